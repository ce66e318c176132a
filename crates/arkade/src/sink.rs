//! Where the pipeline publishes what the installation should show.

use crate::control::{Channel, ChannelValue, VisualFrame};
use crate::gesture::Severity;
use crate::menu::{MenuPhase, MenuVisual};
use crate::mode::Mode;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// The positioning hint as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WarningVisual {
    pub visible: bool,
    pub severity: Severity,
    pub left_tilted: bool,
    pub right_tilted: bool,
}

pub trait UiSink {
    fn set_mode(&mut self, mode: Mode);
    fn set_channel_value(&mut self, channel: Channel, value: ChannelValue);
    fn set_menu_visual(&mut self, visual: &MenuVisual);
    fn set_warning(&mut self, warning: &WarningVisual);
    fn set_visuals(&mut self, _visuals: &VisualFrame) {}
}

/// Logs changes instead of drawing them.
#[derive(Debug, Default)]
pub struct LogSink {
    menu_phase: MenuPhase,
    warning_visible: bool,
}

impl UiSink for LogSink {
    fn set_mode(&mut self, mode: Mode) {
        log::info!("Mode: {mode}");
    }

    fn set_channel_value(&mut self, channel: Channel, value: ChannelValue) {
        log::trace!(
            "{channel}: {:.1} (target {:.1})",
            value.current,
            value.target
        );
    }

    fn set_menu_visual(&mut self, visual: &MenuVisual) {
        if visual.phase == self.menu_phase {
            return;
        }
        self.menu_phase = visual.phase;
        match (visual.phase, visual.center) {
            (MenuPhase::Opening, Some(c)) => log::info!("Menu open at ({:.0}, {:.0})", c.x, c.y),
            (phase, _) => log::debug!("Menu {phase}"),
        }
    }

    fn set_warning(&mut self, warning: &WarningVisual) {
        if warning.visible == self.warning_visible {
            return;
        }
        self.warning_visible = warning.visible;
        if warning.visible {
            log::info!("Hand positioning warning ({})", warning.severity);
        } else {
            log::info!("Hand positioning ok");
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UiSnapshot {
    pub mode: Mode,
    pub channels: HashMap<Channel, ChannelValue>,
    pub menu: Option<MenuVisual>,
    pub warning: WarningVisual,
    pub visuals: VisualFrame,
}

pub type SharedSnapshot = Arc<RwLock<UiSnapshot>>;

/// Keeps the latest published state behind a lock for a render thread to
/// read.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSink {
    shared: SharedSnapshot,
}

impl SnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> SharedSnapshot {
        Arc::clone(&self.shared)
    }
}

impl UiSink for SnapshotSink {
    fn set_mode(&mut self, mode: Mode) {
        self.shared.write().mode = mode;
    }

    fn set_channel_value(&mut self, channel: Channel, value: ChannelValue) {
        self.shared.write().channels.insert(channel, value);
    }

    fn set_menu_visual(&mut self, visual: &MenuVisual) {
        self.shared.write().menu = (visual.phase != MenuPhase::Closed).then(|| visual.clone());
    }

    fn set_warning(&mut self, warning: &WarningVisual) {
        self.shared.write().warning = *warning;
    }

    fn set_visuals(&mut self, visuals: &VisualFrame) {
        self.shared.write().visuals = *visuals;
    }
}
