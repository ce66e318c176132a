//! Gesture measurements mapped onto the three 0..127 control channels, and
//! the visual springs that follow them.

use crate::config::{CalibrationConfig, Config, PanningConfig, SizeRange, VisualsConfig};
use crate::mode::Mode;
use crate::smoothing::{ControlChannel, Spring};
use handmark::{FrameSize, Landmark};
use serde::Serialize;
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

pub const CHANNEL_MIN: f64 = 0.0;
pub const CHANNEL_MAX: f64 = 127.0;
pub const CHANNEL_CENTER: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Volume,
    Reverb,
    Panning,
}

impl Channel {
    pub fn for_mode(mode: Mode) -> Option<Self> {
        match mode {
            Mode::Volume => Some(Self::Volume),
            Mode::Reverb => Some(Self::Reverb),
            Mode::Panning => Some(Self::Panning),
            Mode::Equalizer | Mode::Wobble => None,
        }
    }

    /// Volume and reverb only ease toward their target while both hands
    /// pinch; panning always does.
    fn advances_while_idle(&self) -> bool {
        matches!(self, Self::Panning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelValue {
    pub current: f64,
    pub target: f64,
}

/// Animated sizes for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VisualFrame {
    pub sphere_size: f64,
    pub hourglass_size: f64,
    /// -1 (left) to 1 (right).
    pub pan_position: f64,
}

/// Linear remap of `value` from `[from_lo, from_hi]` to `[to_lo, to_hi]`,
/// unclamped. A degenerate source range maps to `to_lo`.
pub fn remap(value: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    let span = from_hi - from_lo;
    if span.abs() < f64::EPSILON {
        return to_lo;
    }
    to_lo + (value - from_lo) / span * (to_hi - to_lo)
}

fn size_for(range: &SizeRange, value: f64) -> f64 {
    remap(value, CHANNEL_MIN, CHANNEL_MAX, range.min, range.max)
}

/// Hand-to-hand distance range mapped onto `0..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceRange {
    pub min: f64,
    pub max: f64,
}

impl DistanceRange {
    pub fn map(&self, distance: f64) -> f64 {
        remap(distance, self.min, self.max, CHANNEL_MIN, CHANNEL_MAX).clamp(CHANNEL_MIN, CHANNEL_MAX)
    }
}

impl From<&CalibrationConfig> for DistanceRange {
    fn from(cfg: &CalibrationConfig) -> Self {
        Self {
            min: cfg.min_distance,
            max: cfg.max_distance,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlSurface {
    volume: ControlChannel,
    reverb: ControlChannel,
    panning: ControlChannel,
    range: DistanceRange,
    sphere: Spring,
    hourglass: Spring,
    pan: Spring,
    panning_cfg: PanningConfig,
    visuals_cfg: VisualsConfig,
}

impl ControlSurface {
    pub fn new(config: &Config) -> Self {
        let window = config.timing.smoothing_frames;
        let visuals = &config.visuals;
        Self {
            volume: ControlChannel::new(CHANNEL_CENTER, window),
            reverb: ControlChannel::new(CHANNEL_CENTER, window),
            panning: ControlChannel::new(CHANNEL_CENTER, window),
            range: DistanceRange::from(&config.calibration),
            sphere: Spring::new(visuals.sphere.base, visuals.size_spring),
            hourglass: Spring::new(visuals.hourglass.base, visuals.size_spring),
            pan: Spring::new(0.0, visuals.pan_spring),
            panning_cfg: config.panning.clone(),
            visuals_cfg: visuals.clone(),
        }
    }

    /// Applies new settings, keeping channel values and any calibrated range.
    pub fn reconfigure(&mut self, config: &Config, keep_range: bool) {
        let window = config.timing.smoothing_frames;
        for channel in Channel::iter() {
            self.channel_mut(channel).set_window(window);
        }
        if !keep_range {
            self.range = DistanceRange::from(&config.calibration);
        }
        self.sphere.set_params(config.visuals.size_spring);
        self.hourglass.set_params(config.visuals.size_spring);
        self.pan.set_params(config.visuals.pan_spring);
        self.panning_cfg = config.panning.clone();
        self.visuals_cfg = config.visuals.clone();
    }

    fn channel(&self, channel: Channel) -> &ControlChannel {
        match channel {
            Channel::Volume => &self.volume,
            Channel::Reverb => &self.reverb,
            Channel::Panning => &self.panning,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut ControlChannel {
        match channel {
            Channel::Volume => &mut self.volume,
            Channel::Reverb => &mut self.reverb,
            Channel::Panning => &mut self.panning,
        }
    }

    pub fn value(&self, channel: Channel) -> ChannelValue {
        let c = self.channel(channel);
        ChannelValue {
            current: c.current(),
            target: c.target(),
        }
    }

    pub fn range(&self) -> DistanceRange {
        self.range
    }

    pub fn set_range(&mut self, range: DistanceRange) {
        self.range = range;
    }

    /// Feeds a two-hand distance in pixels into `channel` through the
    /// calibrated range.
    pub fn apply_distance(&mut self, channel: Channel, distance: f64) -> ChannelValue {
        let raw = self.range.map(distance);
        self.push(channel, raw)
    }

    /// Maps the (mirrored) fingertip position along the on-screen slider.
    /// Close to the slider centre the value snaps to 64.
    pub fn apply_pan(&mut self, fingertip: &Landmark, frame: FrameSize) -> ChannelValue {
        let cfg = &self.panning_cfg;
        let screen_x = 1.0 - fingertip.x;

        let center_px = (cfg.slider_start + cfg.slider_end) / 2.0 * frame.width;
        let finger_px = screen_x * frame.width;

        let raw = if (finger_px - center_px).abs() <= cfg.magnet_px {
            CHANNEL_CENTER
        } else {
            remap(screen_x, cfg.slider_start, cfg.slider_end, CHANNEL_MIN, CHANNEL_MAX)
                .clamp(CHANNEL_MIN, CHANNEL_MAX)
        };
        self.push(Channel::Panning, raw)
    }

    fn push(&mut self, channel: Channel, raw: f64) -> ChannelValue {
        if !raw.is_finite() {
            log::warn!("Ignoring non-finite {channel} sample");
            return self.value(channel);
        }
        let target = self.channel_mut(channel).push(raw);
        let visuals = &self.visuals_cfg;
        match channel {
            Channel::Volume => self.sphere.set_target(size_for(&visuals.sphere, target)),
            Channel::Reverb => self
                .hourglass
                .set_target(size_for(&visuals.hourglass, target)),
            Channel::Panning => self
                .pan
                .set_target(remap(target, CHANNEL_MIN, CHANNEL_MAX, -1.0, 1.0)),
        }
        self.value(channel)
    }

    /// Eases channels toward their targets. Returns the ones that moved.
    pub fn advance(&mut self, both_hands_pinching: bool) -> Vec<(Channel, ChannelValue)> {
        let mut moved = Vec::new();
        for channel in Channel::iter() {
            if !both_hands_pinching && !channel.advances_while_idle() {
                continue;
            }
            if self.channel_mut(channel).advance() {
                moved.push((channel, self.value(channel)));
            }
        }
        moved
    }

    pub fn step_visuals(&mut self) -> VisualFrame {
        self.sphere.update();
        self.hourglass.update();
        self.pan.update();
        self.visuals()
    }

    pub fn visuals(&self) -> VisualFrame {
        VisualFrame {
            sphere_size: self.sphere.value(),
            hourglass_size: self.hourglass.value(),
            pan_position: self.pan.value(),
        }
    }
}
