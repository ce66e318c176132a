use handmark::Orientation;
use serde::Serialize;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Mild,
    Severe,
}

/// Current advisory state, as handed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PositioningWarning {
    pub active: bool,
    pub left_tilted: bool,
    pub right_tilted: bool,
    pub severity: Severity,
}

/// Debounced "turn your palms toward the camera" hint.
///
/// A tilt has to persist for `show_delay_ms` before the warning appears, and
/// the hands have to stay level for `hide_delay_ms` before it goes away.
#[derive(Debug, Clone)]
pub struct PositioningAdvisory {
    warning: PositioningWarning,
    show_started: Option<f64>,
    hide_started: Option<f64>,
    show_delay_ms: f64,
    hide_delay_ms: f64,
}

impl PositioningAdvisory {
    pub fn new(show_delay_ms: f64, hide_delay_ms: f64) -> Self {
        Self {
            warning: PositioningWarning::default(),
            show_started: None,
            hide_started: None,
            show_delay_ms,
            hide_delay_ms,
        }
    }

    /// Feeds the orientation of whichever hands are present. Returns the new
    /// visibility when it flips.
    pub fn update(
        &mut self,
        left: Option<Orientation>,
        right: Option<Orientation>,
        now: f64,
    ) -> Option<bool> {
        let left_tilted = left.is_some_and(|o| o.is_tilted());
        let right_tilted = right.is_some_and(|o| o.is_tilted());
        self.warning.left_tilted = left_tilted;
        self.warning.right_tilted = right_tilted;
        self.warning.severity = match (left.is_some() && right.is_some(), left_tilted, right_tilted) {
            (true, true, true) => Severity::Severe,
            (_, true, _) | (_, _, true) => Severity::Mild,
            _ => Severity::None,
        };

        let tilted = left_tilted || right_tilted;
        match (tilted, self.warning.active) {
            (true, false) => {
                self.hide_started = None;
                let started = *self.show_started.get_or_insert(now);
                if now - started >= self.show_delay_ms {
                    self.warning.active = true;
                    self.show_started = None;
                    log::debug!("Positioning warning shown ({})", self.warning.severity);
                    return Some(true);
                }
            }
            (false, true) => {
                self.show_started = None;
                let started = *self.hide_started.get_or_insert(now);
                if now - started >= self.hide_delay_ms {
                    self.warning.active = false;
                    self.hide_started = None;
                    log::debug!("Positioning warning hidden");
                    return Some(false);
                }
            }
            // state agrees with the hands, drop any pending flip
            _ => {
                self.show_started = None;
                self.hide_started = None;
            }
        }
        None
    }

    pub fn warning(&self) -> PositioningWarning {
        self.warning
    }

    pub fn is_active(&self) -> bool {
        self.warning.active
    }

    pub fn set_delays(&mut self, show_delay_ms: f64, hide_delay_ms: f64) {
        self.show_delay_ms = show_delay_ms;
        self.hide_delay_ms = hide_delay_ms;
    }

    pub fn reset(&mut self) {
        self.warning = PositioningWarning::default();
        self.show_started = None;
        self.hide_started = None;
    }
}
