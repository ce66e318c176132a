use handmark::Point;

/// Progress is not reported until the pinch has been held this long.
pub const PROGRESS_HIDDEN_MS: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LongPressPhase {
    #[default]
    Idle,
    /// Pinch started, waiting out the open delay.
    Armed { since: f64 },
    /// Open delay elapsed, counting the long press itself.
    Holding { armed_at: f64, since: f64 },
    MenuOpen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongPressAction {
    None,
    Armed,
    Started,
    Open(Point),
    Drag(Point),
    Release,
    Cancelled,
}

/// Single-hand pinch-and-hold that opens the radial menu.
///
/// A pinch arms the timer. Once `open_delay_ms` has passed the long press
/// itself starts, and after a further `duration_ms` the menu opens at the
/// pinch position. While the menu is open every pinching frame drags, and
/// letting go releases.
#[derive(Debug, Clone)]
pub struct LongPress {
    phase: LongPressPhase,
    open_delay_ms: f64,
    duration_ms: f64,
}

impl LongPress {
    pub fn new(open_delay_ms: f64, duration_ms: f64) -> Self {
        Self {
            phase: LongPressPhase::Idle,
            open_delay_ms,
            duration_ms,
        }
    }

    pub fn update(&mut self, pinching: bool, position: Point, now: f64) -> LongPressAction {
        match (self.phase, pinching) {
            (LongPressPhase::Idle, false) => LongPressAction::None,
            (LongPressPhase::Idle, true) => {
                self.phase = LongPressPhase::Armed { since: now };
                LongPressAction::Armed
            }
            (LongPressPhase::Armed { .. } | LongPressPhase::Holding { .. }, false) => {
                self.phase = LongPressPhase::Idle;
                LongPressAction::Cancelled
            }
            (LongPressPhase::MenuOpen, false) => {
                self.phase = LongPressPhase::Idle;
                LongPressAction::Release
            }
            (LongPressPhase::Armed { since }, true) => {
                if now - since < self.open_delay_ms {
                    return LongPressAction::None;
                }
                self.phase = LongPressPhase::Holding {
                    armed_at: since,
                    since: now,
                };
                if self.duration_ms <= 0.0 {
                    self.phase = LongPressPhase::MenuOpen;
                    return LongPressAction::Open(position);
                }
                LongPressAction::Started
            }
            (LongPressPhase::Holding { since, .. }, true) => {
                if now - since < self.duration_ms {
                    return LongPressAction::None;
                }
                self.phase = LongPressPhase::MenuOpen;
                LongPressAction::Open(position)
            }
            (LongPressPhase::MenuOpen, true) => LongPressAction::Drag(position),
        }
    }

    /// Fraction of the hold completed, for a progress ring. `None` while idle,
    /// during the first [`PROGRESS_HIDDEN_MS`] and once the menu is open.
    pub fn progress(&self, now: f64) -> Option<f64> {
        let armed_at = match self.phase {
            LongPressPhase::Armed { since } => since,
            LongPressPhase::Holding { armed_at, .. } => armed_at,
            LongPressPhase::Idle | LongPressPhase::MenuOpen => return None,
        };
        let elapsed = now - armed_at;
        if elapsed < PROGRESS_HIDDEN_MS {
            return None;
        }
        let total = self.open_delay_ms + self.duration_ms;
        if total <= 0.0 {
            return Some(1.0);
        }
        Some((elapsed / total).clamp(0.0, 1.0))
    }

    pub fn phase(&self) -> LongPressPhase {
        self.phase
    }

    pub fn is_menu_open(&self) -> bool {
        self.phase == LongPressPhase::MenuOpen
    }

    pub fn set_timing(&mut self, open_delay_ms: f64, duration_ms: f64) {
        self.open_delay_ms = open_delay_ms;
        self.duration_ms = duration_ms;
    }

    pub fn reset(&mut self) {
        self.phase = LongPressPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HERE: Point = Point { x: 640.0, y: 360.0 };

    /// Pinches from t=0 in 1ms steps up to and including `until`, collecting
    /// every non-trivial action with its timestamp.
    fn hold(press: &mut LongPress, until: u32) -> Vec<(f64, LongPressAction)> {
        (0..=until)
            .map(|t| t as f64)
            .map(|t| (t, press.update(true, HERE, t)))
            .filter(|(_, action)| *action != LongPressAction::None)
            .collect()
    }

    #[test]
    fn test_opens_after_delay_plus_duration() {
        let mut press = LongPress::new(300.0, 500.0);
        let actions = hold(&mut press, 801);

        assert_eq!(actions[0], (0.0, LongPressAction::Armed));
        assert_eq!(actions[1], (300.0, LongPressAction::Started));
        assert_eq!(actions[2], (800.0, LongPressAction::Open(HERE)));
        assert_eq!(actions[3], (801.0, LongPressAction::Drag(HERE)));
        assert_eq!(actions.len(), 4);
    }

    #[test]
    fn test_short_hold_does_not_open() {
        let mut press = LongPress::new(300.0, 500.0);
        let actions = hold(&mut press, 799);
        assert!(
            !actions
                .iter()
                .any(|(_, a)| matches!(a, LongPressAction::Open(_)))
        );
        assert_eq!(press.update(false, HERE, 800.0), LongPressAction::Cancelled);
        assert_eq!(press.phase(), LongPressPhase::Idle);
    }

    #[test]
    fn test_release_after_open() {
        let mut press = LongPress::new(300.0, 500.0);
        hold(&mut press, 900);
        assert!(press.is_menu_open());
        assert_eq!(press.update(false, HERE, 901.0), LongPressAction::Release);
        assert_eq!(press.update(false, HERE, 902.0), LongPressAction::None);
    }

    #[test]
    fn test_opens_exactly_once() {
        let mut press = LongPress::new(300.0, 500.0);
        let opens = hold(&mut press, 2000)
            .into_iter()
            .filter(|(_, a)| matches!(a, LongPressAction::Open(_)))
            .count();
        assert_eq!(opens, 1);
    }

    #[test]
    fn test_progress() {
        let mut press = LongPress::new(300.0, 500.0);
        assert_eq!(press.progress(0.0), None);

        press.update(true, HERE, 0.0);
        assert_eq!(press.progress(199.0), None);
        assert_eq!(press.progress(400.0), Some(0.5));

        hold(&mut press, 800);
        assert_eq!(press.progress(800.0), None);
    }
}
