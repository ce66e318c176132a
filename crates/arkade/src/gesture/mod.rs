//! Edge-triggered gesture interpretation over smoothed hands.

pub mod advisory;
pub mod long_press;
pub mod pinch;
pub mod thumbs_up;

pub use advisory::{PositioningAdvisory, PositioningWarning, Severity};
pub use long_press::{LongPress, LongPressAction, LongPressPhase};
pub use pinch::{PinchUpdate, TwoHandPinch};
pub use thumbs_up::ThumbsUpDetector;

use crate::mode::Mode;
use handmark::{HandSample, Handedness, Point};

/// A stable hand with its pinch classification for this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedHand {
    pub sample: HandSample,
    pub pinching: bool,
}

impl DetectedHand {
    pub fn handedness(&self) -> Handedness {
        self.sample.handedness
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    PinchStarted { distance: f64 },
    PinchReleased,
    LongPressArmed,
    LongPressStarted,
    MenuOpened { center: Point },
    /// Pinch released over the open menu.
    MenuReleased { selection: Option<Mode> },
    /// Menu closed without a release, e.g. the hand left the frame.
    MenuDismissed,
    /// Close animation finished.
    MenuClosed,
    ModeChanged(Mode),
    ThumbsUp,
    WarningShown,
    WarningHidden,
    TrackingLost,
    CalibrationFinished { min: f64, max: f64 },
}
