use serde::Serialize;
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// What the two-hand gesture currently controls.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    #[strum(to_string = "volume", serialize = "vol")]
    Volume,
    #[strum(to_string = "reverb", serialize = "echo", serialize = "space")]
    Reverb,
    #[strum(to_string = "panning", serialize = "pan", serialize = "direction")]
    Panning,
    #[strum(to_string = "equalizer", serialize = "eq")]
    Equalizer,
    #[strum(to_string = "wobble")]
    Wobble,
}

impl Mode {
    /// Modes reachable from the radial menu, in item order.
    pub const MENU: [Mode; 3] = [Mode::Volume, Mode::Reverb, Mode::Panning];

    /// Modes driven by the distance between two pinching hands.
    pub fn uses_two_hand_pinch(&self) -> bool {
        matches!(self, Mode::Volume | Mode::Reverb)
    }

    pub fn menu_index(&self) -> Option<usize> {
        Self::MENU.iter().position(|m| m == self)
    }
}
