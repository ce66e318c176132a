use derive_more::{AsRef, Deref};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// (tip, mcp) pairs for the four long fingers.
pub const FINGER_TIPS_AND_KNUCKLES: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("hand sample has {found} landmarks, expected 21")]
    TooFewLandmarks { found: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// One tracked point, normalized to the capture frame. `z` is relative depth
/// and defaults to 0 when the tracker omits it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn flat(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn distance_2d(&self, other: &Landmark) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn midpoint(&self, other: &Landmark) -> Landmark {
        Landmark::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Handedness {
    Left,
    Right,
}

/// Exactly [`LANDMARK_COUNT`] landmarks. Construction is the only place the
/// count is checked; everything downstream indexes freely.
#[derive(Debug, Clone, Copy, PartialEq, Deref, AsRef)]
pub struct Landmarks([Landmark; LANDMARK_COUNT]);

impl Landmarks {
    pub fn from_array(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    /// Takes the first [`LANDMARK_COUNT`] points; fewer, or any NaN or
    /// infinite coordinate among them, is an error.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, LandmarkError> {
        let head = points
            .get(..LANDMARK_COUNT)
            .and_then(|head| <[Landmark; LANDMARK_COUNT]>::try_from(head).ok())
            .ok_or(LandmarkError::TooFewLandmarks {
                found: points.len(),
            })?;
        if let Some(index) = head.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self(head))
    }

    pub fn map(&self, f: impl Fn(&Landmark) -> Landmark) -> Self {
        Self(std::array::from_fn(|i| f(&self.0[i])))
    }
}

impl TryFrom<Vec<Landmark>> for Landmarks {
    type Error = LandmarkError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_slice(&points)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandSample {
    pub handedness: Handedness,
    pub landmarks: Landmarks,
    /// Capture time in milliseconds on the pipeline's monotonic clock.
    pub timestamp: f64,
}

impl HandSample {
    pub fn new(
        handedness: Handedness,
        points: &[Landmark],
        timestamp: f64,
    ) -> Result<Self, LandmarkError> {
        Ok(Self {
            handedness,
            landmarks: Landmarks::from_slice(points)?,
            timestamp,
        })
    }

    pub fn from_landmarks(handedness: Handedness, landmarks: Landmarks, timestamp: f64) -> Self {
        Self {
            handedness,
            landmarks,
            timestamp,
        }
    }
}

/// A position in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Pixel dimensions of the capture/canvas surface normalized coordinates are
/// projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn project(&self, landmark: &Landmark) -> Point {
        Point::new(landmark.x * self.width, landmark.y * self.height)
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
