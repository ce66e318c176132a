pub mod geometry;
pub mod landmark;
pub mod macros;
pub mod pose;

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;

pub use geometry::{HandScale, PinchThreshold};
pub use landmark::{FrameSize, HandSample, Handedness, Landmark, LandmarkError, Landmarks, Point};
pub use pose::{Degrees, Orientation};
