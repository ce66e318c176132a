//! Hand-gesture control for an audio/visual installation: smoothing of
//! tracked hand landmarks, gesture recognition, a radial mode menu and the
//! control channels it all drives.

pub mod calibration;
pub mod config;
pub mod control;
pub mod events;
pub mod gesture;
pub mod menu;
pub mod mode;
pub mod pipeline;
pub mod sink;
pub mod smoothing;
pub mod sys;

pub use pipeline::{FrameReport, GesturePipeline};
