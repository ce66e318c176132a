//! Temporal smoothing: landmark snapshot blending, moving-average control
//! channels and spring-animated values.

pub mod buffer;
pub mod channel;
pub mod spring;

pub use buffer::{SampleBuffer, Snapshot, Weighting};
pub use channel::ControlChannel;
pub use spring::{Spring, SpringParams};
