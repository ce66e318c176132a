use super::DetectedHand;
use handmark::FrameSize;
use handmark::geometry::hands_distance;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinchUpdate {
    Idle,
    Started(f64),
    Holding(f64),
    Released,
}

impl PinchUpdate {
    /// Live hand-to-hand distance while both hands pinch.
    pub fn distance(&self) -> Option<f64> {
        match *self {
            Self::Started(d) | Self::Holding(d) => Some(d),
            Self::Idle | Self::Released => None,
        }
    }
}

/// Both hands pinching at once. Latches the separation at the moment the
/// second pinch lands and follows it until either hand lets go.
#[derive(Debug, Clone, Default)]
pub struct TwoHandPinch {
    start_distance: Option<f64>,
    last_distance: Option<f64>,
}

impl TwoHandPinch {
    pub fn update(&mut self, hands: &[DetectedHand], frame: FrameSize) -> PinchUpdate {
        match hands {
            [a, b] if a.pinching && b.pinching => {
                let distance = hands_distance(&a.sample, &b.sample, frame);
                self.last_distance = Some(distance);
                if self.start_distance.is_none() {
                    log::debug!("Two-hand pinch started at {distance:.1}px");
                    self.start_distance = Some(distance);
                    PinchUpdate::Started(distance)
                } else {
                    PinchUpdate::Holding(distance)
                }
            }
            _ => {
                if self.release() {
                    PinchUpdate::Released
                } else {
                    PinchUpdate::Idle
                }
            }
        }
    }

    /// Drops any latched pinch. Returns whether one was active.
    pub fn release(&mut self) -> bool {
        self.last_distance = None;
        let was_active = self.start_distance.take().is_some();
        if was_active {
            log::debug!("Two-hand pinch released");
        }
        was_active
    }

    pub fn is_active(&self) -> bool {
        self.start_distance.is_some()
    }

    pub fn start_distance(&self) -> Option<f64> {
        self.start_distance
    }

    pub fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }
}
