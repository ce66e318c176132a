use handmark::{HandSample, Handedness, Landmark};

/// Hands reported by the tracker for one camera frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingFrame {
    pub hands: Vec<HandSample>,
}

impl TrackingFrame {
    pub fn new(hands: Vec<HandSample>) -> Self {
        Self { hands }
    }

    /// Builds a frame from raw tracker output. Hands with too few landmarks
    /// or non-finite coordinates are dropped.
    pub fn from_raw(
        raw: impl IntoIterator<Item = (Handedness, Vec<Landmark>)>,
        timestamp: f64,
    ) -> Self {
        let hands = raw
            .into_iter()
            .filter_map(|(handedness, points)| {
                HandSample::new(handedness, &points, timestamp)
                    .map_err(|e| log::warn!("Dropping {handedness} hand: {e}"))
                    .ok()
            })
            .collect();
        Self { hands }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Frame(TrackingFrame),
    Tick,
    ConfigReload,
    ReplayFinished,
}
