use handmark::landmark::LANDMARK_COUNT;
use handmark::{HandSample, Handedness, Landmark, Landmarks};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How buffered snapshots are blended into a stable hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Weight `2^i` for the i-th snapshot from the oldest. Until the buffer
    /// is full the latest raw sample is passed through.
    #[default]
    Exponential,
    /// Plain mean over whatever is buffered.
    Uniform,
}

impl Weighting {
    fn weight(&self, index: usize) -> f64 {
        match self {
            Self::Exponential => 2f64.powi(index as i32),
            Self::Uniform => 1.0,
        }
    }

    fn needs_full_history(&self) -> bool {
        matches!(self, Self::Exponential)
    }
}

/// Hands seen in one tracking frame, at most one per handedness.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    hands: Vec<HandSample>,
    pub timestamp: f64,
}

impl Snapshot {
    /// Keeps the first hand of each handedness.
    pub fn new(hands: impl IntoIterator<Item = HandSample>, timestamp: f64) -> Self {
        let mut kept: Vec<HandSample> = Vec::with_capacity(2);
        for hand in hands {
            if kept.iter().any(|h| h.handedness == hand.handedness) {
                log::debug!("Dropping duplicate {} hand in frame", hand.handedness);
                continue;
            }
            kept.push(hand);
        }
        Self {
            hands: kept,
            timestamp,
        }
    }

    pub fn hand(&self, handedness: Handedness) -> Option<&HandSample> {
        self.hands.iter().find(|h| h.handedness == handedness)
    }

    pub fn hands(&self) -> &[HandSample] {
        &self.hands
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// Bounded FIFO of recent snapshots.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    capacity: usize,
    weighting: Weighting,
    snapshots: VecDeque<Snapshot>,
}

impl SampleBuffer {
    pub fn new(capacity: usize, weighting: Weighting) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            weighting,
            snapshots: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn reconfigure(&mut self, capacity: usize, weighting: Weighting) {
        self.capacity = capacity.max(1);
        self.weighting = weighting;
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
    }

    /// One smoothed hand per handedness present in the latest snapshot.
    pub fn stable(&self) -> Vec<HandSample> {
        let Some(latest) = self.snapshots.back() else {
            return Vec::new();
        };

        if self.weighting.needs_full_history() && self.snapshots.len() < self.capacity {
            return latest.hands.clone();
        }

        latest.hands.iter().map(|hand| self.blend(hand)).collect()
    }

    fn blend(&self, latest: &HandSample) -> HandSample {
        let mut acc = [[0.0f64; 3]; LANDMARK_COUNT];
        let mut total = 0.0;

        for (i, snapshot) in self.snapshots.iter().enumerate() {
            let Some(sample) = snapshot.hand(latest.handedness) else {
                continue;
            };
            let w = self.weighting.weight(i);
            for (slot, p) in acc.iter_mut().zip(sample.landmarks.iter()) {
                slot[0] += p.x * w;
                slot[1] += p.y * w;
                slot[2] += p.z * w;
            }
            total += w;
        }

        // latest is always among the snapshots, so total > 0
        let landmarks = Landmarks::from_array(
            acc.map(|[x, y, z]| Landmark::new(x / total, y / total, z / total)),
        );
        HandSample::from_landmarks(latest.handedness, landmarks, latest.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handmark::fixtures;
    use handmark::landmark::WRIST;

    fn snapshot_at(dx: f64, t: f64, hands: &[Handedness]) -> Snapshot {
        Snapshot::new(
            hands.iter().map(|&h| {
                HandSample::from_landmarks(
                    h,
                    fixtures::translated(&fixtures::open_hand(), dx, 0.0, 0.0),
                    t,
                )
            }),
            t,
        )
    }

    fn wrist_x(samples: &[HandSample], h: Handedness) -> f64 {
        samples
            .iter()
            .find(|s| s.handedness == h)
            .map(|s| s.landmarks[WRIST].x)
            .unwrap()
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = SampleBuffer::new(2, Weighting::Exponential);
        assert!(buffer.stable().is_empty());
    }

    #[test]
    fn test_single_snapshot_passes_through() {
        let mut buffer = SampleBuffer::new(2, Weighting::Exponential);
        let snap = snapshot_at(0.1, 0.0, &[Handedness::Left]);
        let raw = snap.hands()[0].clone();
        buffer.push(snap);
        assert_eq!(buffer.stable(), vec![raw]);
    }

    #[test]
    fn test_exponential_weights() {
        let mut buffer = SampleBuffer::new(3, Weighting::Exponential);
        buffer.push(snapshot_at(0.0, 0.0, &[Handedness::Right]));
        buffer.push(snapshot_at(0.07, 16.0, &[Handedness::Right]));
        buffer.push(snapshot_at(0.14, 32.0, &[Handedness::Right]));

        // weights 1, 2, 4 oldest to newest
        let expected = 0.5 + (0.0 * 1.0 + 0.07 * 2.0 + 0.14 * 4.0) / 7.0;
        let stable = buffer.stable();
        assert!((wrist_x(&stable, Handedness::Right) - expected).abs() < 1e-12);
        assert_eq!(stable[0].timestamp, 32.0);
    }

    #[test]
    fn test_missing_hand_is_skipped_in_blend() {
        let mut buffer = SampleBuffer::new(2, Weighting::Exponential);
        buffer.push(snapshot_at(0.0, 0.0, &[Handedness::Right]));
        buffer.push(snapshot_at(0.1, 16.0, &[Handedness::Left, Handedness::Right]));

        let stable = buffer.stable();
        assert_eq!(stable.len(), 2);
        // left only in the newest snapshot
        assert!((wrist_x(&stable, Handedness::Left) - 0.6).abs() < 1e-12);
        let right = 0.5 + (0.0 * 1.0 + 0.1 * 2.0) / 3.0;
        assert!((wrist_x(&stable, Handedness::Right) - right).abs() < 1e-12);
    }

    #[test]
    fn test_hand_absent_from_latest_is_dropped() {
        let mut buffer = SampleBuffer::new(2, Weighting::Exponential);
        buffer.push(snapshot_at(0.0, 0.0, &[Handedness::Left, Handedness::Right]));
        buffer.push(snapshot_at(0.0, 16.0, &[Handedness::Right]));
        let stable = buffer.stable();
        assert_eq!(stable.len(), 1);
        assert_eq!(stable[0].handedness, Handedness::Right);
    }

    #[test]
    fn test_oldest_evicted() {
        let mut buffer = SampleBuffer::new(2, Weighting::Exponential);
        buffer.push(snapshot_at(0.3, 0.0, &[Handedness::Left]));
        buffer.push(snapshot_at(0.0, 16.0, &[Handedness::Left]));
        buffer.push(snapshot_at(0.06, 32.0, &[Handedness::Left]));
        assert_eq!(buffer.len(), 2);

        let expected = 0.5 + (0.0 + 0.06 * 2.0) / 3.0;
        assert!((wrist_x(&buffer.stable(), Handedness::Left) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_averages_partial_history() {
        let mut buffer = SampleBuffer::new(5, Weighting::Uniform);
        buffer.push(snapshot_at(0.0, 0.0, &[Handedness::Left]));
        buffer.push(snapshot_at(0.1, 16.0, &[Handedness::Left]));
        assert!((wrist_x(&buffer.stable(), Handedness::Left) - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_handedness_keeps_first() {
        let first = HandSample::from_landmarks(Handedness::Left, fixtures::open_hand(), 0.0);
        let second = HandSample::from_landmarks(Handedness::Left, fixtures::pinching_hand(), 0.0);
        let snap = Snapshot::new([first.clone(), second], 0.0);
        assert_eq!(snap.hands(), &[first]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = SampleBuffer::new(2, Weighting::Exponential);
        buffer.push(snapshot_at(0.0, 0.0, &[Handedness::Left]));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.stable().is_empty());
    }
}
