//! Scale-aware distance classifiers over a single hand or a pair of hands.

use crate::landmark::{
    FrameSize, HandSample, INDEX_PIP, INDEX_TIP, Landmark, Landmarks, MIDDLE_TIP, PINKY_TIP,
    Point, THUMB_IP, THUMB_TIP, WRIST,
};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

// anatomical averages in normalized frame units, for a hand at a typical
// distance from the camera
const AVG_HAND_LENGTH: f64 = 0.15;
const AVG_THUMB_TO_INDEX: f64 = 0.08;
const AVG_HAND_WIDTH: f64 = 0.12;
const MIN_HAND_SCALE: f64 = 0.4;
const MAX_HAND_SCALE: f64 = 2.5;

const DEPTH_ALIGNED: f64 = 0.02;
const DEPTH_ALIGNED_BONUS: f64 = 1.2;

pub const DEFAULT_PINCH_BASE: f64 = 0.02;

/// Relative size of a hand in frame, 1.0 being an average hand.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Into)]
pub struct HandScale(f64);

crate::impl_scalar_newtype!(HandScale);

/// 2D distance between thumb tip and index tip.
pub fn pinch_distance(hand: &Landmarks) -> f64 {
    hand[THUMB_TIP].distance_2d(&hand[INDEX_TIP])
}

/// Blends hand length, hand width and thumb/index span (40/40/20) against
/// anatomical averages, clamped to `[0.4, 2.5]`.
pub fn hand_scale(hand: &Landmarks) -> HandScale {
    let length = hand[WRIST].distance_2d(&hand[MIDDLE_TIP]) / AVG_HAND_LENGTH;
    let width = hand[THUMB_TIP].distance_2d(&hand[PINKY_TIP]) / AVG_HAND_WIDTH;
    let span = pinch_distance(hand) / AVG_THUMB_TO_INDEX;

    let blended = length * 0.4 + width * 0.4 + span * 0.2;
    HandScale(blended.clamp(MIN_HAND_SCALE, MAX_HAND_SCALE))
}

/// How a pinch is decided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PinchThreshold {
    /// `base × hand_scale × depth_bonus` against the closest of the
    /// tip/tip, tip/PIP and IP/tip distances.
    Adaptive { base: f64 },
    /// Plain tip-to-tip distance against a constant.
    Fixed { distance: f64 },
}

impl Default for PinchThreshold {
    fn default() -> Self {
        Self::Adaptive {
            base: DEFAULT_PINCH_BASE,
        }
    }
}

impl PinchThreshold {
    pub fn is_pinching(&self, hand: &Landmarks) -> bool {
        match *self {
            Self::Adaptive { base } => closest_contact(hand) < adaptive_threshold(hand, base),
            Self::Fixed { distance } => pinch_distance(hand) < distance,
        }
    }
}

/// Scale-invariant pinch test with the default base threshold.
pub fn is_pinching(hand: &Landmarks) -> bool {
    PinchThreshold::default().is_pinching(hand)
}

fn adaptive_threshold(hand: &Landmarks, base: f64) -> f64 {
    let depth_gap = (hand[THUMB_TIP].z - hand[INDEX_TIP].z).abs();
    // fingers visually touching but far apart in depth are not a pinch
    let depth_bonus = if depth_gap < DEPTH_ALIGNED {
        DEPTH_ALIGNED_BONUS
    } else {
        1.0
    };
    base * hand_scale(hand).get() * depth_bonus
}

fn closest_contact(hand: &Landmarks) -> f64 {
    let tips = hand[THUMB_TIP].distance_2d(&hand[INDEX_TIP]);
    let thumb_to_pip = hand[THUMB_TIP].distance_2d(&hand[INDEX_PIP]);
    let ip_to_tip = hand[THUMB_IP].distance_2d(&hand[INDEX_TIP]);
    tips.min(thumb_to_pip).min(ip_to_tip)
}

/// Midpoint of thumb tip and index tip, in normalized coordinates.
pub fn pinch_center(hand: &Landmarks) -> Landmark {
    hand[THUMB_TIP].midpoint(&hand[INDEX_TIP])
}

/// Pinch midpoint projected to pixel space.
pub fn pinch_midpoint(hand: &Landmarks, frame: FrameSize) -> Point {
    frame.project(&pinch_center(hand))
}

/// Distance in pixels between the pinch midpoints of two hands. Depth is
/// scaled by the frame width, same as the horizontal axis, and combined with
/// the planar distance.
pub fn hands_distance(a: &HandSample, b: &HandSample, frame: FrameSize) -> f64 {
    let ca = pinch_center(&a.landmarks);
    let cb = pinch_center(&b.landmarks);

    let planar = frame.project(&ca).distance_to(frame.project(&cb));
    let depth = (ca.z - cb.z).abs() * frame.width;

    planar.hypot(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::landmark::Handedness;

    #[test]
    fn test_pinch_distance_open_hand() {
        let hand = fixtures::open_hand();
        let d = pinch_distance(&hand);
        assert!((d - 0.0814).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn test_average_hand_scale_near_one() {
        let scale = hand_scale(&fixtures::open_hand()).get();
        assert!(scale > 0.9 && scale < 1.3, "got {scale}");
    }

    #[test]
    fn test_hand_scale_is_clamped() {
        let tiny = fixtures::scaled(&fixtures::open_hand(), 0.01);
        let huge = fixtures::scaled(&fixtures::open_hand(), 10.0);
        assert_eq!(hand_scale(&tiny).get(), MIN_HAND_SCALE);
        assert_eq!(hand_scale(&huge).get(), MAX_HAND_SCALE);
    }

    #[test]
    fn test_pinch_classification() {
        assert!(is_pinching(&fixtures::pinching_hand()));
        assert!(!is_pinching(&fixtures::open_hand()));
    }

    #[test]
    fn test_pinch_is_scale_invariant() {
        let pinched = fixtures::pinching_hand();
        let open = fixtures::open_hand();
        for k in [0.5, 0.75, 1.0, 1.25, 1.5, 2.0] {
            assert!(is_pinching(&fixtures::scaled(&pinched, k)), "pinch lost at {k}");
            assert!(!is_pinching(&fixtures::scaled(&open, k)), "false pinch at {k}");
        }
    }

    #[test]
    fn test_depth_separation_removes_bonus() {
        let hand = fixtures::pinching_hand();
        let aligned = adaptive_threshold(&hand, DEFAULT_PINCH_BASE);
        let mut points = *hand;
        points[INDEX_TIP].z = 0.1;
        let separated = adaptive_threshold(&Landmarks::from_array(points), DEFAULT_PINCH_BASE);
        assert!((aligned / separated - DEPTH_ALIGNED_BONUS).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_threshold() {
        let threshold = PinchThreshold::Fixed { distance: 0.035 };
        assert!(threshold.is_pinching(&fixtures::pinching_hand()));
        assert!(!threshold.is_pinching(&fixtures::open_hand()));
    }

    #[test]
    fn test_hands_distance_planar_and_depth() {
        let frame = FrameSize::new(1000.0, 1000.0);
        let left = fixtures::sample(Handedness::Left, fixtures::pinching_hand());
        let right = fixtures::sample(
            Handedness::Right,
            fixtures::translated(&fixtures::pinching_hand(), 0.3, 0.0, 0.0),
        );
        assert!((hands_distance(&left, &right, frame) - 300.0).abs() < 1e-6);

        let deeper = fixtures::sample(
            Handedness::Right,
            fixtures::translated(&fixtures::pinching_hand(), 0.3, 0.0, 0.4),
        );
        assert!((hands_distance(&left, &deeper, frame) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_hands_distance_is_monotonic() {
        let frame = FrameSize::default();
        let left = fixtures::sample(Handedness::Left, fixtures::pinching_hand());
        let mut last = 0.0;
        for step in 1..10 {
            let right = fixtures::sample(
                Handedness::Right,
                fixtures::translated(&fixtures::pinching_hand(), step as f64 * 0.05, 0.0, 0.0),
            );
            let d = hands_distance(&left, &right, frame);
            assert!(d > last);
            last = d;
        }
    }

    #[test]
    fn test_pinch_threshold_deserialization() {
        let adaptive: PinchThreshold =
            serde_json::from_str(r#"{"kind": "adaptive", "base": 0.03}"#).unwrap();
        assert_eq!(adaptive, PinchThreshold::Adaptive { base: 0.03 });
        let fixed: PinchThreshold =
            serde_json::from_str(r#"{"kind": "fixed", "distance": 0.035}"#).unwrap();
        assert_eq!(fixed, PinchThreshold::Fixed { distance: 0.035 });
    }
}
