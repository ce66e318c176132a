//! Synthetic hands for tests. Coordinates are normalized, for a hand about
//! average size (`hand_scale` ≈ 1) held upright with the palm facing the
//! camera.

use crate::landmark::{
    HandSample, Handedness, INDEX_DIP, INDEX_MCP, INDEX_PIP, INDEX_TIP, Landmark, Landmarks,
    MIDDLE_TIP, PINKY_TIP, RING_TIP, THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};

const OPEN_HAND: [(f64, f64); 21] = [
    (0.50, 0.80),
    (0.46, 0.77),
    (0.43, 0.74),
    (0.41, 0.71),
    (0.40, 0.68),
    (0.47, 0.70),
    (0.465, 0.67),
    (0.46, 0.645),
    (0.455, 0.62),
    (0.50, 0.695),
    (0.50, 0.67),
    (0.50, 0.66),
    (0.50, 0.65),
    (0.53, 0.70),
    (0.535, 0.67),
    (0.537, 0.65),
    (0.54, 0.63),
    (0.56, 0.71),
    (0.565, 0.69),
    (0.568, 0.675),
    (0.57, 0.66),
];

pub fn open_hand() -> Landmarks {
    Landmarks::from_array(OPEN_HAND.map(|(x, y)| Landmark::flat(x, y)))
}

/// Index tip folded onto the thumb tip.
pub fn pinching_hand() -> Landmarks {
    let mut points = *open_hand();
    points[INDEX_DIP] = Landmark::flat(0.42, 0.65);
    points[INDEX_TIP] = Landmark::flat(0.405, 0.675);
    Landmarks::from_array(points)
}

pub fn thumbs_up_hand() -> Landmarks {
    let mut points = *open_hand();
    points[THUMB_CMC] = Landmark::flat(0.46, 0.65);
    points[THUMB_MCP] = Landmark::flat(0.45, 0.60);
    points[THUMB_IP] = Landmark::flat(0.45, 0.55);
    points[THUMB_TIP] = Landmark::flat(0.452, 0.50);
    points[INDEX_PIP] = Landmark::flat(0.46, 0.73);
    points[INDEX_DIP] = Landmark::flat(0.47, 0.75);
    points[INDEX_TIP] = Landmark::flat(0.475, 0.74);
    points[MIDDLE_TIP] = Landmark::flat(0.50, 0.74);
    points[RING_TIP] = Landmark::flat(0.53, 0.745);
    points[PINKY_TIP] = Landmark::flat(0.56, 0.75);
    Landmarks::from_array(points)
}

/// Palm turned about 60° away from the camera.
pub fn tilted_hand() -> Landmarks {
    let mut points = *open_hand();
    points[INDEX_MCP].z = 0.05;
    Landmarks::from_array(points)
}

/// Scales every landmark about the wrist, as if the hand moved toward
/// (`k > 1`) or away from the camera.
pub fn scaled(hand: &Landmarks, k: f64) -> Landmarks {
    let origin = hand[WRIST];
    hand.map(|p| {
        Landmark::new(
            origin.x + (p.x - origin.x) * k,
            origin.y + (p.y - origin.y) * k,
            origin.z + (p.z - origin.z) * k,
        )
    })
}

pub fn translated(hand: &Landmarks, dx: f64, dy: f64, dz: f64) -> Landmarks {
    hand.map(|p| Landmark::new(p.x + dx, p.y + dy, p.z + dz))
}

pub fn sample(handedness: Handedness, landmarks: Landmarks) -> HandSample {
    HandSample::from_landmarks(handedness, landmarks, 0.0)
}
