use crate::landmark::{
    FINGER_TIPS_AND_KNUCKLES, INDEX_MCP, Landmarks, MIDDLE_MCP, THUMB_IP, THUMB_MCP, THUMB_TIP,
    WRIST,
};
use derive_more::{Display, From, Into};

pub const DEFAULT_TILT_THRESHOLD: f64 = 28.0;

const THUMB_STRAIGHT_MAX_RAD: f64 = 0.75;
const UPRIGHT_RATIO: f64 = 1.2;
const UPRIGHT_RATIO_STRICT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Display, From, Into)]
#[display("{_0:.1}°")]
pub struct Degrees(f64);

crate::impl_scalar_newtype!(Degrees);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Angle between the palm normal and the camera axis.
    pub angle: Degrees,
    pub well_positioned: bool,
}

impl Orientation {
    fn facing_camera() -> Self {
        Self {
            angle: Degrees(0.0),
            well_positioned: true,
        }
    }

    pub fn is_tilted(&self) -> bool {
        !self.well_positioned
    }
}

/// Palm orientation relative to the camera, from the plane spanned by the
/// wrist and the index/middle knuckles. Collinear points report a palm facing
/// the camera.
pub fn orientation(hand: &Landmarks, tilt_threshold: f64) -> Orientation {
    let wrist = hand[WRIST];
    let v1 = [
        hand[MIDDLE_MCP].x - wrist.x,
        hand[MIDDLE_MCP].y - wrist.y,
        hand[MIDDLE_MCP].z - wrist.z,
    ];
    let v2 = [
        hand[INDEX_MCP].x - wrist.x,
        hand[INDEX_MCP].y - wrist.y,
        hand[INDEX_MCP].z - wrist.z,
    ];

    let normal = [
        v1[1] * v2[2] - v1[2] * v2[1],
        v1[2] * v2[0] - v1[0] * v2[2],
        v1[0] * v2[1] - v1[1] * v2[0],
    ];
    let magnitude = normal.iter().map(|c| c * c).sum::<f64>().sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return Orientation::facing_camera();
    }

    // the palm may face toward or away from the camera; only the tilt matters
    let cos = (normal[2] / magnitude).abs().clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();

    Orientation {
        angle: Degrees(angle),
        well_positioned: angle < tilt_threshold,
    }
}

/// Thumb extended upward with the other fingers curled. Image y grows
/// downward, so a curled finger has its tip below (greater y than) its
/// knuckle. `strict` requires all four fingers curled and a more vertical
/// thumb.
pub fn is_thumbs_up(hand: &Landmarks, strict: bool) -> bool {
    let closed = FINGER_TIPS_AND_KNUCKLES
        .iter()
        .filter(|&&(tip, mcp)| hand[tip].y > hand[mcp].y)
        .count();
    let required = if strict { 4 } else { 3 };
    if closed < required {
        return false;
    }

    let (mcp, ip, tip) = (hand[THUMB_MCP], hand[THUMB_IP], hand[THUMB_TIP]);
    let seg1 = (ip.x - mcp.x, ip.y - mcp.y);
    let seg2 = (tip.x - ip.x, tip.y - ip.y);
    let mags = seg1.0.hypot(seg1.1) * seg2.0.hypot(seg2.1);
    if mags == 0.0 {
        return false;
    }

    let bend = ((seg1.0 * seg2.0 + seg1.1 * seg2.1) / mags)
        .clamp(-1.0, 1.0)
        .acos();
    if bend >= THUMB_STRAIGHT_MAX_RAD {
        return false;
    }

    let vertical = (tip.y - mcp.y).abs();
    let horizontal = (tip.x - mcp.x).abs();
    let ratio = if strict {
        UPRIGHT_RATIO_STRICT
    } else {
        UPRIGHT_RATIO
    };
    vertical > horizontal * ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::landmark::{Landmark, PINKY_MCP, PINKY_TIP};

    #[test]
    fn test_flat_hand_faces_camera() {
        let o = orientation(&fixtures::open_hand(), DEFAULT_TILT_THRESHOLD);
        assert!(o.angle.get() < 1e-9);
        assert!(o.well_positioned);
    }

    #[test]
    fn test_tilted_hand() {
        let o = orientation(&fixtures::tilted_hand(), DEFAULT_TILT_THRESHOLD);
        assert!(o.angle.get() > 50.0, "got {}", o.angle);
        assert!(o.is_tilted());
    }

    #[test]
    fn test_degenerate_hand_fails_open() {
        let collapsed = Landmarks::from_array([Landmark::flat(0.5, 0.5); 21]);
        let o = orientation(&collapsed, DEFAULT_TILT_THRESHOLD);
        assert_eq!(o.angle.get(), 0.0);
        assert!(o.well_positioned);
    }

    #[test]
    fn test_thumbs_up() {
        let hand = fixtures::thumbs_up_hand();
        assert!(is_thumbs_up(&hand, false));
        assert!(is_thumbs_up(&hand, true));
        assert!(!is_thumbs_up(&fixtures::open_hand(), false));
    }

    #[test]
    fn test_strict_needs_all_fingers_closed() {
        let mut points = *fixtures::thumbs_up_hand();
        // open the pinky
        points[PINKY_TIP].y = points[PINKY_MCP].y - 0.05;
        let hand = Landmarks::from_array(points);
        assert!(is_thumbs_up(&hand, false));
        assert!(!is_thumbs_up(&hand, true));
    }

    #[test]
    fn test_bent_thumb_is_not_thumbs_up() {
        let mut points = *fixtures::thumbs_up_hand();
        // fold the tip sideways past the straightness limit
        points[THUMB_TIP] = Landmark::flat(points[THUMB_IP].x + 0.05, points[THUMB_IP].y);
        assert!(!is_thumbs_up(&Landmarks::from_array(points), false));
    }

    #[test]
    fn test_degrees_display() {
        assert_eq!(Degrees::new(28.04).to_string(), "28.0°");
    }
}
