//! Per-finger extension predicates.
//!
//! A finger counts as extended when the angle at its PIP joint says it is
//! straight rather than curled. This is a heuristic: values near the
//! threshold are sensitive to camera angle, but a straighter finger never
//! scores a lower angle than a more curled one in the same pose.

use crate::gesture::geometry::angle_at_vertex;
use crate::tracking::{landmarks, HandLandmarks};

/// Minimum PIP angle, in degrees, for a finger to count as straight.
pub const EXTENSION_THRESHOLD_DEG: f32 = 140.0;

/// Minimum normalized horizontal tip-to-wrist distance for the thumb to
/// count as splayed outward rather than tucked against the palm.
const THUMB_SPLAY_MIN: f32 = 0.05;

/// Boolean pose of all five fingers, derived fresh every frame.
///
/// The thumb gets two independent predicates because its joint geometry
/// does not curl like the other four fingers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerPose {
    pub thumb_up: bool,
    pub thumb_down: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerPose {
    /// Derive the pose from one hand's landmarks.
    pub fn from_hand(hand: &HandLandmarks) -> Self {
        Self {
            thumb_up: thumb_extended_up(hand),
            thumb_down: thumb_extended_down(hand),
            index: is_extended(
                hand,
                landmarks::INDEX_TIP,
                landmarks::INDEX_PIP,
                landmarks::INDEX_MCP,
                EXTENSION_THRESHOLD_DEG,
            ),
            middle: is_extended(
                hand,
                landmarks::MIDDLE_TIP,
                landmarks::MIDDLE_PIP,
                landmarks::MIDDLE_MCP,
                EXTENSION_THRESHOLD_DEG,
            ),
            ring: is_extended(
                hand,
                landmarks::RING_TIP,
                landmarks::RING_PIP,
                landmarks::RING_MCP,
                EXTENSION_THRESHOLD_DEG,
            ),
            pinky: is_extended(
                hand,
                landmarks::PINKY_TIP,
                landmarks::PINKY_PIP,
                landmarks::PINKY_MCP,
                EXTENSION_THRESHOLD_DEG,
            ),
        }
    }

    /// Count of extended non-thumb fingers (0-4).
    pub fn extended_count(&self) -> u8 {
        self.index as u8 + self.middle as u8 + self.ring as u8 + self.pinky as u8
    }
}

/// True iff the angle at the PIP joint (between tip and MCP) exceeds
/// `threshold_deg`.
pub fn is_extended(
    hand: &HandLandmarks,
    tip: usize,
    pip: usize,
    mcp: usize,
    threshold_deg: f32,
) -> bool {
    angle_at_vertex(hand.points[tip], hand.points[pip], hand.points[mcp]) > threshold_deg
}

/// True iff the thumb is raised and splayed outward: tip above the IP
/// joint (y grows downward in image coordinates) and horizontally clear
/// of the wrist.
pub fn thumb_extended_up(hand: &HandLandmarks) -> bool {
    let tip = hand.points[landmarks::THUMB_TIP];
    let ip = hand.points[landmarks::THUMB_IP];
    let wrist = hand.points[landmarks::WRIST];

    tip.y < ip.y && (tip.x - wrist.x).abs() > THUMB_SPLAY_MIN
}

/// True iff the thumb points downward: tip below its own IP joint and
/// below the index finger's PIP joint.
pub fn thumb_extended_down(hand: &HandLandmarks) -> bool {
    let tip = hand.points[landmarks::THUMB_TIP];
    let ip = hand.points[landmarks::THUMB_IP];
    let index_pip = hand.points[landmarks::INDEX_PIP];

    tip.y > ip.y && tip.y > index_pip.y
}
