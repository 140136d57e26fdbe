//! Synthetic hand poses for unit tests.
//!
//! Coordinates are normalized image coordinates with y increasing
//! downward, wrist near the bottom center of the frame.

use crate::tracking::{landmarks, HandLandmarks, Landmark};

#[derive(Clone, Copy, Debug)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

fn lm(x: f32, y: f32, z: f32) -> Landmark {
    Landmark { x, y, z }
}

fn finger_base_x(finger: Finger) -> f32 {
    match finger {
        Finger::Index => 0.56,
        Finger::Middle => 0.52,
        Finger::Ring => 0.48,
        Finger::Pinky => 0.44,
    }
}

fn finger_indices(finger: Finger) -> (usize, usize, usize, usize) {
    match finger {
        Finger::Index => (
            landmarks::INDEX_MCP,
            landmarks::INDEX_PIP,
            landmarks::INDEX_DIP,
            landmarks::INDEX_TIP,
        ),
        Finger::Middle => (
            landmarks::MIDDLE_MCP,
            landmarks::MIDDLE_PIP,
            landmarks::MIDDLE_DIP,
            landmarks::MIDDLE_TIP,
        ),
        Finger::Ring => (
            landmarks::RING_MCP,
            landmarks::RING_PIP,
            landmarks::RING_DIP,
            landmarks::RING_TIP,
        ),
        Finger::Pinky => (
            landmarks::PINKY_MCP,
            landmarks::PINKY_PIP,
            landmarks::PINKY_DIP,
            landmarks::PINKY_TIP,
        ),
    }
}

/// Closed fist: all four fingers curled, thumb tucked against the palm.
pub fn fist() -> HandLandmarks {
    let mut points = [Landmark::default(); 21];

    points[landmarks::WRIST] = lm(0.50, 0.80, 0.0);

    // Tucked thumb: tip slightly above the IP joint but horizontally
    // within the splay threshold of the wrist.
    points[landmarks::THUMB_CMC] = lm(0.46, 0.76, 0.0);
    points[landmarks::THUMB_MCP] = lm(0.44, 0.74, 0.0);
    points[landmarks::THUMB_IP] = lm(0.43, 0.72, 0.0);
    points[landmarks::THUMB_TIP] = lm(0.46, 0.70, 0.01);

    for finger in [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky] {
        let x = finger_base_x(finger);
        let (mcp, pip, dip, tip) = finger_indices(finger);
        // Curled: the tip folds back toward the knuckle, so the angle at
        // the PIP joint is sharp.
        points[mcp] = lm(x, 0.60, 0.0);
        points[pip] = lm(x, 0.52, 0.0);
        points[dip] = lm(x + 0.005, 0.56, 0.01);
        points[tip] = lm(x + 0.01, 0.60, 0.02);
    }

    HandLandmarks {
        points,
        confidence: 0.95,
    }
}

/// Fist with the given fingers straightened.
pub fn pose(extended: &[Finger]) -> HandLandmarks {
    let mut hand = fist();
    for &finger in extended {
        let x = finger_base_x(finger);
        let (mcp, pip, dip, tip) = finger_indices(finger);
        // Straight: mcp, pip, dip, tip collinear pointing up.
        hand.points[mcp] = lm(x, 0.60, 0.0);
        hand.points[pip] = lm(x, 0.48, 0.0);
        hand.points[dip] = lm(x, 0.42, 0.0);
        hand.points[tip] = lm(x, 0.36, 0.0);
    }
    hand
}

/// Fist with the thumb extended upward and splayed out.
pub fn thumb_up() -> HandLandmarks {
    let mut hand = fist();
    hand.points[landmarks::THUMB_CMC] = lm(0.44, 0.74, 0.0);
    hand.points[landmarks::THUMB_MCP] = lm(0.42, 0.68, 0.0);
    hand.points[landmarks::THUMB_IP] = lm(0.41, 0.62, 0.0);
    hand.points[landmarks::THUMB_TIP] = lm(0.40, 0.55, 0.0);
    hand
}

/// Fist with the thumb extended downward.
pub fn thumb_down() -> HandLandmarks {
    let mut hand = fist();
    hand.points[landmarks::THUMB_CMC] = lm(0.44, 0.78, 0.0);
    hand.points[landmarks::THUMB_MCP] = lm(0.42, 0.84, 0.0);
    hand.points[landmarks::THUMB_IP] = lm(0.41, 0.88, 0.0);
    hand.points[landmarks::THUMB_TIP] = lm(0.40, 0.93, 0.0);
    hand
}

/// Copy of `hand` with every landmark shifted by a constant offset.
pub fn translate(hand: &HandLandmarks, dx: f32, dy: f32, dz: f32) -> HandLandmarks {
    let mut shifted = hand.clone();
    for p in shifted.points.iter_mut() {
        p.x += dx;
        p.y += dy;
        p.z += dz;
    }
    shifted
}
