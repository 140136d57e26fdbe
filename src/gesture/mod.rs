//! Gesture classification
//!
//! Converts one frame's hand landmarks into a discrete gesture label by
//! combining the per-finger predicates from [`fingers`] under a fixed
//! priority order. "No recognizable pose" is `None`.

pub mod debounce;
pub mod fingers;
pub mod geometry;

#[cfg(test)]
pub mod test_hands;

use crate::tracking::HandLandmarks;
use fingers::FingerPose;

/// The closed set of recognizable gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gesture {
    ThumbUp,
    ThumbDown,
    IndexUp,
    PeaceSign,
    ThreeFingers,
}

impl Gesture {
    /// All gestures, in classification priority order.
    pub const ALL: [Gesture; 5] = [
        Gesture::ThumbUp,
        Gesture::ThumbDown,
        Gesture::IndexUp,
        Gesture::PeaceSign,
        Gesture::ThreeFingers,
    ];

    /// Stable label used in the configuration file.
    pub fn label(self) -> &'static str {
        match self {
            Gesture::ThumbUp => "thumb_up",
            Gesture::ThumbDown => "thumb_down",
            Gesture::IndexUp => "index_up",
            Gesture::PeaceSign => "peace_sign",
            Gesture::ThreeFingers => "three_fingers",
        }
    }

    /// Parse a configuration-file label.
    pub fn from_label(label: &str) -> Option<Gesture> {
        Gesture::ALL.into_iter().find(|g| g.label() == label)
    }

    /// Human-readable name for the status line.
    pub fn display_name(self) -> &'static str {
        match self {
            Gesture::ThumbUp => "Thumb Up",
            Gesture::ThumbDown => "Thumb Down",
            Gesture::IndexUp => "Index Up",
            Gesture::PeaceSign => "Peace Sign",
            Gesture::ThreeFingers => "Three Fingers",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify one frame's hand landmarks into a gesture.
///
/// Rules apply in strict priority order and the first match wins; the
/// order is load-bearing for ambiguous poses (a noisy frame satisfying
/// both thumb rules must not double-fire). Each rule requires all
/// non-participating fingers closed, which keeps false positives low for
/// users who cannot easily correct a misfire.
pub fn classify(hand: &HandLandmarks) -> Option<Gesture> {
    let pose = FingerPose::from_hand(hand);
    classify_pose(pose)
}

/// Classification on an already-derived finger pose.
pub fn classify_pose(pose: FingerPose) -> Option<Gesture> {
    let extended = pose.extended_count();

    // Thumb up: only the thumb, pointing up.
    if pose.thumb_up && extended == 0 && !pose.thumb_down {
        return Some(Gesture::ThumbUp);
    }

    // Thumb down: only the thumb, pointing down.
    if pose.thumb_down && extended == 0 && !pose.thumb_up {
        return Some(Gesture::ThumbDown);
    }

    // Index up: only the index finger (thumb may be tucked or out).
    if pose.index && !pose.middle && !pose.ring && !pose.pinky {
        return Some(Gesture::IndexUp);
    }

    // Peace sign: index + middle.
    if pose.index && pose.middle && !pose.ring && !pose.pinky {
        return Some(Gesture::PeaceSign);
    }

    // Three fingers: index + middle + ring.
    if pose.index && pose.middle && pose.ring && !pose.pinky {
        return Some(Gesture::ThreeFingers);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_hands::Finger;

    #[test]
    fn test_thumb_up_classified() {
        assert_eq!(classify(&test_hands::thumb_up()), Some(Gesture::ThumbUp));
    }

    #[test]
    fn test_thumb_down_classified() {
        assert_eq!(classify(&test_hands::thumb_down()), Some(Gesture::ThumbDown));
    }

    #[test]
    fn test_index_up_classified() {
        let hand = test_hands::pose(&[Finger::Index]);
        assert_eq!(classify(&hand), Some(Gesture::IndexUp));
    }

    #[test]
    fn test_peace_sign_classified() {
        let hand = test_hands::pose(&[Finger::Index, Finger::Middle]);
        assert_eq!(classify(&hand), Some(Gesture::PeaceSign));
    }

    #[test]
    fn test_three_fingers_classified() {
        let hand = test_hands::pose(&[Finger::Index, Finger::Middle, Finger::Ring]);
        assert_eq!(classify(&hand), Some(Gesture::ThreeFingers));
    }

    #[test]
    fn test_fist_is_none() {
        assert_eq!(classify(&test_hands::fist()), None);
    }

    #[test]
    fn test_open_palm_is_none() {
        // All four fingers extended matches no rule.
        let hand = test_hands::pose(&[Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]);
        assert_eq!(classify(&hand), None);
    }

    #[test]
    fn test_translation_invariance() {
        for (hand, expected) in [
            (test_hands::thumb_up(), Gesture::ThumbUp),
            (test_hands::pose(&[Finger::Index]), Gesture::IndexUp),
            (
                test_hands::pose(&[Finger::Index, Finger::Middle]),
                Gesture::PeaceSign,
            ),
        ] {
            let shifted = test_hands::translate(&hand, 0.13, -0.21, 0.05);
            assert_eq!(classify(&shifted), Some(expected));
        }
    }

    #[test]
    fn test_thumb_rules_blocked_by_extended_finger() {
        // Thumb raised alongside an extended index resolves to IndexUp:
        // the thumb rules require all other fingers closed.
        let pose = FingerPose {
            thumb_up: true,
            index: true,
            ..Default::default()
        };
        assert_eq!(classify_pose(pose), Some(Gesture::IndexUp));
    }

    #[test]
    fn test_contradictory_thumb_signals_cancel() {
        // Noisy landmarks can satisfy both thumb predicates; neither rule
        // may fire then.
        let pose = FingerPose {
            thumb_up: true,
            thumb_down: true,
            ..Default::default()
        };
        assert_eq!(classify_pose(pose), None);
    }

    #[test]
    fn test_label_round_trip() {
        for g in Gesture::ALL {
            assert_eq!(Gesture::from_label(g.label()), Some(g));
        }
        assert_eq!(Gesture::from_label("open_palm"), None);
    }
}
