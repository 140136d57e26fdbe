//! Gesture debouncing.
//!
//! A fixed-length sliding window over raw classifications: a gesture is
//! confirmed only after the whole window agrees, which filters out the
//! one-or-two-frame flickers that hand jitter produces.

use std::collections::VecDeque;

use crate::gesture::Gesture;

/// Default number of consecutive agreeing frames required.
pub const DEFAULT_WINDOW: usize = 3;

/// Smallest and largest usable window sizes for the runtime knob.
pub const MIN_WINDOW: usize = 3;
pub const MAX_WINDOW: usize = 10;

/// Sliding-window debouncer over raw gesture classifications.
#[derive(Clone, Debug)]
pub struct GestureDebouncer {
    history: VecDeque<Option<Gesture>>,
    window: usize,
}

impl GestureDebouncer {
    pub fn new(window: usize) -> Self {
        let window = window.clamp(MIN_WINDOW, MAX_WINDOW);
        Self {
            history: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Current window size.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Change the window size at runtime. Larger windows trade
    /// responsiveness for stability. The history is cleared so the new
    /// window starts from a fresh warm-up.
    pub fn set_window(&mut self, window: usize) {
        let window = window.clamp(MIN_WINDOW, MAX_WINDOW);
        if window != self.window {
            self.window = window;
            self.history.clear();
        }
    }

    /// Feed one raw classification and get the confirmed gesture, if any.
    ///
    /// Returns `None` during warm-up (fewer than `window` samples seen)
    /// and whenever the window is not unanimous.
    pub fn push(&mut self, raw: Option<Gesture>) -> Option<Gesture> {
        self.history.push_back(raw);
        if self.history.len() > self.window {
            self.history.pop_front();
        }

        if self.history.len() < self.window {
            return None;
        }

        let first = self.history[0];
        if self.history.iter().all(|&g| g == first) {
            first
        } else {
            None
        }
    }
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_up_emits_nothing() {
        let mut d = GestureDebouncer::new(3);
        assert_eq!(d.push(Some(Gesture::ThumbUp)), None);
        assert_eq!(d.push(Some(Gesture::ThumbUp)), None);
    }

    #[test]
    fn test_unanimous_window_confirms() {
        let mut d = GestureDebouncer::new(3);
        d.push(Some(Gesture::PeaceSign));
        d.push(Some(Gesture::PeaceSign));
        assert_eq!(d.push(Some(Gesture::PeaceSign)), Some(Gesture::PeaceSign));
    }

    #[test]
    fn test_confirmation_persists_while_pose_held() {
        // The debouncer keeps confirming a held pose; firing-once is the
        // router's job.
        let mut d = GestureDebouncer::new(3);
        for _ in 0..3 {
            d.push(Some(Gesture::IndexUp));
        }
        for _ in 0..5 {
            assert_eq!(d.push(Some(Gesture::IndexUp)), Some(Gesture::IndexUp));
        }
    }

    #[test]
    fn test_mixed_window_suppresses() {
        let mut d = GestureDebouncer::new(3);
        d.push(Some(Gesture::ThumbUp));
        d.push(Some(Gesture::ThumbDown));
        assert_eq!(d.push(Some(Gesture::ThumbUp)), None);
    }

    #[test]
    fn test_single_flicker_frame_is_filtered() {
        let mut d = GestureDebouncer::new(3);
        for _ in 0..3 {
            d.push(Some(Gesture::ThumbUp));
        }
        // One bad frame breaks the streak for the next `window` pushes.
        assert_eq!(d.push(None), None);
        assert_eq!(d.push(Some(Gesture::ThumbUp)), None);
        assert_eq!(d.push(Some(Gesture::ThumbUp)), None);
        assert_eq!(d.push(Some(Gesture::ThumbUp)), Some(Gesture::ThumbUp));
    }

    #[test]
    fn test_unanimous_none_confirms_none() {
        let mut d = GestureDebouncer::new(3);
        for _ in 0..3 {
            assert_eq!(d.push(None), None);
        }
    }

    #[test]
    fn test_window_clamped_to_bounds() {
        assert_eq!(GestureDebouncer::new(1).window(), MIN_WINDOW);
        assert_eq!(GestureDebouncer::new(50).window(), MAX_WINDOW);
    }

    #[test]
    fn test_set_window_restarts_warm_up() {
        let mut d = GestureDebouncer::new(3);
        for _ in 0..3 {
            d.push(Some(Gesture::ThumbUp));
        }
        d.set_window(5);
        for _ in 0..4 {
            assert_eq!(d.push(Some(Gesture::ThumbUp)), None);
        }
        assert_eq!(d.push(Some(Gesture::ThumbUp)), Some(Gesture::ThumbUp));
    }

    #[test]
    fn test_history_never_exceeds_window() {
        let mut d = GestureDebouncer::new(4);
        for _ in 0..20 {
            d.push(Some(Gesture::IndexUp));
        }
        assert!(d.history.len() <= d.window());
    }
}
