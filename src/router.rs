//! Gesture routing
//!
//! Looks up a confirmed gesture in the gesture-to-device map and toggles
//! the mapped device. Routing is edge-triggered: a pose fires once on the
//! transition into it, then stays silent until the hand relaxes (a
//! confirmed "none") - otherwise a held thumbs-up would cycle a fan or TV
//! many times per second.

use std::collections::BTreeMap;

use crate::devices::DeviceRegistry;
use crate::gesture::Gesture;

/// Gesture-to-device mapping. Each gesture drives at most one device.
pub type GestureMap = BTreeMap<Gesture, String>;

/// The built-in mapping, matching the default device table.
pub fn default_gesture_map() -> GestureMap {
    let mut map = GestureMap::new();
    map.insert(Gesture::ThumbUp, "LED1".to_string());
    map.insert(Gesture::ThumbDown, "LED2".to_string());
    map.insert(Gesture::ThreeFingers, "FAN1".to_string());
    map.insert(Gesture::IndexUp, "LOCK1".to_string());
    map.insert(Gesture::PeaceSign, "TV1".to_string());
    map
}

/// Edge-triggered router state.
#[derive(Debug, Default)]
pub struct GestureRouter {
    /// The most recently acted-upon gesture, held until the pose relaxes.
    last_fired: Option<Gesture>,
}

impl GestureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one confirmed classification.
    ///
    /// Returns true when a device was toggled. `None` re-arms the router;
    /// a repeat of the latched gesture, or a gesture with no mapping, is
    /// a no-op.
    pub fn route(
        &mut self,
        confirmed: Option<Gesture>,
        map: &GestureMap,
        registry: &mut DeviceRegistry,
    ) -> bool {
        let Some(gesture) = confirmed else {
            self.last_fired = None;
            return false;
        };

        if Some(gesture) == self.last_fired {
            return false;
        }

        let Some(device_id) = map.get(&gesture) else {
            return false;
        };

        let toggled = registry.toggle(device_id).is_some();
        self.last_fired = Some(gesture);
        toggled
    }

    /// The currently latched gesture, for the status line.
    pub fn last_fired(&self) -> Option<Gesture> {
        self.last_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (GestureRouter, GestureMap, DeviceRegistry) {
        (
            GestureRouter::new(),
            default_gesture_map(),
            DeviceRegistry::with_default_devices(),
        )
    }

    #[test]
    fn test_held_gesture_fires_once() {
        let (mut router, map, mut reg) = setup();
        assert!(!reg.state("LED1").unwrap().on);

        assert!(router.route(Some(Gesture::ThumbUp), &map, &mut reg));
        // Same confirmed gesture again without an intervening none.
        assert!(!router.route(Some(Gesture::ThumbUp), &map, &mut reg));

        // Toggled exactly once: false -> true.
        assert!(reg.state("LED1").unwrap().on);
    }

    #[test]
    fn test_none_rearms_the_router() {
        let (mut router, map, mut reg) = setup();
        router.route(Some(Gesture::ThumbUp), &map, &mut reg);
        router.route(None, &map, &mut reg);
        assert!(router.route(Some(Gesture::ThumbUp), &map, &mut reg));
        // Fired twice in total: back to off.
        assert!(!reg.state("LED1").unwrap().on);
    }

    #[test]
    fn test_different_gesture_fires_without_none() {
        let (mut router, map, mut reg) = setup();
        router.route(Some(Gesture::ThumbUp), &map, &mut reg);
        assert!(router.route(Some(Gesture::ThumbDown), &map, &mut reg));
        assert!(reg.state("LED1").unwrap().on);
        assert!(reg.state("LED2").unwrap().on);
    }

    #[test]
    fn test_unmapped_gesture_is_a_noop() {
        let (mut router, _, mut reg) = setup();
        let map = GestureMap::new();
        assert!(!router.route(Some(Gesture::PeaceSign), &map, &mut reg));
        for (_, _, state) in reg.iter() {
            assert!(!state.on);
        }
        // An unmapped gesture is not latched either.
        assert_eq!(router.last_fired(), None);
    }

    #[test]
    fn test_mapping_to_unknown_device_latches_without_toggling() {
        let (mut router, _, mut reg) = setup();
        let mut map = GestureMap::new();
        map.insert(Gesture::IndexUp, "GHOST".to_string());
        assert!(!router.route(Some(Gesture::IndexUp), &map, &mut reg));
        assert_eq!(router.last_fired(), Some(Gesture::IndexUp));
    }

    #[test]
    fn test_default_map_covers_all_gestures() {
        let map = default_gesture_map();
        let reg = DeviceRegistry::with_default_devices();
        for g in Gesture::ALL {
            let id = map.get(&g).expect("every gesture mapped by default");
            assert!(reg.contains(id), "default map points at a real device");
        }
    }
}
