//! Gesture-map configuration file
//!
//! `gesture_config.json` carries a `gestures` object mapping gesture
//! labels to device identifiers. Loading overlays the file's entries on
//! top of the built-in defaults; a missing or broken file keeps the
//! defaults and logs a diagnostic. Saving writes the full current map,
//! pretty-printed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::gesture::Gesture;
use crate::router::GestureMap;

/// Default location of the configuration file, in the working directory.
pub const CONFIG_FILE: &str = "gesture_config.json";

const CONFIG_INFO: &str = "Gesture to Device Mapping - Edit to customize";

/// On-disk shape of the configuration file.
#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    gestures: BTreeMap<String, String>,
    #[serde(default)]
    info: String,
}

/// Overlay custom mappings from `path` onto `map`.
///
/// A missing file is not an error; read or parse failures leave `map`
/// untouched. Unknown gesture labels in the file are skipped with a
/// warning so a typo cannot silently eat a mapping.
pub fn load_gesture_map(path: &Path, map: &mut GestureMap) {
    if !path.exists() {
        log::info!("No gesture config at {:?}, using defaults", path);
        return;
    }

    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("Could not read gesture config {:?}: {}", path, e);
            return;
        }
    };

    let file: ConfigFile = match serde_json::from_str(&text) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("Could not parse gesture config {:?}: {}", path, e);
            return;
        }
    };

    for (label, device_id) in file.gestures {
        match Gesture::from_label(&label) {
            Some(gesture) => {
                map.insert(gesture, device_id);
            }
            None => {
                log::warn!("Unknown gesture label '{}' in config, skipping", label);
            }
        }
    }

    log::info!("Loaded gesture mappings from {:?}", path);
}

/// Serialize the full current map to `path`, pretty-printed.
///
/// A write failure leaves the in-memory map unaffected and logs a
/// diagnostic.
pub fn save_gesture_map(path: &Path, map: &GestureMap) {
    let file = ConfigFile {
        gestures: map
            .iter()
            .map(|(gesture, device_id)| (gesture.label().to_string(), device_id.clone()))
            .collect(),
        info: CONFIG_INFO.to_string(),
    };

    let json = match serde_json::to_string_pretty(&file) {
        Ok(j) => j,
        Err(e) => {
            log::warn!("Could not serialize gesture config: {}", e);
            return;
        }
    };

    match fs::write(path, json) {
        Ok(()) => log::info!("Saved gesture mappings to {:?}", path),
        Err(e) => log::warn!("Could not save gesture config {:?}: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::default_gesture_map;

    #[test]
    fn test_missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = default_gesture_map();
        let before = map.clone();
        load_gesture_map(&dir.path().join("nope.json"), &mut map);
        assert_eq!(map, before);
    }

    #[test]
    fn test_round_trip_preserves_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut map = default_gesture_map();
        map.insert(Gesture::PeaceSign, "LED2".to_string());
        save_gesture_map(&path, &map);

        let mut reloaded = GestureMap::new();
        load_gesture_map(&path, &mut reloaded);
        assert_eq!(reloaded, map);
    }

    #[test]
    fn test_load_overlays_rather_than_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        // File remaps only one gesture.
        let mut partial = GestureMap::new();
        partial.insert(Gesture::ThumbUp, "TV1".to_string());
        save_gesture_map(&path, &partial);

        let mut map = default_gesture_map();
        load_gesture_map(&path, &mut map);

        assert_eq!(map.get(&Gesture::ThumbUp), Some(&"TV1".to_string()));
        // Untouched defaults survive.
        assert_eq!(map.get(&Gesture::IndexUp), Some(&"LOCK1".to_string()));
    }

    #[test]
    fn test_broken_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        let mut map = default_gesture_map();
        let before = map.clone();
        load_gesture_map(&path, &mut map);
        assert_eq!(map, before);
    }

    #[test]
    fn test_unknown_gesture_label_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{ "gestures": { "open_palm": "LED1", "thumb_up": "FAN1" } }"#,
        )
        .unwrap();

        let mut map = GestureMap::new();
        load_gesture_map(&path, &mut map);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Gesture::ThumbUp), Some(&"FAN1".to_string()));
    }

    #[test]
    fn test_saved_file_is_pretty_printed_with_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        save_gesture_map(&path, &default_gesture_map());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("Edit to customize"));
    }
}
