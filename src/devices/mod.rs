//! Simulated device registry
//!
//! Holds the static per-device configuration and the mutable on/off
//! state, and applies the kind-specific toggle transitions. `toggle` is
//! the only mutator of device state; the UI only reads.

use std::collections::BTreeMap;

/// Channels the simulated TV cycles through while on.
pub const TV_CHANNELS: [&str; 5] = ["News 24", "Sports HD", "Movies", "Music TV", "Nature"];

/// The closed set of device kinds. The kind determines the toggle
/// transition and how the tile is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    Led,
    Fan,
    DoorLock,
    Tv,
    Buzzer,
    RgbStrip,
}

/// Static per-device configuration, built once at startup.
#[derive(Clone, Debug)]
pub struct DeviceConfig {
    pub kind: DeviceKind,
    /// Hex color such as "#FF0000", used for the lit tile.
    pub color_on: &'static str,
    /// Hex color for the unlit tile.
    pub color_off: &'static str,
    pub label: &'static str,
}

/// Mutable per-device state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub on: bool,
    /// Current channel index; meaningful only for TVs.
    pub channel: usize,
}

/// Observable result of a toggle, for logging and the status line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub on: bool,
    /// Kind-specific display text, e.g. "ON", "LOCKED", "Channel: Movies".
    pub display: String,
}

/// Device configurations plus their states, keyed by device identifier.
///
/// Invariant: `states` holds exactly the identifiers present in
/// `configs` - no orphan or missing entries.
pub struct DeviceRegistry {
    configs: BTreeMap<String, DeviceConfig>,
    states: BTreeMap<String, DeviceState>,
}

impl DeviceRegistry {
    /// Build a registry from a static configuration table. Every device
    /// starts off (door locks start locked).
    pub fn new(configs: BTreeMap<String, DeviceConfig>) -> Self {
        let states = configs
            .keys()
            .map(|id| (id.clone(), DeviceState::default()))
            .collect();
        Self { configs, states }
    }

    /// The default device table: two LEDs, a fan, a door lock, and a TV.
    pub fn with_default_devices() -> Self {
        let mut configs = BTreeMap::new();
        configs.insert(
            "LED1".to_string(),
            DeviceConfig {
                kind: DeviceKind::Led,
                color_on: "#FF0000",
                color_off: "#330000",
                label: "Red LED",
            },
        );
        configs.insert(
            "LED2".to_string(),
            DeviceConfig {
                kind: DeviceKind::Led,
                color_on: "#00FF00",
                color_off: "#003300",
                label: "Green LED",
            },
        );
        configs.insert(
            "FAN1".to_string(),
            DeviceConfig {
                kind: DeviceKind::Fan,
                color_on: "#00BBFF",
                color_off: "#223344",
                label: "Virtual Fan",
            },
        );
        configs.insert(
            "LOCK1".to_string(),
            DeviceConfig {
                kind: DeviceKind::DoorLock,
                color_on: "#00FF00",
                color_off: "#FF0000",
                label: "Door Lock",
            },
        );
        configs.insert(
            "TV1".to_string(),
            DeviceConfig {
                kind: DeviceKind::Tv,
                color_on: "#4488FF",
                color_off: "#1A1A1A",
                label: "Smart TV",
            },
        );
        Self::new(configs)
    }

    /// Apply the kind-specific toggle transition to `id`.
    ///
    /// Unknown identifiers are a logged no-op returning `None` - partial
    /// configuration is tolerated, not an error.
    pub fn toggle(&mut self, id: &str) -> Option<ToggleOutcome> {
        let Some(config) = self.configs.get(id) else {
            log::warn!("toggle: unknown device '{}', ignoring", id);
            return None;
        };
        let state = self
            .states
            .get_mut(id)
            .expect("state exists for every configured device");

        let outcome = match config.kind {
            DeviceKind::Tv => {
                if !state.on {
                    // Off to on resets the channel; only passing through
                    // an off state does.
                    state.on = true;
                    state.channel = 0;
                    ToggleOutcome {
                        on: true,
                        display: format!("ON (Channel: {})", TV_CHANNELS[0]),
                    }
                } else {
                    state.channel = (state.channel + 1) % TV_CHANNELS.len();
                    ToggleOutcome {
                        on: true,
                        display: format!("Channel: {}", TV_CHANNELS[state.channel]),
                    }
                }
            }
            DeviceKind::DoorLock => {
                state.on = !state.on;
                ToggleOutcome {
                    on: state.on,
                    display: if state.on { "UNLOCKED" } else { "LOCKED" }.to_string(),
                }
            }
            DeviceKind::Led | DeviceKind::Fan | DeviceKind::Buzzer | DeviceKind::RgbStrip => {
                state.on = !state.on;
                ToggleOutcome {
                    on: state.on,
                    display: if state.on { "ON" } else { "OFF" }.to_string(),
                }
            }
        };

        log::info!("{} is now {}", config.label, outcome.display);
        Some(outcome)
    }

    /// True iff `id` is a configured device.
    pub fn contains(&self, id: &str) -> bool {
        self.configs.contains_key(id)
    }

    pub fn config(&self, id: &str) -> Option<&DeviceConfig> {
        self.configs.get(id)
    }

    pub fn state(&self, id: &str) -> Option<DeviceState> {
        self.states.get(id).copied()
    }

    /// Iterate devices in identifier order with config and state.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceConfig, DeviceState)> {
        self.configs
            .iter()
            .map(|(id, config)| (id.as_str(), config, self.states[id]))
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::with_default_devices()
    }
}
