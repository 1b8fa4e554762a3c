//! Startup configuration. Not reloadable at runtime.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use heapless::Vec;

use crate::error::ConfigError;
use crate::model::SensorId;

/// Most sensors the monitor can drive
pub const MAX_SENSORS: usize = 4;

/// Hard upper bound for `Config::max_history`
pub const HISTORY_CAPACITY: usize = 120;

pub const DEFAULT_MAX_HISTORY: usize = 60;
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Height of the numeric readout row above the graph
pub const HEADER_HEIGHT: u32 = 20;

/// Widest legend label expected, used to size the legend column
pub const LEGEND_SAMPLE: &str = "+30";

/// Degrees between legend tick marks
pub const TICK_STEP: usize = 5;

/// Degrees between labelled legend ticks
pub const LABEL_STEP: i16 = 10;

/// A configured sensor position on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSlot {
    /// Bind to this ROM code. `None` takes the next discovered sensor.
    pub id: Option<SensorId>,
    pub name: &'static str,
    pub color: Rgb565,
}

impl SensorSlot {
    pub const fn any(name: &'static str, color: Rgb565) -> Self {
        Self {
            id: None,
            name,
            color,
        }
    }

    pub const fn pinned(id: SensorId, name: &'static str, color: Rgb565) -> Self {
        Self {
            id: Some(id),
            name,
            color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Bottom of the temperature scale in °C
    pub min_temp: i16,
    /// Top of the temperature scale in °C
    pub max_temp: i16,
    pub max_history: usize,
    pub debounce_window_ms: u64,
    pub header_height: u32,
    pub sensors: Vec<SensorSlot, MAX_SENSORS>,
}

impl Default for Config {
    fn default() -> Self {
        let mut sensors = Vec::new();
        let _ = sensors.push(SensorSlot::any("Luft", Rgb565::RED));
        let _ = sensors.push(SensorSlot::any("Bakke", Rgb565::GREEN));
        let _ = sensors.push(SensorSlot::any("Inne", Rgb565::BLUE));

        Self {
            min_temp: -20,
            max_temp: 40,
            max_history: DEFAULT_MAX_HISTORY,
            debounce_window_ms: DEFAULT_DEBOUNCE_MS,
            header_height: HEADER_HEIGHT,
            sensors,
        }
    }
}

impl Config {
    pub fn with_range(mut self, min_temp: i16, max_temp: i16) -> Self {
        self.min_temp = min_temp;
        self.max_temp = max_temp;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_sensors(mut self, slots: &[SensorSlot]) -> Result<Self, ConfigError> {
        self.sensors = Vec::from_slice(slots)
            .map_err(|_| ConfigError::TooManySensors { max: MAX_SENSORS })?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_temp >= self.max_temp {
            return Err(ConfigError::EmptyTemperatureRange {
                min: self.min_temp,
                max: self.max_temp,
            });
        }
        if self.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }
        if self.max_history == 0 || self.max_history > HISTORY_CAPACITY {
            return Err(ConfigError::HistoryCapacity {
                requested: self.max_history,
                max: HISTORY_CAPACITY,
            });
        }
        if self.debounce_window_ms == 0 {
            return Err(ConfigError::ZeroDebounceWindow);
        }
        Ok(())
    }

    /// Resolve every slot to one of the `discovered` sensors, in slot order.
    ///
    /// Pinned slots take their own id; the remaining slots take the unclaimed
    /// sensors in discovery order.
    pub fn bind(&self, discovered: &[SensorId]) -> Result<Vec<SensorId, MAX_SENSORS>, ConfigError> {
        let mut claimed = [false; MAX_SENSORS];
        let mut bound: Vec<Option<SensorId>, MAX_SENSORS> = Vec::new();
        let available = &discovered[..discovered.len().min(MAX_SENSORS)];

        for slot in &self.sensors {
            let pinned = match slot.id {
                Some(id) => {
                    let index = available
                        .iter()
                        .position(|found| *found == id)
                        .ok_or(ConfigError::MissingSensor { name: slot.name })?;
                    claimed[index] = true;
                    Some(id)
                }
                None => None,
            };
            let _ = bound.push(pinned);
        }

        let mut result = Vec::new();
        for (slot, pinned) in self.sensors.iter().zip(bound) {
            let id = match pinned {
                Some(id) => id,
                None => {
                    let index = claimed
                        .iter()
                        .zip(available)
                        .position(|(taken, _)| !taken)
                        .ok_or(ConfigError::MissingSensor { name: slot.name })?;
                    claimed[index] = true;
                    available[index]
                }
            };
            let _ = result.push(id);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.sensors.len(), 3);
        assert_eq!(config.max_history, 60);
        assert_eq!(config.debounce_window_ms, 50);
    }

    #[test]
    fn rejects_empty_or_inverted_range() {
        let config = Config::default().with_range(10, 10);
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyTemperatureRange { min: 10, max: 10 })
        );

        let config = Config::default().with_range(40, -20);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyTemperatureRange { .. })
        ));
    }

    #[test]
    fn rejects_missing_sensors_and_bad_history() {
        let config = Config::default().with_sensors(&[]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::NoSensors));

        let config = Config::default().with_max_history(0);
        assert!(matches!(config.validate(), Err(ConfigError::HistoryCapacity { .. })));

        let config = Config::default().with_max_history(HISTORY_CAPACITY + 1);
        assert!(matches!(config.validate(), Err(ConfigError::HistoryCapacity { .. })));

        let mut config = Config::default();
        config.debounce_window_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDebounceWindow));
    }

    #[test]
    fn too_many_slots_are_rejected() {
        let slot = SensorSlot::any("x", Rgb565::WHITE);
        let result = Config::default().with_sensors(&[slot; MAX_SENSORS + 1]);
        assert!(matches!(result, Err(ConfigError::TooManySensors { .. })));
    }

    #[test]
    fn bind_takes_sensors_in_discovery_order() {
        let config = Config::default();
        let found = [SensorId(30), SensorId(10), SensorId(20)];
        let bound = config.bind(&found).unwrap();
        assert_eq!(bound.as_slice(), &found);
    }

    #[test]
    fn bind_honours_pinned_ids() {
        let config = Config::default()
            .with_sensors(&[
                SensorSlot::any("a", Rgb565::RED),
                SensorSlot::pinned(SensorId(10), "b", Rgb565::GREEN),
            ])
            .unwrap();
        let bound = config.bind(&[SensorId(10), SensorId(20)]).unwrap();
        assert_eq!(bound.as_slice(), &[SensorId(20), SensorId(10)]);
    }

    #[test]
    fn bind_fails_when_a_slot_is_unfilled() {
        let config = Config::default();
        assert_eq!(
            config.bind(&[SensorId(1), SensorId(2)]),
            Err(ConfigError::MissingSensor { name: "Inne" })
        );

        let config = Config::default()
            .with_sensors(&[SensorSlot::pinned(SensorId(5), "p", Rgb565::RED)])
            .unwrap();
        assert_eq!(
            config.bind(&[SensorId(1)]),
            Err(ConfigError::MissingSensor { name: "p" })
        );
    }
}
