// Model of the data kept by the monitor

use core::fmt::{self, Write};

use embedded_graphics::pixelcolor::Rgb565;
use heapless::{Deque, String};
use log::{info, warn};

use crate::config::HISTORY_CAPACITY;
use crate::error::SensorError;
use crate::traits::TemperatureSensor;

/// Shown instead of a value before the first successful reading
pub const NO_READING: &str = "--";

/// Room for any finite `f32` with one decimal, e.g. `f32::MIN` takes 42 characters
pub const READING_TEXT_LEN: usize = 48;

/// Stable sensor identity, a one-wire ROM code packed little-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorId(pub u64);

impl SensorId {
    pub const fn from_rom(rom: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(rom))
    }

    pub const fn to_rom(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Ds18b20,
    Dht22,
}

impl SensorKind {
    pub const fn label(self) -> &'static str {
        match self {
            SensorKind::Ds18b20 => "DS18B20",
            SensorKind::Dht22 => "DHT22",
        }
    }
}

/// A temperature probe of one of the supported kinds
pub enum Probe<T> {
    Ds18b20(T),
    /// No driver yet, every read fails with `SensorError::Unsupported`
    Dht22 { id: SensorId },
}

impl<T: TemperatureSensor> TemperatureSensor for Probe<T> {
    fn identity(&self) -> SensorId {
        match self {
            Probe::Ds18b20(sensor) => sensor.identity(),
            Probe::Dht22 { id } => *id,
        }
    }

    fn kind(&self) -> SensorKind {
        match self {
            Probe::Ds18b20(_) => SensorKind::Ds18b20,
            Probe::Dht22 { .. } => SensorKind::Dht22,
        }
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        match self {
            Probe::Ds18b20(sensor) => sensor.read_temperature(),
            Probe::Dht22 { .. } => Err(SensorError::Unsupported),
        }
    }
}

/// Bounded history of readings for one sensor, oldest first
pub struct SensorHistory {
    id: SensorId,
    name: &'static str,
    kind: SensorKind,
    color: Rgb565,
    max_history: usize,
    readings: Deque<f32, HISTORY_CAPACITY>,
}

impl SensorHistory {
    /// `max_history` is clamped to `1..=HISTORY_CAPACITY`; `Config::validate`
    /// rejects anything outside that range before we get here.
    pub fn new(
        id: SensorId,
        name: &'static str,
        kind: SensorKind,
        color: Rgb565,
        max_history: usize,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            color,
            max_history: max_history.clamp(1, HISTORY_CAPACITY),
            readings: Deque::new(),
        }
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn color(&self) -> Rgb565 {
        self.color
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Append a reading, evicting the oldest one when full
    pub fn record(&mut self, value: f32) {
        if !value.is_finite() {
            warn!("Sensor: {} Type: {} dropped non-finite value", self.name, self.kind.label());
            return;
        }

        while self.readings.len() >= self.max_history {
            self.readings.pop_front();
        }
        // Cannot fail: max_history <= HISTORY_CAPACITY and we just made room
        let _ = self.readings.push_back(value);

        info!("Sensor: {} Type: {} Value: {}", self.name, self.kind.label(), value);
    }

    /// Readings, oldest to newest
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.readings.iter().copied()
    }

    pub fn latest(&self) -> Option<f32> {
        self.readings.back().copied()
    }

    /// Most recent reading with one decimal, or `NO_READING`
    pub fn latest_formatted(&self) -> String<READING_TEXT_LEN> {
        let mut out = String::new();
        match self.latest() {
            Some(value) => {
                let _ = write!(out, "{:.1}", value);
            }
            None => {
                let _ = out.push_str(NO_READING);
            }
        }
        out
    }
}
