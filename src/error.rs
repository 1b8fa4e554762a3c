//! Error types shared by the monitor

use thiserror_no_std::Error;

/// A single sensor failed to produce a reading this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    /// Bus or conversion error
    #[error("sensor unavailable")]
    Unavailable,

    /// No device answered the bus reset
    #[error("no presence pulse on the one-wire bus")]
    NoPresence,

    /// Scratchpad or ROM code failed its checksum
    #[error("CRC mismatch (expected {expected:#04x}, got {actual:#04x})")]
    CrcMismatch { expected: u8, actual: u8 },

    /// The sensor kind has no driver
    #[error("sensor kind not supported")]
    Unsupported,
}

/// A drawing primitive failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("display bus error")]
    Bus,

    #[error("window does not intersect the screen")]
    EmptyWindow,
}

/// Startup configuration rejected before the main loop is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("temperature range is empty ({min}..{max})")]
    EmptyTemperatureRange { min: i16, max: i16 },

    #[error("no sensors configured")]
    NoSensors,

    #[error("too many sensors configured (max: {max})")]
    TooManySensors { max: usize },

    #[error("history length {requested} outside 1..={max}")]
    HistoryCapacity { requested: usize, max: usize },

    #[error("debounce window must be non-zero")]
    ZeroDebounceWindow,

    #[error("display too small for the graph ({width}x{height})")]
    DisplayTooSmall { width: u32, height: u32 },

    #[error("{configured} sensor slots configured but {found} sensors provided")]
    SensorCountMismatch { configured: usize, found: usize },

    #[error("no sensor found for slot '{name}'")]
    MissingSensor { name: &'static str },
}
