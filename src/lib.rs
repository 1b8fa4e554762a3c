//! Firmware library for a multi-sensor temperature board.
//!
//! Everything except `hardware` is hardware independent and runs on the host:
//!
//! ```bash
//! cargo test --lib
//! ```
//!
//! The firmware binaries need the ESP32 toolchain:
//!
//! ```bash
//! cargo build --release --features firmware --target xtensa-esp32-none-elf
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod debounce;
pub mod display;
pub mod error;
pub mod layout;
pub mod logic;
pub mod mode;
pub mod model;
pub mod onewire;
pub mod traits;

#[cfg(target_arch = "xtensa")]
pub mod hardware;

#[cfg(test)]
mod testing;
