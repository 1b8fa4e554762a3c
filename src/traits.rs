//! Hardware abstraction traits

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::Rgb565,
    primitives::Rectangle,
};

use crate::error::{DisplayError, SensorError};
use crate::model::{SensorId, SensorKind};

/// Trait for temperature sensors
pub trait TemperatureSensor {
    /// Stable identity of the device, e.g. its one-wire ROM code
    fn identity(&self) -> SensorId;

    /// Which kind of sensor this is
    fn kind(&self) -> SensorKind;

    /// Read temperature in Celsius
    fn read_temperature(&mut self) -> Result<f32, SensorError>;
}

/// Trait for the pixel display.
///
/// All coordinates are relative to the current window, which starts out as
/// the whole screen.
pub trait Canvas {
    /// Size of the current window
    fn window_size(&self) -> Size;

    /// Restrict drawing to `window` (screen coordinates)
    fn set_window(&mut self, window: Rectangle) -> Result<(), DisplayError>;

    /// Make the whole screen the current window
    fn reset_window(&mut self);

    /// Fill the current window with `color`
    fn clear_window(&mut self, color: Rgb565) -> Result<(), DisplayError>;

    /// Draw a one pixel outline
    fn draw_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), DisplayError>;

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565) -> Result<(), DisplayError>;

    /// Draw text with its top left corner at `position`.
    /// Returns the X position right after the text.
    fn draw_text(&mut self, position: Point, text: &str, color: Rgb565)
    -> Result<i32, DisplayError>;

    /// X position right after the last drawn text
    fn last_x(&self) -> i32;

    /// Width in pixels `sample` would take
    fn text_width(&self, sample: &str) -> u32;

    fn font_height(&self) -> u32;
}

/// Trait for bit-level one-wire operations
pub trait OneWireBus {
    /// Reset pulse. Returns true if at least one device answered with a presence pulse.
    fn reset(&mut self) -> Result<bool, SensorError>;

    fn write_bit(&mut self, bit: bool) -> Result<(), SensorError>;

    fn read_bit(&mut self) -> Result<bool, SensorError>;

    /// Write a byte, least significant bit first
    fn write_byte(&mut self, byte: u8) -> Result<(), SensorError> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Read a byte, least significant bit first
    fn read_byte(&mut self) -> Result<u8, SensorError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }
}

/// Receives debounced button activations.
///
/// Called from the interrupt/button context, so implementations must only do
/// bounded, cheap work.
pub trait ActivationSink {
    fn activate(&self);
}

impl<F: Fn()> ActivationSink for F {
    fn activate(&self) {
        self()
    }
}
