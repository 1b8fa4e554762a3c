//! In-memory fakes for unit tests

use std::string::{String, ToString};
use std::vec::Vec;

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::Rgb565,
    primitives::Rectangle,
};

use crate::error::{DisplayError, SensorError};
use crate::model::{SensorId, SensorKind};
use crate::traits::{Canvas, TemperatureSensor};

/// Glyph width of the 6x10 font the device uses
const CHAR_WIDTH: u32 = 6;
const CHAR_HEIGHT: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Window(Rectangle),
    ResetWindow,
    Clear(Rectangle, Rgb565),
    Rect(Rectangle, Rgb565),
    Line { from: Point, to: Point, color: Rgb565 },
    Text { at: Point, text: String, color: Rgb565 },
}

/// Records every drawing call
pub struct RecordingCanvas {
    screen: Size,
    window: Rectangle,
    last_x: i32,
    pub ops: Vec<Op>,
    /// Fail every draw call while set
    pub fail: bool,
}

impl RecordingCanvas {
    pub fn new(screen: Size) -> Self {
        Self {
            screen,
            window: Rectangle::new(Point::zero(), screen),
            last_x: 0,
            ops: Vec::new(),
            fail: false,
        }
    }

    fn check(&self) -> Result<(), DisplayError> {
        if self.fail { Err(DisplayError::Bus) } else { Ok(()) }
    }
}

impl Canvas for RecordingCanvas {
    fn window_size(&self) -> Size {
        self.window.size
    }

    fn set_window(&mut self, window: Rectangle) -> Result<(), DisplayError> {
        self.check()?;
        self.window = window;
        self.ops.push(Op::Window(window));
        Ok(())
    }

    fn reset_window(&mut self) {
        self.window = Rectangle::new(Point::zero(), self.screen);
        self.ops.push(Op::ResetWindow);
    }

    fn clear_window(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.check()?;
        self.ops.push(Op::Clear(self.window, color));
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), DisplayError> {
        self.check()?;
        self.ops.push(Op::Rect(rect, color));
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565) -> Result<(), DisplayError> {
        self.check()?;
        self.ops.push(Op::Line { from, to, color });
        Ok(())
    }

    fn draw_text(
        &mut self,
        position: Point,
        text: &str,
        color: Rgb565,
    ) -> Result<i32, DisplayError> {
        self.check()?;
        self.ops.push(Op::Text {
            at: position,
            text: text.to_string(),
            color,
        });
        self.last_x = position.x + self.text_width(text) as i32;
        Ok(self.last_x)
    }

    fn last_x(&self) -> i32 {
        self.last_x
    }

    fn text_width(&self, sample: &str) -> u32 {
        sample.chars().count() as u32 * CHAR_WIDTH
    }

    fn font_height(&self) -> u32 {
        CHAR_HEIGHT
    }
}

/// Sensor returning scripted results, then repeating the last one
pub struct ScriptedSensor {
    pub id: SensorId,
    pub script: Vec<Result<f32, SensorError>>,
    pub reads: usize,
}

impl ScriptedSensor {
    pub fn new(id: u64, script: &[Result<f32, SensorError>]) -> Self {
        Self {
            id: SensorId(id),
            script: script.to_vec(),
            reads: 0,
        }
    }
}

impl TemperatureSensor for ScriptedSensor {
    fn identity(&self) -> SensorId {
        self.id
    }

    fn kind(&self) -> SensorKind {
        SensorKind::Ds18b20
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let index = self.reads.min(self.script.len().saturating_sub(1));
        self.reads += 1;
        self.script
            .get(index)
            .copied()
            .unwrap_or(Err(SensorError::Unavailable))
    }
}
