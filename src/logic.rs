//! Render cycle (hardware-independent)

use core::fmt::Write;

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::{Rgb565, RgbColor},
    primitives::Rectangle,
};
use heapless::{String, Vec};
use log::{debug, info, warn};

use crate::config::{Config, LEGEND_SAMPLE, MAX_SENSORS};
use crate::error::{ConfigError, DisplayError};
use crate::layout::{self, GraphArea, TempScale};
use crate::mode::{ModeSelector, RenderMode};
use crate::model::{READING_TEXT_LEN, SensorHistory};
use crate::traits::{Canvas, TemperatureSensor};

const BACKGROUND: Rgb565 = Rgb565::BLACK;
const FRAME_COLOR: Rgb565 = Rgb565::WHITE;

/// Where the first header segment starts
const HEADER_LEFT: i32 = 1;

/// One header segment: sensor name, separator and the widest reading
const SEGMENT_LEN: usize = 24 + READING_TEXT_LEN;

/// A sensor and the readings taken from it
pub struct Channel<S> {
    pub sensor: S,
    pub history: SensorHistory,
}

/// What happened during one render cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub recorded: usize,
    pub failed_reads: usize,
    pub display_errors: usize,
}

impl CycleStats {
    fn display<T>(&mut self, what: &str, result: Result<T, DisplayError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Display: {} failed: {}", what, e);
                self.display_errors += 1;
                None
            }
        }
    }
}

/// Owns everything the render loop touches
pub struct Monitor<C, S> {
    canvas: C,
    channels: Vec<Channel<S>, MAX_SENSORS>,
    scale: TempScale,
    area: GraphArea,
    header_height: u32,
    selector: ModeSelector,
}

impl<C, S> Monitor<C, S>
where
    C: Canvas,
    S: TemperatureSensor,
{
    /// Validate `config`, bind `sensors` to its slots in order, lay out the
    /// screen and draw the static frame.
    ///
    /// Fails before anything is drawn if the configuration is unusable.
    pub fn new<I>(config: &Config, mut canvas: C, sensors: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
    {
        config.validate()?;
        let scale = TempScale::new(config.min_temp, config.max_temp)?;

        let mut channels = Vec::new();
        let mut found = 0;
        for (index, sensor) in sensors.into_iter().enumerate() {
            found += 1;
            let Some(slot) = config.sensors.get(index) else {
                continue;
            };
            let history = SensorHistory::new(
                sensor.identity(),
                slot.name,
                sensor.kind(),
                slot.color,
                config.max_history,
            );
            if channels.push(Channel { sensor, history }).is_err() {
                return Err(ConfigError::TooManySensors { max: MAX_SENSORS });
            }
        }
        if found != config.sensors.len() {
            return Err(ConfigError::SensorCountMismatch {
                configured: config.sensors.len(),
                found,
            });
        }

        canvas.reset_window();
        let area = layout::compute_layout(&canvas, LEGEND_SAMPLE, config.header_height)?;
        if area.width() / (config.max_history as u32) == 0 {
            return Err(ConfigError::DisplayTooSmall {
                width: canvas.window_size().width,
                height: canvas.window_size().height,
            });
        }

        info!(
            "Graph area {}x{} at ({}, {}), {} sensors",
            area.width(),
            area.height(),
            area.origin.x,
            area.origin.y,
            channels.len()
        );

        if let Err(e) = layout::draw_frame(&mut canvas, &area, &scale) {
            warn!("Display: frame failed: {}", e);
        }

        let selector = ModeSelector::new(channels.len());
        Ok(Self {
            canvas,
            channels,
            scale,
            area,
            header_height: config.header_height,
            selector,
        })
    }

    pub fn mode(&self) -> RenderMode {
        self.selector.current()
    }

    pub fn area(&self) -> &GraphArea {
        &self.area
    }

    pub fn scale(&self) -> &TempScale {
        &self.scale
    }

    pub fn channels(&self) -> &[Channel<S>] {
        &self.channels
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// One render cycle. `presses` are the button activations queued since
    /// the previous cycle; they take effect before anything is drawn.
    pub fn tick(&mut self, presses: u32) -> CycleStats {
        if presses > 0 {
            let mode = self.selector.advance_by(presses);
            debug!("Mode: {:?} after {} presses", mode, presses);
        }

        let mut stats = CycleStats::default();
        self.poll_sensors(&mut stats);
        self.draw_header(&mut stats);
        self.draw_graph(&mut stats);
        stats
    }

    fn poll_sensors(&mut self, stats: &mut CycleStats) {
        for channel in self.channels.iter_mut() {
            match channel.sensor.read_temperature() {
                Ok(value) => {
                    channel.history.record(value);
                    stats.recorded += 1;
                }
                Err(e) => {
                    warn!(
                        "Sensor: {} ({}) read failed: {}",
                        channel.history.name(),
                        channel.history.id(),
                        e
                    );
                    stats.failed_reads += 1;
                }
            }
        }
    }

    /// Numeric readout row, one coloured segment per sensor
    fn draw_header(&mut self, stats: &mut CycleStats) {
        self.canvas.reset_window();
        let width = self.canvas.window_size().width;
        let row = Rectangle::new(Point::zero(), Size::new(width, self.header_height));
        let window = self.canvas.set_window(row);
        if stats.display("header window", window).is_none() {
            return;
        }
        let cleared = self.canvas.clear_window(BACKGROUND);
        stats.display("header clear", cleared);

        let mut x = HEADER_LEFT;
        for channel in &self.channels {
            let mut segment: String<SEGMENT_LEN> = String::new();
            let _ = write!(
                segment,
                "{}: {} ",
                channel.history.name(),
                channel.history.latest_formatted()
            );
            let drawn = self
                .canvas
                .draw_text(Point::new(x, 0), &segment, channel.history.color());
            if stats.display("header text", drawn).is_some() {
                x = self.canvas.last_x();
            }
        }
        self.canvas.reset_window();
    }

    /// Clear the plot area and draw the stepped line of every plotted sensor
    fn draw_graph(&mut self, stats: &mut CycleStats) {
        let window = self.canvas.set_window(self.area.rect());
        if stats.display("graph window", window).is_none() {
            return;
        }
        let cleared = self.canvas.clear_window(BACKGROUND);
        stats.display("graph clear", cleared);

        // `min_temp` maps to row `height`, the bottom edge of the frame. Plot
        // one row taller and restore that edge before drawing on it.
        let height = self.area.height();
        let plot = Rectangle::new(self.area.origin, self.area.size + Size::new(0, 1));
        let window = self.canvas.set_window(plot);
        if stats.display("plot window", window).is_none() {
            return;
        }
        let edge = self.canvas.draw_line(
            Point::new(0, height as i32),
            Point::new(self.area.width() as i32 - 1, height as i32),
            FRAME_COLOR,
        );
        stats.display("frame edge", edge);

        let mode = self.selector.current();

        for (index, channel) in self.channels.iter().enumerate() {
            if !mode.includes(index) {
                continue;
            }
            let step = (self.area.width() / channel.history.max_history() as u32) as i32;
            let mut x = 0;
            for reading in channel.history.history() {
                let y = self.scale.to_pixel(reading, height);
                let drawn = self.canvas.draw_line(
                    Point::new(x, y),
                    Point::new(x + step, y),
                    channel.history.color(),
                );
                stats.display("graph line", drawn);
                x += step;
            }
        }
        self.canvas.reset_window();
    }
}
