//! Temperature to pixel mapping and the static graph frame

use core::fmt::Write;

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::{Rgb565, RgbColor},
    primitives::Rectangle,
};
use heapless::String;
use micromath::F32;

use crate::config::{LABEL_STEP, TICK_STEP};
use crate::error::{ConfigError, DisplayError};
use crate::traits::Canvas;

/// Length of a legend tick mark, drawn left of the frame
const TICK_LENGTH: i32 = 4;

/// Largest distance, in pixels, a reading may map away from the area
const MAX_OFFSET: f32 = i16::MAX as f32;

/// Vertical pixel offset of `temp` from the top of an area `height` pixels tall.
///
/// `min_temp` lands on `height`, `max_temp` on 0. Values outside the range
/// map outside the area, at most `MAX_OFFSET` pixels away. Returns `None` for
/// an empty range.
pub fn temp_to_pixel(temp: f32, min_temp: f32, max_temp: f32, height: u32) -> Option<i32> {
    let range = (max_temp - min_temp).abs();
    if range == 0.0 || !range.is_finite() {
        return None;
    }

    // height * (temp - min) / range, multiplied first so whole-degree inputs stay exact
    let scaled = height as f32 * (temp - min_temp) / range;
    let offset = F32(scaled).floor().0.clamp(-MAX_OFFSET, MAX_OFFSET);
    Some(height as i32 - offset as i32)
}

/// Validated temperature scale of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempScale {
    min: i16,
    max: i16,
}

impl TempScale {
    pub fn new(min: i16, max: i16) -> Result<Self, ConfigError> {
        if min >= max {
            return Err(ConfigError::EmptyTemperatureRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i16 {
        self.min
    }

    pub fn max(&self) -> i16 {
        self.max
    }

    /// See [`temp_to_pixel`]. The range is non-empty by construction.
    pub fn to_pixel(&self, temp: f32, height: u32) -> i32 {
        temp_to_pixel(temp, self.min as f32, self.max as f32, height).unwrap_or(height as i32)
    }

    /// Legend ticks from `min` to `max` inclusive, every `TICK_STEP` degrees
    pub fn ticks(&self) -> impl Iterator<Item = i16> {
        (self.min..=self.max).step_by(TICK_STEP)
    }
}

/// Plot rectangle inside the graph frame, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphArea {
    pub origin: Point,
    pub size: Size,
}

impl GraphArea {
    /// Area left after reserving the legend column, the header row and a
    /// one pixel frame on each side.
    pub fn within(display: Size, legend_width: u32, header_height: u32) -> Result<Self, ConfigError> {
        let too_small = ConfigError::DisplayTooSmall {
            width: display.width,
            height: display.height,
        };
        let width = display
            .width
            .checked_sub(legend_width + 2)
            .filter(|w| *w > 0)
            .ok_or(too_small)?;
        let height = display
            .height
            .checked_sub(header_height + 2)
            .filter(|h| *h > 0)
            .ok_or(too_small)?;

        Ok(Self {
            origin: Point::new(legend_width as i32 + 1, header_height as i32 + 1),
            size: Size::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn rect(&self) -> Rectangle {
        Rectangle::new(self.origin, self.size)
    }

    /// The frame drawn around the plot area
    pub fn frame(&self) -> Rectangle {
        Rectangle::new(
            self.origin - Point::new(1, 1),
            self.size + Size::new(2, 2),
        )
    }
}

/// Compute the plot area for the canvas' current window
pub fn compute_layout<C: Canvas>(
    canvas: &C,
    legend_sample: &str,
    header_height: u32,
) -> Result<GraphArea, ConfigError> {
    let legend_width = canvas.text_width(legend_sample) + 1;
    GraphArea::within(canvas.window_size(), legend_width, header_height)
}

/// Colour of a legend label: blue below zero, white at zero, red above
pub fn label_color(degrees: i16) -> Rgb565 {
    match degrees {
        d if d < 0 => Rgb565::BLUE,
        0 => Rgb565::WHITE,
        _ => Rgb565::RED,
    }
}

/// Screen row of a legend tick. Same scale and height as the plotted readings.
fn tick_y(area: &GraphArea, scale: &TempScale, tick: i16) -> i32 {
    area.origin.y + scale.to_pixel(tick as f32, area.height())
}

/// Draw the frame and the temperature legend. Done once at startup.
pub fn draw_frame<C: Canvas>(
    canvas: &mut C,
    area: &GraphArea,
    scale: &TempScale,
) -> Result<(), DisplayError> {
    canvas.reset_window();
    canvas.draw_rect(area.frame(), Rgb565::WHITE)?;

    let font_height = canvas.font_height() as i32;
    let frame = area.frame();
    // Labels stay beside the frame so the header clear never touches them
    let label_top = frame.top_left.y;
    let label_bottom = frame.top_left.y + frame.size.height as i32 - font_height;
    let frame_left = frame.top_left.x;

    // Labels first: their background must not cover the tick marks
    for tick in scale.ticks().filter(|tick| tick % LABEL_STEP == 0) {
        let y = tick_y(area, scale, tick);
        let mut label: String<8> = String::new();
        let _ = write!(label, "{}", tick);
        let top = (y - font_height / 2).min(label_bottom).max(label_top);
        canvas.draw_text(Point::new(0, top), &label, label_color(tick))?;
    }

    for tick in scale.ticks() {
        let y = tick_y(area, scale, tick);
        canvas.draw_line(
            Point::new(frame_left - TICK_LENGTH, y),
            Point::new(frame_left, y),
            Rgb565::WHITE,
        )?;
    }
    Ok(())
}
