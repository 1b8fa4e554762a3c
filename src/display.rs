use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyleBuilder, ascii::FONT_6X10},
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text, renderer::TextRenderer},
};

use crate::error::DisplayError;
use crate::traits::Canvas;

/// [`Canvas`] on top of any embedded-graphics draw target
pub struct GraphicsCanvas<D> {
    target: D,
    window: Rectangle,
    font: &'static MonoFont<'static>,
    background: Rgb565,
    last_x: i32,
}

impl<D> GraphicsCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: D) -> Self {
        let window = target.bounding_box();
        Self {
            target,
            window,
            font: &FONT_6X10,
            background: Rgb565::BLACK,
            last_x: 0,
        }
    }

    pub fn with_font(mut self, font: &'static MonoFont<'static>) -> Self {
        self.font = font;
        self
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn release(self) -> D {
        self.target
    }

    /// Draw `item` clipped and translated to the current window
    fn draw_in_window<T>(&mut self, item: &T) -> Result<T::Output, DisplayError>
    where
        T: Drawable<Color = Rgb565>,
    {
        let window = self.window;
        let mut clipped = self.target.clipped(&window);
        item.draw(&mut clipped.translated(window.top_left))
            .map_err(|_| DisplayError::Bus)
    }
}

impl<D> Canvas for GraphicsCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn window_size(&self) -> Size {
        self.window.size
    }

    fn set_window(&mut self, window: Rectangle) -> Result<(), DisplayError> {
        let window = window.intersection(&self.target.bounding_box());
        if window.is_zero_sized() {
            return Err(DisplayError::EmptyWindow);
        }
        self.window = window;
        Ok(())
    }

    fn reset_window(&mut self) {
        self.window = self.target.bounding_box();
    }

    fn clear_window(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        let window = self.window;
        self.target
            .fill_solid(&window, color)
            .map_err(|_| DisplayError::Bus)
    }

    fn draw_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), DisplayError> {
        self.draw_in_window(&rect.into_styled(PrimitiveStyle::with_stroke(color, 1)))
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb565) -> Result<(), DisplayError> {
        self.draw_in_window(&Line::new(from, to).into_styled(PrimitiveStyle::with_stroke(color, 1)))
    }

    fn draw_text(
        &mut self,
        position: Point,
        text: &str,
        color: Rgb565,
    ) -> Result<i32, DisplayError> {
        let style = MonoTextStyleBuilder::new()
            .font(self.font)
            .text_color(color)
            .background_color(self.background)
            .build();

        let next = self.draw_in_window(&Text::with_baseline(text, position, style, Baseline::Top))?;
        self.last_x = next.x;
        Ok(next.x)
    }

    fn last_x(&self) -> i32 {
        self.last_x
    }

    fn text_width(&self, sample: &str) -> u32 {
        let style = MonoTextStyleBuilder::new()
            .font(self.font)
            .text_color(Rgb565::WHITE)
            .build();
        style
            .measure_string(sample, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    fn font_height(&self) -> u32 {
        self.font.character_size.height
    }
}
