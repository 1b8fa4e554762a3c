//! Drives the monitor end to end against an in-memory framebuffer.

use core::convert::Infallible;
use core::ops::Range;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};

use tempboard::{
    config::Config,
    debounce::Debouncer,
    display::GraphicsCanvas,
    error::SensorError,
    logic::Monitor,
    mode::{PressCounter, RenderMode},
    model::{SensorId, SensorKind},
    traits::{ActivationSink, TemperatureSensor},
};

const WIDTH: u32 = 240;
const HEIGHT: u32 = 135;

struct Framebuffer {
    pixels: Vec<Rgb565>,
}

impl Framebuffer {
    fn new() -> Self {
        Self {
            pixels: vec![Rgb565::BLACK; (WIDTH * HEIGHT) as usize],
        }
    }

    fn pixel(&self, x: i32, y: i32) -> Rgb565 {
        self.pixels[(y as u32 * WIDTH + x as u32) as usize]
    }

    fn count_in(&self, y_range: Range<i32>, x_range: Range<i32>, color: Rgb565) -> usize {
        let mut count = 0;
        for y in y_range {
            for x in x_range.clone() {
                if self.pixel(x, y) == color {
                    count += 1;
                }
            }
        }
        count
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 && (point.x as u32) < WIDTH && (point.y as u32) < HEIGHT {
                self.pixels[(point.y as u32 * WIDTH + point.x as u32) as usize] = color;
            }
        }
        Ok(())
    }
}

struct Steady {
    id: u64,
    value: Result<f32, SensorError>,
}

impl TemperatureSensor for Steady {
    fn identity(&self) -> SensorId {
        SensorId(self.id)
    }

    fn kind(&self) -> SensorKind {
        SensorKind::Ds18b20
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.value
    }
}

fn sensors() -> Vec<Steady> {
    vec![
        Steady { id: 1, value: Ok(10.0) },
        Steady { id: 2, value: Ok(20.0) },
        Steady { id: 3, value: Ok(-5.0) },
    ]
}

#[test]
fn frame_and_legend_are_drawn_at_startup() {
    let monitor = Monitor::new(&Config::default(), GraphicsCanvas::new(Framebuffer::new()), sensors()).unwrap();
    let area = *monitor.area();
    let fb = monitor.canvas().target();

    // Frame corner just outside the plot area
    assert_eq!(fb.pixel(area.origin.x - 1, area.origin.y - 1), Rgb565::WHITE);
    // Tick for +40 sits on the top row of the plot area, left of the frame
    assert_eq!(fb.pixel(area.origin.x - 4, area.origin.y), Rgb565::WHITE);
    // Plot area itself is still empty
    assert_eq!(fb.pixel(area.origin.x + 10, area.origin.y + 10), Rgb565::BLACK);
}

#[test]
fn readings_are_plotted_in_sensor_colors() {
    let mut monitor = Monitor::new(&Config::default(), GraphicsCanvas::new(Framebuffer::new()), sensors()).unwrap();
    let area = *monitor.area();
    assert_eq!(area.size, Size::new(219, 113));

    monitor.tick(0);
    let fb = monitor.canvas().target();

    // 113 px for 60 degrees
    let x = area.origin.x;
    assert_eq!(fb.pixel(x, area.origin.y + 57), Rgb565::RED);
    assert_eq!(fb.pixel(x + 3, area.origin.y + 57), Rgb565::RED);
    assert_eq!(fb.pixel(x, area.origin.y + 38), Rgb565::GREEN);
    assert_eq!(fb.pixel(x, area.origin.y + 85), Rgb565::BLUE);

    // Header shows every sensor in its own colour
    let header = 0..20;
    assert!(fb.count_in(header.clone(), 0..WIDTH as i32, Rgb565::RED) > 0);
    assert!(fb.count_in(header.clone(), 0..WIDTH as i32, Rgb565::GREEN) > 0);
    assert!(fb.count_in(header, 0..WIDTH as i32, Rgb565::BLUE) > 0);
}

#[test]
fn debounced_press_switches_to_single_sensor() {
    let mut monitor = Monitor::new(&Config::default(), GraphicsCanvas::new(Framebuffer::new()), sensors()).unwrap();
    let area = *monitor.area();
    let presses = PressCounter::new();
    let mut button = Debouncer::new(50, || presses.activate());

    monitor.tick(presses.take());
    assert_eq!(monitor.mode(), RenderMode::ShowAll);

    // One press with contact bounce
    button.on_edge(1_000);
    button.on_edge(1_004);
    button.on_edge(1_020);
    monitor.tick(presses.take());
    assert_eq!(monitor.mode(), RenderMode::ShowOnly(0));

    let fb = monitor.canvas().target();
    let plot_rows = area.origin.y..area.origin.y + area.height() as i32;
    let plot_cols = area.origin.x..area.origin.x + area.width() as i32;
    assert!(fb.count_in(plot_rows.clone(), plot_cols.clone(), Rgb565::RED) > 0);
    assert_eq!(fb.count_in(plot_rows.clone(), plot_cols.clone(), Rgb565::GREEN), 0);
    assert_eq!(fb.count_in(plot_rows, plot_cols, Rgb565::BLUE), 0);
}

#[test]
fn failing_sensor_shows_placeholder_and_others_still_plot() {
    let sensors = vec![
        Steady { id: 1, value: Err(SensorError::Unavailable) },
        Steady { id: 2, value: Ok(20.0) },
        Steady { id: 3, value: Ok(-5.0) },
    ];
    let mut monitor = Monitor::new(&Config::default(), GraphicsCanvas::new(Framebuffer::new()), sensors).unwrap();
    let area = *monitor.area();

    let stats = monitor.tick(0);
    assert_eq!(stats.recorded, 2);
    assert_eq!(stats.failed_reads, 1);
    assert!(monitor.channels()[0].history.is_empty());
    assert_eq!(monitor.channels()[0].history.latest_formatted().as_str(), "--");

    let fb = monitor.canvas().target();
    assert_eq!(fb.pixel(area.origin.x, area.origin.y + 38), Rgb565::GREEN);
    assert_eq!(fb.pixel(area.origin.x, area.origin.y + 85), Rgb565::BLUE);
}

#[test]
fn legend_survives_header_redraw() {
    let mut monitor = Monitor::new(&Config::default(), GraphicsCanvas::new(Framebuffer::new()), sensors()).unwrap();
    let header = 0..20;
    let top_label = 20..30;
    let legend_cols = 0..12;

    let fb = monitor.canvas().target();
    assert_eq!(fb.count_in(header, 0..WIDTH as i32, Rgb565::BLACK), (20 * WIDTH) as usize);
    let before = fb.count_in(top_label.clone(), legend_cols.clone(), Rgb565::RED);
    assert!(before > 0);

    monitor.tick(0);
    monitor.tick(0);
    let fb = monitor.canvas().target();
    assert_eq!(fb.count_in(top_label, legend_cols, Rgb565::RED), before);
}

#[test]
fn tick_marks_are_not_covered_by_labels() {
    let monitor = Monitor::new(&Config::default(), GraphicsCanvas::new(Framebuffer::new()), sensors()).unwrap();
    let area = *monitor.area();
    let fb = monitor.canvas().target();

    // -10 on a 113 px scale of 60 degrees: row 95 of the plot area
    let y = area.origin.y + 95;
    for x in area.origin.x - 5..area.origin.x {
        assert_eq!(fb.pixel(x, y), Rgb565::WHITE, "tick pixel at x={}", x);
    }
}

#[test]
fn minimum_reading_is_visible_on_the_bottom_edge() {
    let sensors = vec![
        Steady { id: 1, value: Ok(-20.0) },
        Steady { id: 2, value: Ok(20.0) },
        Steady { id: 3, value: Ok(-5.0) },
    ];
    let mut monitor = Monitor::new(&Config::default(), GraphicsCanvas::new(Framebuffer::new()), sensors).unwrap();
    let area = *monitor.area();
    let bottom = area.origin.y + area.height() as i32;

    monitor.tick(0);
    let fb = monitor.canvas().target();
    assert_eq!(fb.pixel(area.origin.x, bottom), Rgb565::RED);
    assert_eq!(fb.pixel(area.origin.x + 100, bottom), Rgb565::WHITE);

    // Only the second sensor: the edge is restored under the first one
    monitor.tick(2);
    let fb = monitor.canvas().target();
    assert_eq!(fb.pixel(area.origin.x, bottom), Rgb565::WHITE);
    assert_eq!(fb.pixel(area.origin.x - 1, bottom), Rgb565::WHITE);
}
