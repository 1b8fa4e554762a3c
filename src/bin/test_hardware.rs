#![no_std]
#![no_main]

use core::cell::RefCell;
use core::panic::PanicInfo;
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use esp_backtrace as _;
use esp_hal::{delay::Delay, timer::timg::TimerGroup};
use heapless::Vec;

use tempboard::{
    debounce::Debouncer,
    hardware::OneWirePin,
    layout::temp_to_pixel,
    mode::{ModeSelector, PressCounter, RenderMode},
    model::{SensorHistory, SensorId, SensorKind},
    onewire::{self, Ds18b20, RomCode},
    traits::{ActivationSink, TemperatureSensor},
};

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    esp_println::println!("[PANIC] {:?}", info);
    let delay = Delay::new();
    loop {
        delay.delay_millis(1_000);
    }
}

esp_bootloader_esp_idf::esp_app_desc!();

// Test result tracking
struct TestResults {
    passed: u32,
    failed: u32,
    total: u32,
}

impl TestResults {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    fn assert(&mut self, condition: bool, test_name: &str) {
        self.total += 1;
        if condition {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED", test_name);
        }
    }

    fn assert_eq<T: PartialEq + core::fmt::Debug>(&mut self, left: T, right: T, test_name: &str) {
        self.total += 1;
        if left == right {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED: {:?} != {:?}", test_name, left, right);
        }
    }

    fn print_summary(&self) {
        esp_println::println!("\n==========================================");
        esp_println::println!("Test Summary:");
        esp_println::println!("  Total:  {}", self.total);
        esp_println::println!("  Passed: {}", self.passed);
        esp_println::println!("  Failed: {}", self.failed);
        if self.failed == 0 {
            esp_println::println!("\n✓ ALL TESTS PASSED!");
        } else {
            esp_println::println!("\n✗ SOME TESTS FAILED");
        }
        esp_println::println!("==========================================");
    }
}

fn test_history(results: &mut TestResults) {
    esp_println::println!("\n[TEST] SensorHistory Tests");

    let mut history = SensorHistory::new(SensorId(1), "Luft", SensorKind::Ds18b20, Rgb565::RED, 60);
    results.assert_eq(history.latest_formatted().as_str(), "--", "placeholder before first reading");

    for i in 0..65 {
        history.record(i as f32);
    }
    results.assert_eq(history.len(), 60, "history capped at 60");
    results.assert_eq(history.history().next(), Some(5.0), "oldest readings evicted first");
    results.assert_eq(history.latest(), Some(64.0), "newest reading last");
    results.assert_eq(history.latest_formatted().as_str(), "64.0", "one decimal formatting");
}

fn test_mapping(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Temperature Mapping Tests");

    results.assert_eq(temp_to_pixel(-20.0, -20.0, 40.0, 186), Some(186), "min maps to bottom");
    results.assert_eq(temp_to_pixel(40.0, -20.0, 40.0, 186), Some(0), "max maps to top");
    results.assert_eq(temp_to_pixel(10.0, -20.0, 40.0, 186), Some(93), "10 degrees maps to 93");
    results.assert_eq(temp_to_pixel(10.0, 5.0, 5.0, 186), None, "empty range rejected");
}

fn test_mode_and_debounce(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Mode/Debounce Tests");

    let mut selector = ModeSelector::new(3);
    results.assert_eq(selector.advance(), RenderMode::ShowOnly(0), "first press shows sensor 0");
    selector.advance_by(2);
    results.assert_eq(selector.advance(), RenderMode::ShowAll, "wraps back to all");

    let counter = PressCounter::new();
    let mut debouncer = Debouncer::new(50, || counter.activate());
    debouncer.on_edge(1_000);
    debouncer.on_edge(1_049);
    results.assert_eq(counter.take(), 1, "bounce within window ignored");
    debouncer.on_edge(1_100);
    debouncer.on_edge(1_150);
    results.assert_eq(counter.take(), 2, "edges a full window apart both count");
}

fn test_ds18b20_sensors<P>(results: &mut TestResults, dq: P)
where
    P: Into<esp_hal::gpio::AnyPin<'static>>,
{
    esp_println::println!("\n[TEST] DS18B20 Sensor Tests");

    let bus = RefCell::new(OneWirePin::new(dq));

    let mut found: Vec<RomCode, 8> = Vec::new();
    match onewire::search_all(&mut *bus.borrow_mut(), &mut found) {
        Ok(()) => results.assert(!found.is_empty(), "at least one device on the bus"),
        Err(e) => {
            esp_println::println!("  Search failed: {}", e);
            results.assert(false, "one-wire search");
            return;
        }
    }

    for rom in found.iter() {
        esp_println::println!("  Sensor {}", rom);
        results.assert(rom.is_valid(), "ROM CRC valid");

        let mut sensor = Ds18b20::new(&bus, Delay::new(), *rom);
        match sensor.read_temperature() {
            Ok(temp) => {
                esp_println::println!("    Temperature: {:.2}°C", temp);
                results.assert(temp > -55.0 && temp < 125.0, "temperature in sensor range");
            }
            Err(e) => {
                esp_println::println!("    Failed to read temperature: {}", e);
                results.assert(false, "read temperature");
            }
        }
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("\n==========================================");
    esp_println::println!("=== Hardware Unit Test Runner ===");
    esp_println::println!("==========================================");

    let mut results = TestResults::new();

    // Run tests that don't need hardware
    test_history(&mut results);
    test_mapping(&mut results);
    test_mode_and_debounce(&mut results);

    let dq = peripherals.GPIO33;

    // Initialize RTOS timer for embassy (this consumes TIMG0)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Run hardware tests
    test_ds18b20_sensors(&mut results, dq);

    // Print summary
    results.print_summary();

    esp_println::println!("\nTest run complete. Looping...");
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
