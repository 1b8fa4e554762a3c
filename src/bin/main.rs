#![no_std]
#![no_main]

use core::cell::RefCell;
use core::panic::PanicInfo;
use embassy_executor::Spawner;
use embassy_time::{Duration, Instant, Timer};
use esp_backtrace as _;
use esp_hal::{
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    timer::timg::TimerGroup,
};
use heapless::Vec;

use tempboard::{
    config::{Config, MAX_SENSORS},
    debounce::Debouncer,
    display::GraphicsCanvas,
    hardware::{DisplayHardware, OneWirePin},
    logic::Monitor,
    mode::PressCounter,
    model::{Probe, SensorId},
    onewire::{self, Ds18b20, RomCode},
    traits::ActivationSink,
};

const POLL_INTERVAL_MS: u64 = 1_000;

// Board wiring (TTGO T-Display):
// ST7789 - SPI on GPIO5(CS), GPIO19(MOSI), GPIO18(SCK), GPIO16(DC), GPIO23(RST), GPIO4(backlight)
// DS18B20 bus - GPIO33 with 4.7k pull-up
// Mode button - GPIO0, active low
const SPI_BUFFER_SIZE: usize = 512;

/// Button activations handed from the button task to the render loop
static PRESSES: PressCounter = PressCounter::new();

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    esp_println::println!("[PANIC] {:?}", info);
    let delay = Delay::new();
    loop {
        delay.delay_millis(1_000);
        esp_println::println!("[PANIC] continue...");
    }
}

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn button_watcher(mut button: Input<'static>, debounce_ms: u64) {
    let mut debouncer = Debouncer::new(debounce_ms, || PRESSES.activate());

    loop {
        button.wait_for_falling_edge().await;

        if debouncer.on_edge(Instant::now().as_millis()) {
            esp_println::println!("[BUTTON] Mode button pressed");
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("=== Tempboard ===");

    // Initialize RTOS timer for embassy
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = Config::default();

    // Discover sensors on the one-wire bus
    let bus = RefCell::new(OneWirePin::new(peripherals.GPIO33));
    let mut found: Vec<RomCode, MAX_SENSORS> = Vec::new();
    if let Err(e) = onewire::search_all(&mut *bus.borrow_mut(), &mut found) {
        esp_println::println!("[ERROR] One-wire search failed: {}", e);
    }
    found.sort_unstable();
    for rom in found.iter() {
        esp_println::println!("[1WIRE] Found {}", rom);
    }

    let discovered: Vec<SensorId, MAX_SENSORS> = found.iter().map(RomCode::id).collect();
    let bound = match config.bind(&discovered) {
        Ok(bound) => bound,
        Err(e) => {
            esp_println::println!("[ERROR] Sensor setup failed: {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };
    let sensors = bound
        .iter()
        .map(|id| Probe::Ds18b20(Ds18b20::new(&bus, Delay::new(), RomCode(id.to_rom()))));

    // Initialize display
    let _backlight = Output::new(peripherals.GPIO4, Level::High, OutputConfig::default());
    let mut spi_buffer = [0u8; SPI_BUFFER_SIZE];
    let panel = match DisplayHardware::new(
        peripherals.SPI2,
        peripherals.GPIO5,
        peripherals.GPIO19,
        peripherals.GPIO18,
        peripherals.GPIO16,
        peripherals.GPIO23,
    )
    .and_then(|display| display.into_panel(&mut spi_buffer))
    {
        Ok(panel) => panel,
        Err(e) => {
            esp_println::println!("[ERROR] Display init failed: {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let mut monitor = match Monitor::new(&config, GraphicsCanvas::new(panel), sensors) {
        Ok(monitor) => monitor,
        Err(e) => {
            esp_println::println!("[ERROR] Configuration rejected: {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    // Mode button
    let button = Input::new(
        peripherals.GPIO0,
        InputConfig::default().with_pull(Pull::Up),
    );
    if let Err(e) = spawner.spawn(button_watcher(button, config.debounce_window_ms)) {
        esp_println::println!("[ERROR] Failed to spawn task: {:?}", e);
    }

    loop {
        let stats = monitor.tick(PRESSES.take());
        if stats.failed_reads > 0 || stats.display_errors > 0 {
            esp_println::println!(
                "[CYCLE] {} recorded, {} failed reads, {} display errors",
                stats.recorded,
                stats.failed_reads,
                stats.display_errors
            );
        }

        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
