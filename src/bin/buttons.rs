#![no_std]
#![no_main]

use core::panic::PanicInfo;

use embassy_executor::Spawner;
use embassy_time::{Duration, Instant, Timer};
use esp_backtrace as _;
use esp_hal::{
    delay::Delay,
    gpio::{Input, InputConfig, Pull},
    timer::timg::TimerGroup,
};

use tempboard::{
    config::DEFAULT_DEBOUNCE_MS, debounce::Debouncer, mode::ModeSelector, mode::PressCounter,
    traits::ActivationSink,
};

/// Pretend sensor count for the mode cycle
const SENSOR_COUNT: usize = 3;

static PRESSES: PressCounter = PressCounter::new();

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    esp_println::println!("[PANIC] {:?}", info);
    let delay = Delay::new();
    loop {
        delay.delay_millis(1_000);
    }
}

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn button_watcher(mut button: Input<'static>) {
    esp_println::println!("Watching for mode button presses...");

    let mut debouncer = Debouncer::new(DEFAULT_DEBOUNCE_MS, || PRESSES.activate());
    let mut bounces: u32 = 0;

    loop {
        button.wait_for_falling_edge().await;

        if debouncer.on_edge(Instant::now().as_millis()) {
            esp_println::println!("Button accepted ({} bounces filtered so far)", bounces);
        } else {
            bounces += 1;
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = InputConfig::default().with_pull(Pull::Up);
    let mode_button = Input::new(peripherals.GPIO0, config);

    spawner.spawn(button_watcher(mode_button)).unwrap();

    let mut selector = ModeSelector::new(SENSOR_COUNT);

    loop {
        let presses = PRESSES.take();
        if presses > 0 {
            let mode = selector.advance_by(presses);
            esp_println::println!("{} press(es), mode is now {:?}", presses, mode);
        }

        Timer::after(Duration::from_millis(100)).await;
    }
}
