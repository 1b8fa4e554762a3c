//! One-wire bus scan
//!
//! Lists the ROM code of every device on the sensor bus, once per second, so
//! sensors can be pinned to a slot in the configuration.
//!
//! Following pins are used:
//! - DQ => GPIO33 (4.7k pull-up to 3V3)

#![no_std]
#![no_main]

use core::panic::PanicInfo;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{delay::Delay, timer::timg::TimerGroup};
use heapless::Vec;

use tempboard::{
    hardware::OneWirePin,
    onewire::{self, DS18B20_FAMILY, RomCode},
};

const MAX_DEVICES: usize = 16;

esp_bootloader_esp_idf::esp_app_desc!();

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    esp_println::println!("[PANIC] {:?}", info);
    let delay = Delay::new();
    loop {
        delay.delay_millis(1_000);
        esp_println::println!("[PANIC] continue...");
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut bus = OneWirePin::new(peripherals.GPIO33);

    loop {
        esp_println::println!("One-wire scan start");

        let mut found: Vec<RomCode, MAX_DEVICES> = Vec::new();
        match onewire::search_all(&mut bus, &mut found) {
            Ok(()) => {
                for rom in found.iter() {
                    let kind = if rom.family() == DS18B20_FAMILY {
                        "DS18B20"
                    } else {
                        "unknown"
                    };
                    esp_println::println!("Found {} ({}) id {}", rom, kind, rom.id());
                }
                esp_println::println!("One-wire scan done, {} device(s)", found.len());
            }
            Err(e) => {
                esp_println::println!("One-wire scan failed: {}", e);
            }
        }

        Timer::after(Duration::from_secs(1)).await;
    }
}
