use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::gpio::AnyPin;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{DriveMode, Flex, Level, Output, OutputConfig, Pull},
    peripherals::SPI2,
    spi::master::{Config as SpiConfig, Spi},
    time::Rate,
};
use mipidsi::{
    Builder,
    interface::SpiInterface,
    models::ST7789,
    options::{ColorInversion, Orientation, Rotation},
};

use crate::error::SensorError;
use crate::traits::OneWireBus;

const SPI_FREQ_MHZ: u32 = 40;

// 1.14" 135x240 ST7789 panel, used in landscape
const PANEL_WIDTH: u16 = 135;
const PANEL_HEIGHT: u16 = 240;
const PANEL_OFFSET_X: u16 = 52;
const PANEL_OFFSET_Y: u16 = 40;

pub type SpiDisplayDevice<'a> = ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, Delay>;

pub type Panel<'a, 'b> =
    mipidsi::Display<SpiInterface<'b, SpiDisplayDevice<'a>, Output<'a>>, ST7789, Output<'a>>;

pub struct DisplayHardware<'a> {
    pub spi: SpiDisplayDevice<'a>,
    pub dc: Output<'a>,
    pub rst: Output<'a>,
    pub delay: Delay,
}

impl<'a> DisplayHardware<'a> {
    pub fn new<CS, MOSI, SCK, DC, RST>(
        spi_periph: SPI2<'a>,
        cs_gpio: CS,
        mosi_gpio: MOSI,
        sck_gpio: SCK,
        dc_gpio: DC,
        rst_gpio: RST,
    ) -> Result<Self, &'static str>
    where
        CS: Into<AnyPin<'a>>,
        MOSI: Into<AnyPin<'a>>,
        SCK: Into<AnyPin<'a>>,
        DC: Into<AnyPin<'a>>,
        RST: Into<AnyPin<'a>>,
    {
        let delay = Delay::new();

        let spi_bus = Spi::new(
            spi_periph,
            SpiConfig::default().with_frequency(Rate::from_mhz(SPI_FREQ_MHZ)),
        )
        .map_err(|_| "Failed to configure SPI")?
        .with_sck(sck_gpio.into())
        .with_mosi(mosi_gpio.into());

        let cs = Output::new(cs_gpio.into(), Level::High, OutputConfig::default());
        let dc = Output::new(dc_gpio.into(), Level::Low, OutputConfig::default());
        let rst = Output::new(rst_gpio.into(), Level::High, OutputConfig::default());

        let spi = ExclusiveDevice::new(spi_bus, cs, Delay::new())
            .map_err(|_| "Failed to create SPI device")?;

        Ok(Self {
            spi,
            dc,
            rst,
            delay,
        })
    }

    /// Initialize the ST7789 controller. `buffer` batches SPI writes.
    pub fn into_panel<'b>(mut self, buffer: &'b mut [u8]) -> Result<Panel<'a, 'b>, &'static str> {
        let di = SpiInterface::new(self.spi, self.dc, buffer);

        Builder::new(ST7789, di)
            .display_size(PANEL_WIDTH, PANEL_HEIGHT)
            .display_offset(PANEL_OFFSET_X, PANEL_OFFSET_Y)
            .orientation(Orientation::new().rotate(Rotation::Deg90))
            .invert_colors(ColorInversion::Inverted)
            .reset_pin(self.rst)
            .init(&mut self.delay)
            .map_err(|_| "Failed to initialize ST7789")
    }
}

/// Bit-banged one-wire master on an open-drain pin with pull-up
pub struct OneWirePin<'a> {
    pin: Flex<'a>,
    delay: Delay,
}

impl<'a> OneWirePin<'a> {
    pub fn new<P>(gpio: P) -> Self
    where
        P: Into<AnyPin<'a>>,
    {
        let mut pin = Flex::new(gpio.into());
        pin.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        pin.set_input_enable(true);
        pin.set_output_enable(true);
        pin.set_high();

        Self {
            pin,
            delay: Delay::new(),
        }
    }
}

// Standard speed slot timings from the DS18B20 datasheet, in microseconds.
// Each slot runs inside a critical section so interrupts cannot stretch it.
impl OneWireBus for OneWirePin<'_> {
    fn reset(&mut self) -> Result<bool, SensorError> {
        if self.pin.is_low() {
            // Bus shorted or missing pull-up
            return Err(SensorError::Unavailable);
        }

        let present = critical_section::with(|_| {
            self.pin.set_low();
            self.delay.delay_micros(480);
            self.pin.set_high();
            self.delay.delay_micros(70);
            self.pin.is_low()
        });
        self.delay.delay_micros(410);
        Ok(present)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), SensorError> {
        critical_section::with(|_| {
            self.pin.set_low();
            if bit {
                self.delay.delay_micros(6);
                self.pin.set_high();
                self.delay.delay_micros(64);
            } else {
                self.delay.delay_micros(60);
                self.pin.set_high();
                self.delay.delay_micros(10);
            }
        });
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, SensorError> {
        let bit = critical_section::with(|_| {
            self.pin.set_low();
            self.delay.delay_micros(6);
            self.pin.set_high();
            self.delay.delay_micros(9);
            self.pin.is_high()
        });
        self.delay.delay_micros(55);
        Ok(bit)
    }
}
