//! One-wire protocol and the DS18B20 driver, on top of [`OneWireBus`].

use core::cell::RefCell;
use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, warn};

use crate::error::SensorError;
use crate::model::{SensorId, SensorKind};
use crate::traits::{OneWireBus, TemperatureSensor};

pub const SEARCH_ROM: u8 = 0xF0;
pub const MATCH_ROM: u8 = 0x55;
pub const SKIP_ROM: u8 = 0xCC;
pub const CONVERT_T: u8 = 0x44;
pub const READ_SCRATCHPAD: u8 = 0xBE;

/// Family code of the DS18B20
pub const DS18B20_FAMILY: u8 = 0x28;

/// Worst case 12-bit conversion time is 750 ms
const CONVERSION_POLL_MS: u32 = 10;
const CONVERSION_POLLS: u32 = 80;

/// Dallas/Maxim CRC-8 (polynomial x^8 + x^5 + x^4 + 1, LSB first)
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut byte = byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

/// 64-bit device ROM code: family, 48-bit serial, CRC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RomCode(pub [u8; 8]);

impl RomCode {
    pub fn family(&self) -> u8 {
        self.0[0]
    }

    pub fn is_valid(&self) -> bool {
        crc8(&self.0[..7]) == self.0[7]
    }

    pub fn id(&self) -> SensorId {
        SensorId::from_rom(self.0)
    }

    fn bit(&self, index: usize) -> bool {
        self.0[index / 8] & (1 << (index % 8)) != 0
    }

    fn set_bit(&mut self, index: usize, value: bool) {
        let mask = 1 << (index % 8);
        if value {
            self.0[index / 8] |= mask;
        } else {
            self.0[index / 8] &= !mask;
        }
    }
}

impl fmt::Display for RomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl Default for RomCode {
    fn default() -> Self {
        Self([0; 8])
    }
}

/// Enumerates the devices on a bus with the SEARCH ROM algorithm
#[derive(Debug, Default)]
pub struct RomSearch {
    rom: RomCode,
    /// 1-based bit position of the last unexplored zero branch, 0 when none
    last_discrepancy: usize,
    done: bool,
}

impl RomSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next ROM code on the bus, or `None` once every device has been seen
    pub fn next<B: OneWireBus>(&mut self, bus: &mut B) -> Result<Option<RomCode>, SensorError> {
        if self.done {
            return Ok(None);
        }
        if !bus.reset()? {
            self.done = true;
            return Ok(None);
        }
        bus.write_byte(SEARCH_ROM)?;

        let mut last_zero = 0;
        for index in 0..64 {
            let position = index + 1;
            let id_bit = bus.read_bit()?;
            let complement = bus.read_bit()?;

            let direction = match (id_bit, complement) {
                // Nobody answered, devices dropped off mid-search
                (true, true) => {
                    self.done = true;
                    return Ok(None);
                }
                (false, false) => {
                    let direction = if position < self.last_discrepancy {
                        self.rom.bit(index)
                    } else {
                        position == self.last_discrepancy
                    };
                    if !direction {
                        last_zero = position;
                    }
                    direction
                }
                (bit, _) => bit,
            };

            self.rom.set_bit(index, direction);
            bus.write_bit(direction)?;
        }

        self.last_discrepancy = last_zero;
        if last_zero == 0 {
            self.done = true;
        }
        Ok(Some(self.rom))
    }
}

/// Collect valid ROM codes into `found` until the bus is exhausted or `found` is full
pub fn search_all<B: OneWireBus, const N: usize>(
    bus: &mut B,
    found: &mut Vec<RomCode, N>,
) -> Result<(), SensorError> {
    let mut search = RomSearch::new();
    while let Some(rom) = search.next(bus)? {
        if !rom.is_valid() {
            warn!("One-wire: skipping ROM {} with bad CRC", rom);
            continue;
        }
        debug!("One-wire: found {}", rom);
        if found.push(rom).is_err() {
            warn!("One-wire: more than {} devices, ignoring the rest", N);
            break;
        }
    }
    Ok(())
}

/// Address one device, or every device when `rom` is `None`
pub fn select<B: OneWireBus>(bus: &mut B, rom: Option<&RomCode>) -> Result<(), SensorError> {
    if !bus.reset()? {
        return Err(SensorError::NoPresence);
    }
    match rom {
        Some(rom) => {
            bus.write_byte(MATCH_ROM)?;
            for byte in rom.0 {
                bus.write_byte(byte)?;
            }
        }
        None => bus.write_byte(SKIP_ROM)?,
    }
    Ok(())
}

/// Temperature from a DS18B20 scratchpad, after checking its CRC
pub fn decode_scratchpad(pad: &[u8; 9]) -> Result<f32, SensorError> {
    let actual = crc8(&pad[..8]);
    if actual != pad[8] {
        return Err(SensorError::CrcMismatch {
            expected: pad[8],
            actual,
        });
    }
    let raw = i16::from_le_bytes([pad[0], pad[1]]);
    Ok(raw as f32 / 16.0)
}

/// DS18B20 on a bus shared with other devices
pub struct Ds18b20<'a, B, D> {
    bus: &'a RefCell<B>,
    delay: D,
    rom: RomCode,
}

impl<'a, B: OneWireBus, D: DelayNs> Ds18b20<'a, B, D> {
    pub fn new(bus: &'a RefCell<B>, delay: D, rom: RomCode) -> Self {
        Self { bus, delay, rom }
    }

    pub fn rom(&self) -> RomCode {
        self.rom
    }

    fn convert_and_read(&mut self, bus: &mut B) -> Result<f32, SensorError> {
        select(bus, Some(&self.rom))?;
        bus.write_byte(CONVERT_T)?;

        // The device holds the line low until the conversion is done
        let mut ready = false;
        for _ in 0..CONVERSION_POLLS {
            if bus.read_bit()? {
                ready = true;
                break;
            }
            self.delay.delay_ms(CONVERSION_POLL_MS);
        }
        if !ready {
            return Err(SensorError::Unavailable);
        }

        select(bus, Some(&self.rom))?;
        bus.write_byte(READ_SCRATCHPAD)?;
        let mut pad = [0u8; 9];
        for byte in pad.iter_mut() {
            *byte = bus.read_byte()?;
        }
        decode_scratchpad(&pad)
    }
}

impl<B: OneWireBus, D: DelayNs> TemperatureSensor for Ds18b20<'_, B, D> {
    fn identity(&self) -> SensorId {
        self.rom.id()
    }

    fn kind(&self) -> SensorKind {
        SensorKind::Ds18b20
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let bus = self.bus;
        let mut bus = bus.try_borrow_mut().map_err(|_| SensorError::Unavailable)?;
        self.convert_and_read(&mut bus)
    }
}
