//! Blocking HDC302x humidity/temperature sensor driver.
//!
//! ## Hardware
//!
//! TI HDC3020/3021/3022 on I2C at 0x44..=0x47.  Every command is a 16-bit
//! big-endian word; every 16-bit data word the device returns or accepts
//! is followed by a CRC-8 (poly 0x31, init 0xFF).
//!
//! | Operation        | Command  | Payload                          |
//! |------------------|----------|----------------------------------|
//! | One-shot LP0     | `0x2400` | read T, crc, RH, crc             |
//! | Heater config    | `0x306E` | write level word + crc           |
//! | Heater on / off  | `0x306D` / `0x3066` | -                     |
//! | Offsets          | `0xA004` | RH byte, T byte, crc (r/w)       |
//! | NIST ID          | `0x3683..=0x3685` | read word + crc each    |
//!
//! ## Offset byte
//!
//! Bit 7 is the sign (1 = add), bits 6..0 the magnitude.  One LSB is
//! 0.1953125 %RH or 0.1708984375 °C.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use log::{debug, warn};

use crate::app::ports::SensorPort;
use crate::calibration::{HeaterPower, Measurement, OffsetPair, UniqueId};
use crate::error::SensorError;

// ── Commands ──────────────────────────────────────────────────

const CMD_MEASURE_LP0: u16 = 0x2400;
const CMD_HEATER_CONFIG: u16 = 0x306E;
const CMD_HEATER_ENABLE: u16 = 0x306D;
const CMD_HEATER_DISABLE: u16 = 0x3066;
const CMD_OFFSETS: u16 = 0xA004;
const CMD_NIST_ID: [u16; 3] = [0x3683, 0x3684, 0x3685];

const HEATER_FULL: u16 = 0x3FFF;
const HEATER_HALF: u16 = 0x03FF;
const HEATER_QUARTER: u16 = 0x009F;

/// LP0 conversion time is 12.5 ms max.
const MEASURE_DELAY_MS: u32 = 15;
/// EEPROM programming time for the offset register.
const EEPROM_WRITE_DELAY_MS: u32 = 80;

pub const RH_OFFSET_LSB_PCT: f32 = 0.195_312_5;
pub const T_OFFSET_LSB_C: f32 = 0.170_898_437_5;

// ── CRC / conversions ─────────────────────────────────────────

/// CRC-8, polynomial 0x31, init 0xFF, no reflection, no final XOR.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn checked_word(bytes: &[u8]) -> Result<u16, SensorError> {
    if crc8(&bytes[..2]) != bytes[2] {
        warn!("HDC302x CRC mismatch on {:02X?}", bytes);
        return Err(SensorError::Crc);
    }
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub fn raw_to_celsius(raw: u16) -> f32 {
    -45.0 + 175.0 * f32::from(raw) / 65535.0
}

pub fn raw_to_humidity(raw: u16) -> f32 {
    100.0 * f32::from(raw) / 65535.0
}

/// Encode an offset into the sensor's sign/magnitude byte, rounding to
/// the nearest LSB and saturating at the 7-bit maximum.
pub fn encode_offset(value: f32, lsb: f32) -> u8 {
    let steps = (value.abs() / lsb).round().min(127.0) as u8;
    if steps == 0 {
        0
    } else if value > 0.0 {
        0x80 | steps
    } else {
        steps
    }
}

pub fn decode_offset(byte: u8, lsb: f32) -> f32 {
    let magnitude = f32::from(byte & 0x7F) * lsb;
    if byte & 0x80 != 0 {
        magnitude
    } else {
        -magnitude
    }
}

// ── Driver ────────────────────────────────────────────────────

/// HDC302x on an `embedded-hal` I2C bus.
pub struct Hdc302x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> Hdc302x<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// Give the bus and delay back.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, cmd: u16) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &cmd.to_be_bytes())
            .map_err(|e| write_error(e.kind()))
    }

    fn command_with_word(&mut self, cmd: u16, word: [u8; 2]) -> Result<(), SensorError> {
        let [c0, c1] = cmd.to_be_bytes();
        let frame = [c0, c1, word[0], word[1], crc8(&word)];
        self.i2c
            .write(self.address, &frame)
            .map_err(|e| write_error(e.kind()))
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .read(self.address, buf)
            .map_err(|e| read_error(e.kind()))
    }

    fn read_word(&mut self, cmd: u16) -> Result<[u8; 3], SensorError> {
        self.command(cmd)?;
        let mut buf = [0u8; 3];
        self.read_into(&mut buf)?;
        Ok(buf)
    }
}

/// A NACK on a command's data bytes means the device refused it.
fn write_error(kind: ErrorKind) -> SensorError {
    warn!("HDC302x write failed: {:?}", kind);
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => SensorError::CommandRejected,
        _ => SensorError::Bus,
    }
}

/// The device NACKs its address while a conversion is still running.
fn read_error(kind: ErrorKind) -> SensorError {
    warn!("HDC302x read failed: {:?}", kind);
    match kind {
        ErrorKind::NoAcknowledge(_) => SensorError::NotReady,
        _ => SensorError::Bus,
    }
}

impl<I2C, D> SensorPort for Hdc302x<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn read(&mut self) -> Result<Measurement, SensorError> {
        self.command(CMD_MEASURE_LP0)?;
        self.delay.delay_ms(MEASURE_DELAY_MS);

        let mut buf = [0u8; 6];
        self.read_into(&mut buf)?;
        let t_raw = checked_word(&buf[0..3])?;
        let rh_raw = checked_word(&buf[3..6])?;

        Ok(Measurement {
            temperature_c: raw_to_celsius(t_raw),
            humidity_pct: raw_to_humidity(rh_raw),
        })
    }

    fn set_heater(&mut self, power: HeaterPower) -> Result<(), SensorError> {
        let level = match power {
            HeaterPower::Off => {
                debug!("HDC302x heater disable");
                return self.command(CMD_HEATER_DISABLE);
            }
            HeaterPower::Quarter => HEATER_QUARTER,
            HeaterPower::Half => HEATER_HALF,
            HeaterPower::Full => HEATER_FULL,
        };
        debug!("HDC302x heater level 0x{:04X}", level);
        self.command_with_word(CMD_HEATER_CONFIG, level.to_be_bytes())?;
        self.command(CMD_HEATER_ENABLE)
    }

    fn read_offsets(&mut self) -> Result<OffsetPair, SensorError> {
        let buf = self.read_word(CMD_OFFSETS)?;
        let [rh, t] = checked_word(&buf)?.to_be_bytes();
        Ok(OffsetPair {
            temperature_offset_c: decode_offset(t, T_OFFSET_LSB_C),
            humidity_offset_pct: decode_offset(rh, RH_OFFSET_LSB_PCT),
        })
    }

    fn write_offsets(&mut self, offsets: OffsetPair) -> Result<(), SensorError> {
        let rh = encode_offset(offsets.humidity_offset_pct, RH_OFFSET_LSB_PCT);
        let t = encode_offset(offsets.temperature_offset_c, T_OFFSET_LSB_C);
        debug!("HDC302x offsets <- RH 0x{:02X} T 0x{:02X}", rh, t);
        self.command_with_word(CMD_OFFSETS, [rh, t])?;
        self.delay.delay_ms(EEPROM_WRITE_DELAY_MS);
        Ok(())
    }

    fn read_unique_id(&mut self) -> Result<UniqueId, SensorError> {
        let mut bytes = [0u8; 6];
        for (i, cmd) in CMD_NIST_ID.into_iter().enumerate() {
            let buf = self.read_word(cmd)?;
            let [hi, lo] = checked_word(&buf)?.to_be_bytes();
            bytes[i * 2] = hi;
            bytes[i * 2 + 1] = lo;
        }
        Ok(UniqueId::from_bytes(bytes))
    }
}
