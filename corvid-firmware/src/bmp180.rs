//! Minimal BMP180 driver over any `embedded_hal` I2C bus

use embassy_time::Timer;
use embedded_hal::i2c::I2c;

/// Fixed 7-bit address of the BMP180
pub const ADDRESS: u8 = 0x77;

const REG_CHIP_ID: u8 = 0xD0;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_OUT_MSB: u8 = 0xF6;

const CHIP_ID: u8 = 0x55;
const CMD_TEMPERATURE: u8 = 0x2E;
const CMD_PRESSURE_OSS0: u8 = 0x34;

/// Conversion time for temperature and OSS=0 pressure (max 4.5 ms)
const CONVERSION_MS: u64 = 5;

pub struct Bmp180<I> {
    i2c: I,
}

impl<I: I2c> Bmp180<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Check the chip-id register
    pub fn probe(&mut self) -> Result<bool, I::Error> {
        let mut id = [0u8; 1];
        self.i2c.write_read(ADDRESS, &[REG_CHIP_ID], &mut id)?;
        Ok(id[0] == CHIP_ID)
    }

    /// Uncompensated temperature (UT)
    pub async fn raw_temperature(&mut self) -> Result<u16, I::Error> {
        self.measure(CMD_TEMPERATURE).await
    }

    /// Uncompensated pressure (UP) at oversampling 0
    pub async fn raw_pressure(&mut self) -> Result<u16, I::Error> {
        self.measure(CMD_PRESSURE_OSS0).await
    }

    async fn measure(&mut self, command: u8) -> Result<u16, I::Error> {
        self.i2c.write(ADDRESS, &[REG_CTRL_MEAS, command])?;
        Timer::after_millis(CONVERSION_MS).await;

        let mut out = [0u8; 2];
        self.i2c.write_read(ADDRESS, &[REG_OUT_MSB], &mut out)?;
        Ok(u16::from_be_bytes(out))
    }
}
