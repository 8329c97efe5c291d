//! I2C bus abstractions
//!
//! Provides the bus identifiers, speed modes and the byte-level transport
//! capability that chip-specific HALs implement for master operation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of physical I2C buses
pub const BUS_COUNT: usize = 3;

/// Physical I2C bus identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BusId {
    I2c1,
    I2c2,
    I2c3,
}

impl BusId {
    /// All buses, in index order
    pub const ALL: [BusId; BUS_COUNT] = [BusId::I2c1, BusId::I2c2, BusId::I2c3];

    /// Zero-based bus index (I2C1 = 0)
    pub const fn index(self) -> usize {
        match self {
            BusId::I2c1 => 0,
            BusId::I2c2 => 1,
            BusId::I2c3 => 2,
        }
    }

    /// Bit for this bus in an initialization mask
    pub const fn mask(self) -> u8 {
        1 << self.index()
    }
}

/// Raw bus number outside the supported set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidBus(pub u8);

impl TryFrom<u8> for BusId {
    type Error = InvalidBus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BusId::I2c1),
            1 => Ok(BusId::I2c2),
            2 => Ok(BusId::I2c3),
            other => Err(InvalidBus(other)),
        }
    }
}

/// Bus clock speed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpeedMode {
    /// Standard mode (100 kHz)
    #[default]
    Standard,
    /// Fast mode (400 kHz)
    Fast,
}

impl SpeedMode {
    /// SCL frequency in Hz
    pub const fn frequency_hz(self) -> u32 {
        match self {
            SpeedMode::Standard => 100_000,
            SpeedMode::Fast => 400_000,
        }
    }
}

/// Transfer direction, encoded in the low bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    /// Address byte as sent on the wire for a 7-bit address
    pub const fn address_byte(self, address: u8) -> u8 {
        match self {
            Direction::Write => address << 1,
            Direction::Read => (address << 1) | 1,
        }
    }
}

/// Failure reported by a single transport hand-shake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Expected flag never appeared within the polling budget
    Timeout,
    /// Address or data byte not acknowledged
    Nack,
    /// Lost arbitration to another master
    ArbitrationLost,
    /// Misplaced start/stop or unexpected line state
    Bus,
    /// Data register overrun/underrun
    Overrun,
    /// Timing cannot be programmed for the peripheral clock
    Config,
}

/// Byte-level I2C master transport
///
/// Each method performs one hardware hand-shake and blocks until it
/// completes, fails, or its timeout expires. The transaction framing
/// (which steps run in which order) belongs to the caller.
pub trait I2cTransport {
    /// Reset the peripheral and program clock generation for `speed`
    fn enable(&mut self, speed: SpeedMode) -> Result<(), TransportError>;

    /// Switch the peripheral off
    fn disable(&mut self);

    /// Issue a start condition (a repeated start if the bus is already owned)
    fn start(&mut self) -> Result<(), TransportError>;

    /// Send a 7-bit address with the direction bit and wait for the ACK
    ///
    /// `single_read` is set when exactly one byte is read before the bus is
    /// released. That byte has to be NACKed, and on some peripherals the
    /// NACK must be programmed before the address phase is cleared.
    fn send_address(
        &mut self,
        address: u8,
        direction: Direction,
        single_read: bool,
    ) -> Result<(), TransportError>;

    /// Transmit one data byte and wait for the ACK
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError>;

    /// Receive one data byte
    ///
    /// `ack` is false for the final byte of a read, which the master
    /// answers with a NACK.
    fn read_byte(&mut self, ack: bool) -> Result<u8, TransportError>;

    /// Issue a stop condition and release the bus
    fn stop(&mut self);
}
