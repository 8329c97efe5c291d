//! GPIO pin abstractions
//!
//! Pin naming and the pin-claim capability used to route a bus's SCL/SDA
//! signals before the peripheral is enabled.

use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::i2c::BusId;

/// GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    H,
}

impl Port {
    fn from_letter(c: char) -> Option<Self> {
        match c {
            'A' => Some(Port::A),
            'B' => Some(Port::B),
            'C' => Some(Port::C),
            'D' => Some(Port::D),
            'E' => Some(Port::E),
            'H' => Some(Port::H),
            _ => None,
        }
    }
}

/// A single GPIO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pin {
    pub port: Port,
    /// Pin number within the port (0-15)
    pub number: u8,
}

impl Pin {
    /// Create a pin; numbers above 15 are rejected
    pub const fn new(port: Port, number: u8) -> Result<Self, PinError> {
        if number > 15 {
            return Err(PinError::InvalidPin);
        }
        Ok(Self { port, number })
    }

    /// Parse a pin string like "PB8"
    pub fn parse(s: &str) -> Result<Self, PinError> {
        let s = s.trim();
        let rest = s.strip_prefix('P').ok_or(PinError::InvalidPin)?;

        let mut chars = rest.chars();
        let port = chars
            .next()
            .and_then(Port::from_letter)
            .ok_or(PinError::InvalidPin)?;

        let number: u8 = chars.as_str().parse().map_err(|_| PinError::InvalidPin)?;
        Self::new(port, number)
    }
}

impl FromStr for Pin {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Board default pins are compile-time constants; `new` cannot fail for them.
const fn pin(port: Port, number: u8) -> Pin {
    Pin { port, number }
}

/// SCL/SDA pin pair routed to one bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinAssignment {
    pub scl: Pin,
    pub sda: Pin,
}

impl PinAssignment {
    /// Board default wiring for a bus
    ///
    /// - I2C1: PB8 (SCL), PB9 (SDA)
    /// - I2C2: PB10 (SCL), PB11 (SDA)
    /// - I2C3: PA8 (SCL), PC9 (SDA)
    pub const fn default_for(bus: BusId) -> Self {
        match bus {
            BusId::I2c1 => Self {
                scl: pin(Port::B, 8),
                sda: pin(Port::B, 9),
            },
            BusId::I2c2 => Self {
                scl: pin(Port::B, 10),
                sda: pin(Port::B, 11),
            },
            BusId::I2c3 => Self {
                scl: pin(Port::A, 8),
                sda: pin(Port::C, 9),
            },
        }
    }
}

/// Error when claiming pins for a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin does not exist
    InvalidPin,
    /// Pin already claimed by another bus
    AlreadyClaimed,
    /// Pin cannot carry the requested bus signal
    WrongFunction,
}

/// Pin/function binder
///
/// Routes a bus's SCL and SDA signals to physical pins. Implementations
/// either claim both pins or neither.
pub trait PinBinder {
    /// Claim and configure both pins of `pins` for `bus`
    fn bind_pins(&mut self, bus: BusId, pins: &PinAssignment) -> Result<(), PinError>;

    /// Return both pins to the unclaimed pool
    fn release_pins(&mut self, bus: BusId, pins: &PinAssignment);
}
