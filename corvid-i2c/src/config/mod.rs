//! Bus configuration
//!
//! A [`BusConfig`] names the bus, its speed mode and the pins its signals
//! are routed to. Board files are parsed with [`parse_board_config`].

mod toml;

pub use toml::{parse_board_config, ParseError};

use corvid_hal::{BusId, PinAssignment, SpeedMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    pub bus: BusId,
    pub speed: SpeedMode,
    pub pins: PinAssignment,
}

impl BusConfig {
    /// Configuration using the board's default pins for `bus`
    pub const fn new(bus: BusId, speed: SpeedMode) -> Self {
        Self {
            bus,
            speed,
            pins: PinAssignment::default_for(bus),
        }
    }

    /// Route the bus to other pins
    pub const fn with_pins(mut self, pins: PinAssignment) -> Self {
        self.pins = pins;
        self
    }
}
