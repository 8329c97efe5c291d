//! Corvid Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the Corvid I2C driver is
//! written against. Chip-specific HALs implement them on real registers,
//! tests implement them with fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (corvid-firmware, etc.)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  corvid-i2c (bus table, transactions)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  corvid-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ corvid-hal-   │       │  test fakes   │
//! │   stm32f4     │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cTransport`] - Byte-level I2C master hand-shakes
//! - [`gpio::PinBinder`] - Claiming pins for the I2C alternate function

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

// Re-export key types at crate root for convenience
pub use gpio::{Pin, PinAssignment, PinBinder, PinError, Port};
pub use i2c::{BusId, Direction, I2cTransport, InvalidBus, SpeedMode, TransportError, BUS_COUNT};
