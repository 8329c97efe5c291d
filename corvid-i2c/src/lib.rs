//! Blocking I2C master driver
//!
//! Brings up the chip's I2C buses and runs read, write and
//! write-then-read transactions on them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  I2cDriver (initialize / deinitialize)   │
//! │  BusHandle (write / read / write_read)   │
//! ├──────────────────────────────────────────┤
//! │  engine: start, address, data, stop      │
//! │  registry: per-bus state and config      │
//! ├──────────────────────────────────────────┤
//! │  corvid-hal: I2cTransport, PinBinder     │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Each bus is Uninitialized, Ready or Faulted. Timeouts and NACKs leave
//! a bus Ready; arbitration loss, line errors and overruns fault it until
//! it is initialized again.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod handle;
pub mod registry;
pub mod status;

#[cfg(test)]
mod mock;

pub use config::{parse_board_config, BusConfig, ParseError};
pub use driver::I2cDriver;
pub use error::{BusFault, Error, Phase, Status};
pub use handle::BusHandle;
pub use registry::BusState;
pub use status::BusReport;

pub use corvid_hal::{BusId, Pin, PinAssignment, SpeedMode};
