//! STM32F4-specific HAL for Corvid
//!
//! This crate implements the `corvid-hal` capabilities on the STM32F4
//! (Cortex-M4) peripheral registers:
//!
//! - [`i2c::Stm32I2c`] - register-level [`corvid_hal::I2cTransport`]
//! - [`gpio::Stm32Pins`] - [`corvid_hal::PinBinder`] routing SCL/SDA via AF4/AF9
//! - [`timing`] - CCR/TRISE computation for standard and fast mode
//! - [`clock`] - APB1 clock decoding from RCC
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Register access goes through the `stm32-metapac` handles re-exported as
//! [`pac`]. On target they are the chip's peripheral instances (see the
//! `steal` constructors); host tests point the same handles at zeroed RAM
//! and drive the same code paths.

#![no_std]

#[cfg(test)]
extern crate std;

pub use stm32_metapac as pac;

pub mod clock;
pub mod gpio;
pub mod i2c;
pub mod timing;

#[cfg(test)]
mod ram;

pub use gpio::Stm32Pins;
pub use i2c::{Stm32I2c, TransportConfig};
