//! Zeroed RAM standing in for peripheral register blocks in host tests

use std::boxed::Box;

use crate::pac::{gpio::Gpio, i2c::I2c, rcc::Rcc};

/// One peripheral's register window, reset to zero
pub struct RamBlock(Box<[u32; 256]>);

impl RamBlock {
    pub fn new() -> Self {
        Self(Box::new([0; 256]))
    }

    fn ptr(&mut self) -> *mut () {
        self.0.as_mut_ptr() as *mut ()
    }

    pub fn i2c(&mut self) -> I2c {
        // SAFETY: the window outlives every handle within a single test
        unsafe { I2c::from_ptr(self.ptr()) }
    }

    pub fn rcc(&mut self) -> Rcc {
        // SAFETY: as above
        unsafe { Rcc::from_ptr(self.ptr()) }
    }

    pub fn gpio(&mut self) -> Gpio {
        // SAFETY: as above
        unsafe { Gpio::from_ptr(self.ptr()) }
    }
}
