//! GPIO pin binding for STM32F4
//!
//! Routes I2C SCL/SDA signals to pins by switching them to their alternate
//! function, open-drain with pull-up, and tracks which pins are claimed.

use corvid_hal::{BusId, Pin, PinAssignment, PinBinder, PinError, Port};

use crate::pac;
use crate::pac::gpio::vals::{Moder, Ospeedr, Ot, Pupdr};
use crate::pac::gpio::Gpio;
use crate::pac::rcc::Rcc;

/// Number of GPIO ports modelled (A-E, H)
pub const PORT_COUNT: usize = 6;

/// I2C signal carried by a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    Scl,
    Sda,
}

struct Route {
    bus: BusId,
    signal: Signal,
    pin: Pin,
    af: u8,
}

const fn route(bus: BusId, signal: Signal, port: Port, number: u8, af: u8) -> Route {
    Route {
        bus,
        signal,
        pin: Pin { port, number },
        af,
    }
}

/// Pins able to carry each bus signal (STM32F401/F411 pinout)
const ROUTES: [Route; 10] = [
    route(BusId::I2c1, Signal::Scl, Port::B, 6, 4),
    route(BusId::I2c1, Signal::Scl, Port::B, 8, 4),
    route(BusId::I2c1, Signal::Sda, Port::B, 7, 4),
    route(BusId::I2c1, Signal::Sda, Port::B, 9, 4),
    route(BusId::I2c2, Signal::Scl, Port::B, 10, 4),
    route(BusId::I2c2, Signal::Sda, Port::B, 11, 4),
    route(BusId::I2c2, Signal::Sda, Port::B, 3, 9),
    route(BusId::I2c3, Signal::Scl, Port::A, 8, 4),
    route(BusId::I2c3, Signal::Sda, Port::C, 9, 4),
    route(BusId::I2c3, Signal::Sda, Port::B, 4, 9),
];

/// Alternate function number routing `signal` of `bus` to `pin`
pub fn alternate_function(bus: BusId, signal: Signal, pin: Pin) -> Option<u8> {
    ROUTES
        .iter()
        .find(|r| r.bus == bus && r.signal == signal && r.pin == pin)
        .map(|r| r.af)
}

fn port_slot(port: Port) -> usize {
    match port {
        Port::A => 0,
        Port::B => 1,
        Port::C => 2,
        Port::D => 3,
        Port::E => 4,
        Port::H => 5,
    }
}

/// Claimed-pin tracker, one bit per pin
#[derive(Debug, Clone, Default)]
pub struct PinClaims {
    claimed: [u16; PORT_COUNT],
}

impl PinClaims {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a pin
    pub fn claim(&mut self, pin: Pin) -> Result<(), PinError> {
        if self.is_claimed(pin) {
            return Err(PinError::AlreadyClaimed);
        }
        self.claimed[port_slot(pin.port)] |= 1 << pin.number;
        Ok(())
    }

    /// Release a pin
    pub fn release(&mut self, pin: Pin) {
        self.claimed[port_slot(pin.port)] &= !(1 << pin.number);
    }

    /// Check if a pin is claimed
    pub fn is_claimed(&self, pin: Pin) -> bool {
        self.claimed[port_slot(pin.port)] & (1 << pin.number) != 0
    }
}

/// Register-level pin binder
pub struct Stm32Pins {
    rcc: Rcc,
    /// Port register blocks in A, B, C, D, E, H order
    ports: [Gpio; PORT_COUNT],
    claims: PinClaims,
}

impl Stm32Pins {
    /// Create a binder over explicit register blocks
    pub fn new(rcc: Rcc, ports: [Gpio; PORT_COUNT]) -> Self {
        Self {
            rcc,
            ports,
            claims: PinClaims::new(),
        }
    }

    /// Create a binder on the hardware GPIO registers
    ///
    /// # Safety
    ///
    /// Must run on an STM32F4, and at most one binder may exist.
    pub unsafe fn steal() -> Self {
        Self::new(
            pac::RCC,
            [
                pac::GPIOA,
                pac::GPIOB,
                pac::GPIOC,
                pac::GPIOD,
                pac::GPIOE,
                pac::GPIOH,
            ],
        )
    }

    /// Pins currently claimed by a bus
    pub fn claims(&self) -> &PinClaims {
        &self.claims
    }

    fn port(&self, port: Port) -> Gpio {
        self.ports[port_slot(port)]
    }

    fn enable_port_clock(&self, port: Port) {
        self.rcc.ahb1enr().modify(|w| match port {
            Port::A => w.set_gpioaen(true),
            Port::B => w.set_gpioben(true),
            Port::C => w.set_gpiocen(true),
            Port::D => w.set_gpioden(true),
            Port::E => w.set_gpioeen(true),
            Port::H => w.set_gpiohen(true),
        });
    }

    /// Alternate function, open-drain, very high speed, pull-up
    fn configure(&self, pin: Pin, af: u8) {
        let regs = self.port(pin.port);
        let n = pin.number as usize;

        self.enable_port_clock(pin.port);

        regs.moder().modify(|w| w.set_moder(n, Moder::ALTERNATE));
        regs.otyper().modify(|w| w.set_ot(n, Ot::OPEN_DRAIN));
        regs.ospeedr()
            .modify(|w| w.set_ospeedr(n, Ospeedr::VERY_HIGH_SPEED));
        regs.pupdr().modify(|w| w.set_pupdr(n, Pupdr::PULL_UP));
        regs.afr(n / 8).modify(|w| w.set_afr(n % 8, af));
    }

    /// Back to input mode, the reset state
    fn unconfigure(&self, pin: Pin) {
        let regs = self.port(pin.port);
        regs.moder()
            .modify(|w| w.set_moder(pin.number as usize, Moder::INPUT));
    }
}

impl PinBinder for Stm32Pins {
    fn bind_pins(&mut self, bus: BusId, pins: &PinAssignment) -> Result<(), PinError> {
        let scl_af =
            alternate_function(bus, Signal::Scl, pins.scl).ok_or(PinError::WrongFunction)?;
        let sda_af =
            alternate_function(bus, Signal::Sda, pins.sda).ok_or(PinError::WrongFunction)?;

        // All or nothing
        if self.claims.is_claimed(pins.scl) || self.claims.is_claimed(pins.sda) {
            return Err(PinError::AlreadyClaimed);
        }
        self.claims.claim(pins.scl)?;
        self.claims.claim(pins.sda)?;

        self.configure(pins.scl, scl_af);
        self.configure(pins.sda, sda_af);
        Ok(())
    }

    fn release_pins(&mut self, _bus: BusId, pins: &PinAssignment) {
        for pin in [pins.scl, pins.sda] {
            if self.claims.is_claimed(pin) {
                self.unconfigure(pin);
                self.claims.release(pin);
            }
        }
    }
}
