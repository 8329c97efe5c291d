//! I2C master transport for STM32F4
//!
//! Implements the byte-level hand-shakes of [`I2cTransport`] on the I2C
//! v1 peripheral by polling SR1 with a bounded budget.

use corvid_hal::{BusId, Direction, I2cTransport, SpeedMode, TransportError};

use crate::pac;
use crate::pac::i2c::regs::Sr1;
use crate::pac::i2c::vals::FS;
use crate::pac::i2c::I2c;
use crate::pac::rcc::Rcc;
use crate::timing::Timing;

/// Default polling budget per hand-shake
pub const DEFAULT_TIMEOUT_POLLS: u32 = 1_000_000;

/// Transport configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportConfig {
    /// APB1 peripheral clock in Hz
    pub apb1_hz: u32,
    /// SR1 polls before a hand-shake times out
    pub timeout_polls: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            apb1_hz: 16_000_000, // HSI after reset
            timeout_polls: DEFAULT_TIMEOUT_POLLS,
        }
    }
}

/// Register-level I2C transport for one bus
pub struct Stm32I2c {
    bus: BusId,
    regs: I2c,
    rcc: Rcc,
    config: TransportConfig,
    /// STOP already requested for the final read byte
    stop_armed: bool,
}

impl Stm32I2c {
    /// Create a transport over explicit register blocks
    pub fn new(bus: BusId, regs: I2c, rcc: Rcc, config: TransportConfig) -> Self {
        Self {
            bus,
            regs,
            rcc,
            config,
            stop_armed: false,
        }
    }

    /// Create a transport on the hardware registers of `bus`
    ///
    /// # Safety
    ///
    /// Must run on an STM32F4, and at most one transport may exist per bus.
    pub unsafe fn steal(bus: BusId, config: TransportConfig) -> Self {
        let regs = match bus {
            BusId::I2c1 => pac::I2C1,
            BusId::I2c2 => pac::I2C2,
            BusId::I2c3 => pac::I2C3,
        };
        Self::new(bus, regs, pac::RCC, config)
    }

    /// Bus this transport drives
    pub fn bus(&self) -> BusId {
        self.bus
    }

    /// Active configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn set_clock(&self, on: bool) {
        self.rcc.apb1enr().modify(|w| match self.bus {
            BusId::I2c1 => w.set_i2c1en(on),
            BusId::I2c2 => w.set_i2c2en(on),
            BusId::I2c3 => w.set_i2c3en(on),
        });
    }

    /// Map SR1 error flags to a transport error, clearing the flag
    fn check_errors(&self, sr1: Sr1) -> Result<(), TransportError> {
        if sr1.arlo() {
            self.regs.sr1().modify(|w| w.set_arlo(false));
            Err(TransportError::ArbitrationLost)
        } else if sr1.berr() {
            self.regs.sr1().modify(|w| w.set_berr(false));
            Err(TransportError::Bus)
        } else if sr1.af() {
            self.regs.sr1().modify(|w| w.set_af(false));
            Err(TransportError::Nack)
        } else if sr1.ovr() {
            self.regs.sr1().modify(|w| w.set_ovr(false));
            Err(TransportError::Overrun)
        } else {
            Ok(())
        }
    }

    /// Poll SR1 until `ready` holds, an error flag shows up, or the budget runs out
    fn wait(&self, ready: impl Fn(Sr1) -> bool) -> Result<(), TransportError> {
        for _ in 0..self.config.timeout_polls {
            let sr1 = self.regs.sr1().read();
            self.check_errors(sr1)?;
            if ready(sr1) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(TransportError::Timeout)
    }

    fn arm_stop(&mut self) {
        self.regs.cr1().modify(|w| {
            w.set_ack(false);
            w.set_stop(true);
        });
        self.stop_armed = true;
    }
}

impl I2cTransport for Stm32I2c {
    fn enable(&mut self, speed: SpeedMode) -> Result<(), TransportError> {
        let timing = Timing::compute(self.config.apb1_hz, speed)?;
        let regs = self.regs;

        self.set_clock(true);

        regs.cr1().modify(|w| w.set_pe(false));
        regs.cr1().modify(|w| w.set_swrst(true));
        regs.cr1().modify(|w| w.set_swrst(false));

        regs.cr2().modify(|w| w.set_freq(timing.freq_mhz as u8));
        regs.ccr().write(|w| {
            w.set_ccr(timing.ccr as u16);
            w.set_f_s(if timing.fast { FS::FAST } else { FS::STANDARD });
        });
        regs.trise().write(|w| w.set_trise(timing.trise as u8));

        regs.cr1().modify(|w| {
            w.set_pe(true);
            w.set_ack(true);
        });
        self.stop_armed = false;
        Ok(())
    }

    fn disable(&mut self) {
        self.regs.cr1().modify(|w| w.set_pe(false));
        self.set_clock(false);
        self.stop_armed = false;
    }

    fn start(&mut self) -> Result<(), TransportError> {
        self.stop_armed = false;
        self.regs.cr1().modify(|w| w.set_start(true));
        self.wait(|sr1| sr1.start())
    }

    fn send_address(
        &mut self,
        address: u8,
        direction: Direction,
        single_read: bool,
    ) -> Result<(), TransportError> {
        let single = direction == Direction::Read && single_read;
        if direction == Direction::Read {
            // A lone byte is NACKed, which must be set before ADDR clears
            self.regs.cr1().modify(|w| w.set_ack(!single));
        }
        self.regs
            .dr()
            .write(|w| w.set_dr(direction.address_byte(address)));
        self.wait(|sr1| sr1.addr())?;

        // ADDR clears on an SR1 read followed by an SR2 read
        let _ = self.regs.sr1().read();
        let _ = self.regs.sr2().read();

        if single {
            self.arm_stop();
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.wait(|sr1| sr1.txe())?;
        self.regs.dr().write(|w| w.set_dr(byte));
        self.wait(|sr1| sr1.btf())
    }

    fn read_byte(&mut self, ack: bool) -> Result<u8, TransportError> {
        if ack {
            self.regs.cr1().modify(|w| w.set_ack(true));
        } else if !self.stop_armed {
            // Final byte: NACK it and request STOP before it lands in DR
            self.arm_stop();
        }
        self.wait(|sr1| sr1.rxne())?;
        Ok(self.regs.dr().read().dr())
    }

    fn stop(&mut self) {
        if !self.stop_armed {
            self.regs.cr1().modify(|w| w.set_stop(true));
        }
        self.stop_armed = false;
        self.regs.cr1().modify(|w| w.set_ack(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ram::RamBlock;

    struct Bench {
        i2c: RamBlock,
        rcc: RamBlock,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                i2c: RamBlock::new(),
                rcc: RamBlock::new(),
            }
        }

        fn transport(&mut self, bus: BusId, config: TransportConfig) -> (Stm32I2c, I2c, Rcc) {
            let regs = self.i2c.i2c();
            let rcc = self.rcc.rcc();
            (Stm32I2c::new(bus, regs, rcc, config), regs, rcc)
        }
    }

    fn quick() -> TransportConfig {
        TransportConfig {
            apb1_hz: 16_000_000,
            timeout_polls: 16,
        }
    }

    /// Raise every hand-shake flag so each wait succeeds at once
    fn all_flags(regs: I2c) {
        regs.sr1().write(|w| {
            w.set_start(true);
            w.set_addr(true);
            w.set_txe(true);
            w.set_btf(true);
            w.set_rxne(true);
        });
    }

    #[test]
    fn test_enable_standard() {
        let mut bench = Bench::new();
        let (mut i2c, regs, rcc) = bench.transport(BusId::I2c1, quick());

        i2c.enable(SpeedMode::Standard).unwrap();

        let apb1enr = rcc.apb1enr().read();
        assert!(apb1enr.i2c1en());
        assert!(!apb1enr.i2c2en() && !apb1enr.i2c3en());
        assert_eq!(regs.cr2().read().freq(), 16);
        assert_eq!(regs.ccr().read().ccr(), 80);
        assert!(regs.ccr().read().f_s() == FS::STANDARD);
        assert_eq!(regs.trise().read().trise(), 17);
        assert!(regs.cr1().read().pe());
        assert!(regs.cr1().read().ack());
        assert!(!regs.cr1().read().swrst());
    }

    #[test]
    fn test_enable_fast_on_i2c3() {
        let mut bench = Bench::new();
        let config = TransportConfig {
            apb1_hz: 42_000_000,
            ..quick()
        };
        let (mut i2c, regs, rcc) = bench.transport(BusId::I2c3, config);

        i2c.enable(SpeedMode::Fast).unwrap();

        assert!(rcc.apb1enr().read().i2c3en());
        assert!(!rcc.apb1enr().read().i2c1en());
        assert_eq!(regs.ccr().read().ccr(), 35);
        assert!(regs.ccr().read().f_s() == FS::FAST);
        assert_eq!(regs.trise().read().trise(), 13);
    }

    #[test]
    fn test_enable_bad_clock_touches_nothing() {
        let mut bench = Bench::new();
        let config = TransportConfig {
            apb1_hz: 1_000_000,
            ..quick()
        };
        let (mut i2c, regs, rcc) = bench.transport(BusId::I2c2, config);

        assert_eq!(i2c.enable(SpeedMode::Standard), Err(TransportError::Config));
        assert_eq!(rcc.apb1enr().read().0, 0);
        assert_eq!(regs.cr1().read().0, 0);
    }

    #[test]
    fn test_disable() {
        let mut bench = Bench::new();
        let (mut i2c, regs, rcc) = bench.transport(BusId::I2c2, quick());

        i2c.enable(SpeedMode::Standard).unwrap();
        assert!(rcc.apb1enr().read().i2c2en());
        i2c.disable();
        assert!(!rcc.apb1enr().read().i2c2en());
        assert!(!regs.cr1().read().pe());
    }

    #[test]
    fn test_start_timeout() {
        let mut bench = Bench::new();
        let (mut i2c, regs, _) = bench.transport(BusId::I2c1, quick());

        assert_eq!(i2c.start(), Err(TransportError::Timeout));
        assert!(regs.cr1().read().start());
    }

    #[test]
    fn test_write_sequence() {
        let mut bench = Bench::new();
        let (mut i2c, regs, _) = bench.transport(BusId::I2c1, quick());
        all_flags(regs);

        i2c.start().unwrap();
        i2c.send_address(0x77, Direction::Write, false).unwrap();
        assert_eq!(regs.dr().read().dr(), 0xEE);
        assert!(!regs.cr1().read().stop());
        i2c.write_byte(0xF4).unwrap();
        assert_eq!(regs.dr().read().dr(), 0xF4);
        i2c.stop();
        assert!(regs.cr1().read().stop());
    }

    #[test]
    fn test_single_byte_read_nacks_before_address_clears() {
        let mut bench = Bench::new();
        let (mut i2c, regs, _) = bench.transport(BusId::I2c1, quick());
        i2c.enable(SpeedMode::Standard).unwrap();
        assert!(regs.cr1().read().ack());
        all_flags(regs);

        i2c.start().unwrap();
        i2c.send_address(0x77, Direction::Read, true).unwrap();

        // ADDR has been cleared by now: the lone byte must already be NACKed
        // and the STOP requested
        assert_eq!(regs.dr().read().dr(), 0xEF);
        assert!(!regs.cr1().read().ack());
        assert!(regs.cr1().read().stop());

        // The final read does not touch ACK or STOP again
        regs.cr1().modify(|w| w.set_stop(false));
        regs.dr().write(|w| w.set_dr(0x55));
        assert_eq!(i2c.read_byte(false), Ok(0x55));
        assert!(!regs.cr1().read().stop());
        assert!(!regs.cr1().read().ack());

        // STOP is not requested twice, and ACK is restored for the next transfer
        i2c.stop();
        assert!(!regs.cr1().read().stop());
        assert!(regs.cr1().read().ack());
    }

    #[test]
    fn test_multi_byte_read_acks_after_address() {
        let mut bench = Bench::new();
        let (mut i2c, regs, _) = bench.transport(BusId::I2c1, quick());
        all_flags(regs);

        i2c.start().unwrap();
        i2c.send_address(0x77, Direction::Read, false).unwrap();
        assert!(regs.cr1().read().ack());
        assert!(!regs.cr1().read().stop());
    }

    #[test]
    fn test_address_nack_clears_flag() {
        let mut bench = Bench::new();
        let (mut i2c, regs, _) = bench.transport(BusId::I2c1, quick());

        regs.sr1().write(|w| {
            w.set_start(true);
            w.set_af(true);
        });
        assert_eq!(
            i2c.send_address(0x10, Direction::Write, false),
            Err(TransportError::Nack)
        );
        assert!(!regs.sr1().read().af());
        assert!(regs.sr1().read().start());
    }

    #[test]
    fn test_error_flags() {
        let mut bench = Bench::new();
        let (mut i2c, regs, _) = bench.transport(BusId::I2c1, quick());

        regs.sr1().write(|w| w.set_arlo(true));
        assert_eq!(i2c.start(), Err(TransportError::ArbitrationLost));
        assert!(!regs.sr1().read().arlo());

        regs.sr1().write(|w| w.set_berr(true));
        assert_eq!(i2c.write_byte(0), Err(TransportError::Bus));

        regs.sr1().write(|w| w.set_ovr(true));
        assert_eq!(i2c.read_byte(true), Err(TransportError::Overrun));
    }

    #[test]
    fn test_final_read_arms_stop() {
        let mut bench = Bench::new();
        let (mut i2c, regs, _) = bench.transport(BusId::I2c1, quick());

        regs.sr1().write(|w| w.set_rxne(true));
        regs.dr().write(|w| w.set_dr(0x5A));

        assert_eq!(i2c.read_byte(true), Ok(0x5A));
        assert!(regs.cr1().read().ack());

        assert_eq!(i2c.read_byte(false), Ok(0x5A));
        assert!(!regs.cr1().read().ack());
        assert!(regs.cr1().read().stop());
        assert!(i2c.stop_armed);

        i2c.stop();
        assert!(!i2c.stop_armed);
        assert!(regs.cr1().read().ack());
    }
}
