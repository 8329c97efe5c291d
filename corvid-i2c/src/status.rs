//! Status reporter
//!
//! Read-only diagnostics over the bus table.

use corvid_hal::{BusId, I2cTransport, PinBinder, BUS_COUNT};

use crate::config::BusConfig;
use crate::driver::I2cDriver;
use crate::error::Status;
use crate::registry::BusState;

/// Snapshot of one bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusReport {
    pub bus: BusId,
    pub state: BusState,
    pub config: Option<BusConfig>,
    /// Outcome of the last operation that reached the hardware
    pub last_status: Option<Status>,
}

impl<T: I2cTransport, P: PinBinder> I2cDriver<T, P> {
    pub fn report(&self, bus: BusId) -> BusReport {
        let slot = self.table.slot(bus);
        BusReport {
            bus,
            state: slot.state(),
            config: slot.config().copied(),
            last_status: slot.last_status(),
        }
    }

    pub fn reports(&self) -> [BusReport; BUS_COUNT] {
        BusId::ALL.map(|bus| self.report(bus))
    }

    /// Bitmask of Ready buses, bit n set for the bus with index n
    pub fn init_mask(&self) -> u8 {
        self.table
            .iter()
            .filter(|slot| slot.state().is_ready())
            .fold(0, |mask, slot| mask | slot.id().mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BusFault, Error};
    use crate::mock::{FakePins, FakeTransport, Step};
    use corvid_hal::{SpeedMode, TransportError};

    fn driver() -> I2cDriver<FakeTransport, FakePins> {
        I2cDriver::new(
            [
                FakeTransport::loopback(0x10),
                FakeTransport::loopback(0x10),
                FakeTransport::loopback(0x10),
            ],
            FakePins::default(),
        )
    }

    #[test]
    fn test_fresh_reports() {
        let d = driver();
        for (report, bus) in d.reports().iter().zip(BusId::ALL) {
            assert_eq!(report.bus, bus);
            assert_eq!(report.state, BusState::Uninitialized);
            assert_eq!(report.config, None);
            assert_eq!(report.last_status, None);
        }
        assert_eq!(d.init_mask(), 0);
    }

    #[test]
    fn test_init_mask() {
        let mut d = driver();
        d.initialize(BusConfig::new(BusId::I2c1, SpeedMode::Standard))
            .unwrap();
        d.initialize(BusConfig::new(BusId::I2c3, SpeedMode::Fast))
            .unwrap();
        assert_eq!(d.init_mask(), 0b101);

        d.table
            .slot_mut(BusId::I2c3)
            .transport
            .fail_at(Step::Start, 1, TransportError::Bus);
        let _ = d.write(BusId::I2c3, 0x10, &[0]);
        assert_eq!(d.init_mask(), 0b001);
    }

    #[test]
    fn test_report_tracks_last_status() {
        let mut d = driver();
        let config = BusConfig::new(BusId::I2c2, SpeedMode::Fast);
        d.initialize(config).unwrap();

        let _ = d.write(BusId::I2c2, 0x11, &[0]);
        let report = d.report(BusId::I2c2);
        assert_eq!(report.state, BusState::Ready);
        assert_eq!(report.config, Some(config));
        assert_eq!(report.last_status, Some(Status::ErrNack));

        // Precondition rejections are not recorded
        assert_eq!(
            d.write(BusId::I2c2, 0x10, &[]),
            Err(Error::Bus(BusFault::EmptyTransfer))
        );
        assert_eq!(d.report(BusId::I2c2).last_status, Some(Status::ErrNack));

        // Neither is a rejected reinit
        assert_eq!(d.initialize(config), Err(Error::Reinit));
        assert_eq!(d.report(BusId::I2c2).last_status, Some(Status::ErrNack));
    }
}
