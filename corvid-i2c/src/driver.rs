//! I2C driver context
//!
//! [`I2cDriver`] owns the bus table and the pin binder. It is the
//! initialization manager and the entry point for transactions by bus id.

use corvid_hal::{BusId, I2cTransport, PinBinder, BUS_COUNT};

use crate::config::BusConfig;
use crate::error::{BusFault, Error, Phase, Status};
use crate::handle::BusHandle;
use crate::registry::{BusEvent, BusSlot, BusState, BusTable};

/// Driver for all I2C buses of the chip
///
/// Independent instances share nothing, so tests can build as many as
/// they need.
pub struct I2cDriver<T, P> {
    pub(crate) table: BusTable<T>,
    pins: P,
}

impl<T: I2cTransport, P: PinBinder> I2cDriver<T, P> {
    /// Create a driver with every bus Uninitialized
    pub fn new(transports: [T; BUS_COUNT], pins: P) -> Self {
        Self {
            table: BusTable::new(transports),
            pins,
        }
    }

    /// Bring a bus up with `config`
    ///
    /// Allowed from Uninitialized, and from Faulted to recover the bus. A
    /// Ready bus is left untouched and `Error::Reinit` is returned. On
    /// failure the bus ends Uninitialized with no pins held.
    pub fn initialize(&mut self, config: BusConfig) -> Result<(), Error> {
        let bus = config.bus;
        let slot = self.table.slot_mut(bus);

        if !slot.state.accepts_init() {
            warn!("{}: already initialized, reinit rejected", bus);
            return Err(Error::Reinit);
        }

        if slot.state == BusState::Faulted {
            info!("{}: recovering from fault", bus);
            teardown(slot, &mut self.pins);
        }

        let result = bring_up(slot, &mut self.pins, &config);
        slot.last_status = Some(Status::from(&result));

        match result {
            Ok(()) => {
                slot.config = Some(config);
                slot.apply(BusEvent::InitSucceeded);
                info!("{}: ready, {}", bus, config.speed);
            }
            Err(e) => {
                slot.config = None;
                slot.apply(BusEvent::InitFailed);
                warn!("{}: init failed: {}", bus, e);
            }
        }
        result
    }

    /// Reset a bus to Uninitialized, releasing its pins
    pub fn deinitialize(&mut self, bus: BusId) -> Result<(), Error> {
        let slot = self.table.slot_mut(bus);
        if slot.state == BusState::Uninitialized {
            return Err(Error::Bus(BusFault::NotInitialized));
        }
        teardown(slot, &mut self.pins);
        slot.last_status = None;
        slot.apply(BusEvent::Deinit);
        info!("{}: deinitialized", bus);
        Ok(())
    }

    /// Current lifecycle state; never has side effects
    pub fn get_init_status(&self, bus: BusId) -> BusState {
        self.table.slot(bus).state
    }

    /// Handle for one bus
    pub fn bus(&mut self, bus: BusId) -> BusHandle<'_, T> {
        BusHandle::new(self.table.slot_mut(bus))
    }

    /// Handles for every bus, in [`BusId::ALL`] order
    pub fn split(&mut self) -> [BusHandle<'_, T>; BUS_COUNT] {
        self.table.each_mut().map(BusHandle::new)
    }

    pub fn write(&mut self, bus: BusId, address: u8, data: &[u8]) -> Result<(), Error> {
        self.bus(bus).write(address, data)
    }

    pub fn read(&mut self, bus: BusId, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.bus(bus).read(address, buffer)
    }

    pub fn read_array<const N: usize>(&mut self, bus: BusId, address: u8) -> Result<[u8; N], Error> {
        self.bus(bus).read_array(address)
    }

    pub fn write_read(
        &mut self,
        bus: BusId,
        address: u8,
        data: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        self.bus(bus).write_read(address, data, buffer)
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }
}

fn bring_up<T: I2cTransport, P: PinBinder>(
    slot: &mut BusSlot<T>,
    pins: &mut P,
    config: &BusConfig,
) -> Result<(), Error> {
    pins.bind_pins(config.bus, &config.pins)?;
    if let Err(e) = slot.transport.enable(config.speed) {
        pins.release_pins(config.bus, &config.pins);
        return Err(Error::from_transport(e, Phase::Start));
    }
    Ok(())
}

fn teardown<T: I2cTransport, P: PinBinder>(slot: &mut BusSlot<T>, pins: &mut P) {
    slot.transport.disable();
    if let Some(old) = slot.config.take() {
        pins.release_pins(slot.id, &old.pins);
    }
}
