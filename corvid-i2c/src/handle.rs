//! Per-bus handle
//!
//! A [`BusHandle`] borrows one slot of the bus table. Handles for different
//! buses borrow disjoint slots and can be driven independently.

use corvid_hal::{BusId, I2cTransport};
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use crate::engine;
use crate::error::{BusFault, Error, Status};
use crate::registry::{BusEvent, BusSlot, BusState};

/// Highest 7-bit device address
pub const MAX_ADDRESS: u8 = 0x7F;

pub struct BusHandle<'a, T> {
    slot: &'a mut BusSlot<T>,
}

impl<'a, T: I2cTransport> BusHandle<'a, T> {
    pub(crate) fn new(slot: &'a mut BusSlot<T>) -> Self {
        Self { slot }
    }

    pub fn bus(&self) -> BusId {
        self.slot.id
    }

    pub fn state(&self) -> BusState {
        self.slot.state
    }

    /// Write `data` to the device at `address`
    pub fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.admit(address, data.is_empty())?;
        let result = engine::write(&mut self.slot.transport, address, data);
        self.finish(address, result)
    }

    /// Fill `buffer` from the device at `address`
    pub fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.admit(address, buffer.is_empty())?;
        let result = engine::read(&mut self.slot.transport, address, buffer);
        self.finish(address, result)
    }

    /// Read exactly `N` bytes
    pub fn read_array<const N: usize>(&mut self, address: u8) -> Result<[u8; N], Error> {
        let mut buffer = [0u8; N];
        self.read(address, &mut buffer)?;
        Ok(buffer)
    }

    /// Write `data`, then fill `buffer` after a repeated start
    pub fn write_read(&mut self, address: u8, data: &[u8], buffer: &mut [u8]) -> Result<(), Error> {
        self.admit(address, data.is_empty() || buffer.is_empty())?;
        let result = engine::write_read(&mut self.slot.transport, address, data, buffer);
        self.finish(address, result)
    }

    /// Run an arbitrary operation sequence as one transaction
    pub fn execute(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Error> {
        let empty = operations.is_empty()
            || operations.iter().any(|op| match op {
                Operation::Write(bytes) => bytes.is_empty(),
                Operation::Read(buffer) => buffer.is_empty(),
            });
        self.admit(address, empty)?;
        let result = engine::transaction(&mut self.slot.transport, address, operations);
        self.finish(address, result)
    }

    /// Gate and preconditions; a rejection here touches nothing
    fn admit(&self, address: u8, empty: bool) -> Result<(), Error> {
        match self.slot.state {
            BusState::Ready => {}
            BusState::Uninitialized => return Err(Error::Bus(BusFault::NotInitialized)),
            BusState::Faulted => return Err(Error::Bus(BusFault::Faulted)),
        }
        if address > MAX_ADDRESS {
            return Err(Error::Bus(BusFault::InvalidAddress));
        }
        if empty {
            return Err(Error::Bus(BusFault::EmptyTransfer));
        }
        Ok(())
    }

    /// Record the outcome and fault the bus on hardware errors
    fn finish(&mut self, address: u8, result: Result<(), Error>) -> Result<(), Error> {
        self.slot.last_status = Some(Status::from(&result));
        if let Err(e) = result {
            if e.faults_bus() {
                error!("{}: bus fault talking to {=u8:#x}: {}", self.slot.id, address, e);
                self.slot.apply(BusEvent::BusFault);
            } else {
                debug!("{}: {=u8:#x} failed: {}", self.slot.id, address, e);
            }
        }
        result
    }
}

impl<T> ErrorType for BusHandle<'_, T> {
    type Error = Error;
}

impl<T: I2cTransport> I2c<SevenBitAddress> for BusHandle<'_, T> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.execute(address, operations)
    }
}
