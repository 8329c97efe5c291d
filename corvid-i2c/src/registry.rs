//! Bus register model
//!
//! One slot per physical bus holding its lifecycle state, active
//! configuration and last recorded status. Lifecycle changes go through
//! [`BusState::transition`] only.

use corvid_hal::{BusId, BUS_COUNT};

use crate::config::BusConfig;
use crate::error::Status;

/// Bus lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    /// Never initialized, or deinitialized
    #[default]
    Uninitialized,
    /// Configured and accepting transactions
    Ready,
    /// Hardware fault seen; reinitialization required
    Faulted,
}

/// Lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Pins bound and timing programmed
    InitSucceeded,
    /// Pin binding or timing programming failed
    InitFailed,
    /// Arbitration loss, line error or overrun during a transaction
    BusFault,
    /// Explicit reset
    Deinit,
}

impl BusState {
    /// Check if transactions are accepted
    pub fn is_ready(&self) -> bool {
        matches!(self, BusState::Ready)
    }

    /// Check if `initialize` may run from this state
    pub fn accepts_init(&self) -> bool {
        !self.is_ready()
    }

    /// Process an event and return the next state
    pub fn transition(self, event: BusEvent) -> Self {
        use BusEvent::*;
        use BusState::*;

        match (self, event) {
            (Uninitialized, InitSucceeded) => Ready,
            (Faulted, InitSucceeded) => Ready,
            (Uninitialized, InitFailed) => Uninitialized,
            (Faulted, InitFailed) => Uninitialized,

            (Ready, BusFault) => Faulted,

            (Ready, Deinit) => Uninitialized,
            (Faulted, Deinit) => Uninitialized,

            // Everything else leaves the state alone; in particular
            // initialize never reconfigures a Ready bus
            _ => self,
        }
    }
}

/// Per-bus record
#[derive(Debug)]
pub struct BusSlot<T> {
    pub(crate) id: BusId,
    pub(crate) state: BusState,
    pub(crate) config: Option<BusConfig>,
    pub(crate) last_status: Option<Status>,
    pub(crate) transport: T,
}

impl<T> BusSlot<T> {
    fn new(id: BusId, transport: T) -> Self {
        Self {
            id,
            state: BusState::Uninitialized,
            config: None,
            last_status: None,
            transport,
        }
    }

    pub fn id(&self) -> BusId {
        self.id
    }

    pub fn state(&self) -> BusState {
        self.state
    }

    /// Configuration in effect; `None` unless the last initialize succeeded
    pub fn config(&self) -> Option<&BusConfig> {
        self.config.as_ref()
    }

    /// Status of the last operation that reached the hardware
    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    pub(crate) fn apply(&mut self, event: BusEvent) {
        self.state = self.state.transition(event);
    }
}

/// Table of all bus slots, indexed by [`BusId::index`]
#[derive(Debug)]
pub struct BusTable<T> {
    slots: [BusSlot<T>; BUS_COUNT],
}

impl<T> BusTable<T> {
    /// All buses start Uninitialized
    pub fn new(transports: [T; BUS_COUNT]) -> Self {
        let [i2c1, i2c2, i2c3] = transports;
        Self {
            slots: [
                BusSlot::new(BusId::I2c1, i2c1),
                BusSlot::new(BusId::I2c2, i2c2),
                BusSlot::new(BusId::I2c3, i2c3),
            ],
        }
    }

    pub fn slot(&self, bus: BusId) -> &BusSlot<T> {
        &self.slots[bus.index()]
    }

    pub fn slot_mut(&mut self, bus: BusId) -> &mut BusSlot<T> {
        &mut self.slots[bus.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &BusSlot<T>> {
        self.slots.iter()
    }

    /// Disjoint mutable borrows of every slot
    pub fn each_mut(&mut self) -> [&mut BusSlot<T>; BUS_COUNT] {
        self.slots.each_mut()
    }
}
