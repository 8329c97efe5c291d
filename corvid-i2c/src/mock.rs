//! Test doubles for the transport and pin binder

use std::collections::VecDeque;
use std::vec::Vec;

use corvid_hal::{
    BusId, Direction, I2cTransport, PinAssignment, PinBinder, PinError, SpeedMode,
    TransportError,
};

/// Everything the fake transport was asked to do, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Enable(SpeedMode),
    Disable,
    Start,
    /// Address, direction and whether a single-byte read follows
    Address(u8, Direction, bool),
    Write(u8),
    Read { ack: bool },
    Stop,
}

/// Transport steps that can have a fault injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Enable,
    Start,
    Address,
    Write,
    Read,
}

/// What sits on the bus at the device address
enum Device {
    /// Bytes written are read back in order
    Loopback(VecDeque<u8>),
    /// First written byte sets a register pointer; reads and further writes
    /// auto-increment it
    Registers {
        memory: [u8; 256],
        pointer: u8,
        pointer_pending: bool,
    },
}

pub struct FakeTransport {
    address: u8,
    device: Device,
    events: Vec<Event>,
    faults: Vec<(Step, usize, TransportError)>,
    counts: [usize; 5],
}

impl FakeTransport {
    fn with_device(address: u8, device: Device) -> Self {
        Self {
            address,
            device,
            events: Vec::new(),
            faults: Vec::new(),
            counts: [0; 5],
        }
    }

    pub fn loopback(address: u8) -> Self {
        Self::with_device(address, Device::Loopback(VecDeque::new()))
    }

    pub fn registers(address: u8) -> Self {
        Self::with_device(
            address,
            Device::Registers {
                memory: [0; 256],
                pointer: 0,
                pointer_pending: false,
            },
        )
    }

    /// Queue bytes for a loopback device to return
    pub fn preload(&mut self, bytes: &[u8]) {
        if let Device::Loopback(fifo) = &mut self.device {
            fifo.extend(bytes.iter().copied());
        }
    }

    pub fn memory_mut(&mut self) -> &mut [u8; 256] {
        match &mut self.device {
            Device::Registers { memory, .. } => memory,
            Device::Loopback(_) => panic!("loopback device has no register memory"),
        }
    }

    /// Fail the `occurrence`-th (1-based) call of `step` with `error`
    pub fn fail_at(&mut self, step: Step, occurrence: usize, error: TransportError) {
        self.faults.push((step, occurrence, error));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| f(e)).count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn check(&mut self, step: Step) -> Result<(), TransportError> {
        let n = &mut self.counts[step as usize];
        *n += 1;
        let n = *n;
        match self.faults.iter().find(|(s, at, _)| *s == step && *at == n) {
            Some(&(_, _, error)) => Err(error),
            None => Ok(()),
        }
    }
}

impl I2cTransport for FakeTransport {
    fn enable(&mut self, speed: SpeedMode) -> Result<(), TransportError> {
        self.events.push(Event::Enable(speed));
        self.check(Step::Enable)
    }

    fn disable(&mut self) {
        self.events.push(Event::Disable);
    }

    fn start(&mut self) -> Result<(), TransportError> {
        self.events.push(Event::Start);
        self.check(Step::Start)
    }

    fn send_address(
        &mut self,
        address: u8,
        direction: Direction,
        single_read: bool,
    ) -> Result<(), TransportError> {
        self.events.push(Event::Address(address, direction, single_read));
        self.check(Step::Address)?;
        if address != self.address {
            return Err(TransportError::Nack);
        }
        if let (Device::Registers { pointer_pending, .. }, Direction::Write) =
            (&mut self.device, direction)
        {
            *pointer_pending = true;
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.events.push(Event::Write(byte));
        self.check(Step::Write)?;
        match &mut self.device {
            Device::Loopback(fifo) => fifo.push_back(byte),
            Device::Registers {
                memory,
                pointer,
                pointer_pending,
            } => {
                if *pointer_pending {
                    *pointer = byte;
                    *pointer_pending = false;
                } else {
                    memory[*pointer as usize] = byte;
                    *pointer = pointer.wrapping_add(1);
                }
            }
        }
        Ok(())
    }

    fn read_byte(&mut self, ack: bool) -> Result<u8, TransportError> {
        self.events.push(Event::Read { ack });
        self.check(Step::Read)?;
        let byte = match &mut self.device {
            Device::Loopback(fifo) => fifo.pop_front().unwrap_or(0xFF),
            Device::Registers {
                memory, pointer, ..
            } => {
                let byte = memory[*pointer as usize];
                *pointer = pointer.wrapping_add(1);
                byte
            }
        };
        Ok(byte)
    }

    fn stop(&mut self) {
        self.events.push(Event::Stop);
    }
}

/// Pin binder that records claims and rejects pins another bus holds
#[derive(Default)]
pub struct FakePins {
    pub claims: Vec<(BusId, PinAssignment)>,
    pub fail_with: Option<PinError>,
    pub releases: usize,
}

impl FakePins {
    pub fn is_bound(&self, bus: BusId) -> bool {
        self.claims.iter().any(|(b, _)| *b == bus)
    }
}

impl PinBinder for FakePins {
    fn bind_pins(&mut self, bus: BusId, pins: &PinAssignment) -> Result<(), PinError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        let taken = self.claims.iter().any(|(_, held)| {
            [held.scl, held.sda].contains(&pins.scl) || [held.scl, held.sda].contains(&pins.sda)
        });
        if taken {
            return Err(PinError::AlreadyClaimed);
        }
        self.claims.push((bus, *pins));
        Ok(())
    }

    fn release_pins(&mut self, bus: BusId, _pins: &PinAssignment) {
        self.claims.retain(|(b, _)| *b != bus);
        self.releases += 1;
    }
}
