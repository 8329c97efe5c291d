//! Driver errors and the five-way status taxonomy
//!
//! Operations return `Result<_, Error>`. Every error projects onto exactly
//! one [`Status`], which is what diagnostics and the status reporter keep.

use corvid_hal::{PinError, TransportError};
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Outcome of an operation, as recorded for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Operation completed successfully
    Ok,
    /// A hardware hand-shake step exceeded its time bound
    ErrTimeout,
    /// Unrecoverable bus condition or unusable bus
    ErrBus,
    /// Addressed device or byte was not acknowledged
    ErrNack,
    /// Initialize called on an already-initialized bus
    ErrReinit,
}

impl Status {
    /// Check if this is the success status
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl<T> From<&Result<T, Error>> for Status {
    fn from(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}

/// Where in a transaction a hand-shake failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Start or repeated-start condition
    Start,
    /// Address byte
    Address,
    /// Data phase; holds the number of data bytes transferred before the failure
    Data(usize),
}

/// Bus-level fault detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusFault {
    /// Lost arbitration to another master
    ArbitrationLost,
    /// Misplaced start/stop or unexpected line state
    LineError,
    /// Data register overrun/underrun
    Overrun,
    /// Bus has not been initialized
    NotInitialized,
    /// Bus is faulted and must be reinitialized
    Faulted,
    /// Zero-length transfer requested
    EmptyTransfer,
    /// Address does not fit in 7 bits
    InvalidAddress,
    /// Pins could not be bound during initialization
    PinBinding(PinError),
    /// Clock timing cannot be programmed for the requested speed
    Timing,
}

impl BusFault {
    /// Faults that leave the peripheral untrustworthy and fault the bus
    pub fn is_hardware(self) -> bool {
        matches!(
            self,
            BusFault::ArbitrationLost | BusFault::LineError | BusFault::Overrun
        )
    }
}

/// I2C driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Hand-shake timed out; the bus stays usable
    Timeout(Phase),
    /// Device or byte not acknowledged; the bus stays usable
    Nack(Phase),
    /// Bus-level fault
    Bus(BusFault),
    /// Bus is already initialized
    Reinit,
}

impl Error {
    /// Project onto the status taxonomy
    pub fn status(&self) -> Status {
        match self {
            Error::Timeout(_) => Status::ErrTimeout,
            Error::Nack(_) => Status::ErrNack,
            Error::Bus(_) => Status::ErrBus,
            Error::Reinit => Status::ErrReinit,
        }
    }

    /// Check if the caller may retry immediately
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Nack(_))
    }

    /// Check if this error moves the bus to Faulted
    pub fn faults_bus(&self) -> bool {
        matches!(self, Error::Bus(fault) if fault.is_hardware())
    }

    /// Classify a transport failure that happened during `phase`
    pub fn from_transport(err: TransportError, phase: Phase) -> Self {
        match err {
            TransportError::Timeout => Error::Timeout(phase),
            TransportError::Nack => Error::Nack(phase),
            TransportError::ArbitrationLost => Error::Bus(BusFault::ArbitrationLost),
            TransportError::Bus => Error::Bus(BusFault::LineError),
            TransportError::Overrun => Error::Bus(BusFault::Overrun),
            TransportError::Config => Error::Bus(BusFault::Timing),
        }
    }
}

impl From<PinError> for Error {
    fn from(e: PinError) -> Self {
        Error::Bus(BusFault::PinBinding(e))
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Nack(Phase::Address) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::Nack(Phase::Data(_)) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Error::Nack(Phase::Start) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Error::Bus(BusFault::ArbitrationLost) => ErrorKind::ArbitrationLoss,
            Error::Bus(BusFault::Overrun) => ErrorKind::Overrun,
            Error::Bus(BusFault::LineError) => ErrorKind::Bus,
            _ => ErrorKind::Other,
        }
    }
}
