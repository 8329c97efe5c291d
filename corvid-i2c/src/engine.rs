//! Transaction engine
//!
//! Drives an [`I2cTransport`] through the framing of one bus transaction:
//! start, address, data and stop, with a repeated start wherever the
//! direction changes. Callers check the bus state and preconditions first;
//! every operation handed to [`transaction`] must be non-empty.

use corvid_hal::{Direction, I2cTransport};
use embedded_hal::i2c::Operation;

use crate::error::{BusFault, Error, Phase};

/// Run `operations` against `address` as a single transaction
///
/// Adjacent operations in the same direction share one address phase.
/// Received bytes are acknowledged except the last byte of each read run;
/// a run of exactly one byte is announced to the transport at its address
/// phase.
/// A stop is issued at the end and after any failure, except when
/// arbitration was lost and the bus belongs to another master.
pub fn transaction<T: I2cTransport>(
    transport: &mut T,
    address: u8,
    operations: &mut [Operation<'_>],
) -> Result<(), Error> {
    match run(transport, address, operations) {
        Ok(()) => {
            transport.stop();
            Ok(())
        }
        Err(e) => {
            if e != Error::Bus(BusFault::ArbitrationLost) {
                transport.stop();
            }
            Err(e)
        }
    }
}

fn run<T: I2cTransport>(
    transport: &mut T,
    address: u8,
    operations: &mut [Operation<'_>],
) -> Result<(), Error> {
    let mut transferred = 0usize;
    let mut current: Option<Direction> = None;
    let count = operations.len();

    for i in 0..count {
        let direction = direction_of(&operations[i]);
        // The last read byte before a direction change or the end is NACKed
        let run_ends = i + 1 == count || direction_of(&operations[i + 1]) != direction;

        if current != Some(direction) {
            if current.is_some() {
                trace!("i2c: repeated start to {=u8:#x}", address);
            }
            transport
                .start()
                .map_err(|e| Error::from_transport(e, Phase::Start))?;
            let single_read = direction == Direction::Read && run_len(operations, i) == 1;
            transport
                .send_address(address, direction, single_read)
                .map_err(|e| Error::from_transport(e, Phase::Address))?;
            current = Some(direction);
        }

        match &mut operations[i] {
            Operation::Write(bytes) => {
                for &byte in bytes.iter() {
                    transport
                        .write_byte(byte)
                        .map_err(|e| Error::from_transport(e, Phase::Data(transferred)))?;
                    transferred += 1;
                }
            }
            Operation::Read(buffer) => {
                let last = buffer.len().saturating_sub(1);
                for (j, slot) in buffer.iter_mut().enumerate() {
                    let ack = !(run_ends && j == last);
                    *slot = transport
                        .read_byte(ack)
                        .map_err(|e| Error::from_transport(e, Phase::Data(transferred)))?;
                    transferred += 1;
                }
            }
        }
    }
    Ok(())
}

fn direction_of(operation: &Operation<'_>) -> Direction {
    match operation {
        Operation::Write(_) => Direction::Write,
        Operation::Read(_) => Direction::Read,
    }
}

fn len_of(operation: &Operation<'_>) -> usize {
    match operation {
        Operation::Write(bytes) => bytes.len(),
        Operation::Read(buffer) => buffer.len(),
    }
}

/// Bytes in the run of same-direction operations starting at `start`
fn run_len(operations: &[Operation<'_>], start: usize) -> usize {
    let direction = direction_of(&operations[start]);
    operations[start..]
        .iter()
        .take_while(|op| direction_of(op) == direction)
        .map(len_of)
        .sum()
}

/// Start, address with write, every byte of `data`, stop
pub fn write<T: I2cTransport>(transport: &mut T, address: u8, data: &[u8]) -> Result<(), Error> {
    transaction(transport, address, &mut [Operation::Write(data)])
}

/// Start, address with read, fill `buffer`, stop
pub fn read<T: I2cTransport>(
    transport: &mut T,
    address: u8,
    buffer: &mut [u8],
) -> Result<(), Error> {
    transaction(transport, address, &mut [Operation::Read(buffer)])
}

/// Write then read with a repeated start and no stop in between
pub fn write_read<T: I2cTransport>(
    transport: &mut T,
    address: u8,
    data: &[u8],
    buffer: &mut [u8],
) -> Result<(), Error> {
    transaction(
        transport,
        address,
        &mut [Operation::Write(data), Operation::Read(buffer)],
    )
}
