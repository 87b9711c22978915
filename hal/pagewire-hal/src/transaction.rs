//! Scoped bus transactions
//!
//! [`Transaction`] wraps one start..stop sequence. It borrows the bus
//! mutably for its whole lifetime, so a second transaction cannot begin
//! until the first is gone, and it issues the stop condition when dropped
//! so that every exit path (including `?`) releases the bus.

use crate::bus::{BusError, DeviceAddress, RetryLimit, SerialBus};

/// Progress of a transaction through the bus protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionState {
    /// No start condition issued yet
    Idle,
    /// Start issued, address not (yet) acknowledged
    Started,
    /// Device acknowledged; ready for the next byte
    AddressAcked,
    /// A byte transfer is in progress, or failed part way
    ByteInFlight,
    /// Stop issued; bus released
    Stopped,
}

/// One open start..stop sequence on a [`SerialBus`]
///
/// After a byte is NACKed the transaction refuses further transfers
/// (resuming mid-transfer is unsafe); drop or [`finish`](Self::finish) it
/// and start over.
pub struct Transaction<'a, B: SerialBus + ?Sized> {
    bus: &'a mut B,
    state: TransactionState,
}

impl<'a, B: SerialBus + ?Sized> Transaction<'a, B> {
    /// Start a transaction with a single addressing attempt
    ///
    /// # Errors
    /// [`BusError::AddressNack`] if the device does not answer. The bus is
    /// released before returning.
    pub fn begin(bus: &'a mut B, address: DeviceAddress) -> Result<Self, BusError> {
        let mut tx = Self {
            bus,
            state: TransactionState::Idle,
        };
        tx.state = TransactionState::Started;
        // On error `tx` drops here and issues the stop
        tx.bus.start(address)?;
        tx.state = TransactionState::AddressAcked;
        Ok(tx)
    }

    /// Start a transaction, ack polling a busy device up to `limit`
    ///
    /// # Errors
    /// [`BusError::RetriesExhausted`] if the device never answered.
    pub fn begin_with_retry(
        bus: &'a mut B,
        address: DeviceAddress,
        limit: RetryLimit,
    ) -> Result<Self, BusError> {
        bus.start_with_retry(address, limit)?;
        Ok(Self {
            bus,
            state: TransactionState::AddressAcked,
        })
    }

    /// Current protocol state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Re-address without releasing the bus (write-then-read)
    pub fn repeated_start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        self.ensure_ready()?;
        self.state = TransactionState::Started;
        self.bus.repeated_start(address)?;
        self.state = TransactionState::AddressAcked;
        Ok(())
    }

    /// Send one byte
    pub fn send_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.ensure_ready()?;
        self.state = TransactionState::ByteInFlight;
        self.bus.send_byte(byte)?;
        self.state = TransactionState::AddressAcked;
        Ok(())
    }

    /// Send a run of bytes, stopping at the first NACK
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        for &byte in bytes {
            self.send_byte(byte)?;
        }
        Ok(())
    }

    /// Receive one byte and acknowledge it
    pub fn receive_continue(&mut self) -> Result<u8, BusError> {
        self.ensure_ready()?;
        self.state = TransactionState::ByteInFlight;
        let byte = self.bus.receive_byte_continue()?;
        self.state = TransactionState::AddressAcked;
        Ok(byte)
    }

    /// Receive the last byte of a read and NACK it
    pub fn receive_final(&mut self) -> Result<u8, BusError> {
        self.ensure_ready()?;
        self.state = TransactionState::ByteInFlight;
        let byte = self.bus.receive_byte_final()?;
        self.state = TransactionState::AddressAcked;
        Ok(byte)
    }

    /// Fill `buf`, acknowledging every byte except the last
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        let Some((last, head)) = buf.split_last_mut() else {
            return Ok(());
        };
        for byte in head.iter_mut() {
            *byte = self.receive_continue()?;
        }
        *last = self.receive_final()?;
        Ok(())
    }

    /// Issue the stop condition now
    pub fn finish(mut self) {
        self.release();
    }

    fn ensure_ready(&self) -> Result<(), BusError> {
        match self.state {
            TransactionState::AddressAcked => Ok(()),
            _ => Err(BusError::Bus),
        }
    }

    fn release(&mut self) {
        match self.state {
            TransactionState::Idle | TransactionState::Stopped => {}
            _ => self.bus.stop(),
        }
        self.state = TransactionState::Stopped;
    }
}

impl<B: SerialBus + ?Sized> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        self.release();
    }
}
