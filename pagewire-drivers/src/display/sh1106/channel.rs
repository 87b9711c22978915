//! Command/data framing over the serial bus
//!
//! Every byte sent to the controller is tagged by a control byte. A
//! command transaction interleaves [`CONTROL_COMMAND`] with each command
//! byte; a data transaction sends [`CONTROL_DATA`] once and then only
//! display data. The two are never mixed in one transaction.

use pagewire_hal::{BusError, DeviceAddress, RetryLimit, SerialBus, Transaction};

use super::cmd::{CONTROL_COMMAND, CONTROL_DATA, MAX_SEGMENTS_PER_WRITE};

/// Framed access to one controller on a bus
pub struct CommandChannel<B> {
    bus: B,
    address: DeviceAddress,
}

impl<B: SerialBus> CommandChannel<B> {
    pub fn new(bus: B, address: DeviceAddress) -> Self {
        Self { bus, address }
    }

    /// Write address of the controller
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Address the controller once and release the bus
    pub fn probe(&mut self) -> Result<(), BusError> {
        Transaction::begin(&mut self.bus, self.address)?.finish();
        Ok(())
    }

    /// Ack-poll the controller until it answers, then release the bus
    pub fn wait_ready(&mut self, limit: RetryLimit) -> Result<u32, BusError> {
        let attempts = self.bus.start_with_retry(self.address, limit)?;
        self.bus.stop();
        Ok(attempts)
    }

    /// Send one command byte in its own transaction
    pub fn send_command(&mut self, command: u8) -> Result<(), BusError> {
        self.send_commands(&[command])
    }

    /// Send a run of command (and argument) bytes in one transaction
    pub fn send_commands(&mut self, commands: &[u8]) -> Result<(), BusError> {
        let mut tx = Transaction::begin(&mut self.bus, self.address)?;
        for &command in commands {
            tx.send(&[CONTROL_COMMAND, command])?;
        }
        tx.finish();
        Ok(())
    }

    /// Send one burst of display data in its own transaction
    ///
    /// The controller writes the bytes at its current page/column and
    /// advances the column after each one.
    ///
    /// # Panics
    /// If `data` is longer than [`MAX_SEGMENTS_PER_WRITE`]; the addressing
    /// layer never produces such a burst.
    pub fn send_data_burst(&mut self, data: &[u8]) -> Result<(), BusError> {
        assert!(
            data.len() <= MAX_SEGMENTS_PER_WRITE,
            "data burst of {} bytes exceeds the controller limit",
            data.len()
        );
        if data.is_empty() {
            return Ok(());
        }
        let mut tx = Transaction::begin(&mut self.bus, self.address)?;
        tx.send_byte(CONTROL_DATA)?;
        tx.send(data)?;
        tx.finish();
        #[cfg(feature = "defmt")]
        defmt::trace!("data burst: {} bytes", data.len());
        Ok(())
    }
}
