//! Recording bus double
//!
//! [`MockBus`] implements [`SerialBus`] without hardware. It logs every
//! primitive call as a [`BusEvent`], can be scripted to refuse addresses
//! or data bytes, and counts protocol violations (a start while the bus is
//! still held, byte transfers outside a transaction) so tests can assert
//! that drivers keep the start..stop discipline.

use heapless::Vec;

use crate::bus::{BusError, DeviceAddress, SerialBus};

/// Maximum number of events kept by a [`MockBus`]
pub const EVENT_CAPACITY: usize = 8192;

/// Maximum number of scripted read bytes
pub const READ_CAPACITY: usize = 64;

/// One primitive call observed on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Start condition followed by this addressing byte
    Start(u8),
    /// Repeated start followed by this addressing byte
    RepeatedStart(u8),
    /// Byte transmitted by the master
    Byte(u8),
    /// Byte received by the master, with or without acknowledgement
    Read {
        /// True if the master acknowledged (asked for more)
        ack: bool,
    },
    /// Stop condition
    Stop,
}

/// Scriptable, recording [`SerialBus`]
pub struct MockBus {
    events: Vec<BusEvent, EVENT_CAPACITY>,
    held: bool,
    starts: u32,
    bytes_sent: usize,
    violations: u32,
    nack_addresses: bool,
    busy_starts: u32,
    nack_byte_at: Option<usize>,
    read_data: Vec<u8, READ_CAPACITY>,
    read_pos: usize,
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBus {
    /// Create a bus where every device acknowledges everything
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            held: false,
            starts: 0,
            bytes_sent: 0,
            violations: 0,
            nack_addresses: false,
            busy_starts: 0,
            nack_byte_at: None,
            read_data: Vec::new(),
            read_pos: 0,
        }
    }

    /// Refuse (or stop refusing) every addressing byte
    pub fn nack_addresses(&mut self, nack: bool) {
        self.nack_addresses = nack;
    }

    /// Refuse the next `starts` addressing bytes, then acknowledge
    pub fn busy_for(&mut self, starts: u32) {
        self.busy_starts = starts;
    }

    /// Refuse the data byte with this index (counted over the bus lifetime)
    pub fn nack_byte(&mut self, index: usize) {
        self.nack_byte_at = Some(index);
    }

    /// Bytes returned by subsequent reads; `0xFF` once exhausted
    pub fn set_read_data(&mut self, data: &[u8]) {
        self.read_data.clear();
        // Truncates silently beyond READ_CAPACITY
        let _ = self
            .read_data
            .extend_from_slice(&data[..data.len().min(READ_CAPACITY)]);
        self.read_pos = 0;
    }

    /// Everything recorded so far
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Forget recorded events (scripting and counters are kept)
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Recorded events split into start..stop groups
    pub fn transactions(&self) -> impl Iterator<Item = &[BusEvent]> {
        self.events
            .split_inclusive(|event| *event == BusEvent::Stop)
    }

    /// Every byte transmitted by the master, in order
    pub fn data_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(|event| match event {
            BusEvent::Byte(byte) => Some(*byte),
            _ => None,
        })
    }

    /// Number of start conditions issued (not counting repeated starts)
    pub fn starts(&self) -> u32 {
        self.starts
    }

    /// Bytes transmitted over the bus lifetime, the index space of [`nack_byte`](Self::nack_byte)
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    /// Number of protocol violations seen
    pub fn violations(&self) -> u32 {
        self.violations
    }

    /// True between a start and the matching stop
    pub fn is_held(&self) -> bool {
        self.held
    }

    fn record(&mut self, event: BusEvent) {
        if self.events.push(event).is_err() {
            panic!("MockBus event log full ({} events)", EVENT_CAPACITY);
        }
    }

    fn address_acked(&mut self) -> bool {
        if self.nack_addresses {
            return false;
        }
        if self.busy_starts > 0 {
            self.busy_starts -= 1;
            return false;
        }
        true
    }

    fn next_read(&mut self) -> u8 {
        let byte = self.read_data.get(self.read_pos).copied().unwrap_or(0xFF);
        self.read_pos += 1;
        byte
    }
}

impl SerialBus for MockBus {
    fn start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        if self.held {
            self.violations += 1;
        }
        self.held = true;
        self.starts += 1;
        self.record(BusEvent::Start(address.to_byte()));
        if self.address_acked() {
            Ok(())
        } else {
            Err(BusError::AddressNack)
        }
    }

    fn repeated_start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        if !self.held {
            self.violations += 1;
        }
        self.held = true;
        self.record(BusEvent::RepeatedStart(address.to_byte()));
        if self.address_acked() {
            Ok(())
        } else {
            Err(BusError::AddressNack)
        }
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), BusError> {
        if !self.held {
            self.violations += 1;
        }
        self.record(BusEvent::Byte(byte));
        let index = self.bytes_sent;
        self.bytes_sent += 1;
        if self.nack_byte_at == Some(index) {
            Err(BusError::ByteNack)
        } else {
            Ok(())
        }
    }

    fn receive_byte_continue(&mut self) -> Result<u8, BusError> {
        if !self.held {
            self.violations += 1;
        }
        self.record(BusEvent::Read { ack: true });
        Ok(self.next_read())
    }

    fn receive_byte_final(&mut self) -> Result<u8, BusError> {
        if !self.held {
            self.violations += 1;
        }
        self.record(BusEvent::Read { ack: false });
        Ok(self.next_read())
    }

    fn stop(&mut self) {
        self.held = false;
        self.record(BusEvent::Stop);
    }
}
