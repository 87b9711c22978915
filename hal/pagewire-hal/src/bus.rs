//! Two-wire serial bus abstractions
//!
//! Provides the bus master primitives (start, repeated start, byte
//! transfer, stop) that chip-specific HALs implement, plus the addressing
//! byte and error types shared by every implementation.

use core::fmt;

/// Data direction carried in the R/W bit of the addressing byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master transmits to the device (R/W = 0)
    Write,
    /// Master receives from the device (R/W = 1)
    Read,
}

impl Direction {
    /// Value of the R/W bit for this direction
    pub const fn bit(self) -> u8 {
        match self {
            Direction::Write => 0,
            Direction::Read => 1,
        }
    }
}

/// 7-bit peripheral address paired with a transfer direction
///
/// The two halves are only ever combined into the addressing byte sent
/// after a start condition. There is no setter for the direction: a new
/// direction means a new `DeviceAddress`, which in turn means a new start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAddress {
    address: u8,
    direction: Direction,
}

impl DeviceAddress {
    /// Largest valid 7-bit address
    pub const MAX: u8 = 0x7F;

    /// Create an address, or `None` if `address` does not fit in 7 bits
    pub const fn new(address: u8, direction: Direction) -> Option<Self> {
        if address > Self::MAX {
            None
        } else {
            Some(Self { address, direction })
        }
    }

    /// Address a device for writing
    ///
    /// # Panics
    /// If `address` does not fit in 7 bits.
    pub const fn write(address: u8) -> Self {
        assert!(address <= Self::MAX, "device address must fit in 7 bits");
        Self {
            address,
            direction: Direction::Write,
        }
    }

    /// Address a device for reading
    ///
    /// # Panics
    /// If `address` does not fit in 7 bits.
    pub const fn read(address: u8) -> Self {
        assert!(address <= Self::MAX, "device address must fit in 7 bits");
        Self {
            address,
            direction: Direction::Read,
        }
    }

    /// The 7-bit device address
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// The transfer direction
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Same device, other direction (for a repeated start)
    pub const fn with_direction(self, direction: Direction) -> Self {
        Self {
            address: self.address,
            direction,
        }
    }

    /// Addressing byte as transmitted: `(address << 1) | R/W`
    pub const fn to_byte(self) -> u8 {
        (self.address << 1) | self.direction.bit()
    }
}

/// Errors reported by bus primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Device did not acknowledge its address (absent, busy or misaddressed)
    AddressNack,
    /// A transmitted byte was not acknowledged
    ByteNack,
    /// Another master won arbitration
    ArbitrationLost,
    /// Illegal start/stop, unexpected controller status, or an operation
    /// outside an open transaction
    Bus,
    /// Ack polling gave up before the device responded
    RetriesExhausted,
}

impl BusError {
    /// True if the device never answered its address
    pub fn is_address_failure(&self) -> bool {
        matches!(self, BusError::AddressNack | BusError::RetriesExhausted)
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BusError::AddressNack => write!(f, "address not acknowledged"),
            BusError::ByteNack => write!(f, "data byte not acknowledged"),
            BusError::ArbitrationLost => write!(f, "bus arbitration lost"),
            BusError::Bus => write!(f, "bus protocol error"),
            BusError::RetriesExhausted => write!(f, "device did not respond to ack polling"),
        }
    }
}

/// Default number of start attempts used when ack polling
pub const DEFAULT_POLL_ATTEMPTS: u32 = 64;

/// Upper bound for [`SerialBus::start_with_retry`]
///
/// Classic ack polling loops forever when a device never answers.
/// `Unbounded` keeps that behaviour for callers that want it; everything
/// else should pass a finite attempt count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RetryLimit {
    /// Poll until the device acknowledges
    Unbounded,
    /// Give up after this many start attempts (0 is treated as 1)
    Attempts(u32),
}

impl Default for RetryLimit {
    fn default() -> Self {
        RetryLimit::Attempts(DEFAULT_POLL_ATTEMPTS)
    }
}

impl RetryLimit {
    /// Check whether `attempts` start attempts use up the limit
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        match self {
            RetryLimit::Unbounded => false,
            RetryLimit::Attempts(max) => attempts >= (*max).max(1),
        }
    }
}

/// Bus configuration
///
/// Consumed once when a bus implementation is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// SCL clock frequency in kHz
    pub frequency_khz: u16,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BusConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency_khz: 100 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency_khz: 400 };

    /// SCL clock frequency in Hz
    pub const fn frequency_hz(&self) -> u32 {
        self.frequency_khz as u32 * 1000
    }

    /// Duration of half an SCL period in nanoseconds (at least 1)
    pub const fn half_period_ns(&self) -> u32 {
        let khz = if self.frequency_khz == 0 {
            1
        } else {
            self.frequency_khz as u32
        };
        let ns = 500_000 / khz;
        if ns == 0 {
            1
        } else {
            ns
        }
    }
}

/// Two-wire bus master
///
/// A transaction runs from [`start`](Self::start) to [`stop`](Self::stop).
/// Only one transaction may be open at a time and every started
/// transaction must be stopped, including after a failed `start`: the
/// master still holds the bus at that point. [`Transaction`] enforces
/// both rules through borrowing and `Drop`.
///
/// Failures are reported, not retried. The one exception is
/// [`start_with_retry`](Self::start_with_retry), which exists to retry.
///
/// [`Transaction`]: crate::transaction::Transaction
pub trait SerialBus {
    /// Issue a start condition and transmit the addressing byte
    ///
    /// Returns [`BusError::AddressNack`] if the device does not acknowledge.
    fn start(&mut self, address: DeviceAddress) -> Result<(), BusError>;

    /// Issue a start condition without a preceding stop
    ///
    /// Used for write-then-read sequences. Same contract as `start`.
    fn repeated_start(&mut self, address: DeviceAddress) -> Result<(), BusError>;

    /// Transmit one byte
    ///
    /// Returns [`BusError::ByteNack`] if the peer does not acknowledge.
    fn send_byte(&mut self, byte: u8) -> Result<(), BusError>;

    /// Receive one byte and acknowledge it, asking the peer for more
    fn receive_byte_continue(&mut self) -> Result<u8, BusError>;

    /// Receive one byte and NACK it, telling the peer the transfer is over
    fn receive_byte_final(&mut self) -> Result<u8, BusError>;

    /// Issue a stop condition and release the bus
    fn stop(&mut self);

    /// Start with ack polling
    ///
    /// Repeats `start` (releasing the bus between attempts) until the
    /// device acknowledges or `limit` runs out. Returns the number of
    /// attempts taken. On error the bus has already been released.
    ///
    /// Unlike plain ack polling this takes a bound; pass
    /// [`RetryLimit::Unbounded`] for the wait-forever behaviour.
    fn start_with_retry(
        &mut self,
        address: DeviceAddress,
        limit: RetryLimit,
    ) -> Result<u32, BusError> {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match self.start(address) {
                Ok(()) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!(
                        "device {=u8:#x} ready after {} polls",
                        address.address(),
                        attempts
                    );
                    return Ok(attempts);
                }
                Err(_e) => {
                    self.stop();
                    if limit.is_exhausted(attempts) {
                        #[cfg(feature = "defmt")]
                        defmt::warn!(
                            "device {=u8:#x} still busy after {} polls: {}",
                            address.address(),
                            attempts,
                            _e
                        );
                        return Err(BusError::RetriesExhausted);
                    }
                }
            }
        }
    }
}

impl<T: SerialBus + ?Sized> SerialBus for &mut T {
    fn start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        T::start(self, address)
    }

    fn repeated_start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        T::repeated_start(self, address)
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), BusError> {
        T::send_byte(self, byte)
    }

    fn receive_byte_continue(&mut self) -> Result<u8, BusError> {
        T::receive_byte_continue(self)
    }

    fn receive_byte_final(&mut self) -> Result<u8, BusError> {
        T::receive_byte_final(self)
    }

    fn stop(&mut self) {
        T::stop(self)
    }

    fn start_with_retry(
        &mut self,
        address: DeviceAddress,
        limit: RetryLimit,
    ) -> Result<u32, BusError> {
        T::start_with_retry(self, address, limit)
    }
}
