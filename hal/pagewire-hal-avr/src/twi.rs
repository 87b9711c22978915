//! Hardware TWI bus master
//!
//! Register-level driver for the AVR two-wire interface. Each primitive
//! writes the control register, spins until the peripheral raises TWINT,
//! then checks the status register against the code expected for that
//! step of the protocol.

use pagewire_hal::{BusConfig, BusError, DeviceAddress, SerialBus};

/// The address of the 2-wire bit rate register
pub const TWBR: *mut u8 = 0x00B8 as *mut u8;

/// The address of the 2-wire status register
pub const TWSR: *mut u8 = 0x00B9 as *mut u8;

/// The address of the 2-wire data register
pub const TWDR: *mut u8 = 0x00BB as *mut u8;

/// The address of the 2-wire control register
pub const TWCR: *mut u8 = 0x00BC as *mut u8;

/// TWCR interrupt flag (set by hardware when an operation completes)
pub const TWINT: u8 = 0x80;

/// TWCR enable acknowledge bit
pub const TWEA: u8 = 0x40;

/// TWCR start condition bit
pub const TWSTA: u8 = 0x20;

/// TWCR stop condition bit
pub const TWSTO: u8 = 0x10;

/// TWCR enable bit
pub const TWEN: u8 = 0x04;

/// TWSR bits holding the status code (the low bits are the prescaler)
const STATUS_MASK: u8 = 0xF8;

/// Master-mode status codes of the 2-wire status register
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiStatus {
    BusError = 0x00,
    StartTransmitted = 0x08,
    RepeatedStartTransmitted = 0x10,
    WriteAddressAcked = 0x18,
    WriteAddressNacked = 0x20,
    DataTransmittedAcked = 0x28,
    DataTransmittedNacked = 0x30,
    ArbitrationLost = 0x38,
    ReadAddressAcked = 0x40,
    ReadAddressNacked = 0x48,
    DataReceivedAcked = 0x50,
    DataReceivedNacked = 0x58,
    NoInformation = 0xF8,
}

impl TwiStatus {
    /// Decode a raw TWSR value
    ///
    /// Prescaler bits are masked off. Returns `None` for slave-mode and
    /// reserved codes.
    pub fn from_register(value: u8) -> Option<Self> {
        match value & STATUS_MASK {
            0x00 => Some(Self::BusError),
            0x08 => Some(Self::StartTransmitted),
            0x10 => Some(Self::RepeatedStartTransmitted),
            0x18 => Some(Self::WriteAddressAcked),
            0x20 => Some(Self::WriteAddressNacked),
            0x28 => Some(Self::DataTransmittedAcked),
            0x30 => Some(Self::DataTransmittedNacked),
            0x38 => Some(Self::ArbitrationLost),
            0x40 => Some(Self::ReadAddressAcked),
            0x48 => Some(Self::ReadAddressNacked),
            0x50 => Some(Self::DataReceivedAcked),
            0x58 => Some(Self::DataReceivedNacked),
            0xF8 => Some(Self::NoInformation),
            _ => None,
        }
    }
}

impl From<TwiStatus> for BusError {
    fn from(status: TwiStatus) -> Self {
        match status {
            TwiStatus::WriteAddressNacked | TwiStatus::ReadAddressNacked => BusError::AddressNack,
            TwiStatus::DataTransmittedNacked => BusError::ByteNack,
            TwiStatus::ArbitrationLost => BusError::ArbitrationLost,
            _ => BusError::Bus,
        }
    }
}

/// TWBR value for the requested SCL rate with a prescaler of 1
///
/// `SCL = F_CPU / (16 + 2 * TWBR)`, saturated to the register range.
pub const fn bit_rate_register(cpu_hz: u32, config: BusConfig) -> u8 {
    let scl_hz = config.frequency_hz();
    if scl_hz == 0 {
        return u8::MAX;
    }
    let divider = cpu_hz / scl_hz;
    if divider <= 16 {
        return 0;
    }
    let twbr = (divider - 16) / 2;
    if twbr > u8::MAX as u32 {
        u8::MAX
    } else {
        twbr as u8
    }
}

/// Hardware 2-wire interface in master mode
pub struct Twi {
    twbr: u8,
}

impl Twi {
    /// Configure the TWI peripheral
    ///
    /// Call once at start-up; the clock rate is fixed from then on.
    pub fn init(cpu_hz: u32, config: BusConfig) -> Self {
        let twi = Self {
            twbr: bit_rate_register(cpu_hz, config),
        };
        // SAFETY: fixed TWI register addresses on supported parts
        unsafe {
            TWSR.write_volatile(0x00);
            TWBR.write_volatile(twi.twbr);
            TWCR.write_volatile(TWEN);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("TWI init: {} kHz, TWBR={}", config.frequency_khz, twi.twbr);
        twi
    }

    /// Bit-rate register value in use
    pub fn twbr(&self) -> u8 {
        self.twbr
    }

    /// Write TWCR and wait for the operation to complete
    fn command(&mut self, control: u8) -> Option<TwiStatus> {
        // SAFETY: fixed TWI register addresses on supported parts
        unsafe {
            TWCR.write_volatile(control);
            while TWCR.read_volatile() & TWINT == 0 {}
            TwiStatus::from_register(TWSR.read_volatile())
        }
    }

    /// Issue (repeated) start and send the addressing byte
    fn address(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        match self.command(TWINT | TWSTA | TWEN) {
            Some(TwiStatus::StartTransmitted | TwiStatus::RepeatedStartTransmitted) => {}
            Some(status) => return Err(status.into()),
            None => return Err(BusError::Bus),
        }

        // SAFETY: fixed TWI register addresses on supported parts
        unsafe {
            TWDR.write_volatile(address.to_byte());
        }
        match self.command(TWINT | TWEN) {
            Some(TwiStatus::WriteAddressAcked | TwiStatus::ReadAddressAcked) => Ok(()),
            Some(status) => Err(status.into()),
            None => Err(BusError::Bus),
        }
    }

    fn receive(&mut self, ack: bool) -> Result<u8, BusError> {
        let (control, expected) = if ack {
            (TWINT | TWEN | TWEA, TwiStatus::DataReceivedAcked)
        } else {
            (TWINT | TWEN, TwiStatus::DataReceivedNacked)
        };
        match self.command(control) {
            // SAFETY: fixed TWI register addresses on supported parts
            Some(status) if status == expected => Ok(unsafe { TWDR.read_volatile() }),
            Some(status) => Err(status.into()),
            None => Err(BusError::Bus),
        }
    }
}

impl SerialBus for Twi {
    fn start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        self.address(address)
    }

    fn repeated_start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        // Same register sequence; the status code tells them apart
        self.address(address)
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), BusError> {
        // SAFETY: fixed TWI register addresses on supported parts
        unsafe {
            TWDR.write_volatile(byte);
        }
        match self.command(TWINT | TWEN) {
            Some(TwiStatus::DataTransmittedAcked) => Ok(()),
            Some(status) => Err(status.into()),
            None => Err(BusError::Bus),
        }
    }

    fn receive_byte_continue(&mut self) -> Result<u8, BusError> {
        self.receive(true)
    }

    fn receive_byte_final(&mut self) -> Result<u8, BusError> {
        self.receive(false)
    }

    fn stop(&mut self) {
        // SAFETY: fixed TWI register addresses on supported parts
        unsafe {
            TWCR.write_volatile(TWINT | TWEN | TWSTO);
            // TWINT is not set after a stop; TWSTO clears once it is on the wire
            while TWCR.read_volatile() & TWSTO != 0 {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_rate_register() {
        // 16 MHz: 100 kHz -> 72, 400 kHz -> 12
        assert_eq!(bit_rate_register(16_000_000, BusConfig::STANDARD), 72);
        assert_eq!(bit_rate_register(16_000_000, BusConfig::FAST), 12);
        // 8 MHz at 400 kHz is right at the edge
        assert_eq!(bit_rate_register(8_000_000, BusConfig::FAST), 2);
    }

    #[test]
    fn test_bit_rate_register_saturates() {
        // Too fast for the CPU clock
        assert_eq!(bit_rate_register(1_000_000, BusConfig::FAST), 0);
        // Slower than a prescaler of 1 can reach
        assert_eq!(
            bit_rate_register(20_000_000, BusConfig { frequency_khz: 10 }),
            u8::MAX
        );
        assert_eq!(
            bit_rate_register(16_000_000, BusConfig { frequency_khz: 0 }),
            u8::MAX
        );
    }

    #[test]
    fn test_status_masks_prescaler() {
        assert_eq!(TwiStatus::from_register(0x08), Some(TwiStatus::StartTransmitted));
        assert_eq!(TwiStatus::from_register(0x0B), Some(TwiStatus::StartTransmitted));
        assert_eq!(TwiStatus::from_register(0x18), Some(TwiStatus::WriteAddressAcked));
        // Slave-mode code
        assert_eq!(TwiStatus::from_register(0x60), None);
    }

    #[test]
    fn test_status_to_bus_error() {
        assert_eq!(BusError::from(TwiStatus::WriteAddressNacked), BusError::AddressNack);
        assert_eq!(BusError::from(TwiStatus::ReadAddressNacked), BusError::AddressNack);
        assert_eq!(BusError::from(TwiStatus::DataTransmittedNacked), BusError::ByteNack);
        assert_eq!(BusError::from(TwiStatus::ArbitrationLost), BusError::ArbitrationLost);
        assert_eq!(BusError::from(TwiStatus::BusError), BusError::Bus);
    }
}
