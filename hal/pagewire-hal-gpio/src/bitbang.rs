//! Bit-banged bus master
//!
//! Timing is derived from [`BusConfig`]: each SCL phase lasts half a clock
//! period. Data changes only while SCL is low, except for the start and
//! stop conditions, which are SDA edges while SCL is high.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use pagewire_hal::{BusConfig, BusError, DeviceAddress, SerialBus};

/// Two-wire bus master on two GPIO pins
pub struct BitBangBus<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    half_period_ns: u32,
    /// Last level driven on SCL; the pins start released
    scl_high: bool,
    /// True between a start and the next stop
    held: bool,
}

impl<SCL, SDA, D> BitBangBus<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    /// Create a bus master
    ///
    /// No pin is touched until the first start condition.
    pub fn new(scl: SCL, sda: SDA, delay: D, config: BusConfig) -> Self {
        Self {
            scl,
            sda,
            delay,
            half_period_ns: config.half_period_ns(),
            scl_high: true,
            held: false,
        }
    }

    /// Give the pins and delay back
    pub fn release(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    fn half(&mut self) {
        self.delay.delay_ns(self.half_period_ns);
    }

    fn scl(&mut self, high: bool) -> Result<(), BusError> {
        self.scl_high = high;
        if high {
            self.scl.set_high().map_err(|_| BusError::Bus)
        } else {
            self.scl.set_low().map_err(|_| BusError::Bus)
        }
    }

    fn sda(&mut self, high: bool) -> Result<(), BusError> {
        if high {
            self.sda.set_high().map_err(|_| BusError::Bus)
        } else {
            self.sda.set_low().map_err(|_| BusError::Bus)
        }
    }

    fn sda_is_high(&mut self) -> Result<bool, BusError> {
        self.sda.is_high().map_err(|_| BusError::Bus)
    }

    /// Start condition: SDA falls while SCL is high
    fn start_condition(&mut self) -> Result<(), BusError> {
        if self.held {
            // Repeated start: release SDA first, with SCL still low
            self.sda(true)?;
            self.half();
        }
        self.scl(true)?;
        self.half();
        if !self.sda_is_high()? {
            // Someone else is holding the data line
            return Err(BusError::ArbitrationLost);
        }
        self.sda(false)?;
        self.half();
        self.scl(false)?;
        self.held = true;
        Ok(())
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), BusError> {
        self.sda(bit)?;
        self.half();
        self.scl(true)?;
        self.half();
        if bit && !self.sda_is_high()? {
            self.scl(false)?;
            return Err(BusError::ArbitrationLost);
        }
        self.scl(false)
    }

    fn read_bit(&mut self) -> Result<bool, BusError> {
        self.sda(true)?;
        self.half();
        self.scl(true)?;
        self.half();
        let bit = self.sda_is_high()?;
        self.scl(false)?;
        Ok(bit)
    }

    /// Clock out a byte MSB first; returns true if the peer acknowledged
    fn write_byte(&mut self, byte: u8) -> Result<bool, BusError> {
        for shift in (0..8).rev() {
            self.write_bit(byte & (1 << shift) != 0)?;
        }
        // Acknowledge is the peer pulling SDA low on the ninth clock
        Ok(!self.read_bit()?)
    }

    fn read_byte(&mut self, ack: bool) -> Result<u8, BusError> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit()?);
        }
        self.write_bit(!ack)?;
        Ok(byte)
    }

    fn address(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        self.start_condition()?;
        if self.write_byte(address.to_byte())? {
            Ok(())
        } else {
            Err(BusError::AddressNack)
        }
    }
}

impl<SCL, SDA, D> SerialBus for BitBangBus<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    fn start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        if self.held {
            return Err(BusError::Bus);
        }
        self.address(address)
    }

    fn repeated_start(&mut self, address: DeviceAddress) -> Result<(), BusError> {
        if !self.held {
            return Err(BusError::Bus);
        }
        self.address(address)
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), BusError> {
        if self.write_byte(byte)? {
            Ok(())
        } else {
            Err(BusError::ByteNack)
        }
    }

    fn receive_byte_continue(&mut self) -> Result<u8, BusError> {
        self.read_byte(true)
    }

    fn receive_byte_final(&mut self) -> Result<u8, BusError> {
        self.read_byte(false)
    }

    fn stop(&mut self) {
        // Stop condition: SDA rises while SCL is high. Pin errors are
        // ignored here; the bus is considered released either way.
        if self.scl_high {
            // Left high by a lost start; SDA may only fall with SCL low
            let _ = self.scl(false);
            self.half();
        }
        let _ = self.sda(false);
        self.half();
        let _ = self.scl(true);
        self.half();
        let _ = self.sda(true);
        self.half();
        self.held = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use pagewire_hal::Direction;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Seen {
        Start,
        Byte(u8),
        Stop,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        Idle,
        Receiving,
        AckSlot,
        Sending,
        MasterAck,
    }

    /// Minimal bus slave, clocked by the master's pin changes
    struct Slave {
        scl: bool,
        sda_master: bool,
        drive_low: bool,
        address: u8,
        ack_data: bool,
        phase: Phase,
        shift: u8,
        bits: u8,
        first_byte: bool,
        reading: bool,
        tx_byte: u8,
        master_acked: bool,
        seen: heapless::Vec<Seen, 64>,
    }

    impl Slave {
        fn new(address: u8) -> Self {
            Self {
                scl: true,
                sda_master: true,
                drive_low: false,
                address,
                ack_data: true,
                phase: Phase::Idle,
                shift: 0,
                bits: 0,
                first_byte: false,
                reading: false,
                tx_byte: 0xA5,
                master_acked: false,
                seen: heapless::Vec::new(),
            }
        }

        fn line(&self) -> bool {
            self.sda_master && !self.drive_low
        }

        fn set_sda(&mut self, high: bool) {
            let before = self.line();
            self.sda_master = high;
            let after = self.line();
            if self.scl && before != after {
                if after {
                    self.phase = Phase::Idle;
                    self.drive_low = false;
                    self.seen.push(Seen::Stop).unwrap();
                } else {
                    self.phase = Phase::Receiving;
                    self.bits = 0;
                    self.first_byte = true;
                    self.seen.push(Seen::Start).unwrap();
                }
            }
        }

        fn set_scl(&mut self, high: bool) {
            let rising = high && !self.scl;
            let falling = !high && self.scl;
            self.scl = high;
            if rising {
                match self.phase {
                    Phase::Receiving => {
                        self.shift = (self.shift << 1) | u8::from(self.line());
                        self.bits += 1;
                    }
                    Phase::MasterAck => self.master_acked = !self.line(),
                    _ => {}
                }
            }
            if falling {
                self.on_falling_edge();
            }
        }

        fn on_falling_edge(&mut self) {
            match self.phase {
                Phase::Receiving if self.bits == 8 => {
                    let byte = self.shift;
                    self.seen.push(Seen::Byte(byte)).unwrap();
                    let ack = if self.first_byte {
                        self.reading = byte & 1 == 1;
                        byte >> 1 == self.address
                    } else {
                        self.ack_data
                    };
                    self.first_byte = false;
                    self.drive_low = ack;
                    self.phase = if ack { Phase::AckSlot } else { Phase::Idle };
                }
                Phase::AckSlot => {
                    self.drive_low = false;
                    self.bits = 0;
                    if self.reading {
                        self.phase = Phase::Sending;
                        self.send_next_bit();
                    } else {
                        self.phase = Phase::Receiving;
                    }
                }
                Phase::Sending => {
                    if self.bits == 8 {
                        self.drive_low = false;
                        self.phase = Phase::MasterAck;
                    } else {
                        self.send_next_bit();
                    }
                }
                Phase::MasterAck => {
                    if self.master_acked {
                        self.tx_byte = self.tx_byte.wrapping_add(1);
                        self.bits = 0;
                        self.phase = Phase::Sending;
                        self.send_next_bit();
                    } else {
                        self.phase = Phase::Idle;
                    }
                }
                _ => {}
            }
        }

        fn send_next_bit(&mut self) {
            let bit = self.tx_byte & (0x80 >> self.bits) != 0;
            self.drive_low = !bit;
            self.bits += 1;
        }
    }

    struct Scl<'a>(&'a RefCell<Slave>);
    struct Sda<'a>(&'a RefCell<Slave>);
    struct NoDelay(u64);

    impl ErrorType for Scl<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Scl<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_scl(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_scl(true);
            Ok(())
        }
    }

    impl ErrorType for Sda<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Sda<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_sda(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_sda(true);
            Ok(())
        }
    }

    impl InputPin for Sda<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.borrow().line())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.borrow().line())
        }
    }

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0 += u64::from(ns);
        }
    }

    fn bus(slave: &RefCell<Slave>) -> BitBangBus<Scl<'_>, Sda<'_>, NoDelay> {
        BitBangBus::new(Scl(slave), Sda(slave), NoDelay(0), BusConfig::FAST)
    }

    #[test]
    fn test_write_transaction_on_the_wire() {
        let slave = RefCell::new(Slave::new(0x3C));
        let mut bus = bus(&slave);

        bus.start(DeviceAddress::write(0x3C)).unwrap();
        bus.send_byte(0x80).unwrap();
        bus.send_byte(0xAF).unwrap();
        bus.stop();

        assert_eq!(
            slave.borrow().seen.as_slice(),
            &[
                Seen::Start,
                Seen::Byte(0x78),
                Seen::Byte(0x80),
                Seen::Byte(0xAF),
                Seen::Stop,
            ]
        );
        // Lines released afterwards
        assert!(slave.borrow().scl);
        assert!(slave.borrow().line());
    }

    #[test]
    fn test_wrong_address_is_nacked() {
        let slave = RefCell::new(Slave::new(0x3D));
        let mut bus = bus(&slave);

        assert_eq!(bus.start(DeviceAddress::write(0x3C)), Err(BusError::AddressNack));
        bus.stop();

        // Bus can be started again after the stop
        assert_eq!(bus.start(DeviceAddress::write(0x3D)), Ok(()));
        bus.stop();
    }

    #[test]
    fn test_data_nack() {
        let slave = RefCell::new(Slave::new(0x3C));
        slave.borrow_mut().ack_data = false;
        let mut bus = bus(&slave);

        bus.start(DeviceAddress::write(0x3C)).unwrap();
        assert_eq!(bus.send_byte(0x40), Err(BusError::ByteNack));
        bus.stop();
    }

    #[test]
    fn test_write_then_read() {
        let slave = RefCell::new(Slave::new(0x3C));
        let mut bus = bus(&slave);

        bus.start(DeviceAddress::write(0x3C)).unwrap();
        bus.send_byte(0x00).unwrap();
        bus.repeated_start(DeviceAddress::write(0x3C).with_direction(Direction::Read))
            .unwrap();
        let first = bus.receive_byte_continue().unwrap();
        let second = bus.receive_byte_final().unwrap();
        bus.stop();

        assert_eq!(first, 0xA5);
        assert_eq!(second, 0xA6);
        let slave = slave.borrow();
        assert_eq!(slave.seen.iter().filter(|s| **s == Seen::Start).count(), 2);
        assert_eq!(slave.seen.last(), Some(&Seen::Stop));
    }

    #[test]
    fn test_start_while_held_is_rejected() {
        let slave = RefCell::new(Slave::new(0x3C));
        let mut bus = bus(&slave);

        bus.start(DeviceAddress::write(0x3C)).unwrap();
        assert_eq!(bus.start(DeviceAddress::write(0x3C)), Err(BusError::Bus));
        bus.stop();
        assert_eq!(bus.repeated_start(DeviceAddress::write(0x3C)), Err(BusError::Bus));
    }

    #[test]
    fn test_stop_after_lost_start_sends_no_start() {
        let slave = RefCell::new(Slave::new(0x3C));
        let mut bus = bus(&slave);

        // Another master holds SDA low
        slave.borrow_mut().drive_low = true;
        assert_eq!(bus.start(DeviceAddress::write(0x3C)), Err(BusError::ArbitrationLost));
        assert!(slave.borrow().seen.is_empty());

        slave.borrow_mut().drive_low = false;
        bus.stop();

        assert_eq!(slave.borrow().seen.as_slice(), &[Seen::Stop]);
        assert!(slave.borrow().scl);
        assert!(slave.borrow().line());

        // Usable again afterwards
        assert_eq!(bus.start(DeviceAddress::write(0x3C)), Ok(()));
        bus.stop();
    }

    #[test]
    fn test_clock_timing_follows_config() {
        let slave = RefCell::new(Slave::new(0x3C));
        let mut bus = bus(&slave);

        bus.start(DeviceAddress::write(0x3C)).unwrap();
        bus.stop();

        let (_, _, delay) = bus.release();
        // 2 (start) + 9 bits * 2 + 3 (stop) half periods at 400 kHz
        assert_eq!(delay.0, 23 * 1_250);
    }
}
