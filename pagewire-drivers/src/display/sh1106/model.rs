//! Controller model for tests
//!
//! Replays recorded bus events the way an SH1106 would interpret them, so
//! tests can check what ends up in display memory instead of matching raw
//! byte streams.

use heapless::Vec;
use pagewire_hal::mock::BusEvent;

use super::cmd::{argument_count, op, PAGES, SEGMENTS};

pub struct Panel {
    pub gdram: [[u8; SEGMENTS as usize]; PAGES as usize],
    pub page: u8,
    pub column: u8,
    pub contrast: Option<u8>,
    pub display_on: bool,
    pub inverted: bool,
    pub entire_on: bool,
    /// Command and argument bytes, in order
    pub commands: Vec<u8, 2048>,
    pub data_transactions: usize,
    pub longest_burst: usize,
    /// Data bytes that ran past the last segment
    pub overruns: usize,
    pending: Option<u8>,
}

impl Panel {
    /// Panel with display memory filled with `fill`
    pub fn new(fill: u8) -> Self {
        Self {
            gdram: [[fill; SEGMENTS as usize]; PAGES as usize],
            page: 0,
            column: 0,
            contrast: None,
            display_on: false,
            inverted: false,
            entire_on: false,
            commands: Vec::new(),
            data_transactions: 0,
            longest_burst: 0,
            overruns: 0,
            pending: None,
        }
    }

    /// Apply every transaction addressed to `address_byte`
    pub fn replay(&mut self, events: &[BusEvent], address_byte: u8) {
        for tx in events.split_inclusive(|e| *e == BusEvent::Stop) {
            if tx.first() != Some(&BusEvent::Start(address_byte)) {
                continue;
            }
            let mut bytes: Vec<u8, 128> = Vec::new();
            for event in tx {
                if let BusEvent::Byte(b) = event {
                    bytes.push(*b).unwrap();
                }
            }
            self.transaction(&bytes);
        }
    }

    fn transaction(&mut self, bytes: &[u8]) {
        let mut i = 0;
        let mut data_in_tx = 0;
        while i < bytes.len() {
            let control = bytes[i];
            i += 1;
            let continuation = control & 0x80 != 0;
            let is_data = control & 0x40 != 0;
            let end = if continuation {
                (i + 1).min(bytes.len())
            } else {
                bytes.len()
            };
            for &b in &bytes[i..end] {
                if is_data {
                    self.data(b);
                    data_in_tx += 1;
                } else {
                    self.command(b);
                }
            }
            i = end;
        }
        if data_in_tx > 0 {
            self.data_transactions += 1;
            self.longest_burst = self.longest_burst.max(data_in_tx);
        }
    }

    fn command(&mut self, b: u8) {
        self.commands.push(b).unwrap();
        if let Some(opcode) = self.pending.take() {
            if opcode == op::SET_CONTRAST {
                self.contrast = Some(b);
            }
            return;
        }
        match b {
            0x00..=0x0F => self.column = (self.column & 0xF0) | b,
            0x10..=0x1F => self.column = (self.column & 0x0F) | ((b & 0x0F) << 4),
            0xB0..=0xB7 => self.page = b & 0x07,
            op::DISPLAY_ON => self.display_on = true,
            op::DISPLAY_OFF => self.display_on = false,
            op::INVERT_DISPLAY => self.inverted = true,
            op::NORMAL_DISPLAY => self.inverted = false,
            op::DISPLAY_ALL_ON => self.entire_on = true,
            op::DISPLAY_ALL_ON_RESUME => self.entire_on = false,
            _ if argument_count(b) == 1 => self.pending = Some(b),
            _ => {}
        }
    }

    fn data(&mut self, b: u8) {
        if (self.column as u16) < SEGMENTS {
            self.gdram[self.page as usize][self.column as usize] = b;
        } else {
            self.overruns += 1;
        }
        self.column = self.column.saturating_add(1);
    }
}
