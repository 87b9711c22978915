//! SH1106 command set and memory geometry

/// Control byte: one command byte follows, then another control byte
pub const CONTROL_COMMAND: u8 = 0x80;
/// Control byte: every following byte in the transaction is display data
pub const CONTROL_DATA: u8 = 0x40;

/// Most data bytes sent in one burst
pub const MAX_SEGMENTS_PER_WRITE: usize = 16;
/// Physical columns (segments) in display memory
pub const SEGMENTS: u16 = 132;
/// Highest physical column address
pub const MAX_SEGMENT: u16 = SEGMENTS - 1;
/// Pages of display memory
pub const PAGES: u16 = 8;
/// Pixel rows per page
pub const PAGE_HEIGHT: u16 = 8;
/// Visible width in pixels
pub const WIDTH: u16 = 128;
/// Visible height in pixels
pub const HEIGHT: u16 = 64;

/// SH1106 opcodes
pub mod op {
    /// Contrast; one argument byte follows
    pub const SET_CONTRAST: u8 = 0x81;
    /// Show display memory (leave entire-display-on mode)
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    /// Light every pixel regardless of memory
    pub const DISPLAY_ALL_ON: u8 = 0xA5;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERT_DISPLAY: u8 = 0xA7;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    /// Vertical shift; one argument byte follows
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    /// COM pin hardware layout; one argument byte follows
    pub const SET_COM_PINS: u8 = 0xDA;
    /// VCOM deselect level; one argument byte follows
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    /// Clock divider and oscillator frequency; one argument byte follows
    pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
    /// Pre-charge period; one argument byte follows
    pub const SET_PRECHARGE: u8 = 0xD9;
    /// Multiplex ratio; one argument byte follows
    pub const SET_MULTIPLEX: u8 = 0xA8;
    /// Lower column nibble in bits 0..4
    pub const SET_COLUMN_ADDR_LOW: u8 = 0x00;
    /// Upper column nibble in bits 0..4
    pub const SET_COLUMN_ADDR_HIGH: u8 = 0x10;
    /// Display start line in bits 0..6
    pub const SET_START_LINE: u8 = 0x40;
    pub const MEMORY_MODE: u8 = 0x20;
    /// Page address in bits 0..3
    pub const PAGE_ADDR: u8 = 0xB0;
    pub const COM_SCAN_INC: u8 = 0xC0;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    /// Segment remap; bit 0 mirrors columns
    pub const SEG_REMAP: u8 = 0xA0;
    /// Charge pump; one argument byte follows
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const EXTERNAL_VCC: u8 = 0x01;
    pub const SWITCH_CAP_VCC: u8 = 0x02;
}

/// Page select command
pub const fn page_address(page: u8) -> u8 {
    op::PAGE_ADDR | (page & 0x07)
}

/// Column select commands (low nibble, high nibble)
pub const fn column_address(column: u8) -> [u8; 2] {
    [
        op::SET_COLUMN_ADDR_LOW | (column & 0x0F),
        op::SET_COLUMN_ADDR_HIGH | (column >> 4),
    ]
}

/// Start line command
pub const fn start_line(line: u8) -> u8 {
    op::SET_START_LINE | (line & 0x3F)
}

/// Number of argument bytes that follow `opcode`
///
/// Used when walking a command stream.
pub const fn argument_count(opcode: u8) -> usize {
    match opcode {
        op::SET_CONTRAST
        | op::SET_DISPLAY_OFFSET
        | op::SET_COM_PINS
        | op::SET_VCOM_DETECT
        | op::SET_DISPLAY_CLOCK_DIV
        | op::SET_PRECHARGE
        | op::SET_MULTIPLEX
        | op::CHARGE_PUMP => 1,
        _ => 0,
    }
}
