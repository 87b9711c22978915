//! 5x7 digit font
//!
//! Just enough glyphs for the counter readout.

use pagewire_display::{FontId, Glyph, GlyphSource};

/// The only font in the table
pub const DIGITS: FontId = FontId(0);

/// Columns per glyph
const WIDTH: u8 = 5;

/// '0'..='9', column-major, LSB on top
const GLYPHS: [[u8; 5]; 10] = [
    [0x3E, 0x51, 0x49, 0x45, 0x3E],
    [0x00, 0x42, 0x7F, 0x40, 0x00],
    [0x42, 0x61, 0x51, 0x49, 0x46],
    [0x21, 0x41, 0x45, 0x4B, 0x31],
    [0x18, 0x14, 0x12, 0x7F, 0x10],
    [0x27, 0x45, 0x45, 0x45, 0x39],
    [0x3C, 0x4A, 0x49, 0x49, 0x30],
    [0x01, 0x71, 0x09, 0x05, 0x03],
    [0x36, 0x49, 0x49, 0x49, 0x36],
    [0x06, 0x49, 0x49, 0x29, 0x1E],
];

const BLANK: [u8; 5] = [0; 5];

pub struct DigitFont;

impl GlyphSource for DigitFont {
    fn glyph(&self, font: FontId, code: u8) -> Option<Glyph<'_>> {
        if font != DIGITS {
            return None;
        }
        let columns = match code {
            b'0'..=b'9' => &GLYPHS[(code - b'0') as usize],
            b' ' => &BLANK,
            _ => return None,
        };
        Some(Glyph {
            width: WIDTH,
            height: 7,
            columns,
        })
    }
}
