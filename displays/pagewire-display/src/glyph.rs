//! Glyph lookup capability
//!
//! Font tables live with whoever implements [`GlyphSource`]; drawing code
//! only asks for a glyph by font and character code.

/// Font identifier understood by a [`GlyphSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FontId(pub u8);

/// One rendered character
///
/// `columns` is column-major: each column is `height.div_ceil(8)` bytes,
/// the first byte covering the top eight rows with its LSB on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph<'a> {
    pub width: u8,
    pub height: u8,
    pub columns: &'a [u8],
}

impl Glyph<'_> {
    /// Bytes per glyph column
    pub const fn bytes_per_column(&self) -> usize {
        (self.height as usize).div_ceil(8)
    }

    /// Pixel at (x, y) of the glyph; missing data reads as unlit
    pub fn pixel(&self, x: u8, y: u8) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = x as usize * self.bytes_per_column() + (y / 8) as usize;
        self.columns
            .get(index)
            .is_some_and(|byte| byte & (1 << (y % 8)) != 0)
    }
}

/// Source of glyph bitmaps, keyed by font and character code
pub trait GlyphSource {
    /// Glyph for `code` in `font`, or `None` if the font has no such glyph
    fn glyph(&self, font: FontId, code: u8) -> Option<Glyph<'_>>;

    /// Horizontal gap left after each glyph
    fn spacing(&self, _font: FontId) -> u8 {
        1
    }
}
