//! Borrowed monochrome bitmaps
//!
//! Pixels are stored row-major in 16-bit words. Within a word the most
//! significant bit is the leftmost pixel, and row `r` starts at word
//! `r * stride`. A set bit is a lit pixel.

use crate::region::PAGE_HEIGHT;

/// Pixels per storage word
pub const WORD_BITS: u16 = 16;

/// Read-only view of a caller-owned pixel buffer
///
/// The view is only borrowed for the duration of a draw or transfer call.
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    pub(crate) words: &'a [u16],
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) stride: usize,
}

impl<'a> Bitmap<'a> {
    /// Wrap a word buffer
    ///
    /// Returns `None` if `stride` words cannot hold a row of `width`
    /// pixels, or if `words` is too short for `height` rows.
    pub fn new(words: &'a [u16], width: u16, height: u16, stride: usize) -> Option<Self> {
        let row_words = width.div_ceil(WORD_BITS) as usize;
        if stride < row_words {
            return None;
        }
        let needed = match height {
            0 => 0,
            h => (h as usize - 1) * stride + row_words,
        };
        if words.len() < needed {
            return None;
        }
        Some(Self {
            words,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel at (x, y); pixels outside the bitmap read as unlit
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let word = self.words[y as usize * self.stride + (x / WORD_BITS) as usize];
        word & (0x8000 >> (x % WORD_BITS)) != 0
    }

    /// Vertical strip of eight pixels in column `x` of `page`
    ///
    /// Bit `i` (LSB = top) is the pixel at row `page * 8 + i`, which is the
    /// layout page-addressed controllers expect in display memory. Pages
    /// past the last addressable row read as zero.
    pub fn column_byte(&self, page: u16, x: u16) -> u8 {
        let Some(top) = page.checked_mul(PAGE_HEIGHT) else {
            return 0;
        };
        (0..PAGE_HEIGHT).fold(0u8, |byte, bit| {
            if self.pixel(x, top + bit) {
                byte | (1 << bit)
            } else {
                byte
            }
        })
    }
}
