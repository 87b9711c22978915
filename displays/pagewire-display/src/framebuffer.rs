//! Screen frame buffer
//!
//! A full 128x64 monochrome image kept in RAM. Drawing happens here; the
//! changed [`Region`] is then transferred through a `DisplayBackend`.

use crate::bitmap::{Bitmap, WORD_BITS};
use crate::glyph::{FontId, Glyph, GlyphSource};
use crate::region::Region;

/// Visible width in pixels
pub const SCREEN_WIDTH: u16 = 128;

/// Visible height in pixels
pub const SCREEN_HEIGHT: u16 = 64;

/// Storage words per pixel row
pub const WORDS_PER_ROW: usize = (SCREEN_WIDTH / WORD_BITS) as usize;

/// How a drawing operation changes the pixels it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelMode {
    /// Turn pixels off
    Clear,
    /// Turn pixels on
    Set,
    /// Invert pixels
    Flip,
}

/// Owned 128x64 pixel buffer
#[derive(Clone)]
pub struct FrameBuffer {
    words: [u16; WORDS_PER_ROW * SCREEN_HEIGHT as usize],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a blank buffer
    pub const fn new() -> Self {
        Self {
            words: [0; WORDS_PER_ROW * SCREEN_HEIGHT as usize],
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Read-only view for transfers
    pub fn bitmap(&self) -> Bitmap<'_> {
        Bitmap {
            words: &self.words,
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            stride: WORDS_PER_ROW,
        }
    }

    /// Raw storage words, row-major
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    fn locate(x: u16, y: u16) -> Option<(usize, u16)> {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        let index = y as usize * WORDS_PER_ROW + (x / WORD_BITS) as usize;
        Some((index, 0x8000 >> (x % WORD_BITS)))
    }

    /// Pixel at (x, y); off-screen reads as unlit
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        Self::locate(x, y).is_some_and(|(index, mask)| self.words[index] & mask != 0)
    }

    /// Change one pixel; off-screen coordinates are ignored
    pub fn draw_pixel(&mut self, x: u16, y: u16, mode: PixelMode) {
        if let Some((index, mask)) = Self::locate(x, y) {
            let word = &mut self.words[index];
            match mode {
                PixelMode::Clear => *word &= !mask,
                PixelMode::Set => *word |= mask,
                PixelMode::Flip => *word ^= mask,
            }
        }
    }

    pub fn set_pixel(&mut self, x: u16, y: u16) {
        self.draw_pixel(x, y, PixelMode::Set);
    }

    pub fn clear_pixel(&mut self, x: u16, y: u16) {
        self.draw_pixel(x, y, PixelMode::Clear);
    }

    pub fn flip_pixel(&mut self, x: u16, y: u16) {
        self.draw_pixel(x, y, PixelMode::Flip);
    }

    /// Clip a rectangle to the screen
    fn clip(x: u16, y: u16, width: u16, height: u16) -> Region {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return Region::default();
        }
        Region::new(
            x,
            y,
            width.min(SCREEN_WIDTH - x),
            height.min(SCREEN_HEIGHT - y),
        )
    }

    /// Apply `mode` to a rectangle
    ///
    /// Returns the on-screen part that was touched.
    pub fn fill_block(&mut self, x: u16, y: u16, width: u16, height: u16, mode: PixelMode) -> Region {
        let region = Self::clip(x, y, width, height);
        if region.is_empty() {
            return region;
        }
        for row in region.y..region.y + region.height {
            for col in region.x..region.x + region.width {
                self.draw_pixel(col, row, mode);
            }
        }
        region
    }

    /// Draw a one-pixel rectangle outline
    ///
    /// Edges that fall off-screen are skipped. Returns the on-screen part
    /// of the rectangle.
    pub fn draw_rect(&mut self, x: u16, y: u16, width: u16, height: u16, mode: PixelMode) -> Region {
        let region = Self::clip(x, y, width, height);
        if region.is_empty() {
            return region;
        }
        // Edges are drawn without overlap so Flip leaves corners lit
        self.fill_block(x, y, width, 1, mode);
        if height > 1 {
            if let Some(bottom) = y.checked_add(height - 1) {
                self.fill_block(x, bottom, width, 1, mode);
            }
        }
        if height > 2 {
            self.fill_block(x, y + 1, 1, height - 2, mode);
            if width > 1 {
                if let Some(right) = x.checked_add(width - 1) {
                    self.fill_block(right, y + 1, 1, height - 2, mode);
                }
            }
        }
        region
    }

    /// Draw the lit pixels of `image` with its top-left corner at (x, y)
    ///
    /// Unlit image pixels leave the buffer untouched and anything past the
    /// screen edge is dropped. Returns the on-screen part of the image.
    pub fn draw_image(&mut self, image: &Bitmap<'_>, x: u16, y: u16, mode: PixelMode) -> Region {
        let region = Self::clip(x, y, image.width(), image.height());
        if region.is_empty() {
            return region;
        }
        for iy in 0..region.height {
            for ix in 0..region.width {
                if image.pixel(ix, iy) {
                    self.draw_pixel(x + ix, y + iy, mode);
                }
            }
        }
        region
    }

    /// Draw the lit pixels of `glyph` with its top-left corner at (x, y)
    ///
    /// Unlit glyph pixels leave the buffer untouched.
    pub fn draw_glyph(&mut self, glyph: &Glyph<'_>, x: u16, y: u16, mode: PixelMode) -> Region {
        for gx in 0..glyph.width {
            for gy in 0..glyph.height {
                if glyph.pixel(gx, gy) {
                    self.draw_pixel(x.saturating_add(gx as u16), y.saturating_add(gy as u16), mode);
                }
            }
        }
        Self::clip(x, y, glyph.width as u16, glyph.height as u16)
    }

    /// Draw a string left to right starting at (x, y)
    ///
    /// Characters the font lacks are skipped. Returns the touched region.
    pub fn draw_text<G: GlyphSource + ?Sized>(
        &mut self,
        source: &G,
        font: FontId,
        x: u16,
        y: u16,
        text: &str,
        mode: PixelMode,
    ) -> Region {
        let mut cursor = x;
        let mut touched = Region::default();
        for code in text.bytes() {
            if cursor >= SCREEN_WIDTH {
                break;
            }
            let Some(glyph) = source.glyph(font, code) else {
                continue;
            };
            touched = touched.union(&self.draw_glyph(&glyph, cursor, y, mode));
            cursor = cursor.saturating_add(glyph.width as u16 + source.spacing(font) as u16);
        }
        touched
    }
}
