//! Rectangular screen areas

use core::ops::Range;

/// Pixel rows per controller page
pub const PAGE_HEIGHT: u16 = 8;

/// Rectangle in pixel coordinates, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of a `width` x `height` screen
    pub const fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// True if the region covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the rightmost column
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.width as u32
    }

    /// One past the bottom row
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.height as u32
    }

    /// True if the region lies inside a `width` x `height` area
    pub const fn fits_within(&self, width: u16, height: u16) -> bool {
        self.right() <= width as u32 && self.bottom() <= height as u32
    }

    /// Pages touched by the region's rows
    ///
    /// A region that covers part of a page touches the whole page.
    pub fn pages(&self) -> Range<u16> {
        if self.is_empty() {
            return 0..0;
        }
        let first = self.y / PAGE_HEIGHT;
        let last = ((self.bottom() - 1) / PAGE_HEIGHT as u32) as u16;
        first..last + 1
    }

    /// Smallest region covering both
    ///
    /// Empty regions are ignored.
    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Region::new(
            x,
            y,
            (right - x as u32).min(u16::MAX as u32) as u16,
            (bottom - y as u32).min(u16::MAX as u32) as u16,
        )
    }
}
