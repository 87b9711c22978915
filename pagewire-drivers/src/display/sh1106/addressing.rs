//! Page/column addressing and burst chunking
//!
//! Display memory is 8 pages of 132 columns. A logical column is shifted
//! by the module's column offset to reach its physical column, and every
//! transfer is cut into bursts of at most [`MAX_SEGMENTS_PER_WRITE`]
//! bytes. A burst never leaves its page: the controller advances the
//! column after each byte but never moves on to the next page.

use core::ops::Range;

use super::cmd::{MAX_SEGMENT, MAX_SEGMENTS_PER_WRITE};

/// Physical column for a logical column
///
/// # Panics
/// If the result lies beyond the last physical column. Callers validate
/// regions and offsets first, so this is a programming error.
pub fn physical_column(column: u16, offset: u8) -> u8 {
    let physical = column + offset as u16;
    assert!(
        physical <= MAX_SEGMENT,
        "column {} + offset {} is past the last segment",
        column,
        offset
    );
    physical as u8
}

/// One addressed run of columns within a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Burst {
    pub page: u16,
    /// First column of the run, in the caller's column space
    pub column: u16,
    pub len: usize,
}

impl Burst {
    /// Columns covered by the burst
    pub fn columns(&self) -> Range<u16> {
        self.column..self.column + self.len as u16
    }
}

/// Bursts covering `columns` on each of `pages`, page by page
pub fn bursts(pages: Range<u16>, columns: Range<u16>) -> impl Iterator<Item = Burst> {
    pages.flat_map(move |page| {
        let end = columns.end;
        columns
            .clone()
            .step_by(MAX_SEGMENTS_PER_WRITE)
            .map(move |column| Burst {
                page,
                column,
                len: (end - column).min(MAX_SEGMENTS_PER_WRITE as u16) as usize,
            })
    })
}
