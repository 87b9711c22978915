//! Display backend trait
//!
//! Defines the interface between drawing code and panel drivers.

use crate::bitmap::Bitmap;
use crate::region::Region;

/// Display backend trait
///
/// Hardware-agnostic lifecycle and transfer operations for pixel displays.
/// Implementations handle controller addressing, transfer limits and bus
/// errors.
pub trait DisplayBackend {
    /// Error reported by the backend
    type Error;

    /// Bring the panel from reset to a known, visible state
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Turn the panel output back on
    fn wake(&mut self) -> Result<(), Self::Error>;

    /// Blank the panel output; display memory is kept
    fn sleep(&mut self) -> Result<(), Self::Error>;

    /// Set the contrast as a percentage (0-100)
    fn set_contrast(&mut self, percent: u8) -> Result<(), Self::Error>;

    /// Transfer `region` of `bitmap` to the same place on the panel
    ///
    /// An empty region is a no-op.
    fn write_region(&mut self, bitmap: &Bitmap<'_>, region: Region) -> Result<(), Self::Error>;

    /// Zero the whole display memory
    fn clear_all(&mut self) -> Result<(), Self::Error>;

    /// Visible size in pixels (width, height)
    fn pixel_dimensions(&self) -> (u16, u16);
}
