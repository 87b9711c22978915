//! SH1106 driver errors

use core::fmt;

use pagewire_hal::BusError;

/// Errors reported by the SH1106 driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sh1106Error {
    /// The bus transfer failed
    Bus(BusError),
    /// Operation needs `initialize` first
    NotInitialized,
    /// Region lies outside the screen or the source bitmap
    RegionOutOfBounds,
    /// Address or column offset out of range
    InvalidConfig,
}

impl From<BusError> for Sh1106Error {
    fn from(e: BusError) -> Self {
        Sh1106Error::Bus(e)
    }
}

impl fmt::Display for Sh1106Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sh1106Error::Bus(e) => write!(f, "bus error: {}", e),
            Sh1106Error::NotInitialized => write!(f, "display not initialized"),
            Sh1106Error::RegionOutOfBounds => write!(f, "region out of bounds"),
            Sh1106Error::InvalidConfig => write!(f, "invalid display configuration"),
        }
    }
}
