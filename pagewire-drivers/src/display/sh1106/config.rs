//! SH1106 driver configuration

use pagewire_hal::{DeviceAddress, RetryLimit};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Device address with the SA0 pin low
pub const DEFAULT_ADDRESS: u8 = 0x3C;
/// Device address with the SA0 pin high
pub const ALTERNATE_ADDRESS: u8 = 0x3D;

/// Column skew of common 1.3" modules (128 visible of 132 columns, centred)
pub const DEFAULT_COLUMN_OFFSET: u8 = 2;
/// Largest skew that keeps all 128 visible columns inside display memory
pub const MAX_COLUMN_OFFSET: u8 = 4;

/// SH1106 configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sh1106Config {
    /// 7-bit bus address
    pub address: u8,
    /// Physical column of visible column 0
    pub column_offset: u8,
    /// Contrast applied by `initialize`, percent
    pub contrast_percent: u8,
    /// How long `initialize` polls for the controller to answer
    pub ready_poll: RetryLimit,
    /// Zero display memory before the panel is switched on
    pub clear_on_init: bool,
    /// Panel mounted rotated by 180 degrees (segment remap + COM scan reversed)
    pub flip: bool,
}

impl Default for Sh1106Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            column_offset: DEFAULT_COLUMN_OFFSET,
            contrast_percent: 80,
            ready_poll: RetryLimit::Attempts(8),
            clear_on_init: true,
            flip: true,
        }
    }
}

impl Sh1106Config {
    /// Config for a module strapped to `address`
    pub fn with_address(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Check ranges
    ///
    /// Returns the write address on success.
    pub fn validate(&self) -> Option<DeviceAddress> {
        if self.column_offset > MAX_COLUMN_OFFSET {
            return None;
        }
        DeviceAddress::new(self.address, pagewire_hal::Direction::Write)
    }
}
