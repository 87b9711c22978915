//! SH1106 lifecycle and transfers
//!
//! The driver is a small state machine:
//!
//! ```text
//! Uninitialized --initialize()--> Awake <--sleep()/wake()--> Asleep
//! ```
//!
//! Display memory can be written while the panel is asleep; only an
//! uninitialized controller is refused. Every transfer is recomputed from
//! the caller's bitmap, so no cursor or page state is kept between calls.

use pagewire_display::{Bitmap, DisplayBackend, Region};
use pagewire_hal::SerialBus;

use super::addressing::{bursts, physical_column};
use super::channel::CommandChannel;
use super::cmd::{self, op, HEIGHT, MAX_SEGMENTS_PER_WRITE, PAGES, SEGMENTS, WIDTH};
use super::config::Sh1106Config;
use super::error::Sh1106Error;

/// Zero bytes for clearing
const ZEROS: [u8; MAX_SEGMENTS_PER_WRITE] = [0; MAX_SEGMENTS_PER_WRITE];

/// Power state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Not yet configured since power-on or a failed `initialize`
    Uninitialized,
    /// Configured, panel output on
    Awake,
    /// Configured, panel output off
    Asleep,
}

impl PowerState {
    pub fn is_initialized(&self) -> bool {
        !matches!(self, PowerState::Uninitialized)
    }
}

/// Contrast register value for a percentage
///
/// Linear over 0..=255, truncating; percentages above 100 are clamped.
pub fn contrast_level(percent: u8) -> u8 {
    (percent.min(100) as u16 * 255 / 100) as u8
}

/// SH1106 OLED driver
pub struct Sh1106<B> {
    channel: CommandChannel<B>,
    config: Sh1106Config,
    state: PowerState,
}

impl<B: SerialBus> Sh1106<B> {
    /// Create a driver; the controller is not touched until `initialize`
    ///
    /// # Errors
    /// [`Sh1106Error::InvalidConfig`] if the address or column offset is out
    /// of range.
    pub fn new(bus: B, config: Sh1106Config) -> Result<Self, Sh1106Error> {
        let address = config.validate().ok_or(Sh1106Error::InvalidConfig)?;
        Ok(Self {
            channel: CommandChannel::new(bus, address),
            config,
            state: PowerState::Uninitialized,
        })
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn config(&self) -> &Sh1106Config {
        &self.config
    }

    pub fn bus(&self) -> &B {
        self.channel.bus()
    }

    pub fn bus_mut(&mut self) -> &mut B {
        self.channel.bus_mut()
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.channel.release()
    }

    /// Check that the controller answers its address
    pub fn probe(&mut self) -> Result<(), Sh1106Error> {
        self.channel.probe()?;
        Ok(())
    }

    /// Configuration commands sent by `initialize`, in order
    fn init_sequence(&self) -> [u8; 22] {
        let (remap, scan) = if self.config.flip {
            (op::SEG_REMAP | 0x01, op::COM_SCAN_DEC)
        } else {
            (op::SEG_REMAP, op::COM_SCAN_INC)
        };
        [
            op::DISPLAY_OFF,
            op::SET_DISPLAY_CLOCK_DIV,
            0x80, // Default oscillator, divide by 1
            op::SET_MULTIPLEX,
            0x3F, // 64 lines
            op::SET_DISPLAY_OFFSET,
            0x00,
            cmd::start_line(0),
            op::CHARGE_PUMP,
            0x14, // Enable
            remap,
            scan,
            op::SET_COM_PINS,
            0x12, // Alternative COM layout
            op::SET_CONTRAST,
            contrast_level(self.config.contrast_percent),
            op::SET_PRECHARGE,
            0xF1,
            op::SET_VCOM_DETECT,
            0x40,
            op::DISPLAY_ALL_ON_RESUME,
            op::NORMAL_DISPLAY,
        ]
    }

    /// Bring the controller from reset to a configured, visible state
    ///
    /// Waits for the controller to answer, sends the configuration
    /// sequence, optionally clears display memory, then switches the panel
    /// on. On failure the driver stays uninitialized and `initialize` can
    /// be called again.
    pub fn initialize(&mut self) -> Result<(), Sh1106Error> {
        self.state = PowerState::Uninitialized;

        let _attempts = self.channel.wait_ready(self.config.ready_poll).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("SH1106 at {=u8:#x} not responding: {}", self.config.address, _e);
        })?;
        #[cfg(feature = "defmt")]
        defmt::debug!("SH1106 answered after {} polls", _attempts);

        let sequence = self.init_sequence();
        self.channel.send_commands(&sequence)?;
        if self.config.clear_on_init {
            self.clear_memory()?;
        }
        self.channel.send_command(op::DISPLAY_ON)?;

        self.state = PowerState::Awake;
        #[cfg(feature = "defmt")]
        defmt::debug!("SH1106 initialized");
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), Sh1106Error> {
        if self.state.is_initialized() {
            Ok(())
        } else {
            Err(Sh1106Error::NotInitialized)
        }
    }

    /// Switch the panel output on
    pub fn wake(&mut self) -> Result<(), Sh1106Error> {
        self.ensure_initialized()?;
        self.channel.send_command(op::DISPLAY_ON)?;
        self.state = PowerState::Awake;
        #[cfg(feature = "defmt")]
        defmt::debug!("SH1106 awake");
        Ok(())
    }

    /// Switch the panel output off; display memory is retained
    pub fn sleep(&mut self) -> Result<(), Sh1106Error> {
        self.ensure_initialized()?;
        self.channel.send_command(op::DISPLAY_OFF)?;
        self.state = PowerState::Asleep;
        #[cfg(feature = "defmt")]
        defmt::debug!("SH1106 asleep");
        Ok(())
    }

    /// Set contrast from a percentage (0-100)
    pub fn set_contrast(&mut self, percent: u8) -> Result<(), Sh1106Error> {
        self.ensure_initialized()?;
        self.channel
            .send_commands(&[op::SET_CONTRAST, contrast_level(percent)])?;
        Ok(())
    }

    /// Show display memory inverted (lit pixels dark)
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Sh1106Error> {
        self.ensure_initialized()?;
        let command = if inverted {
            op::INVERT_DISPLAY
        } else {
            op::NORMAL_DISPLAY
        };
        self.channel.send_command(command)?;
        Ok(())
    }

    /// Light every pixel regardless of display memory
    pub fn set_entire_display_on(&mut self, on: bool) -> Result<(), Sh1106Error> {
        self.ensure_initialized()?;
        let command = if on {
            op::DISPLAY_ALL_ON
        } else {
            op::DISPLAY_ALL_ON_RESUME
        };
        self.channel.send_command(command)?;
        Ok(())
    }

    /// Address `column` of `page` and send one data burst there
    fn write_burst(&mut self, page: u16, column: u8, data: &[u8]) -> Result<(), Sh1106Error> {
        let [low, high] = cmd::column_address(column);
        self.channel
            .send_commands(&[cmd::page_address(page as u8), low, high])?;
        self.channel.send_data_burst(data)?;
        Ok(())
    }

    /// Copy `region` of `bitmap` into display memory at the same position
    ///
    /// Whole pages are written for every page the region touches; rows of
    /// those pages outside the region are taken from the bitmap as well.
    /// An empty region is a no-op.
    ///
    /// # Errors
    /// - [`Sh1106Error::RegionOutOfBounds`] if the region leaves the screen
    ///   or the bitmap. Nothing is sent.
    /// - [`Sh1106Error::Bus`] from the first failing transfer. Pages before
    ///   it have been written.
    pub fn write_region(&mut self, bitmap: &Bitmap<'_>, region: Region) -> Result<(), Sh1106Error> {
        if region.is_empty() {
            return Ok(());
        }
        self.ensure_initialized()?;
        if !region.fits_within(WIDTH, HEIGHT)
            || !region.fits_within(bitmap.width(), bitmap.height())
        {
            return Err(Sh1106Error::RegionOutOfBounds);
        }

        let offset = self.config.column_offset;
        for burst in bursts(region.pages(), region.x..region.x + region.width) {
            let mut data = [0u8; MAX_SEGMENTS_PER_WRITE];
            for (byte, x) in data.iter_mut().zip(burst.columns()) {
                *byte = bitmap.column_byte(burst.page, x);
            }
            #[cfg(feature = "defmt")]
            defmt::trace!("write page {} column {} len {}", burst.page, burst.column, burst.len);
            self.write_burst(
                burst.page,
                physical_column(burst.column, offset),
                &data[..burst.len],
            )?;
        }
        Ok(())
    }

    /// Zero every physical column of every page
    fn clear_memory(&mut self) -> Result<(), Sh1106Error> {
        for burst in bursts(0..PAGES, 0..SEGMENTS) {
            self.write_burst(burst.page, physical_column(burst.column, 0), &ZEROS[..burst.len])?;
        }
        Ok(())
    }

    /// Zero all of display memory, including the hidden columns
    pub fn clear_all(&mut self) -> Result<(), Sh1106Error> {
        self.ensure_initialized()?;
        self.clear_memory()
    }

    /// Fill the visible area with a checkerboard of 8x8 blocks
    pub fn test_pattern(&mut self) -> Result<(), Sh1106Error> {
        self.ensure_initialized()?;
        let offset = self.config.column_offset;
        for burst in bursts(0..PAGES, 0..WIDTH) {
            let mut data = [0u8; MAX_SEGMENTS_PER_WRITE];
            for (byte, x) in data.iter_mut().zip(burst.columns()) {
                *byte = if (x / 8 + burst.page) % 2 == 0 { 0xFF } else { 0x00 };
            }
            self.write_burst(
                burst.page,
                physical_column(burst.column, offset),
                &data[..burst.len],
            )?;
        }
        Ok(())
    }
}

impl<B: SerialBus> DisplayBackend for Sh1106<B> {
    type Error = Sh1106Error;

    fn initialize(&mut self) -> Result<(), Sh1106Error> {
        Sh1106::initialize(self)
    }

    fn wake(&mut self) -> Result<(), Sh1106Error> {
        Sh1106::wake(self)
    }

    fn sleep(&mut self) -> Result<(), Sh1106Error> {
        Sh1106::sleep(self)
    }

    fn set_contrast(&mut self, percent: u8) -> Result<(), Sh1106Error> {
        Sh1106::set_contrast(self, percent)
    }

    fn write_region(&mut self, bitmap: &Bitmap<'_>, region: Region) -> Result<(), Sh1106Error> {
        Sh1106::write_region(self, bitmap, region)
    }

    fn clear_all(&mut self) -> Result<(), Sh1106Error> {
        Sh1106::clear_all(self)
    }

    fn pixel_dimensions(&self) -> (u16, u16) {
        (WIDTH, HEIGHT)
    }
}
