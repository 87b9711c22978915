//! Pagewire Display Firmware
//!
//! Demo firmware for a 1.3" SH1106 OLED module on an STM32F042K6.
//! The panel hangs off PB6 (SCL) and PB7 (SDA), driven as a bit-banged
//! bus. A ticker task draws a counter into a frame buffer and the display
//! task pushes only the changed region to the panel.

#![no_std]
#![no_main]

mod font;

use core::fmt::Write;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, OutputOpenDrain, Speed};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration, Ticker, Timer};
use {defmt_rtt as _, panic_probe as _};

use pagewire_display::{FrameBuffer, PixelMode, Region, SCREEN_HEIGHT, SCREEN_WIDTH};
use pagewire_drivers::display::{Sh1106, Sh1106Config};
use pagewire_hal::BusConfig;
use pagewire_hal_gpio::BitBangBus;

use crate::font::{DigitFont, DIGITS};

type Bus = BitBangBus<OutputOpenDrain<'static>, OutputOpenDrain<'static>, Delay>;

/// Frame buffer plus the area changed since the last transfer
pub struct Frame {
    pub buffer: FrameBuffer,
    pub dirty: Region,
}

impl Frame {
    pub const fn new() -> Self {
        Self {
            buffer: FrameBuffer::new(),
            dirty: Region::new(0, 0, 0, 0),
        }
    }

    fn touch(&mut self, region: Region) {
        self.dirty = self.dirty.union(&region);
    }
}

/// Shared frame
static FRAME: Mutex<CriticalSectionRawMutex, Frame> = Mutex::new(Frame::new());

/// Signal to trigger display refresh
static DISPLAY_REFRESH: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Counter update interval
const TICK_MS: u64 = 250;

/// Refreshes between panel power cycles
const REFRESHES_PER_SLEEP: u32 = 120;

/// How long the panel stays dark
const SLEEP_MS: u64 = 2000;

/// Counter bar geometry
const BAR_X: u16 = 4;
const BAR_Y: u16 = 40;
const BAR_WIDTH: u16 = SCREEN_WIDTH - 2 * BAR_X;
const BAR_HEIGHT: u16 = 8;

/// Counter readout position
const TEXT_X: u16 = 4;
const TEXT_Y: u16 = 16;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pagewire Display Firmware starting...");

    let p = embassy_stm32::init(Default::default());

    // Open-drain with external pull-ups; both lines start released
    let scl = OutputOpenDrain::new(p.PB6, Level::High, Speed::Low);
    let sda = OutputOpenDrain::new(p.PB7, Level::High, Speed::Low);
    let bus: Bus = BitBangBus::new(scl, sda, Delay, BusConfig::FAST);

    let mut display = match Sh1106::new(bus, Sh1106Config::default()) {
        Ok(display) => display,
        Err(e) => {
            error!("Invalid display config: {}", e);
            return;
        }
    };

    if let Err(e) = display.initialize() {
        error!("Failed to initialize display: {}", e);
    } else {
        info!("OLED initialized");
    }

    {
        let mut frame = FRAME.lock().await;
        let border = frame
            .buffer
            .draw_rect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT, PixelMode::Set);
        frame.touch(border);
        let outline = frame.buffer.draw_rect(
            BAR_X - 1,
            BAR_Y - 1,
            BAR_WIDTH + 2,
            BAR_HEIGHT + 2,
            PixelMode::Set,
        );
        frame.touch(outline);
    }
    DISPLAY_REFRESH.signal(());

    spawner.spawn(ticker_task()).unwrap();
    spawner.spawn(display_task(display)).unwrap();

    info!("All tasks spawned");
}

/// Counter task - redraws the readout and bar every tick
#[embassy_executor::task]
async fn ticker_task() {
    info!("Ticker task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    let mut count: u32 = 0;

    loop {
        ticker.next().await;
        count = count.wrapping_add(1);

        let mut text: heapless::String<10> = heapless::String::new();
        let _ = write!(text, "{:>8}", count);
        let fill = (count % (BAR_WIDTH as u32 + 1)) as u16;

        {
            let mut frame = FRAME.lock().await;
            let cleared = frame
                .buffer
                .fill_block(TEXT_X, TEXT_Y, 8 * 6, 7, PixelMode::Clear);
            frame.touch(cleared);
            let drawn = frame.buffer.draw_text(
                &DigitFont,
                DIGITS,
                TEXT_X,
                TEXT_Y,
                text.as_str(),
                PixelMode::Set,
            );
            frame.touch(drawn);

            let bar = frame
                .buffer
                .fill_block(BAR_X, BAR_Y, BAR_WIDTH, BAR_HEIGHT, PixelMode::Clear);
            frame.touch(bar);
            frame
                .buffer
                .fill_block(BAR_X, BAR_Y, fill, BAR_HEIGHT, PixelMode::Set);
        }

        trace!("Tick {}", count);
        DISPLAY_REFRESH.signal(());
    }
}

/// Display update task
#[embassy_executor::task]
async fn display_task(mut display: Sh1106<Bus>) {
    info!("Display task started");

    let mut refreshes: u32 = 0;

    loop {
        // Wait for refresh signal
        DISPLAY_REFRESH.wait().await;

        {
            let mut frame = FRAME.lock().await;
            let region = frame.dirty;
            let result = display.write_region(&frame.buffer.bitmap(), region);
            match result {
                Ok(()) => {
                    frame.dirty = Region::default();
                    trace!("Display updated: {}", region);
                }
                Err(e) => {
                    // Region stays dirty and is retried on the next refresh
                    warn!("Display update failed: {}", e);
                    if !display.state().is_initialized() {
                        display.initialize().ok();
                    }
                }
            }
        }

        refreshes = refreshes.wrapping_add(1);
        if refreshes % REFRESHES_PER_SLEEP == 0 {
            debug!("Panel sleeping");
            display.sleep().ok();
            Timer::after(Duration::from_millis(SLEEP_MS)).await;
            display.wake().ok();
        }
    }
}
