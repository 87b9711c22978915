//! Display controller drivers
//!
//! This crate provides concrete implementations of the
//! `pagewire_display::DisplayBackend` trait on top of a
//! `pagewire_hal::SerialBus`:
//!
//! - SH1106 132x64 OLED controller (128x64 visible)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
