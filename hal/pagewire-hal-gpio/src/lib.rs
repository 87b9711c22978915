//! GPIO bit-banged HAL for Pagewire
//!
//! Implements [`pagewire_hal::SerialBus`] on any pair of `embedded-hal`
//! 1.0 pins plus a [`DelayNs`](embedded_hal::delay::DelayNs), for boards
//! where the hardware I2C block is unavailable or already taken.
//!
//! Both pins must be configured open-drain with a pull-up and start out
//! released (high). SDA must also be readable. Clock stretching is not
//! supported: the master drives SCL unconditionally.

#![no_std]
#![deny(unsafe_code)]

pub mod bitbang;

pub use bitbang::BitBangBus;
