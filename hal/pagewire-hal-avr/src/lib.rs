//! AVR-specific HAL for Pagewire
//!
//! This crate implements [`pagewire_hal::SerialBus`] on the hardware TWI
//! (two-wire interface) peripheral of 8-bit AVR parts. It supports chips
//! sharing the ATmega328P TWI register map, including:
//!
//! - ATmega328P
//! - ATmega32U4
//!
//! # Usage
//!
//! ```ignore
//! use pagewire_hal::BusConfig;
//! use pagewire_hal_avr::Twi;
//!
//! // Once, at start-up: 16 MHz CPU, 400 kHz SCL
//! let bus = Twi::init(16_000_000, BusConfig::FAST);
//! ```

#![no_std]

pub mod twi;

pub use twi::{bit_rate_register, Twi, TwiStatus};
