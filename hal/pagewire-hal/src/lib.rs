//! Pagewire Hardware Abstraction Layer
//!
//! This crate defines the two-wire serial bus capability that display
//! drivers are written against. Chip-specific crates implement
//! [`SerialBus`] for their peripheral (hardware TWI, bit-banged GPIO, ...),
//! and drivers receive the bus by injection instead of calling a fixed
//! set of global functions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (pagewire-drivers: SH1106)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pagewire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ pagewire-hal- │       │ pagewire-hal- │
//! │      avr      │       │     gpio      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Contents
//!
//! - [`bus::SerialBus`] - start/stop/byte primitives of a bus master
//! - [`bus::DeviceAddress`], [`bus::Direction`] - the addressing byte
//! - [`transaction::Transaction`] - scoped start..stop guard
//! - [`mock::MockBus`] - recording bus double (feature `mock`)

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod transaction;

// Re-export key types at crate root for convenience
pub use bus::{BusConfig, BusError, DeviceAddress, Direction, RetryLimit, SerialBus};
pub use transaction::{Transaction, TransactionState};
