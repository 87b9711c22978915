//! SH1106 OLED display controller
//!
//! Driver for 132x64 SH1106 controllers on 128x64 modules, reached over a
//! two-wire bus. Layers, bottom up:
//!
//! - [`cmd`]: opcodes, control bytes and memory geometry
//! - [`channel`]: command/data framing on top of bus transactions
//! - [`addressing`]: logical to physical columns, burst chunking
//! - [`driver`]: the lifecycle state machine and transfers

pub mod addressing;
pub mod channel;
pub mod cmd;
pub mod config;
pub mod driver;
pub mod error;
#[cfg(test)]
mod model;

pub use channel::CommandChannel;
pub use config::Sh1106Config;
pub use driver::{contrast_level, PowerState, Sh1106};
pub use error::Sh1106Error;
