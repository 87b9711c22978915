//! Display abstraction traits and shared types for Pagewire
//!
//! This crate provides:
//! - `DisplayBackend` trait, the only path from drawing code to a panel
//! - `Region` for rectangular screen areas
//! - `Bitmap`, a borrowed view of row-major pixel words
//! - `FrameBuffer`, an owned 128x64 monochrome buffer with pixel modes
//! - `GlyphSource` trait for looking up font glyphs
//!
//! # Architecture
//!
//! Drawing code renders into a `FrameBuffer` (or any other word buffer)
//! and hands a `Bitmap` view of it, together with the `Region` that
//! changed, to a `DisplayBackend`. The backend owns the bus and converts
//! pixels into whatever addressing scheme the controller uses. Nothing in
//! this crate touches hardware.

#![no_std]

pub mod backend;
pub mod bitmap;
pub mod framebuffer;
pub mod glyph;
pub mod region;

// Re-export key types
pub use backend::DisplayBackend;
pub use bitmap::Bitmap;
pub use framebuffer::{FrameBuffer, PixelMode, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use glyph::{FontId, Glyph, GlyphSource};
pub use region::Region;
