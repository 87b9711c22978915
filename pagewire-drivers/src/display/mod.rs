//! Display controller implementations

pub mod sh1106;
// pub mod ssd1306;  // Future

pub use sh1106::{PowerState, Sh1106, Sh1106Config, Sh1106Error};
