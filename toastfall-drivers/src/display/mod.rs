//! Display drivers

pub mod st7789;

pub use st7789::{ColorOrder, Error, Orientation, St7789};
