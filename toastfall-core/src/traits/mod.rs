//! Collaborator traits
//!
//! These traits define the interface between the sprite engine and the
//! hardware-specific (or test) implementations it drives.

pub mod display;
pub mod random;

pub use display::DisplaySink;
pub use random::RandomSource;
