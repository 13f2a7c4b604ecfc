//! Board-agnostic core logic for the flying toasters firmware
//!
//! This crate contains everything that does not depend on a specific
//! display controller or microcontroller:
//!
//! - Collaborator traits (display sink, random source)
//! - Rectangle overlap test
//! - Spawn placement along the top and right screen edges
//! - Per-tick sprite movement and avoidance
//! - Frame buffer compositing and bitmap decoding
//! - The scene context and the fixed-timestep run loop

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bitmap;
pub mod config;
pub mod framebuffer;
pub mod geometry;
pub mod runner;
pub mod scene;
pub mod spawn;
pub mod sprite;
pub mod traits;

pub use bitmap::{Bitmap, BitmapError, SpriteSheet};
pub use config::{ConfigError, SceneConfig};
pub use framebuffer::FrameBuffer;
pub use geometry::{overlaps, SENTINEL};
pub use runner::{run, RunHooks};
pub use scene::{Scene, SceneError, TickSummary, MAX_SPRITES};
pub use sprite::{FrameRange, Motion, Sprite};
pub use traits::{DisplaySink, RandomSource};
