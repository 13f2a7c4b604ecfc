//! Sprite sheets for the flying toasters
//!
//! Frames are drawn as ASCII art under `art/` and listed in
//! `assets.toml`; the build script packs them into [`TOASTERS`].
//! Frames 0..4 are the toaster's wing flap cycle, frame 4 is the toast.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

use toastfall_core::{Bitmap, FrameRange};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/bitmaps.rs"));
}

/// Toaster and toast frames, 32x32 at 3 bits per pixel
pub static TOASTERS: Bitmap<'static> = Bitmap {
    width: generated::SHEET_WIDTH,
    height: generated::SHEET_HEIGHT,
    bpp: generated::SHEET_BPP,
    frames: generated::SHEET_FRAMES,
    palette: &generated::SHEET_PALETTE,
    data: &generated::SHEET_DATA,
};

/// Wing flap cycle
pub const TOASTER_FRAMES: FrameRange =
    FrameRange::new(generated::TOASTER_START, generated::TOASTER_COUNT);

/// Single toast frame
pub const TOAST_FRAMES: FrameRange =
    FrameRange::new(generated::TOAST_START, generated::TOAST_COUNT);

/// Pixels needed to hold every decoded frame of [`TOASTERS`]
pub const SHEET_PIXELS: usize = generated::SHEET_WIDTH as usize
    * generated::SHEET_HEIGHT as usize
    * generated::SHEET_FRAMES as usize;
