//! Indexed-colour bitmap assets
//!
//! Asset layout:
//! - `palette`: RGB565 colour per palette index
//! - `data`: packed bit stream, MSB first, `bpp` bits per pixel
//! - frames are stored back to back, each `width * height` pixels
//!
//! Frames are decoded once at startup into a [`SpriteSheet`] of
//! display-ready RGB565 pixels so the tick loop only copies memory.

use embedded_graphics::prelude::Size;

/// Errors that can occur while decoding a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitmapError {
    /// Requested frame does not exist
    FrameOutOfRange,
    /// Output buffer cannot hold the decoded pixels
    BufferTooSmall,
    /// Bit stream ends before the requested frame does
    TruncatedData,
    /// Pixel refers to a palette entry that does not exist
    PaletteIndexOutOfRange,
    /// Bits per pixel outside 1..=8
    UnsupportedDepth,
}

/// Packed, palette-indexed bitmap with one or more frames
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Bits per pixel (1..=8)
    pub bpp: u8,
    /// Number of frames in `data`
    pub frames: u16,
    /// RGB565 colour for each palette index
    pub palette: &'a [u16],
    /// Packed palette indices, MSB first
    pub data: &'a [u8],
}

impl<'a> Bitmap<'a> {
    /// Frame size in pixels
    pub fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }

    /// Pixels in one frame
    pub fn frame_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixels needed to hold every frame
    pub fn sheet_pixels(&self) -> usize {
        self.frame_pixels() * self.frames as usize
    }

    /// Decode frame `index` into `out` (at least one frame of pixels)
    pub fn decode_frame(&self, index: usize, out: &mut [u16]) -> Result<(), BitmapError> {
        if !(1..=8).contains(&self.bpp) {
            return Err(BitmapError::UnsupportedDepth);
        }
        if index >= self.frames as usize {
            return Err(BitmapError::FrameOutOfRange);
        }

        let pixels = self.frame_pixels();
        if out.len() < pixels {
            return Err(BitmapError::BufferTooSmall);
        }

        let bpp = self.bpp as usize;
        let mut bit = bpp * pixels * index;
        if (bit + bpp * pixels).div_ceil(8) > self.data.len() {
            return Err(BitmapError::TruncatedData);
        }

        for px in out[..pixels].iter_mut() {
            let mut color_index = 0usize;
            for _ in 0..bpp {
                let byte = self.data[bit >> 3];
                color_index = (color_index << 1) | ((byte >> (7 - (bit & 7))) & 1) as usize;
                bit += 1;
            }

            *px = *self
                .palette
                .get(color_index)
                .ok_or(BitmapError::PaletteIndexOutOfRange)?;
        }

        Ok(())
    }

    /// Decode every frame into `out` and wrap it as a sprite sheet
    pub fn decode_sheet<'b>(&self, out: &'b mut [u16]) -> Result<SpriteSheet<'b>, BitmapError> {
        let per_frame = self.frame_pixels();
        let total = self.sheet_pixels();
        if out.len() < total {
            return Err(BitmapError::BufferTooSmall);
        }

        for index in 0..self.frames as usize {
            let start = index * per_frame;
            self.decode_frame(index, &mut out[start..start + per_frame])?;
        }

        let pixels: &'b [u16] = out;
        Ok(SpriteSheet {
            size: self.size(),
            frames: self.frames as usize,
            pixels: &pixels[..total],
        })
    }
}

/// Decoded frames, ready to be copied into the frame buffer
#[derive(Debug, Clone, Copy)]
pub struct SpriteSheet<'a> {
    size: Size,
    frames: usize,
    pixels: &'a [u16],
}

impl<'a> SpriteSheet<'a> {
    /// Wrap pre-decoded pixels (`frames` frames of `size`, back to back)
    pub fn from_pixels(size: Size, frames: usize, pixels: &'a [u16]) -> Result<Self, BitmapError> {
        let needed = (size.width * size.height) as usize * frames;
        if pixels.len() < needed {
            return Err(BitmapError::TruncatedData);
        }
        Ok(Self {
            size,
            frames,
            pixels: &pixels[..needed],
        })
    }

    /// Frame size in pixels
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Pixels of frame `index`
    pub fn frame(&self, index: usize) -> Option<&'a [u16]> {
        if index >= self.frames {
            return None;
        }
        let per_frame = (self.size.width * self.size.height) as usize;
        let start = index * per_frame;
        Some(&self.pixels[start..start + per_frame])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PALETTE: [u16; 4] = [0x0000, 0xF800, 0x07E0, 0x001F];

    // 2x2 frames at 2 bpp: frame 0 = [0, 1, 2, 3], frame 1 = [3, 3, 0, 1]
    const DATA: [u8; 2] = [0b00_01_10_11, 0b11_11_00_01];

    fn bitmap() -> Bitmap<'static> {
        Bitmap {
            width: 2,
            height: 2,
            bpp: 2,
            frames: 2,
            palette: &PALETTE,
            data: &DATA,
        }
    }

    #[test]
    fn test_decode_first_frame() {
        let mut out = [0u16; 4];
        bitmap().decode_frame(0, &mut out).unwrap();
        assert_eq!(out, [0x0000, 0xF800, 0x07E0, 0x001F]);
    }

    #[test]
    fn test_decode_second_frame() {
        let mut out = [0u16; 4];
        bitmap().decode_frame(1, &mut out).unwrap();
        assert_eq!(out, [0x001F, 0x001F, 0x0000, 0xF800]);
    }

    #[test]
    fn test_decode_across_byte_boundary() {
        // 3 bpp, 3 pixels: indices 5, 2, 7 -> 101 010 11|1
        let palette = [0u16, 10, 20, 30, 40, 50, 60, 70];
        let data = [0b1010_1011, 0b1000_0000];
        let bmp = Bitmap {
            width: 3,
            height: 1,
            bpp: 3,
            frames: 1,
            palette: &palette,
            data: &data,
        };

        let mut out = [0u16; 3];
        bmp.decode_frame(0, &mut out).unwrap();
        assert_eq!(out, [50, 20, 70]);
    }

    #[test]
    fn test_decode_errors() {
        let bmp = bitmap();
        let mut out = [0u16; 4];

        assert_eq!(bmp.decode_frame(2, &mut out), Err(BitmapError::FrameOutOfRange));
        assert_eq!(
            bmp.decode_frame(0, &mut out[..3]),
            Err(BitmapError::BufferTooSmall)
        );

        let short = Bitmap { data: &DATA[..1], ..bmp };
        assert_eq!(short.decode_frame(1, &mut out), Err(BitmapError::TruncatedData));

        let small_palette = Bitmap { palette: &PALETTE[..2], ..bmp };
        assert_eq!(
            small_palette.decode_frame(0, &mut out),
            Err(BitmapError::PaletteIndexOutOfRange)
        );

        let deep = Bitmap { bpp: 9, ..bmp };
        assert_eq!(deep.decode_frame(0, &mut out), Err(BitmapError::UnsupportedDepth));
    }

    #[test]
    fn test_decode_sheet() {
        let mut out = [0u16; 8];
        let sheet = bitmap().decode_sheet(&mut out).unwrap();

        assert_eq!(sheet.frame_count(), 2);
        assert_eq!(sheet.size(), Size::new(2, 2));
        assert_eq!(sheet.frame(0), Some(&[0x0000, 0xF800, 0x07E0, 0x001F][..]));
        assert_eq!(sheet.frame(1), Some(&[0x001F, 0x001F, 0x0000, 0xF800][..]));
        assert_eq!(sheet.frame(2), None);
    }

    #[test]
    fn test_sheet_from_pixels_checks_length() {
        let pixels = [0u16; 7];
        assert_eq!(
            SpriteSheet::from_pixels(Size::new(2, 2), 2, &pixels).err(),
            Some(BitmapError::TruncatedData)
        );
        assert!(SpriteSheet::from_pixels(Size::new(2, 2), 1, &pixels).is_ok());
    }
}
