//! Whole-screen frame buffer
//!
//! Raw RGB565 pixels, row-major. Sprites are copied in opaquely; anything
//! falling outside the buffer is clipped without error.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{IntoStorage, Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Off-screen pixel surface the scene composites into
pub struct FrameBuffer<'a> {
    size: Size,
    pixels: &'a mut [u16],
}

impl<'a> FrameBuffer<'a> {
    /// Wrap `pixels` as a `size` buffer
    ///
    /// Returns `None` if the slice does not hold exactly
    /// `width * height` pixels.
    pub fn new(size: Size, pixels: &'a mut [u16]) -> Option<Self> {
        if pixels.len() != (size.width * size.height) as usize {
            return None;
        }
        Some(Self { size, pixels })
    }

    /// Buffer size in pixels
    pub fn size(&self) -> Size {
        self.size
    }

    /// Rectangle covering the whole buffer
    pub fn bounding_box(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size)
    }

    /// Raw pixel data, row-major
    pub fn pixels(&self) -> &[u16] {
        self.pixels
    }

    /// Read one pixel (`None` outside the buffer)
    pub fn pixel(&self, at: Point) -> Option<u16> {
        self.index(at).map(|i| self.pixels[i])
    }

    /// Fill the whole buffer with one colour
    pub fn clear(&mut self, color: Rgb565) {
        self.pixels.fill(color.into_storage());
    }

    /// Copy a `size` block of pixels with its top-left corner at `top_left`
    ///
    /// Rows and columns outside the buffer are skipped. Returns the number
    /// of pixels written.
    pub fn blit(&mut self, top_left: Point, size: Size, src: &[u16]) -> usize {
        let src_w = size.width as i32;
        let src_h = size.height as i32;
        let dst_w = self.size.width as i32;
        let dst_h = self.size.height as i32;

        if src.len() < (size.width * size.height) as usize {
            return 0;
        }

        // Visible span of the source, in source coordinates
        let x0 = (-top_left.x).clamp(0, src_w);
        let x1 = (dst_w - top_left.x).clamp(0, src_w);
        let y0 = (-top_left.y).clamp(0, src_h);
        let y1 = (dst_h - top_left.y).clamp(0, src_h);

        if x0 >= x1 || y0 >= y1 {
            return 0;
        }

        let run = (x1 - x0) as usize;
        for sy in y0..y1 {
            let s = (sy * src_w + x0) as usize;
            let d = ((top_left.y + sy) * dst_w + top_left.x + x0) as usize;
            self.pixels[d..d + run].copy_from_slice(&src[s..s + run]);
        }

        run * (y1 - y0) as usize
    }

    fn index(&self, at: Point) -> Option<usize> {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        if at.x < 0 || at.y < 0 || at.x >= w || at.y >= h {
            return None;
        }
        Some((at.y * w + at.x) as usize)
    }
}
