//! Display sink trait

use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

/// Destination for composed frames
///
/// The engine hands over a rectangle and a matching block of raw RGB565
/// pixels (row-major, `area.size.width * area.size.height` entries). The
/// call is synchronous: when it returns the pixels have been sent.
pub trait DisplaySink {
    /// Error type for transfers to the panel
    type Error;

    /// Show `pixels` inside `area`
    fn blit(&mut self, area: Rectangle, pixels: &[u16]) -> Result<(), Self::Error>;

    /// Visible panel size in pixels
    fn size(&self) -> Size;
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    type Error = T::Error;

    fn blit(&mut self, area: Rectangle, pixels: &[u16]) -> Result<(), Self::Error> {
        (**self).blit(area, pixels)
    }

    fn size(&self) -> Size {
        (**self).size()
    }
}
