//! ST7789 TFT Display Driver
//!
//! Driver for the 135x240 ST7789V panels found on small RP2040 boards
//! (Waveshare Pico-LCD-1.14, Pimoroni Pico Display) over a write-only SPI
//! bus with separate data/command, chip select and reset lines.
//!
//! The panel only shows a 135x240 window of the controller's 240x320
//! RAM, so every orientation carries its own column/row offset.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use toastfall_core::traits::DisplaySink;

/// Pixels converted and written per SPI transfer
const CHUNK_PIXELS: usize = 64;

/// ST7789 commands
#[allow(dead_code)]
mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

/// COLMOD value for 16 bits per pixel (RGB565)
const COLMOD_RGB565: u8 = 0x55;

/// MADCTL bit selecting BGR subpixel order
const MADCTL_BGR: u8 = 0x08;

/// Errors that can occur while driving the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SpiE, PinE> {
    /// SPI transfer failed
    Spi(SpiE),
    /// Control pin could not be driven
    Pin(PinE),
    /// Area lies (partly) outside the panel
    OutOfBounds,
    /// Pixel count does not match the area
    SizeMismatch,
}

/// Panel rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// 135 wide, 240 tall
    Portrait,
    /// 240 wide, 135 tall
    #[default]
    Landscape,
    /// Portrait, rotated 180°
    PortraitFlipped,
    /// Landscape, rotated 180°
    LandscapeFlipped,
}

impl Orientation {
    /// MADCTL rotation bits
    pub const fn madctl(self) -> u8 {
        match self {
            Orientation::Portrait => 0x00,
            Orientation::Landscape => 0x60,
            Orientation::PortraitFlipped => 0xC0,
            Orientation::LandscapeFlipped => 0xA0,
        }
    }

    /// Visible size in this orientation
    pub const fn size(self) -> Size {
        match self {
            Orientation::Portrait | Orientation::PortraitFlipped => Size::new(135, 240),
            Orientation::Landscape | Orientation::LandscapeFlipped => Size::new(240, 135),
        }
    }

    /// Offset of the visible window in controller RAM (column, row)
    pub const fn offset(self) -> (u16, u16) {
        match self {
            Orientation::Portrait => (52, 40),
            Orientation::Landscape => (40, 53),
            Orientation::PortraitFlipped => (53, 40),
            Orientation::LandscapeFlipped => (40, 52),
        }
    }
}

/// Subpixel order of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

/// ST7789 driver
pub struct St7789<SPI, DC, CS, RST> {
    spi: SPI,
    dc: DC,
    cs: CS,
    rst: RST,
    orientation: Orientation,
    color_order: ColorOrder,
}

type Result<T, SPI, DC> = core::result::Result<
    T,
    Error<
        <SPI as embedded_hal::spi::ErrorType>::Error,
        <DC as embedded_hal::digital::ErrorType>::Error,
    >,
>;

impl<SPI, DC, CS, RST> St7789<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin<Error = DC::Error>,
    RST: OutputPin<Error = DC::Error>,
{
    /// Create a new driver; call [`init`](Self::init) before drawing
    pub fn new(
        spi: SPI,
        dc: DC,
        cs: CS,
        rst: RST,
        orientation: Orientation,
        color_order: ColorOrder,
    ) -> Self {
        Self {
            spi,
            dc,
            cs,
            rst,
            orientation,
            color_order,
        }
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Reset and configure the panel, then switch it on
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), SPI, DC> {
        self.cs.set_high().map_err(Error::Pin)?;

        // Hardware reset pulse
        self.rst.set_high().map_err(Error::Pin)?;
        delay.delay_ms(10);
        self.rst.set_low().map_err(Error::Pin)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(Error::Pin)?;
        delay.delay_ms(120);

        self.command(cmd::SWRESET, &[])?;
        delay.delay_ms(150);
        self.command(cmd::SLPOUT, &[])?;
        delay.delay_ms(10);

        self.command(cmd::COLMOD, &[COLMOD_RGB565])?;
        delay.delay_ms(10);
        self.command(cmd::MADCTL, &[self.madctl()])?;
        // IPS panels need inversion on for true colours
        self.command(cmd::INVON, &[])?;
        self.command(cmd::NORON, &[])?;
        delay.delay_ms(10);
        self.command(cmd::DISPON, &[])?;
        delay.delay_ms(10);

        Ok(())
    }

    /// Select the RAM window for `area` and start a memory write
    ///
    /// `area` must be non-empty and inside the panel.
    pub fn set_window(&mut self, area: &Rectangle) -> Result<(), SPI, DC> {
        let (col_off, row_off) = self.orientation.offset();
        let x0 = area.top_left.x as u16 + col_off;
        let y0 = area.top_left.y as u16 + row_off;
        let x1 = x0 + area.size.width as u16 - 1;
        let y1 = y0 + area.size.height as u16 - 1;

        self.command(cmd::CASET, &window_bytes(x0, x1))?;
        self.command(cmd::RASET, &window_bytes(y0, y1))?;
        Ok(())
    }

    fn madctl(&self) -> u8 {
        match self.color_order {
            ColorOrder::Rgb => self.orientation.madctl(),
            ColorOrder::Bgr => self.orientation.madctl() | MADCTL_BGR,
        }
    }

    /// Send a command byte followed by its parameters
    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), SPI, DC> {
        self.cs.set_low().map_err(Error::Pin)?;
        let sent = self.send_command(command, params);
        self.release(sent)
    }

    fn send_command(&mut self, command: u8, params: &[u8]) -> Result<(), SPI, DC> {
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[command]).map_err(Error::Spi)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(Error::Pin)?;
            self.spi.write(params).map_err(Error::Spi)?;
        }
        self.spi.flush().map_err(Error::Spi)
    }

    /// Send RAMWR and stream `pixels` big-endian
    fn write_pixels(&mut self, pixels: &[u16]) -> Result<(), SPI, DC> {
        self.cs.set_low().map_err(Error::Pin)?;
        let sent = self.stream_pixels(pixels);
        self.release(sent)
    }

    fn stream_pixels(&mut self, pixels: &[u16]) -> Result<(), SPI, DC> {
        let mut buf = [0u8; CHUNK_PIXELS * 2];

        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[cmd::RAMWR]).map_err(Error::Spi)?;
        self.dc.set_high().map_err(Error::Pin)?;

        for chunk in pixels.chunks(CHUNK_PIXELS) {
            for (bytes, px) in buf.chunks_exact_mut(2).zip(chunk) {
                bytes.copy_from_slice(&px.to_be_bytes());
            }
            self.spi.write(&buf[..chunk.len() * 2]).map_err(Error::Spi)?;
        }

        self.spi.flush().map_err(Error::Spi)
    }

    /// Deselect the chip whether or not the transfer went through
    ///
    /// The transfer error wins over a failure to raise CS.
    fn release(&mut self, sent: Result<(), SPI, DC>) -> Result<(), SPI, DC> {
        let released = self.cs.set_high().map_err(Error::Pin);
        sent.and(released)
    }

    fn contains(&self, area: &Rectangle) -> bool {
        let panel = self.orientation.size();
        let Point { x, y } = area.top_left;
        if x < 0 || y < 0 {
            return false;
        }
        let right = (x as u32).checked_add(area.size.width);
        let bottom = (y as u32).checked_add(area.size.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= panel.width && b <= panel.height)
    }
}

fn window_bytes(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}

impl<SPI, DC, CS, RST> DisplaySink for St7789<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin<Error = DC::Error>,
    RST: OutputPin<Error = DC::Error>,
{
    type Error = Error<SPI::Error, DC::Error>;

    fn blit(&mut self, area: Rectangle, pixels: &[u16]) -> core::result::Result<(), Self::Error> {
        if !self.contains(&area) {
            return Err(Error::OutOfBounds);
        }
        if pixels.len() != (area.size.width * area.size.height) as usize {
            return Err(Error::SizeMismatch);
        }
        if pixels.is_empty() {
            return Ok(());
        }

        self.set_window(&area)?;
        self.write_pixels(pixels)
    }

    fn size(&self) -> Size {
        self.orientation.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorKind, ErrorType};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Command(u8),
        Data(Vec<u8>),
        Select,
        Deselect,
        Reset(bool),
    }

    /// Shared wire state seen by the mock bus and pins
    #[derive(Default)]
    struct Wire {
        ops: Vec<Op>,
        dc_high: bool,
        fail_writes: bool,
    }

    type Shared = Rc<RefCell<Wire>>;

    struct MockSpi(Shared);

    impl ErrorType for MockSpi {
        type Error = ErrorKind;
    }

    impl SpiBus<u8> for MockSpi {
        fn read(&mut self, _words: &mut [u8]) -> core::result::Result<(), ErrorKind> {
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> core::result::Result<(), ErrorKind> {
            let wire = &mut *self.0.borrow_mut();
            if wire.fail_writes {
                return Err(ErrorKind::Other);
            }
            if wire.dc_high {
                if let Some(Op::Data(data)) = wire.ops.last_mut() {
                    data.extend_from_slice(words);
                } else {
                    wire.ops.push(Op::Data(words.to_vec()));
                }
            } else {
                wire.ops.extend(words.iter().map(|&b| Op::Command(b)));
            }
            Ok(())
        }

        fn transfer(
            &mut self,
            _read: &mut [u8],
            write: &[u8],
        ) -> core::result::Result<(), ErrorKind> {
            self.write(write)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> core::result::Result<(), ErrorKind> {
            Ok(())
        }

        fn flush(&mut self) -> core::result::Result<(), ErrorKind> {
            Ok(())
        }
    }

    enum Role {
        Dc,
        Cs,
        Rst,
    }

    struct MockPin(Shared, Role);

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            self.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            self.set(true);
            Ok(())
        }
    }

    impl MockPin {
        fn set(&self, high: bool) {
            let mut wire = self.0.borrow_mut();
            match self.1 {
                Role::Dc => wire.dc_high = high,
                Role::Cs if high => wire.ops.push(Op::Deselect),
                Role::Cs => wire.ops.push(Op::Select),
                Role::Rst => wire.ops.push(Op::Reset(high)),
            }
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type Driver = St7789<MockSpi, MockPin, MockPin, MockPin>;

    fn driver(orientation: Orientation, color_order: ColorOrder) -> (Driver, Shared) {
        let wire: Shared = Rc::new(RefCell::new(Wire::default()));
        let display = St7789::new(
            MockSpi(wire.clone()),
            MockPin(wire.clone(), Role::Dc),
            MockPin(wire.clone(), Role::Cs),
            MockPin(wire.clone(), Role::Rst),
            orientation,
            color_order,
        );
        (display, wire)
    }

    /// Recorded ops without the chip select toggles
    fn bus_ops(wire: &Shared) -> Vec<Op> {
        wire.borrow()
            .ops
            .iter()
            .filter(|op| !matches!(op, Op::Select | Op::Deselect))
            .cloned()
            .collect()
    }

    fn data(bytes: &[u8]) -> Op {
        Op::Data(bytes.to_vec())
    }

    #[test]
    fn test_orientation_table() {
        assert_eq!(Orientation::Landscape.size(), Size::new(240, 135));
        assert_eq!(Orientation::LandscapeFlipped.size(), Size::new(240, 135));
        assert_eq!(Orientation::Portrait.size(), Size::new(135, 240));
        assert_eq!(Orientation::Portrait.offset(), (52, 40));
        assert_eq!(Orientation::PortraitFlipped.offset(), (53, 40));
        assert_eq!(Orientation::LandscapeFlipped.madctl(), 0xA0);
    }

    #[test]
    fn test_init_sequence() {
        let (mut display, wire) = driver(Orientation::Landscape, ColorOrder::Bgr);
        display.init(&mut NoDelay).unwrap();

        assert_eq!(
            bus_ops(&wire),
            [
                Op::Reset(true),
                Op::Reset(false),
                Op::Reset(true),
                Op::Command(cmd::SWRESET),
                Op::Command(cmd::SLPOUT),
                Op::Command(cmd::COLMOD),
                data(&[0x55]),
                Op::Command(cmd::MADCTL),
                data(&[0x68]),
                Op::Command(cmd::INVON),
                Op::Command(cmd::NORON),
                Op::Command(cmd::DISPON),
            ]
        );

        // Every command is framed by its own chip select
        let wire = wire.borrow();
        let ops = &wire.ops;
        let selects = ops.iter().filter(|op| **op == Op::Select).count();
        let deselects = ops.iter().filter(|op| **op == Op::Deselect).count();
        assert_eq!(selects, 7);
        assert_eq!(deselects, 8);
        assert_eq!(ops.last(), Some(&Op::Deselect));
    }

    #[test]
    fn test_rgb_order_leaves_madctl_bit_clear() {
        let (mut display, wire) = driver(Orientation::Portrait, ColorOrder::Rgb);
        display.init(&mut NoDelay).unwrap();

        let ops = bus_ops(&wire);
        let at = ops
            .iter()
            .position(|op| *op == Op::Command(cmd::MADCTL))
            .unwrap();
        assert_eq!(ops[at + 1], data(&[0x00]));
    }

    #[test]
    fn test_blit_addresses_window_with_offset() {
        let (mut display, wire) = driver(Orientation::Landscape, ColorOrder::Rgb);
        let area = Rectangle::new(Point::new(10, 20), Size::new(2, 1));

        display.blit(area, &[0x1234, 0xABCD]).unwrap();

        assert_eq!(
            bus_ops(&wire),
            [
                Op::Command(cmd::CASET),
                data(&[0, 50, 0, 51]),
                Op::Command(cmd::RASET),
                data(&[0, 73, 0, 73]),
                Op::Command(cmd::RAMWR),
                data(&[0x12, 0x34, 0xAB, 0xCD]),
            ]
        );
    }

    #[test]
    fn test_full_frame_streams_every_pixel() {
        let (mut display, wire) = driver(Orientation::Landscape, ColorOrder::Bgr);
        let size = display.size();
        let pixels = std::vec![0xF81Fu16; (size.width * size.height) as usize];

        display
            .blit(Rectangle::new(Point::zero(), size), &pixels)
            .unwrap();

        let ops = bus_ops(&wire);
        assert_eq!(ops[1], data(&[0, 40, 0x01, 0x17]));
        assert_eq!(ops[3], data(&[0, 53, 0, 187]));
        assert_eq!(ops[4], Op::Command(cmd::RAMWR));
        match &ops[5] {
            Op::Data(bytes) => {
                assert_eq!(bytes.len(), 240 * 135 * 2);
                assert!(bytes.chunks(2).all(|px| px == [0xF8, 0x1F]));
            }
            other => panic!("expected pixel data, got {:?}", other),
        }
    }

    #[test]
    fn test_blit_rejects_bad_areas() {
        let (mut display, wire) = driver(Orientation::Landscape, ColorOrder::Rgb);
        let pixels = [0u16; 256];

        let cases = [
            Rectangle::new(Point::new(230, 0), Size::new(16, 16)),
            Rectangle::new(Point::new(0, 120), Size::new(16, 16)),
            Rectangle::new(Point::new(-1, 0), Size::new(16, 16)),
            Rectangle::new(Point::new(0, -1), Size::new(16, 16)),
        ];
        for area in cases {
            assert_eq!(display.blit(area, &pixels), Err(Error::OutOfBounds), "{:?}", area);
        }

        let area = Rectangle::new(Point::new(0, 0), Size::new(16, 16));
        assert_eq!(display.blit(area, &pixels[..255]), Err(Error::SizeMismatch));

        assert!(wire.borrow().ops.is_empty());
    }

    #[test]
    fn test_empty_area_is_noop() {
        let (mut display, wire) = driver(Orientation::Landscape, ColorOrder::Rgb);
        let area = Rectangle::new(Point::new(5, 5), Size::zero());

        assert_eq!(display.blit(area, &[]), Ok(()));
        assert!(wire.borrow().ops.is_empty());
    }

    #[test]
    fn test_spi_error_propagates() {
        let (mut display, wire) = driver(Orientation::Landscape, ColorOrder::Rgb);
        wire.borrow_mut().fail_writes = true;

        let area = Rectangle::new(Point::zero(), Size::new(1, 1));
        assert_eq!(display.blit(area, &[0]), Err(Error::Spi(ErrorKind::Other)));
    }

    #[test]
    fn test_failed_transfer_releases_chip_select() {
        let (mut display, wire) = driver(Orientation::Landscape, ColorOrder::Rgb);
        wire.borrow_mut().fail_writes = true;

        let area = Rectangle::new(Point::zero(), Size::new(1, 1));
        assert!(display.blit(area, &[0]).is_err());
        assert_eq!(wire.borrow().ops, [Op::Select, Op::Deselect]);

        // Init fails on SWRESET, after the reset pulse
        assert!(display.init(&mut NoDelay).is_err());
        let wire = wire.borrow();
        assert_eq!(wire.ops.last(), Some(&Op::Deselect));
        let selects = wire.ops.iter().filter(|op| **op == Op::Select).count();
        assert_eq!(selects, 2);
    }
}
