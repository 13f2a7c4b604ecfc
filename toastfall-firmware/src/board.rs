//! Board wiring
//!
//! Waveshare Pico-LCD-1.14 on a Raspberry Pi Pico:
//!
//! | Signal | GPIO |
//! |--------|------|
//! | LCD_DC | 8    |
//! | LCD_CS | 9    |
//! | LCD_CLK (SPI1 SCK) | 10 |
//! | LCD_DIN (SPI1 TX)  | 11 |
//! | LCD_RST | 12  |
//! | LCD_BL  | 13  |
//!
//! Pin assignments are typed peripherals, so they are taken in `main`;
//! everything else about the board lives here.

use embassy_rp::spi::{Config as SpiConfig, Phase, Polarity};
use toastfall_drivers::display::{ColorOrder, Orientation};

/// SPI clock for the panel (ST7789 write cycle is 16 ns minimum)
pub const SPI_FREQUENCY_HZ: u32 = 40_000_000;

/// Panel mounted with the USB connector on the left
pub const ORIENTATION: Orientation = Orientation::Landscape;

pub const COLOR_ORDER: ColorOrder = ColorOrder::Bgr;

/// SPI mode 0, MSB first
pub fn display_spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = SPI_FREQUENCY_HZ;
    config.phase = Phase::CaptureOnFirstTransition;
    config.polarity = Polarity::IdleLow;
    config
}
