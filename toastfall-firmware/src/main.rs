//! Toastfall - Flying Toasters Firmware
//!
//! Main firmware binary for RP2040 boards with a 240x135 ST7789 panel.
//! Toasters flap across the screen from the top-right, toast tumbles
//! along with them, and anything about to collide swerves out of the way.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::Spi;
use embassy_time::Delay;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use static_cell::ConstStaticCell;
use {defmt_rtt as _, panic_probe as _};

use toastfall_assets::{SHEET_PIXELS, TOASTERS, TOASTER_FRAMES, TOAST_FRAMES};
use toastfall_core::{run, FrameBuffer, FrameRange, RunHooks, Scene, SceneConfig, TickSummary};
use toastfall_drivers::display::St7789;

mod board;

const SCREEN_PIXELS: usize = 240 * 135;

/// Creation order; later entries are drawn on top
const ROSTER: [FrameRange; 5] = [
    TOAST_FRAMES,
    TOASTER_FRAMES,
    TOAST_FRAMES,
    TOASTER_FRAMES,
    TOASTER_FRAMES,
];

/// Log a heartbeat every minute at the default 10 ms tick
const HEARTBEAT_FRAMES: u32 = 6000;

// Static cells for the frame buffer and decoded sheet (must live forever)
static FRAME: ConstStaticCell<[u16; SCREEN_PIXELS]> = ConstStaticCell::new([0; SCREEN_PIXELS]);
static SHEET: ConstStaticCell<[u16; SHEET_PIXELS]> = ConstStaticCell::new([0; SHEET_PIXELS]);

/// Run loop telemetry over RTT
///
/// Panics abort on target, so `shutdown` only logs for display errors;
/// panic-probe prints the panic message itself.
struct Telemetry;

impl RunHooks for Telemetry {
    fn frame_presented(&mut self, frame: u32, summary: &TickSummary) {
        if summary.evading > 0 {
            trace!("frame {}: {} sprite(s) evading", frame, summary.evading);
        }
        if frame % HEARTBEAT_FRAMES == 0 {
            debug!("frame {}: {}", frame, summary);
        }
    }

    fn shutdown(&mut self) {
        info!("done");
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Toastfall firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Waveshare Pico-LCD-1.14 on SPI1 (see board.rs)
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, board::display_spi_config());
    let dc = Output::new(p.PIN_8, Level::Low);
    let cs = Output::new(p.PIN_9, Level::High);
    let rst = Output::new(p.PIN_12, Level::High);
    let _backlight = Output::new(p.PIN_13, Level::High);

    let mut display = St7789::new(spi, dc, cs, rst, board::ORIENTATION, board::COLOR_ORDER);
    let mut delay = Delay;
    if let Err(e) = display.init(&mut delay) {
        error!("Display init failed: {:?}", Debug2Format(&e));
        park();
    }
    info!("Display initialized ({} MHz SPI)", board::SPI_FREQUENCY_HZ / 1_000_000);

    let sheet = match TOASTERS.decode_sheet(SHEET.take()) {
        Ok(sheet) => sheet,
        Err(e) => {
            error!("Sprite sheet decode failed: {}", e);
            park();
        }
    };
    info!("Decoded {} sprite frames", sheet.frame_count());

    let config = SceneConfig {
        screen: board::ORIENTATION.size(),
        ..SceneConfig::default()
    };

    let Some(framebuffer) = FrameBuffer::new(config.screen, FRAME.take()) else {
        error!("Frame buffer does not match a {}x{} screen", config.width(), config.height());
        park();
    };

    let mut rng = SmallRng::seed_from_u64(RoscRng.next_u64());

    let mut scene = match Scene::new(config, sheet, framebuffer, &ROSTER, &mut rng) {
        Ok(scene) => scene,
        Err(e) => {
            error!("Scene setup failed: {}", e);
            park();
        }
    };
    for sprite in scene.sprites() {
        debug!(
            "sprite {} at ({}, {})",
            sprite.id(),
            sprite.position().x,
            sprite.position().y
        );
    }
    info!("Scene ready, {} sprites", scene.sprites().len());

    match run(&mut scene, &mut display, &mut rng, &mut delay, Telemetry) {
        Ok(never) => match never {},
        Err(e) => error!("Display failed: {:?}", Debug2Format(&e)),
    }

    park();
}

/// Nothing left to do; sleep until reset
fn park() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
