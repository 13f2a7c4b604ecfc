//! Fixed-timestep run loop
//!
//! Tick, present, sleep, repeat. The loop only ends when the display
//! reports an error; whichever way it ends (error return or unwinding
//! panic) the shutdown hook runs exactly once. With `panic = "abort"`
//! nothing unwinds, so a panic skips the hook.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::scene::{Scene, TickSummary};
use crate::traits::{DisplaySink, RandomSource};

/// Callbacks from the run loop
pub trait RunHooks {
    /// Called after every frame has been sent to the display
    fn frame_presented(&mut self, _frame: u32, _summary: &TickSummary) {}

    /// Called once when the loop ends
    ///
    /// Runs on a display error and while unwinding from a panic. Builds
    /// with `panic = "abort"` (the firmware profiles) never unwind, so
    /// there the panic handler is the only notice.
    fn shutdown(&mut self);
}

/// Runs [`RunHooks::shutdown`] when dropped
struct ShutdownGuard<H: RunHooks> {
    hooks: H,
}

impl<H: RunHooks> Drop for ShutdownGuard<H> {
    fn drop(&mut self) {
        self.hooks.shutdown();
    }
}

/// Animate `scene` on `display` until the display fails
///
/// Only returns on a display error, which is handed back to the caller
/// after the shutdown hook has run.
pub fn run<D, R, T, H>(
    scene: &mut Scene<'_>,
    display: &mut D,
    rng: &mut R,
    delay: &mut T,
    hooks: H,
) -> Result<Infallible, D::Error>
where
    D: DisplaySink + ?Sized,
    R: RandomSource + ?Sized,
    T: DelayNs + ?Sized,
    H: RunHooks,
{
    let mut guard = ShutdownGuard { hooks };
    let tick_delay_ms = scene.config().tick_delay_ms;
    let mut frame: u32 = 0;

    loop {
        let summary = scene.tick(rng);
        scene.present(display)?;
        guard.hooks.frame_presented(frame, &summary);
        frame = frame.wrapping_add(1);
        delay.delay_ms(tick_delay_ms);
    }
}
