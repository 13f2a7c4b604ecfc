//! Spawn placement
//!
//! Picks an entry point along the top or right edge of the screen. A
//! blocked candidate is not retried: the sprite parks at the sentinel for a
//! tick and tries again once the others have moved on.

use embedded_graphics::prelude::{Point, Size};

use crate::config::SceneConfig;
use crate::geometry::{overlaps, rect, SENTINEL};
use crate::sprite::Sprite;
use crate::traits::RandomSource;

/// Choose a spawn point for sprite `id` of the given size
///
/// Returns [`SENTINEL`] when the candidate overlaps any other sprite.
pub fn spawn_point<R>(
    config: &SceneConfig,
    id: u8,
    size: Size,
    sprites: &[Sprite],
    rng: &mut R,
) -> Point
where
    R: RandomSource + ?Sized,
{
    let candidate = if rng.bit() {
        // Along the top, somewhere in the right half
        let col = rng.range_inclusive(config.width() / 2, config.width() - size.width as i32);
        Point::new(col, config.top_spawn_row)
    } else {
        // Down the right edge, somewhere in the top half
        let row = rng.range_inclusive(1, config.height() / 2);
        Point::new(config.width() - size.width as i32, row)
    };

    let area = rect(candidate, size);
    let blocked = sprites
        .iter()
        .filter(|other| other.id() != id)
        .any(|other| overlaps(&area, &other.bounds()));

    if blocked {
        SENTINEL
    } else {
        candidate
    }
}
