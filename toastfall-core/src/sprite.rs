//! Sprite state and the per-tick movement rule
//!
//! Each sprite is either cruising along its velocity or running an
//! avoidance maneuver (timer > 0). The movement rule is deterministic given
//! the random source, so replaying a seed replays the whole animation.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::config::SceneConfig;
use crate::geometry::{overlaps, rect, SENTINEL};
use crate::spawn::spawn_point;
use crate::traits::RandomSource;

/// Contiguous run of frames in the sprite sheet used by one animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameRange {
    start: u8,
    len: u8,
}

impl FrameRange {
    /// Create a range of `len` frames starting at sheet frame `start`
    ///
    /// A zero length is bumped to one so every sprite has a frame to show.
    pub const fn new(start: u8, len: u8) -> Self {
        Self {
            start,
            len: if len == 0 { 1 } else { len },
        }
    }

    /// First sheet frame
    pub const fn start(&self) -> u8 {
        self.start
    }

    /// Number of frames in the animation
    pub const fn count(&self) -> u8 {
        self.len
    }

    /// One past the last sheet frame
    pub const fn end(&self) -> usize {
        self.start as usize + self.len as usize
    }
}

/// What a sprite did during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motion {
    /// Moved along its current velocity
    Cruising,
    /// Started (or re-armed) an avoidance maneuver
    Evading,
    /// Left the screen and re-entered at a new spawn point
    Respawned,
    /// Left the screen, spawn point was blocked, now parked at the sentinel
    Parked,
}

/// One moving, animated sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sprite {
    id: u8,
    position: Point,
    previous: Point,
    velocity: Point,
    saved_velocity: Point,
    size: Size,
    frames: FrameRange,
    step: u8,
    avoidance: u8,
}

impl Sprite {
    /// Create a sprite at a known position
    pub const fn new(
        id: u8,
        position: Point,
        size: Size,
        frames: FrameRange,
        velocity: Point,
    ) -> Self {
        Self {
            id,
            position,
            previous: position,
            velocity,
            saved_velocity: velocity,
            size,
            frames,
            step: 0,
            avoidance: 0,
        }
    }

    /// Create a sprite at a random spawn point clear of `sprites`
    ///
    /// Also picks a random starting animation frame (multi-frame sprites
    /// only) and a random leftward speed.
    pub fn spawn<R>(
        config: &SceneConfig,
        id: u8,
        size: Size,
        frames: FrameRange,
        sprites: &[Sprite],
        rng: &mut R,
    ) -> Self
    where
        R: RandomSource + ?Sized,
    {
        let position = spawn_point(config, id, size, sprites, rng);
        let mut sprite = Self::new(id, position, size, frames, SENTINEL);

        if frames.count() > 1 {
            sprite.step = rng.range_inclusive(0, frames.count() as i32 - 1) as u8;
        }

        sprite.velocity = entry_velocity(config, rng);
        sprite.saved_velocity = sprite.velocity;
        sprite
    }

    /// Identity index (creation order)
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Current top-left corner
    pub fn position(&self) -> Point {
        self.position
    }

    /// Top-left corner before the last tick
    pub fn previous_position(&self) -> Point {
        self.previous
    }

    /// Current velocity (pixels per tick)
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Velocity restored when an avoidance maneuver ends
    pub fn saved_velocity(&self) -> Point {
        self.saved_velocity
    }

    /// Sprite size in pixels
    pub fn size(&self) -> Size {
        self.size
    }

    /// Animation frames this sprite cycles through
    pub fn frames(&self) -> FrameRange {
        self.frames
    }

    /// Current frame index within the animation, in `[0, frame_count)`
    pub fn frame_index(&self) -> u8 {
        self.step
    }

    /// Current frame index within the sprite sheet
    pub fn sheet_frame(&self) -> usize {
        self.frames.start() as usize + self.step as usize
    }

    /// Ticks left in the current avoidance maneuver (0 when cruising)
    pub fn avoidance_ticks(&self) -> u8 {
        self.avoidance
    }

    /// Check if an avoidance maneuver is running
    pub fn is_avoiding(&self) -> bool {
        self.avoidance > 0
    }

    /// Check if the sprite is parked at the sentinel (not drawn)
    pub fn is_parked(&self) -> bool {
        self.position == SENTINEL
    }

    /// Bounding rectangle at the current position
    pub fn bounds(&self) -> Rectangle {
        rect(self.position, self.size)
    }

    /// Advance one tick
    ///
    /// `sprites` is the whole active set; the entry with this sprite's id
    /// is skipped, so passing a slice that still holds a stale copy of
    /// this sprite is fine.
    pub fn advance<R>(&mut self, config: &SceneConfig, sprites: &[Sprite], rng: &mut R) -> Motion
    where
        R: RandomSource + ?Sized,
    {
        let mut motion = Motion::Cruising;

        if self.frames.count() > 1 {
            self.step = (self.step + 1) % self.frames.count();
        }

        self.previous = self.position;
        let mut next = self.position + self.velocity;

        // Dip under anything we are about to run into from the right.
        // The last hit in the scan wins; there is no early exit.
        for other in sprites.iter().filter(|other| other.id != self.id) {
            if overlaps(&rect(next, self.size), &other.bounds())
                && self.position.x > other.position.x
            {
                self.avoidance = config.avoidance_ticks;
                self.velocity = config.evasive_velocity;
                next = self.position + self.velocity;
                motion = Motion::Evading;
            }
        }

        self.position = next;

        if self.position.x <= 0 || self.position.y + self.size.height as i32 > config.height() {
            self.velocity = entry_velocity(config, rng);
            self.saved_velocity = self.velocity;
            self.position = spawn_point(config, self.id, self.size, sprites, rng);
            motion = if self.is_parked() {
                Motion::Parked
            } else {
                Motion::Respawned
            };
        }

        if self.avoidance > 0 {
            self.avoidance -= 1;
            if self.avoidance == 0 {
                self.velocity = self.saved_velocity;
            }
        }

        motion
    }
}

/// Fresh leftward and downward velocity for a newly entering sprite
fn entry_velocity<R>(config: &SceneConfig, rng: &mut R) -> Point
where
    R: RandomSource + ?Sized,
{
    let speed = rng.range_inclusive(config.min_speed, config.max_speed);
    Point::new(-speed, config.fall_speed)
}
