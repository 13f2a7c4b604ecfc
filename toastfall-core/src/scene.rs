//! Scene context
//!
//! Owns everything one tick touches: the sprite set, the decoded sprite
//! sheet and the frame buffer. The run loop borrows it mutably; nothing
//! else holds on to any of it.

use embedded_graphics::prelude::Size;
use heapless::Vec;

use crate::bitmap::SpriteSheet;
use crate::config::{ConfigError, SceneConfig};
use crate::framebuffer::FrameBuffer;
use crate::sprite::{FrameRange, Motion, Sprite};
use crate::traits::{DisplaySink, RandomSource};

/// Maximum sprites in one scene
pub const MAX_SPRITES: usize = 8;

/// Errors that can occur while building a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SceneError {
    /// Roster is empty
    NoSprites,
    /// Roster exceeds [`MAX_SPRITES`]
    TooManySprites,
    /// Frame buffer size differs from the configured screen
    BufferSizeMismatch,
    /// Roster refers to frames the sheet does not have
    FrameOutOfRange,
    /// Configuration cannot host sprites of the sheet's size
    Config(ConfigError),
}

impl From<ConfigError> for SceneError {
    fn from(e: ConfigError) -> Self {
        SceneError::Config(e)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickSummary {
    /// Sprites that started or re-armed an avoidance maneuver
    pub evading: u8,
    /// Sprites with an avoidance maneuver still running after the tick
    pub avoiding: u8,
    /// Sprites that re-entered the screen
    pub respawned: u8,
    /// Sprites parked at the sentinel after the tick
    pub parked: u8,
    /// Sprites drawn into the frame buffer
    pub drawn: u8,
}

/// Sprites, sheet and frame buffer for one display
pub struct Scene<'a> {
    config: SceneConfig,
    sheet: SpriteSheet<'a>,
    framebuffer: FrameBuffer<'a>,
    sprites: Vec<Sprite, MAX_SPRITES>,
}

impl<'a> Scene<'a> {
    /// Build a scene, spawning one sprite per roster entry in order
    ///
    /// Each sprite gets a spawn point clear of the ones created before it
    /// (or the sentinel if none was free).
    pub fn new<R>(
        config: SceneConfig,
        sheet: SpriteSheet<'a>,
        framebuffer: FrameBuffer<'a>,
        roster: &[FrameRange],
        rng: &mut R,
    ) -> Result<Self, SceneError>
    where
        R: RandomSource + ?Sized,
    {
        if roster.is_empty() {
            return Err(SceneError::NoSprites);
        }
        if roster.len() > MAX_SPRITES {
            return Err(SceneError::TooManySprites);
        }
        if framebuffer.size() != config.screen {
            return Err(SceneError::BufferSizeMismatch);
        }
        if roster.iter().any(|frames| frames.end() > sheet.frame_count()) {
            return Err(SceneError::FrameOutOfRange);
        }

        let size: Size = sheet.size();
        config.validate(size)?;

        let mut sprites: Vec<Sprite, MAX_SPRITES> = Vec::new();
        for (id, &frames) in roster.iter().enumerate() {
            let sprite = Sprite::spawn(&config, id as u8, size, frames, &sprites, rng);
            sprites
                .push(sprite)
                .map_err(|_| SceneError::TooManySprites)?;
        }

        Ok(Self {
            config,
            sheet,
            framebuffer,
            sprites,
        })
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Active sprites in creation order
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Composited frame
    pub fn framebuffer(&self) -> &FrameBuffer<'a> {
        &self.framebuffer
    }

    /// Run one tick: clear, then move and draw every sprite in order
    pub fn tick<R>(&mut self, rng: &mut R) -> TickSummary
    where
        R: RandomSource + ?Sized,
    {
        let mut summary = TickSummary::default();
        self.framebuffer.clear(self.config.background);

        for i in 0..self.sprites.len() {
            // Others see this sprite's pre-move state; its own entry is skipped
            let mut sprite = self.sprites[i];
            match sprite.advance(&self.config, &self.sprites, rng) {
                Motion::Cruising => {}
                Motion::Evading => summary.evading += 1,
                Motion::Respawned => summary.respawned += 1,
                Motion::Parked => {}
            }
            self.sprites[i] = sprite;

            if sprite.is_avoiding() {
                summary.avoiding += 1;
            }
            if sprite.is_parked() {
                summary.parked += 1;
            }
            if self.draw(&sprite) {
                summary.drawn += 1;
            }
        }

        summary
    }

    /// Composite one sprite's current frame; sentinel sprites are skipped
    fn draw(&mut self, sprite: &Sprite) -> bool {
        if sprite.is_parked() {
            return false;
        }
        match self.sheet.frame(sprite.sheet_frame()) {
            Some(pixels) => {
                self.framebuffer.blit(sprite.position(), sprite.size(), pixels);
                true
            }
            None => false,
        }
    }

    /// Send the whole frame buffer to `display`
    pub fn present<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DisplaySink + ?Sized,
    {
        display.blit(self.framebuffer.bounding_box(), self.framebuffer.pixels())
    }
}
