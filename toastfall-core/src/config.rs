//! Scene configuration
//!
//! Compile-time tunables for the animation. The defaults reproduce the
//! classic look on a 240x135 landscape panel.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor, Size};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Screen has a zero dimension
    ZeroScreen,
    /// Sprite wider than half the screen cannot use the top-edge spawn band
    SpriteTooWide,
    /// Sprite taller than half the screen would spawn past the bottom edge
    SpriteTooTall,
    /// Respawn speed range is empty or not leftward
    InvalidSpeedRange,
    /// Avoidance maneuver of zero ticks would never restore the saved velocity
    ZeroAvoidance,
}

/// Animation tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SceneConfig {
    /// Screen size in pixels
    pub screen: Size,
    /// Colour the frame buffer is cleared to every tick
    pub background: Rgb565,
    /// Pause between ticks (ms)
    pub tick_delay_ms: u32,
    /// Ticks an avoidance maneuver lasts
    pub avoidance_ticks: u8,
    /// Velocity forced while avoiding (pixels per tick)
    pub evasive_velocity: Point,
    /// Slowest leftward speed picked on respawn (pixels per tick)
    pub min_speed: i32,
    /// Fastest leftward speed picked on respawn (pixels per tick)
    pub max_speed: i32,
    /// Downward speed after respawn (pixels per tick)
    pub fall_speed: i32,
    /// Row used for spawns along the top edge
    pub top_spawn_row: i32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            screen: Size::new(240, 135),
            background: Rgb565::BLACK,
            tick_delay_ms: 10,
            avoidance_ticks: 32,
            evasive_velocity: Point::new(-1, 3),
            min_speed: 2,
            max_speed: 5,
            fall_speed: 2,
            top_spawn_row: 1,
        }
    }
}

impl SceneConfig {
    /// Screen width as a signed coordinate
    pub fn width(&self) -> i32 {
        self.screen.width as i32
    }

    /// Screen height as a signed coordinate
    pub fn height(&self) -> i32 {
        self.screen.height as i32
    }

    /// Check that sprites of `sprite` size always spawn fully on screen
    pub fn validate(&self, sprite: Size) -> Result<(), ConfigError> {
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(ConfigError::ZeroScreen);
        }

        // Top-edge spawns pick a column in [width / 2, width - sprite width]
        if sprite.width == 0 || sprite.width > self.screen.width / 2 {
            return Err(ConfigError::SpriteTooWide);
        }

        // Right-edge spawns pick a row in [1, height / 2]
        let lowest_row = (self.height() / 2).max(self.top_spawn_row);
        if sprite.height == 0 || lowest_row + sprite.height as i32 > self.height() {
            return Err(ConfigError::SpriteTooTall);
        }

        if self.min_speed < 1 || self.max_speed < self.min_speed {
            return Err(ConfigError::InvalidSpeedRange);
        }

        if self.avoidance_ticks == 0 {
            return Err(ConfigError::ZeroAvoidance);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_accept_toaster_sprites() {
        let config = SceneConfig::default();
        assert_eq!(config.validate(Size::new(32, 32)), Ok(()));
        assert_eq!(config.validate(Size::new(64, 64)), Ok(()));
    }

    #[test]
    fn test_rejects_oversized_sprites() {
        let config = SceneConfig::default();
        assert_eq!(
            config.validate(Size::new(121, 32)),
            Err(ConfigError::SpriteTooWide)
        );
        assert_eq!(
            config.validate(Size::new(32, 70)),
            Err(ConfigError::SpriteTooTall)
        );
    }

    #[test]
    fn test_rejects_bad_speed_range() {
        let config = SceneConfig {
            min_speed: 4,
            max_speed: 3,
            ..Default::default()
        };
        assert_eq!(
            config.validate(Size::new(32, 32)),
            Err(ConfigError::InvalidSpeedRange)
        );
    }

    #[test]
    fn test_rejects_zero_avoidance() {
        let config = SceneConfig {
            avoidance_ticks: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(Size::new(32, 32)),
            Err(ConfigError::ZeroAvoidance)
        );
    }

    #[test]
    fn test_rejects_zero_screen() {
        let config = SceneConfig {
            screen: Size::new(0, 135),
            ..Default::default()
        };
        assert_eq!(config.validate(Size::new(32, 32)), Err(ConfigError::ZeroScreen));
    }
}
