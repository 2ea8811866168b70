use std::time::Duration;

use anyhow::{bail, Result};

use crate::geometry::Grid;
use crate::{Cell, GridInt};

pub const SCREEN_WIDTH: u32 = 640;
pub const SCREEN_HEIGHT: u32 = 480;
pub const CELL_SIZE: u32 = 20;
pub const TICKS_PER_SECOND: u32 = 20;
pub const LOG_FILE: &str = "snake.log";

pub const BACKGROUND_COLOR: Rgb = Rgb(0, 0, 0);
pub const BORDER_COLOR: Rgb = Rgb(93, 216, 228);
pub const APPLE_COLOR: Rgb = Rgb(255, 0, 0);
pub const SNAKE_COLOR: Rgb = Rgb(0, 255, 0);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub border: Rgb,
    pub apple: Rgb,
    pub snake: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            background: BACKGROUND_COLOR,
            border: BORDER_COLOR,
            apple: APPLE_COLOR,
            snake: SNAKE_COLOR,
        }
    }
}

/// Everything the game needs to know about screen geometry, pacing and colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub screen_width: u32,
    pub screen_height: u32,
    pub cell_size: u32,
    pub ticks_per_second: u32,
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            cell_size: CELL_SIZE,
            ticks_per_second: TICKS_PER_SECOND,
            palette: Palette::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            bail!("cell size must be positive");
        }

        if self.ticks_per_second == 0 {
            bail!("tick rate must be positive");
        }

        for (name, px) in [("width", self.screen_width), ("height", self.screen_height)].iter() {
            if *px == 0 || px % self.cell_size != 0 {
                bail!("screen {} {} is not a positive multiple of cell size {}", name, px, self.cell_size);
            }

            if px / self.cell_size > GridInt::MAX as u32 {
                bail!("screen {} {} gives more than {} cells", name, px, GridInt::MAX);
            }
        }

        Ok(())
    }

    /// The cell grid covering the screen. Only meaningful on a validated config.
    pub fn grid(&self) -> Grid {
        Grid::new(
            (self.screen_width / self.cell_size) as GridInt,
            (self.screen_height / self.cell_size) as GridInt,
        )
    }

    pub fn center(&self) -> Cell {
        self.grid().center()
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_gives_32_by_24_grid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid(), Grid::new(32, 24));
        assert_eq!(config.center(), (16, 12));
    }

    #[test]
    fn default_tick_period_is_50ms() {
        assert_eq!(Config::default().tick_period(), Duration::from_millis(50));
    }

    #[test]
    fn rejects_zero_cell_size() {
        let config = Config { cell_size: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_tick_rate() {
        let config = Config { ticks_per_second: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_screen_not_multiple_of_cell() {
        let config = Config { screen_width: 650, ..Config::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("width 650"));
    }

    #[test]
    fn rejects_empty_screen() {
        let config = Config { screen_height: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }
}
