use anyhow::Result;

use crate::apple::Apple;
use crate::config::{Config, Rgb};
use crate::geometry::{cell_rect, PixelRect};
use crate::snake::Snake;

/// Whatever the game draws on. Coordinates are in pixels.
pub trait Surface {
    fn fill(&mut self, color: Rgb);

    /// Filled rectangle with a one-unit outline.
    fn fill_rect(&mut self, rect: PixelRect, fill: Rgb, outline: Rgb);

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgb);

    fn present(&mut self) -> Result<()>;
}

pub trait Drawable {
    fn draw(&self, surface: &mut dyn Surface, config: &Config);
}

impl Drawable for Apple {
    fn draw(&self, surface: &mut dyn Surface, config: &Config) {
        let rect = cell_rect(self.position(), config.cell_size);
        surface.fill_rect(rect, config.palette.apple, config.palette.border);
    }
}

impl Drawable for Snake {
    fn draw(&self, surface: &mut dyn Surface, config: &Config) {
        for cell in self.positions() {
            let rect = cell_rect(cell, config.cell_size);
            surface.fill_rect(rect, config.palette.snake, config.palette.border);
        }
    }
}

pub fn render_frame(surface: &mut dyn Surface, config: &Config, snake: &Snake, apple: &Apple) -> Result<()> {
    let palette = &config.palette;
    surface.fill(palette.background);
    surface.stroke_rect(PixelRect::new(0, 0, config.screen_width, config.screen_height), palette.border);

    apple.draw(surface, config);
    snake.draw(surface, config);

    surface.present()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::geometry::{Direction, Grid};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug, PartialEq)]
    pub enum Call {
        Fill(Rgb),
        FillRect(PixelRect, Rgb, Rgb),
        StrokeRect(PixelRect, Rgb),
        Present,
    }

    /// Records every drawing call instead of drawing.
    #[derive(Default)]
    pub struct Recorder {
        pub calls: Vec<Call>,
    }

    impl Surface for Recorder {
        fn fill(&mut self, color: Rgb) {
            self.calls.push(Call::Fill(color));
        }

        fn fill_rect(&mut self, rect: PixelRect, fill: Rgb, outline: Rgb) {
            self.calls.push(Call::FillRect(rect, fill, outline));
        }

        fn stroke_rect(&mut self, rect: PixelRect, color: Rgb) {
            self.calls.push(Call::StrokeRect(rect, color));
        }

        fn present(&mut self) -> Result<()> {
            self.calls.push(Call::Present);
            Ok(())
        }
    }

    #[test]
    fn frame_draws_background_border_apple_snake_in_order() {
        let config = Config::default();
        let palette = config.palette;
        let mut rng = StdRng::seed_from_u64(9);
        let mut apple = Apple::new(Grid::new(32, 24), &mut rng);
        let snake = Snake::with_body(vec![(5, 5), (4, 5)], Direction::Right);
        apple.place_avoiding(config.grid(), &snake, &mut rng).unwrap();

        let mut surface = Recorder::default();
        render_frame(&mut surface, &config, &snake, &apple).unwrap();

        assert_eq!(surface.calls, vec![
            Call::Fill(palette.background),
            Call::StrokeRect(PixelRect::new(0, 0, 640, 480), palette.border),
            Call::FillRect(cell_rect(apple.position(), 20), palette.apple, palette.border),
            Call::FillRect(PixelRect::new(100, 100, 20, 20), palette.snake, palette.border),
            Call::FillRect(PixelRect::new(80, 100, 20, 20), palette.snake, palette.border),
            Call::Present,
        ]);
    }
}
