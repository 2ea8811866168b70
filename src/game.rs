use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::Result;
use log::{debug, info};
use rand::Rng;

use crate::Cell;
use crate::apple::Apple;
use crate::config::Config;
use crate::geometry::Grid;
use crate::input::{EventSource, InputEvent};
use crate::render::{render_frame, Surface};
use crate::snake::Snake;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Caps the loop at a fixed number of ticks per second.
pub struct Clock {
    period: Duration,
    last_tick: Option<Instant>,
}

impl Clock {
    pub fn new(period: Duration) -> Self {
        Clock { period, last_tick: None }
    }

    /// Blocks until a full period has passed since the previous tick.
    pub fn tick(&mut self) {
        let wait = self.remaining(Instant::now());
        if wait > Duration::from_millis(0) {
            sleep(wait);
        }
        self.last_tick = Some(Instant::now());
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_tick {
            Some(last) => self.period.checked_sub(now.saturating_duration_since(last)).unwrap_or_default(),
            None => Duration::from_millis(0),
        }
    }
}

pub struct SnakeGame<R: Rng> {
    config: Config,
    grid: Grid,
    snake: Snake,
    apple: Apple,
    rng: R,
    wins: u32,
}

impl<R: Rng> SnakeGame<R> {
    pub fn new(config: Config, mut rng: R) -> Self {
        let grid = config.grid();
        let snake = Snake::new(grid.center());
        let mut apple = Apple::new(grid, &mut rng);
        if snake.occupies(apple.position()) {
            apple.place_avoiding(grid, &snake, &mut rng);
        }

        SnakeGame { config, grid, snake, apple, rng, wins: 0 }
    }

    #[cfg(test)]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[cfg(test)]
    pub fn apple(&self) -> &Apple {
        &self.apple
    }

    pub fn handle_input(&mut self, events: &[InputEvent]) -> Flow {
        for ev in events {
            match ev.direction() {
                Some(dir) => self.snake.set_pending_direction(dir),
                None => return Flow::Quit,
            }
        }

        Flow::Continue
    }

    pub fn update(&mut self) {
        self.snake.advance(self.grid);

        if self.snake.head() == self.apple.position() {
            self.snake.grow();
            match self.apple.place_avoiding(self.grid, &self.snake, &mut self.rng) {
                Some(cell) => debug!("Apple eaten, target length {}, next apple at {:?}", self.snake.length(), cell),
                None => self.board_filled(),
            }
        }

        if self.snake.self_collision() {
            info!("Snake bit itself at length {} heading {:?}, resetting", self.snake.len(), self.snake.direction());
            self.restart();
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) -> Result<()> {
        render_frame(surface, &self.config, &self.snake, &self.apple)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn center(&self) -> Cell {
        self.config.center()
    }

    // No free cell is left for the apple: count it as a win and start over.
    fn board_filled(&mut self) {
        self.wins += 1;
        info!("Board filled ({} cells), win #{}", self.grid.area(), self.wins);

        let center = self.center();
        self.snake.reset(center);
        self.apple.place_avoiding(self.grid, &self.snake, &mut self.rng);
    }

    fn restart(&mut self) {
        let center = self.center();
        self.snake.reset(center);
        if self.snake.occupies(self.apple.position()) {
            self.apple.place_avoiding(self.grid, &self.snake, &mut self.rng);
        }
    }
}

/// Runs until a quit event: tick, input, update, draw.
pub fn run<T, R>(ctx: &mut T, game: &mut SnakeGame<R>, clock: &mut Clock) -> Result<()>
where
    T: Surface + EventSource,
    R: Rng,
{
    game.draw(ctx)?;

    loop {
        clock.tick();

        let events = ctx.poll_events()?;
        if game.handle_input(&events) == Flow::Quit {
            info!("Quit requested");
            return Ok(());
        }

        game.update();
        game.draw(ctx)?;
    }
}
