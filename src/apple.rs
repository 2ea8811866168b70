use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::Cell;
use crate::geometry::Grid;
use crate::snake::Snake;

pub struct Apple {
    position: Cell,
}

impl Apple {
    pub fn new<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Self {
        let mut apple = Apple { position: (0, 0) };
        apple.place_random(grid, rng);
        apple
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    #[cfg(test)]
    pub fn set_position(&mut self, cell: Cell) {
        self.position = cell;
    }

    pub fn place_random<R: Rng + ?Sized>(&mut self, grid: Grid, rng: &mut R) -> Cell {
        self.position = (rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()));
        self.position
    }

    /// Moves the apple to a uniformly chosen cell the snake does not cover.
    /// Returns `None`, leaving the apple where it was, if the snake fills the board.
    pub fn place_avoiding<R: Rng + ?Sized>(&mut self, grid: Grid, snake: &Snake, rng: &mut R) -> Option<Cell> {
        let occupied: HashSet<Cell> = snake.positions().collect();
        let free: Vec<Cell> = grid.cells().filter(|cell| !occupied.contains(cell)).collect();

        let choice = free.choose(rng).copied()?;
        self.position = choice;
        Some(choice)
    }
}
