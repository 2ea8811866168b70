use std::collections::VecDeque;

use crate::Cell;
use crate::geometry::{Direction, Grid};

const START_DIRECTION: Direction = Direction::Right;

pub struct Snake {
    // Head first
    body: VecDeque<Cell>,
    length: usize,
    direction: Direction,
    pending: Option<Direction>,
}

impl Snake {
    pub fn new(start: Cell) -> Self {
        Snake::with_body(vec![start], START_DIRECTION)
    }

    /// Builds a snake from explicit cells, head first. The target length is the number of cells.
    pub fn with_body(positions: Vec<Cell>, direction: Direction) -> Self {
        assert!(!positions.is_empty(), "a snake needs at least a head");
        let length = positions.len();
        Snake { body: positions.into(), length, direction, pending: None }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn positions(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[cfg(test)]
    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Buffers a turn for the next `advance`. Reversing onto the body is ignored,
    /// and a later call in the same tick overwrites an earlier one.
    pub fn set_pending_direction(&mut self, direction: Direction) {
        if direction != self.direction.opposite() {
            self.pending = Some(direction);
        }
    }

    pub fn advance(&mut self, grid: Grid) {
        if let Some(dir) = self.pending.take() {
            self.direction = dir;
        }

        let new_head = grid.step(self.head(), self.direction);
        debug_assert!(grid.contains(new_head));
        self.body.push_front(new_head);

        if self.body.len() > self.length {
            self.body.pop_back();
        }
    }

    pub fn grow(&mut self) {
        self.length += 1;
    }

    pub fn self_collision(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|&cell| cell == head)
    }

    pub fn reset(&mut self, start: Cell) {
        self.body.clear();
        self.body.push_back(start);
        self.length = 1;
        self.direction = START_DIRECTION;
        self.pending = None;
    }
}
