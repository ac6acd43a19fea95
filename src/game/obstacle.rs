use rand::Rng;

use super::action::Direction;
use super::grid::Grid;
use super::state::Position;

/// Ticks between direction changes of a moving obstacle
pub const REDIRECT_INTERVAL: u32 = 60;

/// A cell blocker for the obstacles mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub position: Position,
    pub moving: bool,
    pub direction: Direction,
    move_timer: u32,
}

impl Obstacle {
    pub fn new(position: Position, moving: bool, direction: Direction) -> Self {
        Self {
            position,
            moving,
            direction,
            move_timer: 0,
        }
    }

    pub fn fixed(position: Position) -> Self {
        Self::new(position, false, Direction::Right)
    }

    /// Step a moving obstacle one cell, picking a fresh direction every
    /// `REDIRECT_INTERVAL` ticks. A step that would leave the grid is skipped.
    pub fn update<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) {
        if !self.moving {
            return;
        }

        self.move_timer += 1;
        if self.move_timer >= REDIRECT_INTERVAL {
            self.direction = Direction::random(rng);
            self.move_timer = 0;
        }

        let next = self.position.moved_in_direction(self.direction);
        if grid.in_bounds(next) {
            self.position = next;
        }
    }
}
