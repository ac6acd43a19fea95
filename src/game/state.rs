use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::collision::CollisionKind;
use super::grid::Grid;
use super::item::{Item, SHRINK_SEGMENTS};
use super::obstacle::Obstacle;
use super::particles::Particle;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Boundary policy for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Edges are lethal
    Classic,
    /// Leaving one edge re-enters on the opposite one
    Portal,
    /// Edges are lethal and the field holds obstacles
    Obstacles,
}

impl GameMode {
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Portal => "Portal",
            GameMode::Obstacles => "Obstacles",
        }
    }
}

/// Timers that ran out during one decay step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiredTimers {
    pub ghost: bool,
    pub speed_boost: bool,
}

/// One player's snake
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    pub body: VecDeque<Position>,
    /// Direction of the last move
    pub direction: Direction,
    /// Direction the next move will take
    pub pending_direction: Direction,
    /// Ticks left of self/opponent collision immunity
    pub ghost_timer: u32,
    /// Ticks left of the speed multiplier
    pub speed_boost_timer: u32,
    /// Set once the snake has died this round
    pub death: Option<CollisionKind>,
}

impl Snake {
    /// Create a one-segment snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self::with_body([head], direction)
    }

    /// Create a snake from explicit segments, head first
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn with_body(segments: impl IntoIterator<Item = Position>, direction: Direction) -> Self {
        let body: VecDeque<Position> = segments.into_iter().collect();
        assert!(!body.is_empty(), "snake needs at least one segment");

        Self {
            body,
            direction,
            pending_direction: direction,
            ghost_timer: 0,
            speed_boost_timer: 0,
            death: None,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Never true for a constructed snake
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost_timer > 0
    }

    pub fn is_boosted(&self) -> bool {
        self.speed_boost_timer > 0
    }

    /// Queue a turn for the next move. Reversals are ignored.
    ///
    /// Returns whether the request was accepted.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if direction.is_opposite(self.direction) {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Push a new head in the pending direction. The tail is left alone.
    pub fn advance(&mut self) -> Position {
        self.direction = self.pending_direction;
        let new_head = self.head().moved_in_direction(self.direction);
        self.body.push_front(new_head);
        new_head
    }

    /// Drop the last segment, keeping at least one
    pub fn shrink_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    pub fn apply_shrink_penalty(&mut self) {
        for _ in 0..SHRINK_SEGMENTS {
            self.shrink_tail();
        }
    }

    /// Replace the head in place, used for portal wraparound
    pub fn set_head(&mut self, head: Position) {
        self.body[0] = head;
    }

    /// Count down status timers, reporting the ones that just ran out
    pub fn decay_timers(&mut self) -> ExpiredTimers {
        ExpiredTimers {
            ghost: decay(&mut self.ghost_timer),
            speed_boost: decay(&mut self.speed_boost_timer),
        }
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter().skip(1)
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().any(|&p| p == pos)
    }

    /// Check if any segment, head included, sits on the position
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }
}

/// Decrement a countdown, returning true on the tick it reaches zero
fn decay(timer: &mut u32) -> bool {
    if *timer == 0 {
        return false;
    }
    *timer -= 1;
    *timer == 0
}

/// How a round ended, decided on score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Solo { score: u32 },
    Winner { player: usize, score: u32 },
    Tie { score: u32 },
}

/// Complete state of one round
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub grid: Grid,
    pub mode: GameMode,
    /// One snake per player, player one first
    pub snakes: Vec<Snake>,
    /// Score per player, same order as `snakes`
    pub scores: Vec<u32>,
    pub items: Vec<Item>,
    pub obstacles: Vec<Obstacle>,
    pub particles: Vec<Particle>,
    pub level: u32,
    /// Ticks left of the global slow effect
    pub slow_timer: u32,
    pub elapsed_ticks: u64,
    pub is_over: bool,
}

impl GameState {
    /// Create a new game state
    pub fn new(grid: Grid, mode: GameMode, snakes: Vec<Snake>) -> Self {
        let scores = vec![0; snakes.len()];
        Self {
            grid,
            mode,
            snakes,
            scores,
            items: Vec::new(),
            obstacles: Vec::new(),
            particles: Vec::new(),
            level: 1,
            slow_timer: 0,
            elapsed_ticks: 0,
            is_over: false,
        }
    }

    pub fn is_two_player(&self) -> bool {
        self.snakes.len() > 1
    }

    pub fn slow_active(&self) -> bool {
        self.slow_timer > 0
    }

    /// Score the level is derived from: pooled across players
    pub fn total_score(&self) -> u32 {
        self.scores.iter().sum()
    }

    pub fn best_score(&self) -> u32 {
        self.scores.iter().copied().max().unwrap_or(0)
    }

    /// Single-player score, or the player with the strictly highest score
    pub fn outcome(&self) -> RoundOutcome {
        let best = self.best_score();
        if !self.is_two_player() {
            return RoundOutcome::Solo { score: best };
        }

        let mut leaders = self.scores.iter().enumerate().filter(|(_, s)| **s == best);
        match (leaders.next(), leaders.next()) {
            (Some((player, _)), None) => RoundOutcome::Winner {
                player,
                score: best,
            },
            _ => RoundOutcome::Tie { score: best },
        }
    }

    pub fn item_index_at(&self, pos: Position) -> Option<usize> {
        self.items.iter().position(|item| item.position == pos)
    }

    /// Check if a position is occupied by any snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snakes.iter().any(|snake| snake.occupies(pos))
    }

    /// Cells taken by snakes, items and obstacles
    pub fn occupied_cells(&self) -> HashSet<Position> {
        self.snakes
            .iter()
            .flat_map(|snake| snake.body.iter().copied())
            .chain(self.items.iter().map(|item| item.position))
            .chain(self.obstacles.iter().map(|obstacle| obstacle.position))
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.snakes.iter().filter(|snake| snake.is_alive()).count()
    }
}
