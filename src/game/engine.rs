use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::{
    action::Direction,
    collision::{self, CollisionKind, CollisionOutcome},
    config::{EliminationRule, GameConfig},
    grid::Grid,
    item::{Effect, ItemKind},
    particles,
    spawner::{Spawner, place_obstacles},
    state::{GameMode, GameState, Position, Snake},
};

/// Something that happened during a tick, for cues, HUD and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    ItemEaten {
        player: usize,
        kind: ItemKind,
        points: u32,
    },
    LevelUp {
        level: u32,
    },
    SlowExpired,
    GhostExpired {
        player: usize,
    },
    SpeedBoostExpired {
        player: usize,
    },
    SnakeDied {
        player: usize,
        cause: CollisionKind,
    },
}

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    pub events: Vec<TickEvent>,
}

impl StepInfo {
    /// Whether the given player ate anything this step
    pub fn ate_food(&self, player: usize) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TickEvent::ItemEaten { player: p, .. } if *p == player))
    }

    /// Players that died this step, with the cause
    pub fn deaths(&self) -> impl Iterator<Item = (usize, CollisionKind)> + '_ {
        self.events.iter().filter_map(|e| match e {
            TickEvent::SnakeDied { player, cause } => Some((*player, *cause)),
            _ => None,
        })
    }

    pub fn leveled_up(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TickEvent::LevelUp { .. }))
    }
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the round has ended
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// Level reached with a cumulative score
pub fn level_for_score(total_score: u32, divisor: u32) -> u32 {
    total_score / divisor.max(1) + 1
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    spawner: Spawner,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose rounds replay identically for the same seed
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let spawner = Spawner::new(config.item_weights.clone());
        Self {
            config,
            spawner,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a fresh round
    pub fn reset(&mut self, mode: GameMode, two_player: bool) -> GameState {
        let grid = Grid::new(self.config.grid_width, self.config.grid_height);

        let mut snakes = vec![Snake::new(grid.center(), Direction::Right)];
        if two_player {
            let start = Position::new((grid.width / 4) as i32, (grid.height / 2) as i32);
            snakes.push(Snake::new(start, Direction::Right));
        }

        let mut state = GameState::new(grid, mode, snakes);

        if mode == GameMode::Obstacles {
            let occupied = state.occupied_cells();
            state.obstacles = place_obstacles(
                &grid,
                &occupied,
                self.config.obstacle_count,
                self.config.moving_obstacle_chance,
                &mut self.rng,
            );
        }

        self.stock_items(&mut state);

        info!(
            mode = mode.label(),
            two_player,
            width = grid.width,
            height = grid.height,
            obstacles = state.obstacles.len(),
            "round started"
        );

        state
    }

    /// Queue a turn for a player; reversals and dead snakes are ignored
    pub fn set_direction(
        &self,
        state: &mut GameState,
        player: usize,
        direction: Direction,
    ) -> bool {
        match state.snakes.get_mut(player) {
            Some(snake) if snake.is_alive() => snake.set_direction(direction),
            _ => false,
        }
    }

    /// Execute one tick of the game
    pub fn step(&mut self, state: &mut GameState) -> StepResult {
        if state.is_over {
            return StepResult {
                terminated: true,
                info: StepInfo::default(),
            };
        }

        let mut info = StepInfo::default();
        let grid = state.grid;

        for obstacle in state.obstacles.iter_mut() {
            obstacle.update(&grid, &mut self.rng);
        }

        self.stock_items(state);

        if state.slow_timer > 0 {
            state.slow_timer -= 1;
            if state.slow_timer == 0 {
                info.events.push(TickEvent::SlowExpired);
            }
        }
        particles::update_all(&mut state.particles);

        for (player, snake) in state.snakes.iter_mut().enumerate() {
            if !snake.is_alive() {
                continue;
            }
            let expired = snake.decay_timers();
            if expired.ghost {
                info.events.push(TickEvent::GhostExpired { player });
            }
            if expired.speed_boost {
                info.events.push(TickEvent::SpeedBoostExpired { player });
            }
        }

        // Snakes take turns: each one is resolved against the others as they
        // stand, before any later snake has moved this tick
        let first_death = self.config.elimination == EliminationRule::FirstDeath;
        for player in 0..state.snakes.len() {
            if !state.snakes[player].is_alive() {
                continue;
            }
            self.move_snake(state, player, &mut info);

            let CollisionOutcome::Fatal(cause) = self.resolve_collision(state, player) else {
                continue;
            };
            state.snakes[player].death = Some(cause);
            info.events.push(TickEvent::SnakeDied { player, cause });
            info!(player, cause = cause.label(), score = state.scores[player], "snake died");

            if first_death {
                break;
            }
        }

        state.elapsed_ticks += 1;

        let terminated = match self.config.elimination {
            EliminationRule::FirstDeath => info.deaths().next().is_some(),
            EliminationRule::LastStanding => state.alive_count() == 0,
        };
        state.is_over = terminated;

        StepResult { terminated, info }
    }

    /// Move one snake and settle what its new head landed on
    fn move_snake(&mut self, state: &mut GameState, player: usize, info: &mut StepInfo) {
        let head = state.snakes[player].advance();

        let Some(index) = state.item_index_at(head) else {
            state.snakes[player].shrink_tail();
            return;
        };

        let item = state.items.remove(index);
        let points = item.points();
        state.scores[player] += points;
        self.apply_effect(state, player, item.kind);
        state
            .particles
            .extend(particles::burst(head, item.kind, &mut self.rng));

        debug!(
            player,
            kind = item.kind.label(),
            x = head.x,
            y = head.y,
            score = state.scores[player],
            "item eaten"
        );
        info.events.push(TickEvent::ItemEaten {
            player,
            kind: item.kind,
            points,
        });

        let divisor = self.config.level_divisor_for(state.is_two_player());
        let level = level_for_score(state.total_score(), divisor);
        if level > state.level {
            state.level = level;
            info!(level, "level up");
            info.events.push(TickEvent::LevelUp { level });
        }
    }

    fn apply_effect(&self, state: &mut GameState, player: usize, kind: ItemKind) {
        match kind.effect() {
            Effect::None => {}
            Effect::Slow { ticks } => {
                state.slow_timer = state.slow_timer.max(ticks);
            }
            Effect::Shrink => state.snakes[player].apply_shrink_penalty(),
            Effect::Ghost { ticks } => state.snakes[player].ghost_timer = ticks,
            Effect::SpeedBoost { ticks } => state.snakes[player].speed_boost_timer = ticks,
        }
    }

    /// Run the collision resolver for one snake that has just moved. Dead
    /// snakes stay on the field as obstacles for the others.
    fn resolve_collision(&self, state: &mut GameState, player: usize) -> CollisionOutcome {
        let grid = state.grid;
        let mode = state.mode;

        let (before, rest) = state.snakes.split_at_mut(player);
        let Some((snake, after)) = rest.split_first_mut() else {
            return CollisionOutcome::None;
        };
        let opponents: Vec<&Snake> = before.iter().chain(after.iter()).collect();

        collision::resolve(snake, &grid, mode, &state.obstacles, &opponents)
    }

    fn stock_items(&mut self, state: &mut GameState) {
        let target = self.config.food_target_for(state.is_two_player());
        let occupied = state.occupied_cells();
        self.spawner.maintain(
            &state.grid,
            &mut state.items,
            &occupied,
            target,
            &mut self.rng,
        );
    }

    /// Ticks per second one player asks for
    pub fn effective_speed(&self, state: &GameState, player: usize, sprinting: bool) -> u32 {
        let config = &self.config;
        let mut speed =
            config.base_speed + state.level.saturating_sub(1) as f32 * config.level_increment;

        if state.slow_active() {
            speed = (speed / 2.0).floor().max(config.min_slow_speed);
        }
        if state.snakes.get(player).is_some_and(Snake::is_boosted) {
            speed *= config.speed_boost_multiplier;
        }
        if sprinting {
            speed *= config.sprint_multiplier;
        }

        (speed.floor() as u32).clamp(1, config.max_speed)
    }

    /// Rate of the shared clock: the fastest live player's speed.
    ///
    /// Both snakes move once per tick, so in two-player rounds the slower
    /// player is carried along at the faster player's cadence.
    pub fn tick_rate(&self, state: &GameState, sprinting: &[bool]) -> u32 {
        (0..state.snakes.len())
            .filter(|&player| state.snakes[player].is_alive())
            .map(|player| {
                let held = sprinting.get(player).copied().unwrap_or(false);
                self.effective_speed(state, player, held)
            })
            .max()
            .unwrap_or(1)
    }

    pub fn tick_interval(&self, state: &GameState, sprinting: &[bool]) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate(state, sprinting)))
    }
}
