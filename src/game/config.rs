use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use super::item::ItemKind;
use super::spawner::WeightTable;
use super::state::GameMode;

/// Preset rule sets, from the plain game to the full one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edition {
    /// Plain food only, constant speed, classic walls
    Basic,
    /// Bonus/slow/shrink items and levels
    Enhanced,
    /// Every item, portal and obstacle modes, two players
    Ultimate,
}

/// When a two-player round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliminationRule {
    /// The first death ends the round
    FirstDeath,
    /// The round goes on while any snake is alive
    LastStanding,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub edition: Edition,
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,

    // Speed, in ticks per second
    /// Speed at level 1
    pub base_speed: f32,
    /// Speed added per level above 1
    pub level_increment: f32,
    /// Floor applied when the slow effect halves the speed
    pub min_slow_speed: f32,
    /// Multiplier while a speed item is active
    pub speed_boost_multiplier: f32,
    /// Multiplier while sprint is held
    pub sprint_multiplier: f32,
    /// Upper clamp on the final speed
    pub max_speed: u32,

    // Levels
    /// Points per level in single-player rounds
    pub level_divisor: u32,
    /// Points per level when two players pool their score
    pub level_divisor_two_player: u32,

    // Field population
    /// Items kept on the field in single-player rounds
    pub food_target: usize,
    /// Items kept on the field in two-player rounds
    pub food_target_two_player: usize,
    /// Obstacles placed at the start of an obstacles round
    pub obstacle_count: usize,
    /// Chance that a placed obstacle moves
    pub moving_obstacle_chance: f64,
    pub item_weights: WeightTable,

    // Menu
    /// Modes offered in the menu
    pub modes: Vec<GameMode>,
    /// Whether the two-player entry is offered
    pub two_player: bool,
    pub elimination: EliminationRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::ultimate()
    }
}

impl GameConfig {
    pub fn for_edition(edition: Edition) -> Self {
        match edition {
            Edition::Basic => Self::basic(),
            Edition::Enhanced => Self::enhanced(),
            Edition::Ultimate => Self::ultimate(),
        }
    }

    pub fn basic() -> Self {
        Self {
            edition: Edition::Basic,
            grid_width: 60,
            grid_height: 40,
            base_speed: 10.0,
            level_increment: 0.0,
            min_slow_speed: 4.0,
            speed_boost_multiplier: 1.5,
            sprint_multiplier: 2.0,
            max_speed: 30,
            level_divisor: 10,
            level_divisor_two_player: 10,
            food_target: 10,
            food_target_two_player: 10,
            obstacle_count: 0,
            moving_obstacle_chance: 0.0,
            item_weights: WeightTable::new([(ItemKind::Normal, 1.0)]),
            modes: vec![GameMode::Classic],
            two_player: false,
            elimination: EliminationRule::FirstDeath,
        }
    }

    pub fn enhanced() -> Self {
        Self {
            edition: Edition::Enhanced,
            base_speed: 8.0,
            level_increment: 2.0,
            item_weights: WeightTable::new([
                (ItemKind::Normal, 0.70),
                (ItemKind::Bonus, 0.15),
                (ItemKind::Slow, 0.10),
                (ItemKind::Shrink, 0.05),
            ]),
            ..Self::basic()
        }
    }

    pub fn ultimate() -> Self {
        Self {
            edition: Edition::Ultimate,
            base_speed: 8.0,
            level_increment: 1.5,
            max_speed: 25,
            level_divisor: 15,
            level_divisor_two_player: 15,
            food_target: 10,
            food_target_two_player: 15,
            obstacle_count: 5,
            moving_obstacle_chance: 0.3,
            item_weights: WeightTable::new([
                (ItemKind::Normal, 0.50),
                (ItemKind::Bonus, 0.15),
                (ItemKind::Slow, 0.10),
                (ItemKind::Shrink, 0.10),
                (ItemKind::Ghost, 0.10),
                (ItemKind::Speed, 0.05),
            ]),
            modes: vec![GameMode::Classic, GameMode::Portal, GameMode::Obstacles],
            two_player: true,
            ..Self::basic()
        }
    }

    /// Override the grid size
    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::default().with_grid(10, 10)
    }

    /// Read a JSON configuration. Missing fields take the ultimate defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn level_divisor_for(&self, two_player: bool) -> u32 {
        if two_player {
            self.level_divisor_two_player
        } else {
            self.level_divisor
        }
    }

    pub fn food_target_for(&self, two_player: bool) -> usize {
        if two_player {
            self.food_target_two_player
        } else {
            self.food_target
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width >= 5 && self.grid_height >= 5,
            "grid must be at least 5x5, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= i32::MAX as usize && self.grid_height <= i32::MAX as usize,
            "grid is too large"
        );
        ensure!(self.base_speed > 0.0, "base_speed must be positive");
        ensure!(self.level_increment >= 0.0, "level_increment must not be negative");
        ensure!(self.min_slow_speed > 0.0, "min_slow_speed must be positive");
        ensure!(
            self.speed_boost_multiplier > 0.0 && self.sprint_multiplier > 0.0,
            "speed multipliers must be positive"
        );
        ensure!(self.max_speed >= 1, "max_speed must be at least 1");
        ensure!(
            self.level_divisor > 0 && self.level_divisor_two_player > 0,
            "level divisors must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&self.moving_obstacle_chance),
            "moving_obstacle_chance must be between 0.0 and 1.0"
        );
        if self.modes.is_empty() && !self.two_player {
            bail!("config offers no playable mode");
        }
        self.item_weights
            .validate()
            .context("invalid item_weights")?;
        Ok(())
    }
}
