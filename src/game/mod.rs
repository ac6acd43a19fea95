//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The frame loop in `modes` drives it; tests drive it directly.

pub mod action;
pub mod collision;
pub mod config;
pub mod engine;
pub mod grid;
pub mod item;
pub mod obstacle;
pub mod particles;
pub mod session;
pub mod spawner;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use collision::{CollisionKind, CollisionOutcome};
pub use config::{Edition, EliminationRule, GameConfig};
pub use engine::{GameEngine, StepInfo, StepResult, TickEvent};
pub use grid::Grid;
pub use item::{Effect, Item, ItemKind};
pub use obstacle::Obstacle;
pub use particles::Particle;
pub use session::{MenuEntry, Phase, Session, SessionEvent, Transition};
pub use spawner::{Spawner, WeightTable};
pub use state::{GameMode, GameState, Position, RoundOutcome, Snake};
