//! Snake Arcade - a grid-based snake game in three editions
//!
//! This library provides:
//! - Core game logic and session phases (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Round clock and persistent stats (metrics module)
//! - The interactive frame loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
