use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

use crate::game::{Action, Direction};

/// How long a sprint key counts as held after its last press or repeat
/// when the terminal does not report key releases
pub const HELD_FALLBACK_WINDOW: Duration = Duration::from_millis(550);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction { player: usize, action: Action },
    Confirm,
    Pause,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.kind == KeyEventKind::Release {
            return match Self::sprint_player(key.code) {
                Some(player) => KeyAction::GameAction {
                    player,
                    action: Action::Sprint(false),
                },
                None => KeyAction::None,
            };
        }

        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        if let Some(player) = Self::sprint_player(key.code) {
            return KeyAction::GameAction {
                player,
                action: Action::Sprint(true),
            };
        }

        match key.code {
            // Player 1 - Arrow keys
            KeyCode::Up => Self::movement(0, Direction::Up),
            KeyCode::Down => Self::movement(0, Direction::Down),
            KeyCode::Left => Self::movement(0, Direction::Left),
            KeyCode::Right => Self::movement(0, Direction::Right),

            // Player 2 - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Self::movement(1, Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => Self::movement(1, Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => Self::movement(1, Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Self::movement(1, Direction::Right),

            // Controls
            KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Esc => KeyAction::Pause,
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }

    fn movement(player: usize, direction: Direction) -> KeyAction {
        KeyAction::GameAction {
            player,
            action: direction.into(),
        }
    }

    /// Space for player 1; Tab, or Shift where the terminal reports it, for player 2
    fn sprint_player(code: KeyCode) -> Option<usize> {
        match code {
            KeyCode::Char(' ') => Some(0),
            KeyCode::Tab
            | KeyCode::Modifier(ModifierKeyCode::LeftShift)
            | KeyCode::Modifier(ModifierKeyCode::RightShift) => Some(1),
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks whether each player's sprint key is held down.
///
/// Terminals with keyboard enhancement report releases, so a press holds
/// until its release. Elsewhere a press holds for [`HELD_FALLBACK_WINDOW`],
/// which auto-repeat keeps extending while the key stays down.
#[derive(Debug, Clone)]
pub struct SprintTracker {
    reports_release: bool,
    last_press: [Option<Instant>; 2],
}

impl SprintTracker {
    pub fn new(reports_release: bool) -> Self {
        Self {
            reports_release,
            last_press: [None; 2],
        }
    }

    pub fn record(&mut self, player: usize, held: bool, now: Instant) {
        let Some(slot) = self.last_press.get_mut(player) else {
            return;
        };
        *slot = if held { Some(now) } else { None };
    }

    pub fn is_held(&self, player: usize, now: Instant) -> bool {
        match self.last_press.get(player).copied().flatten() {
            Some(_) if self.reports_release => true,
            Some(pressed) => now.saturating_duration_since(pressed) < HELD_FALLBACK_WINDOW,
            None => false,
        }
    }

    /// Held state for the first `players` players
    pub fn snapshot(&self, players: usize, now: Instant) -> Vec<bool> {
        (0..players).map(|p| self.is_held(p, now)).collect()
    }

    pub fn clear(&mut self) {
        self.last_press = [None; 2];
    }
}
