//! Session phases and the transitions between them
//!
//! The frame loop owns a [`Phase`] and feeds it [`SessionEvent`]s. Transitions
//! are a pure function of the current phase, the event and the menu entries on
//! offer; the caller carries out the side effects a [`Transition`] names.

use super::action::{Action, Direction};
use super::config::GameConfig;
use super::engine::{GameEngine, StepResult};
use super::state::{GameMode, GameState};

/// A line of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Play { mode: GameMode, two_player: bool },
    Quit,
}

impl MenuEntry {
    pub fn label(&self) -> String {
        match self {
            MenuEntry::Play {
                mode,
                two_player: false,
            } => format!("{} Mode", mode.label()),
            MenuEntry::Play {
                mode: GameMode::Classic,
                two_player: true,
            } => "Two Players".to_string(),
            MenuEntry::Play {
                mode,
                two_player: true,
            } => format!("Two Players ({})", mode.label()),
            MenuEntry::Quit => "Quit".to_string(),
        }
    }
}

/// Menu entries the edition offers, Quit last
pub fn menu_entries(config: &GameConfig) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = config
        .modes
        .iter()
        .map(|&mode| MenuEntry::Play {
            mode,
            two_player: false,
        })
        .collect();

    if config.two_player {
        entries.push(MenuEntry::Play {
            mode: GameMode::Classic,
            two_player: true,
        });
    }

    entries.push(MenuEntry::Quit);
    entries
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu { selection: usize },
    Playing,
    RoundOver,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Menu { selection: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    NavigateUp,
    NavigateDown,
    Confirm,
    /// Pause/menu command
    Pause,
    /// The engine reported a finished round
    RoundEnded,
    Quit,
}

/// What the owner of the session has to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changes
    Stay,
    /// Move to another phase without side effects
    Goto(Phase),
    /// Set up a round and enter `Playing`
    StartRound { mode: GameMode, two_player: bool },
    /// Drop the running round and return to the menu
    AbandonRound,
    /// Record the finished round and enter `RoundOver`
    FinishRound,
    /// Leave the program
    Terminate,
}

impl Phase {
    pub fn is_playing(&self) -> bool {
        matches!(self, Phase::Playing)
    }

    pub fn on(self, event: SessionEvent, entries: &[MenuEntry]) -> Transition {
        match (self, event) {
            (_, SessionEvent::Quit) => Transition::Terminate,

            (Phase::Menu { selection }, SessionEvent::NavigateUp) => {
                let count = entries.len().max(1);
                Transition::Goto(Phase::Menu {
                    selection: (selection + count - 1) % count,
                })
            }
            (Phase::Menu { selection }, SessionEvent::NavigateDown) => {
                let count = entries.len().max(1);
                Transition::Goto(Phase::Menu {
                    selection: (selection + 1) % count,
                })
            }
            (Phase::Menu { selection }, SessionEvent::Confirm) => match entries.get(selection) {
                Some(MenuEntry::Play { mode, two_player }) => Transition::StartRound {
                    mode: *mode,
                    two_player: *two_player,
                },
                Some(MenuEntry::Quit) | None => Transition::Terminate,
            },
            (Phase::Menu { .. }, _) => Transition::Stay,

            (Phase::Playing, SessionEvent::RoundEnded) => Transition::FinishRound,
            (Phase::Playing, SessionEvent::Pause) => Transition::AbandonRound,
            (Phase::Playing, _) => Transition::Stay,

            (Phase::RoundOver, SessionEvent::Confirm) => Transition::Goto(Phase::default()),
            (Phase::RoundOver, SessionEvent::Pause) => Transition::Terminate,
            (Phase::RoundOver, _) => Transition::Stay,
        }
    }

    /// Phase reached once the caller has carried out a transition
    pub fn after(self, transition: Transition) -> Option<Phase> {
        match transition {
            Transition::Stay => Some(self),
            Transition::Goto(phase) => Some(phase),
            Transition::StartRound { .. } => Some(Phase::Playing),
            Transition::AbandonRound => Some(Phase::default()),
            Transition::FinishRound => Some(Phase::RoundOver),
            Transition::Terminate => None,
        }
    }
}

/// Owned session context: the current phase plus the round being played
pub struct Session {
    phase: Phase,
    entries: Vec<MenuEntry>,
    engine: GameEngine,
    round: Option<GameState>,
    sprinting: Vec<bool>,
}

impl Session {
    pub fn new(engine: GameEngine) -> Self {
        let entries = menu_entries(engine.config());
        Self {
            phase: Phase::default(),
            entries,
            engine,
            round: None,
            sprinting: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// The running or just finished round
    pub fn round(&self) -> Option<&GameState> {
        self.round.as_ref()
    }

    pub fn sprinting(&self) -> &[bool] {
        &self.sprinting
    }

    /// Feed an event through the phase machine and carry out its side
    /// effects. Returns the transition taken.
    pub fn handle(&mut self, event: SessionEvent) -> Transition {
        let transition = self.phase.on(event, &self.entries);

        match transition {
            Transition::StartRound { mode, two_player } => {
                let state = self.engine.reset(mode, two_player);
                self.sprinting = vec![false; state.snakes.len()];
                self.round = Some(state);
            }
            Transition::AbandonRound => {
                self.round = None;
                self.sprinting.clear();
            }
            Transition::Goto(Phase::Menu { .. }) => {
                self.round = None;
                self.sprinting.clear();
            }
            Transition::FinishRound => self.sprinting.iter_mut().for_each(|s| *s = false),
            Transition::Stay | Transition::Goto(_) | Transition::Terminate => {}
        }

        if let Some(next) = self.phase.after(transition) {
            self.phase = next;
        }
        transition
    }

    /// Queue a turn; ignored outside of play
    pub fn steer(&mut self, player: usize, direction: Direction) -> bool {
        if !self.phase.is_playing() {
            return false;
        }
        match self.round.as_mut() {
            Some(state) => self.engine.set_direction(state, player, direction),
            None => false,
        }
    }

    pub fn apply(&mut self, player: usize, action: Action) {
        match action {
            Action::Turn(direction) => {
                self.steer(player, direction);
            }
            Action::Sprint(held) => self.set_sprint(player, held),
        }
    }

    pub fn set_sprint(&mut self, player: usize, held: bool) {
        if let Some(flag) = self.sprinting.get_mut(player) {
            *flag = held;
        }
    }

    /// Advance the round by one tick. Nothing happens outside of play.
    pub fn tick(&mut self) -> Option<StepResult> {
        if !self.phase.is_playing() {
            return None;
        }
        let state = self.round.as_mut()?;
        let result = self.engine.step(state);
        if result.terminated {
            self.handle(SessionEvent::RoundEnded);
        }
        Some(result)
    }

    /// Time between ticks at the current speeds, if a round is running
    pub fn tick_interval(&self) -> Option<std::time::Duration> {
        if !self.phase.is_playing() {
            return None;
        }
        self.round
            .as_ref()
            .map(|state| self.engine.tick_interval(state, &self.sprinting))
    }
}
