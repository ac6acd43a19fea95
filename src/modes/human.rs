use anyhow::{Context, Result};
use crossterm::{
    event::{
        Event, EventStream, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior, interval, interval_at};
use tracing::{debug, info, warn};

use crate::game::{
    Action, Direction, GameEngine, Phase, Session, SessionEvent, TickEvent, Transition,
};
use crate::input::{InputHandler, KeyAction, SprintTracker};
use crate::metrics::{GameMetrics, StatsStore};
use crate::render::Renderer;

/// Tick period while no round is running; menus do not tick
const IDLE_TICK: Duration = Duration::from_millis(250);
/// Render at 30 FPS
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

pub struct HumanMode {
    session: Session,
    metrics: GameMetrics,
    store: StatsStore,
    renderer: Renderer,
    input_handler: InputHandler,
    sprint: SprintTracker,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(engine: GameEngine, store: StatsStore) -> Self {
        let stats = store.load();
        info!(
            path = %store.path().display(),
            best_score = stats.best_score,
            games_played = stats.games_played,
            "loaded stats"
        );

        Self {
            session: Session::new(engine),
            metrics: GameMetrics::with_stats(stats),
            store,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            sprint: SprintTracker::new(false),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;

        // Key releases are only reported with the enhancement protocol
        let enhanced = supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                stderr,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )
            .context("Failed to enable keyboard enhancement")?;
        }
        self.sprint = SprintTracker::new(enhanced);
        info!(enhanced, "terminal ready");

        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal, enhanced)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_period = self.tick_period();
        let mut tick_timer = interval_at(time::Instant::now() + tick_period, tick_period);
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut render_timer = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.session, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            // Speed depends on level, effects and sprint; follow it
            self.sync_sprint();
            let wanted = self.tick_period();
            if wanted != tick_period {
                debug!(period_ms = wanted.as_millis() as u64, "tick period changed");
                tick_period = wanted;
                tick_timer = interval_at(time::Instant::now() + tick_period, tick_period);
                tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            }
        }

        info!("leaving game loop");
        Ok(())
    }

    fn tick_period(&self) -> Duration {
        self.session.tick_interval().unwrap_or(IDLE_TICK)
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            let action = self.input_handler.handle_key_event(key);
            self.handle_action(action, key);
        }
    }

    fn handle_action(&mut self, action: KeyAction, key: KeyEvent) {
        let pressed = key.kind == KeyEventKind::Press;
        let playing = self.session.phase().is_playing();

        let event = match action {
            KeyAction::GameAction {
                player,
                action: Action::Sprint(held),
            } if playing => {
                self.sprint.record(player, held, Instant::now());
                self.sync_sprint();
                None
            }
            KeyAction::GameAction { player, action } if playing => {
                self.session.apply(player, action);
                None
            }
            KeyAction::GameAction {
                action: Action::Turn(direction),
                ..
            } => match direction {
                Direction::Up => Some(SessionEvent::NavigateUp),
                Direction::Down => Some(SessionEvent::NavigateDown),
                Direction::Left | Direction::Right => None,
            },
            // Space doubles as confirm outside of play
            KeyAction::GameAction {
                player: 0,
                action: Action::Sprint(true),
            } if pressed => Some(SessionEvent::Confirm),
            KeyAction::GameAction { .. } => None,
            KeyAction::Confirm if pressed => Some(SessionEvent::Confirm),
            KeyAction::Pause if pressed => Some(SessionEvent::Pause),
            KeyAction::Quit => Some(SessionEvent::Quit),
            KeyAction::Confirm | KeyAction::Pause | KeyAction::None => None,
        };

        if let Some(event) = event {
            let transition = self.session.handle(event);
            self.apply_transition(transition);
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::StartRound { mode, two_player } => {
                self.sprint.clear();
                self.metrics.on_game_start();
                debug!(mode = mode.label(), two_player, "round requested");
            }
            Transition::AbandonRound => {
                self.sprint.clear();
                self.metrics.on_game_abandoned();
                info!("round abandoned");
            }
            Transition::FinishRound => self.on_round_over(),
            Transition::Terminate => self.should_quit = true,
            Transition::Stay | Transition::Goto(_) => {}
        }
    }

    fn sync_sprint(&mut self) {
        let players = self.session.sprinting().len();
        let held = self.sprint.snapshot(players, Instant::now());
        for (player, held) in held.into_iter().enumerate() {
            self.session.set_sprint(player, held);
        }
    }

    fn update_game(&mut self) {
        self.sync_sprint();

        let Some(result) = self.session.tick() else {
            return;
        };

        for event in &result.info.events {
            match event {
                TickEvent::ItemEaten { player, kind, .. } if kind.is_power_up() => {
                    debug!(player, kind = kind.label(), "power-up cue");
                }
                _ => debug!(?event, "tick event"),
            }
        }

        if result.terminated && self.session.phase() == Phase::RoundOver {
            self.on_round_over();
        }
    }

    fn on_round_over(&mut self) {
        let Some(state) = self.session.round() else {
            return;
        };
        let score = state.best_score();
        let ticks = state.elapsed_ticks;

        self.sprint.clear();
        self.metrics.on_game_over(score);
        info!(
            score,
            ticks,
            best_score = self.metrics.best_score(),
            "round over"
        );

        if let Err(e) = self.store.save(&self.metrics.stats) {
            warn!(error = %e, "failed to save stats");
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        enhanced: bool,
    ) -> Result<()> {
        if enhanced {
            execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
                .context("Failed to restore keyboard mode")?;
        }
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
