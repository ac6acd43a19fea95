use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, ItemKind, MenuEntry, Phase, Position, RoundOutcome, Session};
use crate::metrics::GameMetrics;

/// What occupies one grid cell, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    SnakeHead { player: usize, ghost: bool },
    SnakeBody { player: usize, ghost: bool },
    Obstacle { moving: bool },
    Item(ItemKind),
    Particle { kind: ItemKind, fading: bool },
    Empty,
}

/// Lay the round out as rows of cells
pub fn build_cells(state: &GameState) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![Cell::Empty; state.grid.width]; state.grid.height];
    let mut put = |pos: Position, cell: Cell| {
        if !state.grid.in_bounds(pos) {
            return;
        }
        let slot = &mut rows[pos.y as usize][pos.x as usize];
        if priority(cell) < priority(*slot) {
            *slot = cell;
        }
    };

    for particle in &state.particles {
        put(
            particle.cell(),
            Cell::Particle {
                kind: particle.kind,
                fading: particle.strength() < 0.5,
            },
        );
    }
    for item in &state.items {
        put(item.position, Cell::Item(item.kind));
    }
    for obstacle in &state.obstacles {
        put(
            obstacle.position,
            Cell::Obstacle {
                moving: obstacle.moving,
            },
        );
    }
    for (player, snake) in state.snakes.iter().enumerate() {
        let ghost = snake.is_ghost();
        for (segment, &pos) in snake.body.iter().enumerate() {
            let cell = if segment == 0 {
                Cell::SnakeHead { player, ghost }
            } else {
                Cell::SnakeBody { player, ghost }
            };
            put(pos, cell);
        }
    }

    rows
}

fn priority(cell: Cell) -> u8 {
    match cell {
        Cell::SnakeHead { .. } => 0,
        Cell::SnakeBody { .. } => 1,
        Cell::Obstacle { .. } => 2,
        Cell::Item(_) => 3,
        Cell::Particle { .. } => 4,
        Cell::Empty => 5,
    }
}

pub fn item_glyph(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Normal => "● ",
        ItemKind::Bonus => "★ ",
        ItemKind::Slow => "S ",
        ItemKind::Shrink => "- ",
        ItemKind::Ghost => "G ",
        ItemKind::Speed => "» ",
    }
}

pub fn item_color(kind: ItemKind) -> Color {
    match kind {
        ItemKind::Normal => Color::Red,
        ItemKind::Bonus => Color::Yellow,
        ItemKind::Slow => Color::Blue,
        ItemKind::Shrink => Color::Magenta,
        ItemKind::Ghost => Color::White,
        ItemKind::Speed => Color::LightCyan,
    }
}

fn player_color(player: usize) -> Color {
    if player == 0 { Color::Green } else { Color::Cyan }
}

pub fn cell_span(cell: Cell) -> Span<'static> {
    match cell {
        Cell::SnakeHead { player, ghost } => {
            let mut style = Style::default()
                .fg(player_color(player))
                .add_modifier(Modifier::BOLD);
            if ghost {
                style = style.add_modifier(Modifier::DIM);
            }
            Span::styled("■ ", style)
        }
        Cell::SnakeBody { player, ghost } => {
            let mut style = Style::default().fg(player_color(player));
            if ghost {
                style = style.add_modifier(Modifier::DIM);
            }
            Span::styled("□ ", style)
        }
        Cell::Obstacle { moving } => {
            let color = if moving { Color::LightRed } else { Color::Gray };
            Span::styled("█ ", Style::default().fg(color))
        }
        Cell::Item(kind) => Span::styled(
            item_glyph(kind),
            Style::default()
                .fg(item_color(kind))
                .add_modifier(Modifier::BOLD),
        ),
        Cell::Particle { kind, fading } => {
            let mut style = Style::default().fg(item_color(kind));
            if fading {
                style = style.add_modifier(Modifier::DIM);
            }
            Span::styled("· ", style)
        }
        Cell::Empty => Span::styled("  ", Style::default()),
    }
}

/// Status flags shown in the HUD
pub fn status_flags(state: &GameState, sprinting: &[bool]) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if sprinting.iter().any(|&held| held) {
        flags.push("SPRINT");
    }
    if state.slow_active() {
        flags.push("SLOW");
    }
    if state.snakes.iter().any(|s| s.is_ghost()) {
        flags.push("GHOST");
    }
    if state.snakes.iter().any(|s| s.is_boosted()) {
        flags.push("SPEED");
    }
    flags
}

/// Round-over headline and its colour
pub fn outcome_headline(outcome: RoundOutcome) -> (String, Color) {
    match outcome {
        RoundOutcome::Solo { .. } => ("GAME OVER".to_string(), Color::Red),
        RoundOutcome::Winner { player, .. } => {
            (format!("PLAYER {} WINS!", player + 1), player_color(player))
        }
        RoundOutcome::Tie { .. } => ("TIE!".to_string(), Color::White),
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, session: &Session, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        match (session.phase(), session.round()) {
            (Phase::Menu { selection }, _) => {
                let title = self.render_title(session);
                frame.render_widget(title, chunks[0]);
                let menu = self.render_menu(session.entries(), selection, metrics);
                frame.render_widget(menu, chunks[1]);
            }
            (_, None) => {
                let title = self.render_title(session);
                frame.render_widget(title, chunks[0]);
            }
            (Phase::Playing, Some(state)) => {
                let stats = self.render_stats(state, session.sprinting(), metrics);
                frame.render_widget(stats, chunks[0]);
                let grid = self.render_grid(state);
                frame.render_widget(grid, centered(chunks[1], state));
            }
            (Phase::RoundOver, Some(state)) => {
                let stats = self.render_stats(state, session.sprinting(), metrics);
                frame.render_widget(stats, chunks[0]);
                let game_over = self.render_game_over(state, metrics);
                frame.render_widget(game_over, chunks[1]);
            }
        }

        let controls = self.render_controls(session.phase());
        frame.render_widget(controls, chunks[2]);
    }

    fn render_title(&self, session: &Session) -> Paragraph<'_> {
        let edition = session.engine().config().edition;
        Paragraph::new(Line::from(vec![Span::styled(
            format!("SNAKE ({edition:?})"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )]))
        .alignment(Alignment::Center)
    }

    fn render_menu(
        &self,
        entries: &[MenuEntry],
        selection: usize,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let mut lines = vec![Line::from("")];

        for (index, entry) in entries.iter().enumerate() {
            let line = if index == selection {
                Line::from(Span::styled(
                    format!("> {} <", entry.label()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(entry.label(), Style::default().fg(Color::Gray)))
            };
            lines.push(line);
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                metrics.best_score().to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Games: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                metrics.stats.games_played.to_string(),
                Style::default().fg(Color::White),
            ),
        ]));

        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Menu "),
        )
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let lines: Vec<Line> = build_cells(state)
            .into_iter()
            .map(|row| Line::from(row.into_iter().map(cell_span).collect::<Vec<_>>()))
            .collect();

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", state.mode.label())),
        )
    }

    fn render_stats(
        &self,
        state: &GameState,
        sprinting: &[bool],
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let mut spans = Vec::new();
        for (player, score) in state.scores.iter().enumerate() {
            let name = if state.is_two_player() {
                format!("P{}: ", player + 1)
            } else {
                "Score: ".to_string()
            };
            spans.push(Span::styled(name, label.fg(player_color(player))));
            spans.push(Span::styled(score.to_string(), value));
            spans.push(Span::raw("    "));
        }
        spans.extend([
            Span::styled("Level: ", label),
            Span::styled(state.level.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.best_score().max(state.best_score()).to_string(), value),
        ]);

        let flags = status_flags(state, sprinting);
        let flag_line = Line::from(Span::styled(
            flags.join(" "),
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ));

        Paragraph::new(vec![Line::from(spans), flag_line]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let (headline, color) = outcome_headline(state.outcome());
        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
        ];

        for (player, snake) in state.snakes.iter().enumerate() {
            let cause = snake.death.map(|c| c.label()).unwrap_or("survived");
            let name = if state.is_two_player() {
                format!("Player {}", player + 1)
            } else {
                "Final Score".to_string()
            };
            text.push(Line::from(vec![
                Span::styled(format!("{name}: "), Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.scores[player].to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" ({cause})"), Style::default().fg(Color::Gray)),
            ]));
        }

        text.push(Line::from(""));
        let stats = [
            ("Level reached", state.level.to_string()),
            ("Time", metrics.format_time()),
            ("Best", metrics.best_score().to_string()),
            ("Games played", metrics.stats.games_played.to_string()),
        ];
        for (name, value) in stats {
            text.push(Line::from(vec![
                Span::styled(format!("{name}: "), Style::default().fg(Color::Yellow)),
                Span::styled(value, Style::default().fg(Color::White)),
            ]));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, phase: Phase) -> Paragraph<'_> {
        let key = Style::default().fg(Color::Cyan);
        let spans = match phase {
            Phase::Menu { .. } => vec![
                Span::styled("↑↓", key),
                Span::raw(" select | "),
                Span::styled("Enter", key),
                Span::raw(" start | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" quit"),
            ],
            Phase::Playing => vec![
                Span::styled("↑↓←→", key),
                Span::raw(" + "),
                Span::styled("Space", key),
                Span::raw(" P1 | "),
                Span::styled("WASD", key),
                Span::raw(" + "),
                Span::styled("Tab", key),
                Span::raw(" P2 | "),
                Span::styled("Esc", key),
                Span::raw(" menu"),
            ],
            Phase::RoundOver => vec![
                Span::styled("Space", key),
                Span::raw(" menu | "),
                Span::styled("Esc", Style::default().fg(Color::Red)),
                Span::raw(" quit"),
            ],
        };

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Center the bordered grid inside the game area
fn centered(area: Rect, state: &GameState) -> Rect {
    let width = (state.grid.width as u16).saturating_mul(2).saturating_add(2);
    let height = (state.grid.height as u16).saturating_add(2);
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        Direction, GameConfig, GameEngine, GameMode, Grid, Item, Obstacle, SessionEvent, Snake,
    };
    use ratatui::{Terminal, backend::TestBackend};

    fn state() -> GameState {
        let snake = Snake::with_body(
            [Position::new(2, 1), Position::new(1, 1), Position::new(0, 1)],
            Direction::Right,
        );
        let mut state = GameState::new(Grid::new(6, 5), GameMode::Obstacles, vec![snake]);
        state.items.push(Item::new(Position::new(4, 1), ItemKind::Bonus));
        state.items.push(Item::new(Position::new(1, 1), ItemKind::Normal));
        state.obstacles.push(Obstacle::fixed(Position::new(3, 3)));
        state
    }

    #[test]
    fn test_build_cells_layers() {
        let cells = build_cells(&state());

        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0].len(), 6);
        assert_eq!(
            cells[1][2],
            Cell::SnakeHead {
                player: 0,
                ghost: false
            }
        );
        // Body wins over an item underneath it
        assert_eq!(
            cells[1][1],
            Cell::SnakeBody {
                player: 0,
                ghost: false
            }
        );
        assert_eq!(cells[1][4], Cell::Item(ItemKind::Bonus));
        assert_eq!(cells[3][3], Cell::Obstacle { moving: false });
        assert_eq!(cells[0][0], Cell::Empty);
    }

    #[test]
    fn test_item_glyphs_are_distinct() {
        let mut glyphs: Vec<&str> = ItemKind::ALL.iter().map(|k| item_glyph(*k)).collect();
        glyphs.sort();
        glyphs.dedup();
        assert_eq!(glyphs.len(), ItemKind::ALL.len());
    }

    #[test]
    fn test_outcome_headlines() {
        assert_eq!(
            outcome_headline(RoundOutcome::Solo { score: 3 }).0,
            "GAME OVER"
        );
        assert_eq!(
            outcome_headline(RoundOutcome::Winner {
                player: 1,
                score: 9
            }),
            ("PLAYER 2 WINS!".to_string(), Color::Cyan)
        );
        assert_eq!(outcome_headline(RoundOutcome::Tie { score: 4 }).0, "TIE!");
    }

    #[test]
    fn test_status_flags() {
        let mut state = state();
        assert!(status_flags(&state, &[false]).is_empty());

        state.slow_timer = 5;
        state.snakes[0].ghost_timer = 5;
        assert_eq!(status_flags(&state, &[true]), vec!["SPRINT", "SLOW", "GHOST"]);
    }

    #[test]
    fn test_render_every_phase() {
        let backend = TestBackend::new(140, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        let renderer = Renderer::new();
        let metrics = GameMetrics::new();

        let mut config = GameConfig::ultimate().with_grid(20, 15);
        config.food_target = 3;
        let mut session = Session::new(GameEngine::with_seed(config, 4));

        terminal
            .draw(|frame| renderer.render(frame, &session, &metrics))
            .unwrap();
        let menu = format!("{:?}", terminal.backend().buffer());
        assert!(menu.contains("Classic Mode"));

        session.handle(SessionEvent::Confirm);
        terminal
            .draw(|frame| renderer.render(frame, &session, &metrics))
            .unwrap();
        let playing = format!("{:?}", terminal.backend().buffer());
        assert!(playing.contains("Level"));

        session.handle(SessionEvent::RoundEnded);
        terminal
            .draw(|frame| renderer.render(frame, &session, &metrics))
            .unwrap();
        let over = format!("{:?}", terminal.backend().buffer());
        assert!(over.contains("GAME OVER"));
        assert!(over.contains("Level reached"));
        assert!(over.contains("Games played"));
    }

    #[test]
    fn test_two_player_round_over_names_result() {
        let backend = TestBackend::new(140, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        let renderer = Renderer::new();
        let metrics = GameMetrics::new();

        let config = GameConfig::ultimate().with_grid(20, 15);
        let mut session = Session::new(GameEngine::with_seed(config, 4));
        for _ in 0..3 {
            session.handle(SessionEvent::NavigateDown);
        }
        session.handle(SessionEvent::Confirm);
        session.handle(SessionEvent::RoundEnded);

        terminal
            .draw(|frame| renderer.render(frame, &session, &metrics))
            .unwrap();
        let over = format!("{:?}", terminal.backend().buffer());
        // Both players start on zero
        assert!(over.contains("TIE!"));
        assert!(over.contains("Player 2"));
    }
}
