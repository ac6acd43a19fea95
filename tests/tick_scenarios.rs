use snake_arcade::game::{
    CollisionKind, Direction, GameConfig, GameEngine, GameMode, GameState, Grid, Item, ItemKind,
    Position, Snake,
};

fn engine() -> GameEngine {
    let mut config = GameConfig::ultimate();
    config.food_target = 0;
    config.food_target_two_player = 0;
    GameEngine::with_seed(config, 42)
}

fn line(head: Position, direction: Direction, length: i32) -> Snake {
    let (dx, dy) = direction.delta();
    Snake::with_body(
        (0..length).map(|i| head.moved_by(-dx * i, -dy * i)),
        direction,
    )
}

fn round(mode: GameMode, snakes: Vec<Snake>) -> GameState {
    GameState::new(Grid::new(60, 40), mode, snakes)
}

#[test]
fn normal_item_scores_and_grows() {
    let mut engine = engine();
    let mut state = round(
        GameMode::Classic,
        vec![Snake::new(Position::new(10, 10), Direction::Right)],
    );
    state.items.push(Item::new(Position::new(11, 10), ItemKind::Normal));

    let result = engine.step(&mut state);

    assert!(!result.terminated);
    assert_eq!(state.snakes[0].head(), Position::new(11, 10));
    assert_eq!(state.scores[0], 1);
    assert_eq!(state.snakes[0].len(), 2);
}

#[test]
fn shrink_item_nets_minus_two() {
    let mut engine = engine();
    let mut state = round(
        GameMode::Classic,
        vec![line(Position::new(10, 10), Direction::Right, 5)],
    );
    state.items.push(Item::new(Position::new(11, 10), ItemKind::Shrink));

    engine.step(&mut state);

    assert_eq!(state.snakes[0].len(), 3);
    assert_eq!(state.scores[0], 3);
}

#[test]
fn left_edge_kills_in_classic_and_wraps_in_portal() {
    let mut engine = engine();

    let mut classic = round(
        GameMode::Classic,
        vec![Snake::new(Position::new(0, 10), Direction::Left)],
    );
    let result = engine.step(&mut classic);
    assert!(result.terminated);
    assert_eq!(classic.snakes[0].death, Some(CollisionKind::Wall));

    let mut portal = round(
        GameMode::Portal,
        vec![Snake::new(Position::new(0, 10), Direction::Left)],
    );
    let result = engine.step(&mut portal);
    assert!(!result.terminated);
    assert_eq!(portal.snakes[0].head(), Position::new(59, 10));
}

#[test]
fn wrapping_move_skips_item_on_reentry_cell() {
    let mut engine = engine();
    let mut state = round(
        GameMode::Portal,
        vec![Snake::new(Position::new(0, 10), Direction::Left)],
    );
    state.items.push(Item::new(Position::new(59, 10), ItemKind::Normal));

    engine.step(&mut state);
    assert_eq!(state.scores[0], 0);
    assert_eq!(state.items.len(), 1);
}

#[test]
fn head_into_other_snake_ends_round() {
    let mut engine = engine();
    let p1 = Snake::new(Position::new(9, 10), Direction::Right);
    let p2 = line(Position::new(10, 11), Direction::Down, 4);
    let mut state = round(GameMode::Classic, vec![p1, p2]);

    let result = engine.step(&mut state);

    assert!(result.terminated);
    assert_eq!(state.snakes[0].death, Some(CollisionKind::OtherSnake));
    assert!(
        result
            .info
            .deaths()
            .any(|(player, cause)| player == 0 && cause == CollisionKind::OtherSnake)
    );
}

#[test]
fn cell_vacated_later_in_the_tick_is_still_lethal() {
    let mut engine = engine();
    let p1 = Snake::new(Position::new(9, 10), Direction::Right);
    let p2 = line(Position::new(10, 8), Direction::Up, 3);
    let mut state = round(GameMode::Classic, vec![p1, p2]);

    let result = engine.step(&mut state);

    assert!(result.terminated);
    assert_eq!(state.snakes[0].death, Some(CollisionKind::OtherSnake));
    assert_eq!(state.snakes[1].head(), Position::new(10, 8));
}

#[test]
fn ghost_passes_through_other_snake() {
    let mut engine = engine();
    let mut p1 = Snake::new(Position::new(9, 10), Direction::Right);
    p1.ghost_timer = 10;
    let p2 = line(Position::new(10, 11), Direction::Down, 4);
    let mut state = round(GameMode::Classic, vec![p1, p2]);

    let result = engine.step(&mut state);
    assert!(!result.terminated);
}

#[test]
fn length_changes_stay_in_bounds_over_a_long_run() {
    let mut config = GameConfig::ultimate().with_grid(12, 12);
    config.food_target = 20;
    let mut engine = GameEngine::with_seed(config, 5);
    let mut state = engine.reset(GameMode::Portal, false);

    let turns = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];
    for tick in 0..400 {
        if tick % 7 == 0 {
            engine.set_direction(&mut state, 0, turns[(tick / 7) % turns.len()]);
        }
        let before = state.snakes[0].len() as i64;
        let result = engine.step(&mut state);
        if result.terminated {
            break;
        }
        let after = state.snakes[0].len() as i64;

        assert!(after >= 1);
        assert!((-2..=1).contains(&(after - before)));
        assert!(state.items.len() <= 20);
    }
}

#[test]
fn reversal_is_always_rejected() {
    let engine = engine();
    let mut state = round(
        GameMode::Classic,
        vec![line(Position::new(10, 10), Direction::Up, 3)],
    );

    assert!(!engine.set_direction(&mut state, 0, Direction::Down));
    assert!(engine.set_direction(&mut state, 0, Direction::Left));
    // Still the opposite of the applied direction
    assert!(!engine.set_direction(&mut state, 0, Direction::Down));
}
