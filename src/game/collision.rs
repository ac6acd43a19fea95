use super::grid::Grid;
use super::obstacle::Obstacle;
use super::state::{GameMode, Snake};

/// What a snake's head ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Snake left the grid in a bounded mode
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake hit an obstacle
    Obstacle,
    /// Snake hit the other player's body
    OtherSnake,
}

impl CollisionKind {
    pub fn label(&self) -> &'static str {
        match self {
            CollisionKind::Wall => "hit the wall",
            CollisionKind::SelfCollision => "bit itself",
            CollisionKind::Obstacle => "hit an obstacle",
            CollisionKind::OtherSnake => "hit the other snake",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    None,
    Fatal(CollisionKind),
}

/// Resolve the head of a snake that has just moved.
///
/// In portal mode the head is wrapped back onto the grid first, so edges
/// are never lethal there. Ghost snakes pass through themselves and their
/// opponents but never through obstacles.
pub fn resolve(
    snake: &mut Snake,
    grid: &Grid,
    mode: GameMode,
    obstacles: &[Obstacle],
    opponents: &[&Snake],
) -> CollisionOutcome {
    if mode == GameMode::Portal {
        let wrapped = grid.wrap(snake.head());
        snake.set_head(wrapped);
    } else if !grid.in_bounds(snake.head()) {
        return CollisionOutcome::Fatal(CollisionKind::Wall);
    }

    let head = snake.head();

    if !snake.is_ghost() && snake.collides_with_body(head) {
        return CollisionOutcome::Fatal(CollisionKind::SelfCollision);
    }

    if mode == GameMode::Obstacles && obstacles.iter().any(|o| o.position == head) {
        return CollisionOutcome::Fatal(CollisionKind::Obstacle);
    }

    if !snake.is_ghost() && opponents.iter().any(|other| other.occupies(head)) {
        return CollisionOutcome::Fatal(CollisionKind::OtherSnake);
    }

    CollisionOutcome::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Direction;
    use crate::game::state::Position;

    fn grid() -> Grid {
        Grid::new(60, 40)
    }

    /// A snake whose head has just moved onto its own body at (5,5)
    fn looped_snake() -> Snake {
        Snake::with_body(
            [
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(6, 6),
                Position::new(6, 5),
                Position::new(5, 5),
            ],
            Direction::Up,
        )
    }

    #[test]
    fn test_classic_wall_is_fatal() {
        let mut snake = Snake::with_body(
            [Position::new(-1, 10), Position::new(0, 10)],
            Direction::Left,
        );
        let outcome = resolve(&mut snake, &grid(), GameMode::Classic, &[], &[]);
        assert_eq!(outcome, CollisionOutcome::Fatal(CollisionKind::Wall));
    }

    #[test]
    fn test_portal_wraps_instead_of_dying() {
        let mut snake = Snake::with_body(
            [Position::new(-1, 10), Position::new(0, 10)],
            Direction::Left,
        );
        let outcome = resolve(&mut snake, &grid(), GameMode::Portal, &[], &[]);

        assert_eq!(outcome, CollisionOutcome::None);
        assert_eq!(snake.head(), Position::new(59, 10));

        let mut snake = Snake::with_body(
            [Position::new(12, 40), Position::new(12, 39)],
            Direction::Down,
        );
        resolve(&mut snake, &grid(), GameMode::Portal, &[], &[]);
        assert_eq!(snake.head(), Position::new(12, 0));
    }

    #[test]
    fn test_self_collision() {
        let mut snake = looped_snake();
        let outcome = resolve(&mut snake, &grid(), GameMode::Classic, &[], &[]);
        assert_eq!(outcome, CollisionOutcome::Fatal(CollisionKind::SelfCollision));
    }

    #[test]
    fn test_ghost_ignores_self() {
        let mut snake = looped_snake();
        snake.ghost_timer = 10;
        let outcome = resolve(&mut snake, &grid(), GameMode::Classic, &[], &[]);
        assert_eq!(outcome, CollisionOutcome::None);
    }

    #[test]
    fn test_obstacle_is_fatal_even_for_ghost() {
        let mut snake = Snake::new(Position::new(8, 8), Direction::Right);
        snake.ghost_timer = 100;
        let obstacles = [Obstacle::fixed(Position::new(8, 8))];

        let outcome = resolve(&mut snake, &grid(), GameMode::Obstacles, &obstacles, &[]);
        assert_eq!(outcome, CollisionOutcome::Fatal(CollisionKind::Obstacle));
    }

    #[test]
    fn test_obstacles_only_count_in_obstacles_mode() {
        let mut snake = Snake::new(Position::new(8, 8), Direction::Right);
        let obstacles = [Obstacle::fixed(Position::new(8, 8))];

        let outcome = resolve(&mut snake, &grid(), GameMode::Classic, &obstacles, &[]);
        assert_eq!(outcome, CollisionOutcome::None);
    }

    #[test]
    fn test_other_snake_collision() {
        let mut snake = Snake::new(Position::new(10, 10), Direction::Right);
        let other = Snake::with_body(
            [Position::new(10, 9), Position::new(10, 10), Position::new(10, 11)],
            Direction::Up,
        );

        let outcome = resolve(&mut snake, &grid(), GameMode::Classic, &[], &[&other]);
        assert_eq!(outcome, CollisionOutcome::Fatal(CollisionKind::OtherSnake));

        snake.ghost_timer = 1;
        let outcome = resolve(&mut snake, &grid(), GameMode::Classic, &[], &[&other]);
        assert_eq!(outcome, CollisionOutcome::None);
    }
}
