//! Item and obstacle placement on free cells

use std::collections::HashSet;

use anyhow::{Result, bail};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::action::Direction;
use super::grid::Grid;
use super::item::{Item, ItemKind};
use super::obstacle::Obstacle;
use super::state::Position;

/// Distance from the edges kept clear when placing obstacles
pub const OBSTACLE_MARGIN: i32 = 5;

/// Relative likelihood of one item kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub kind: ItemKind,
    pub weight: f64,
}

/// Weighted item kinds, drawn with one uniform sample against the
/// cumulative distribution. Weights are normalized, so they need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
}

impl WeightTable {
    pub fn new(entries: impl IntoIterator<Item = (ItemKind, f64)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(kind, weight)| WeightEntry { kind, weight })
                .collect(),
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Check that at least one kind can be drawn
    pub fn validate(&self) -> Result<()> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| !e.weight.is_finite() || e.weight < 0.0)
        {
            bail!("weight for {:?} must be a non-negative number", entry.kind);
        }
        if self.total_weight() <= 0.0 {
            bail!("item weight table needs at least one positive weight");
        }
        Ok(())
    }

    pub fn contains(&self, kind: ItemKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind && e.weight > 0.0)
    }

    /// Map a sample in [0, 1) to a kind
    pub fn draw(&self, sample: f64) -> ItemKind {
        let total = self.total_weight();
        let target = sample.clamp(0.0, 1.0) * total;

        let mut cumulative = 0.0;
        for entry in self.entries.iter().filter(|e| e.weight > 0.0) {
            cumulative += entry.weight;
            if target < cumulative {
                return entry.kind;
            }
        }

        // sample == 1.0 or rounding at the top end
        self.entries
            .iter()
            .rev()
            .find(|e| e.weight > 0.0)
            .map(|e| e.kind)
            .unwrap_or(ItemKind::Normal)
    }
}

/// Keeps the field stocked with items
#[derive(Debug, Clone)]
pub struct Spawner {
    weights: WeightTable,
}

impl Spawner {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    /// Top `items` up to `target`, choosing uniformly among cells that are
    /// neither in `occupied` nor already holding an item. Stops quietly once
    /// the grid is full. Returns how many items were added.
    pub fn maintain<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        items: &mut Vec<Item>,
        occupied: &HashSet<Position>,
        target: usize,
        rng: &mut R,
    ) -> usize {
        if items.len() >= target {
            return 0;
        }
        if occupied.len() >= grid.cell_count() {
            debug!("grid full, no items spawned");
            return 0;
        }

        let item_cells: HashSet<Position> = items.iter().map(|item| item.position).collect();
        let mut free: Vec<Position> = grid
            .cells()
            .filter(|cell| !occupied.contains(cell) && !item_cells.contains(cell))
            .collect();

        let mut spawned = 0;
        while items.len() < target {
            if free.is_empty() {
                debug!(deficit = target - items.len(), "no free cell left for items");
                break;
            }

            let pos = free.swap_remove(rng.gen_range(0..free.len()));
            let kind = self.weights.draw(rng.r#gen::<f64>());
            items.push(Item::new(pos, kind));
            spawned += 1;
        }

        spawned
    }
}

/// Place up to `count` obstacles on free cells away from the edges.
/// Each one moves with probability `moving_chance`.
pub fn place_obstacles<R: Rng + ?Sized>(
    grid: &Grid,
    occupied: &HashSet<Position>,
    count: usize,
    moving_chance: f64,
    rng: &mut R,
) -> Vec<Obstacle> {
    let in_band = |value: i32, size: usize| {
        let size = size as i32;
        if size <= OBSTACLE_MARGIN * 2 {
            true
        } else {
            (OBSTACLE_MARGIN..=size - OBSTACLE_MARGIN).contains(&value)
        }
    };

    let mut free: Vec<Position> = grid
        .cells()
        .filter(|cell| in_band(cell.x, grid.width) && in_band(cell.y, grid.height))
        .filter(|cell| !occupied.contains(cell))
        .collect();

    let mut obstacles = Vec::with_capacity(count);
    while obstacles.len() < count && !free.is_empty() {
        let pos = free.swap_remove(rng.gen_range(0..free.len()));
        let moving = rng.gen_bool(moving_chance.clamp(0.0, 1.0));
        obstacles.push(Obstacle::new(pos, moving, Direction::random(rng)));
    }

    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ultimate_table() -> WeightTable {
        WeightTable::new([
            (ItemKind::Normal, 0.50),
            (ItemKind::Bonus, 0.15),
            (ItemKind::Slow, 0.10),
            (ItemKind::Shrink, 0.10),
            (ItemKind::Ghost, 0.10),
            (ItemKind::Speed, 0.05),
        ])
    }

    #[test]
    fn test_cumulative_draw() {
        let table = ultimate_table();

        assert_eq!(table.draw(0.0), ItemKind::Normal);
        assert_eq!(table.draw(0.49), ItemKind::Normal);
        assert_eq!(table.draw(0.51), ItemKind::Bonus);
        assert_eq!(table.draw(0.71), ItemKind::Slow);
        assert_eq!(table.draw(0.81), ItemKind::Shrink);
        assert_eq!(table.draw(0.91), ItemKind::Ghost);
        assert_eq!(table.draw(0.97), ItemKind::Speed);
        assert_eq!(table.draw(1.0), ItemKind::Speed);
    }

    #[test]
    fn test_draw_normalizes_weights() {
        let table = WeightTable::new([(ItemKind::Normal, 3.0), (ItemKind::Bonus, 1.0)]);
        assert_eq!(table.draw(0.74), ItemKind::Normal);
        assert_eq!(table.draw(0.76), ItemKind::Bonus);
    }

    #[test]
    fn test_zero_weight_never_drawn() {
        let table = WeightTable::new([(ItemKind::Ghost, 0.0), (ItemKind::Normal, 1.0)]);
        assert_eq!(table.draw(0.0), ItemKind::Normal);
        assert!(!table.contains(ItemKind::Ghost));
    }

    #[test]
    fn test_validate() {
        assert!(ultimate_table().validate().is_ok());
        assert!(WeightTable::new([]).validate().is_err());
        assert!(WeightTable::new([(ItemKind::Normal, 0.0)]).validate().is_err());
        assert!(WeightTable::new([(ItemKind::Normal, -1.0)]).validate().is_err());
        assert!(
            WeightTable::new([(ItemKind::Normal, f64::NAN)])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_maintain_reaches_target_on_free_cells() {
        let grid = Grid::new(10, 10);
        let spawner = Spawner::new(ultimate_table());
        let mut rng = StdRng::seed_from_u64(11);
        let occupied: HashSet<Position> = (0..10).map(|x| Position::new(x, 0)).collect();
        let mut items = Vec::new();

        let spawned = spawner.maintain(&grid, &mut items, &occupied, 10, &mut rng);

        assert_eq!(spawned, 10);
        assert_eq!(items.len(), 10);
        let cells: HashSet<Position> = items.iter().map(|i| i.position).collect();
        assert_eq!(cells.len(), 10, "items must not share a cell");
        assert!(cells.iter().all(|c| grid.in_bounds(*c) && !occupied.contains(c)));
    }

    #[test]
    fn test_maintain_is_noop_when_stocked() {
        let grid = Grid::new(10, 10);
        let spawner = Spawner::new(ultimate_table());
        let mut rng = StdRng::seed_from_u64(11);
        let mut items = vec![Item::new(Position::new(1, 1), ItemKind::Bonus)];

        let spawned = spawner.maintain(&grid, &mut items, &HashSet::new(), 1, &mut rng);
        assert_eq!(spawned, 0);
        assert_eq!(items, vec![Item::new(Position::new(1, 1), ItemKind::Bonus)]);
    }

    #[test]
    fn test_maintain_stops_when_grid_full() {
        let grid = Grid::new(3, 3);
        let spawner = Spawner::new(WeightTable::new([(ItemKind::Normal, 1.0)]));
        let mut rng = StdRng::seed_from_u64(5);
        let occupied: HashSet<Position> = grid.cells().skip(2).collect();
        let mut items = Vec::new();

        let spawned = spawner.maintain(&grid, &mut items, &occupied, 10, &mut rng);
        assert_eq!(spawned, 2);
        assert_eq!(items.len(), 2);

        // Deficit persists without error
        let spawned = spawner.maintain(&grid, &mut items, &occupied, 10, &mut rng);
        assert_eq!(spawned, 0);
    }

    #[test]
    fn test_maintain_on_fully_occupied_grid() {
        let grid = Grid::new(3, 3);
        let spawner = Spawner::new(WeightTable::new([(ItemKind::Normal, 1.0)]));
        let mut rng = StdRng::seed_from_u64(5);
        let occupied: HashSet<Position> = grid.cells().collect();
        let mut items = Vec::new();

        assert_eq!(spawner.maintain(&grid, &mut items, &occupied, 4, &mut rng), 0);
        assert!(items.is_empty());
    }

    #[test]
    fn test_place_obstacles_in_band() {
        let grid = Grid::new(60, 40);
        let mut rng = StdRng::seed_from_u64(9);
        let occupied: HashSet<Position> = [grid.center()].into_iter().collect();

        let obstacles = place_obstacles(&grid, &occupied, 5, 0.3, &mut rng);

        assert_eq!(obstacles.len(), 5);
        for obstacle in &obstacles {
            let p = obstacle.position;
            assert!((5..=55).contains(&p.x));
            assert!((5..=35).contains(&p.y));
            assert_ne!(p, grid.center());
        }
        let cells: HashSet<Position> = obstacles.iter().map(|o| o.position).collect();
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn test_place_obstacles_small_grid_uses_whole_field() {
        let grid = Grid::new(6, 6);
        let mut rng = StdRng::seed_from_u64(9);

        let obstacles = place_obstacles(&grid, &HashSet::new(), 3, 0.0, &mut rng);
        assert_eq!(obstacles.len(), 3);
        assert!(obstacles.iter().all(|o| !o.moving));
    }

    #[test]
    fn test_weight_table_json_shape() {
        let table = WeightTable::new([(ItemKind::Normal, 0.7), (ItemKind::Slow, 0.3)]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"Normal","weight":0.7},{"kind":"Slow","weight":0.3}]"#
        );
        let back: WeightTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
