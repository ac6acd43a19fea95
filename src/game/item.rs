//! Item taxonomy: what each edible kind is worth and what it does

use serde::{Deserialize, Serialize};

use super::state::Position;

/// Ticks the global slow effect lasts
pub const SLOW_TICKS: u32 = 300;
/// Ticks of self/opponent collision immunity
pub const GHOST_TICKS: u32 = 180;
/// Ticks of the speed multiplier
pub const SPEED_BOOST_TICKS: u32 = 300;
/// Tail segments removed by a shrink item
pub const SHRINK_SEGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Normal,
    Bonus,
    Slow,
    Shrink,
    Ghost,
    Speed,
}

/// What happens to the game when an item is eaten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Global slow, timer raised to at least `ticks`
    Slow { ticks: u32 },
    /// Drop up to `SHRINK_SEGMENTS` tail segments right away
    Shrink,
    /// Eater ignores self and opponent bodies, timer refreshed to `ticks`
    Ghost { ticks: u32 },
    /// Eater moves faster, timer refreshed to `ticks`
    SpeedBoost { ticks: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProfile {
    pub points: u32,
    pub effect: Effect,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Normal,
        ItemKind::Bonus,
        ItemKind::Slow,
        ItemKind::Shrink,
        ItemKind::Ghost,
        ItemKind::Speed,
    ];

    pub fn profile(&self) -> ItemProfile {
        match self {
            ItemKind::Normal => ItemProfile {
                points: 1,
                effect: Effect::None,
            },
            ItemKind::Bonus => ItemProfile {
                points: 5,
                effect: Effect::None,
            },
            ItemKind::Slow => ItemProfile {
                points: 2,
                effect: Effect::Slow { ticks: SLOW_TICKS },
            },
            ItemKind::Shrink => ItemProfile {
                points: 3,
                effect: Effect::Shrink,
            },
            ItemKind::Ghost => ItemProfile {
                points: 4,
                effect: Effect::Ghost { ticks: GHOST_TICKS },
            },
            ItemKind::Speed => ItemProfile {
                points: 3,
                effect: Effect::SpeedBoost {
                    ticks: SPEED_BOOST_TICKS,
                },
            },
        }
    }

    pub fn points(&self) -> u32 {
        self.profile().points
    }

    pub fn effect(&self) -> Effect {
        self.profile().effect
    }

    /// Anything other than plain food counts as a power-up for cues
    pub fn is_power_up(&self) -> bool {
        !matches!(self, ItemKind::Normal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Normal => "Normal",
            ItemKind::Bonus => "Bonus",
            ItemKind::Slow => "Slow",
            ItemKind::Shrink => "Shrink",
            ItemKind::Ghost => "Ghost",
            ItemKind::Speed => "Speed",
        }
    }
}

/// A food or power-up lying on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub position: Position,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(position: Position, kind: ItemKind) -> Self {
        Self { position, kind }
    }

    pub fn points(&self) -> u32 {
        self.kind.points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_values() {
        assert_eq!(ItemKind::Normal.points(), 1);
        assert_eq!(ItemKind::Bonus.points(), 5);
        assert_eq!(ItemKind::Slow.points(), 2);
        assert_eq!(ItemKind::Shrink.points(), 3);
        assert_eq!(ItemKind::Ghost.points(), 4);
        assert_eq!(ItemKind::Speed.points(), 3);
    }

    #[test]
    fn test_effects() {
        assert_eq!(ItemKind::Normal.effect(), Effect::None);
        assert_eq!(ItemKind::Bonus.effect(), Effect::None);
        assert_eq!(ItemKind::Slow.effect(), Effect::Slow { ticks: 300 });
        assert_eq!(ItemKind::Shrink.effect(), Effect::Shrink);
        assert_eq!(ItemKind::Ghost.effect(), Effect::Ghost { ticks: 180 });
        assert_eq!(ItemKind::Speed.effect(), Effect::SpeedBoost { ticks: 300 });
    }

    #[test]
    fn test_power_up_classification() {
        assert!(!ItemKind::Normal.is_power_up());
        assert!(
            ItemKind::ALL
                .iter()
                .filter(|k| **k != ItemKind::Normal)
                .all(|k| k.is_power_up())
        );
    }

    #[test]
    fn test_kind_serializes_by_name() {
        let json = serde_json::to_string(&ItemKind::Ghost).unwrap();
        assert_eq!(json, "\"Ghost\"");
    }
}
