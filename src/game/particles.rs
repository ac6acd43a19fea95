//! Cosmetic bursts emitted when an item is eaten
//!
//! Particles live in cell coordinates with fractional precision. They have no
//! effect on the simulation; renderers round them to the nearest cell.

use rand::Rng;

use super::item::ItemKind;
use super::state::Position;

pub const PARTICLE_LIFE: u32 = 30;
pub const BURST_SIZE: usize = 10;
/// Maximum speed along each axis, in cells per tick
const MAX_VELOCITY: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: u32,
    pub kind: ItemKind,
}

impl Particle {
    pub fn update(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.life = self.life.saturating_sub(1);
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Fraction of life remaining, 1.0 when fresh
    pub fn strength(&self) -> f32 {
        self.life as f32 / PARTICLE_LIFE as f32
    }

    pub fn cell(&self) -> Position {
        Position::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// Spawn a burst centred on a cell
pub fn burst<R: Rng + ?Sized>(at: Position, kind: ItemKind, rng: &mut R) -> Vec<Particle> {
    (0..BURST_SIZE)
        .map(|_| Particle {
            x: at.x as f32,
            y: at.y as f32,
            vx: rng.gen_range(-MAX_VELOCITY..=MAX_VELOCITY),
            vy: rng.gen_range(-MAX_VELOCITY..=MAX_VELOCITY),
            life: PARTICLE_LIFE,
            kind,
        })
        .collect()
}

/// Advance every particle one tick and drop the expired ones
pub fn update_all(particles: &mut Vec<Particle>) {
    for particle in particles.iter_mut() {
        particle.update();
    }
    particles.retain(Particle::is_alive);
}
