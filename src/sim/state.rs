//! World state and core simulation types
//!
//! The world owns the body array plus the per-frame scratch structures
//! (grid and overlap graph) that are cleared and rebuilt every tick.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Circle;
use super::graph::OverlapGraph;
use super::grid::SpatialGrid;
use crate::consts::SPAWN_ATTEMPTS;
use crate::settings::{Settings, SettingsError};

/// A moving circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Fixed at creation, always > 0
    pub radius: f32,
    pub vel: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32, vel: Vec2) -> Self {
        debug_assert!(radius > 0.0, "body radius must be positive");
        Self { pos, radius, vel }
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Exactly zero velocity (settled or stopped by a wall)
    #[inline]
    pub fn is_resting(&self) -> bool {
        self.vel == Vec2::ZERO
    }
}

/// Display color of a body (consumed by whatever draws the world)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Seeded randomness for placement, wake-ups, wall bounces and island colors
#[derive(Debug, Clone)]
pub struct WorldRng {
    seed: u64,
    rng: Pcg32,
}

impl WorldRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// True two times out of three
    pub fn random_bool(&mut self) -> bool {
        self.rng.random_ratio(2, 3)
    }

    /// Uniform point inside the world, keeping the spawn margin from every wall
    pub fn random_point(&mut self, settings: &Settings) -> Vec2 {
        let margin = settings.spawn_margin();
        let x = self.rng.random_range(margin..=settings.world_width - margin);
        let y = self.rng.random_range(margin..=settings.world_height - margin);
        Vec2::new(x, y)
    }

    /// Uniform direction, uniform speed in `[0, max_velocity]`
    pub fn random_velocity(&mut self, max_velocity: f32) -> Vec2 {
        let angle = self.rng.random_range(0.0..TAU);
        let speed = self.rng.random_range(0.0..=max_velocity);
        Vec2::from_angle(angle) * speed
    }

    pub fn random_radius(&mut self, settings: &Settings) -> f32 {
        self.rng
            .random_range(settings.min_radius()..=settings.max_radius())
    }

    /// Dim color, occasionally with one bright channel
    pub fn random_color(&mut self) -> Rgba {
        let bright = self.rng.random_range(0..=4u8);
        let mut channel = |which: u8| {
            let level: u8 = self.rng.random_range(128..=255);
            if bright == which { level } else { level - 128 }
        };
        let r = channel(1);
        let g = channel(2);
        let b = channel(3);
        Rgba::opaque(r, g, b)
    }
}

/// Serializable view of the world at a frame boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub seed: u64,
    pub frame: u64,
    pub bodies: Vec<Body>,
    pub colors: Vec<Rgba>,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub settings: Settings,
    /// Bodies, indexed 0..N-1 in stable order
    pub bodies: Vec<Body>,
    /// One color per body, repainted per island
    pub colors: Vec<Rgba>,
    /// Frames simulated so far
    pub frame: u64,
    pub(crate) rng: WorldRng,
    pub(crate) grid: SpatialGrid,
    pub(crate) graph: OverlapGraph,
    /// Bodies touched by island resolution this frame
    pub(crate) settled: Vec<bool>,
}

impl World {
    /// Create a world with `settings.body_count` randomly placed, non-overlapping bodies
    ///
    /// Settings are validated first; the spawn ranges are empty otherwise.
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut rng = WorldRng::new(settings.seed);
        let bodies = spawn_bodies(&settings, &mut rng);
        if bodies.len() < settings.body_count {
            log::warn!(
                "Placed only {} of {} bodies (world too crowded)",
                bodies.len(),
                settings.body_count
            );
        }
        log::info!(
            "World {}x{}: {} bodies, seed {}",
            settings.world_width,
            settings.world_height,
            bodies.len(),
            settings.seed
        );
        Ok(Self::assemble(settings, bodies, rng))
    }

    /// Create a world around caller-supplied bodies
    pub fn from_bodies(settings: Settings, bodies: Vec<Body>) -> Self {
        let rng = WorldRng::new(settings.seed);
        Self::assemble(settings, bodies, rng)
    }

    fn assemble(settings: Settings, bodies: Vec<Body>, mut rng: WorldRng) -> Self {
        let colors = bodies.iter().map(|_| rng.random_color()).collect();
        // Caller-supplied bodies may exceed the configured extents
        let widest = bodies.iter().map(|b| 2.0 * b.radius).fold(0.0, f32::max);
        let grid = SpatialGrid::new(settings.cell_size().max(widest));
        let settled = vec![false; bodies.len()];
        Self {
            settings,
            bodies,
            colors,
            frame: 0,
            rng,
            grid,
            graph: OverlapGraph::default(),
            settled,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Whether island resolution touched `index` during the last frame
    pub fn was_settled(&self, index: usize) -> bool {
        self.settled.get(index).copied().unwrap_or(false)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            seed: self.rng.seed(),
            frame: self.frame,
            bodies: self.bodies.clone(),
            colors: self.colors.clone(),
        }
    }
}

/// Rejection-sample non-overlapping bodies with random velocities
fn spawn_bodies(settings: &Settings, rng: &mut WorldRng) -> Vec<Body> {
    let mut bodies: Vec<Body> = Vec::with_capacity(settings.body_count);

    for _ in 0..settings.body_count {
        let placed = (0..SPAWN_ATTEMPTS).find_map(|_| {
            let candidate = Circle::new(rng.random_point(settings), rng.random_radius(settings));
            let blocked = bodies.iter().any(|b| b.circle().overlaps(&candidate));
            (!blocked).then_some(candidate)
        });

        match placed {
            Some(circle) => {
                let vel = rng.random_velocity(settings.max_velocity);
                bodies.push(Body::new(circle.center, circle.radius, vel));
            }
            None => break,
        }
    }

    bodies
}
