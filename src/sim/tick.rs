//! Per-frame simulation tick
//!
//! Rebuilds the grid and overlap graph, settles every island, then moves the
//! remaining free bodies with wall handling.

use super::settle::settle_island;
use super::state::{Body, World, WorldRng};
use crate::settings::Settings;

/// Counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Bucket pairs examined by the broad phase
    pub candidate_pairs: usize,
    /// Overlap edges recorded (duplicates included)
    pub overlaps: usize,
    pub islands: usize,
    /// Bodies stopped by island resolution
    pub settled_bodies: usize,
    /// Sum over islands and sub-steps of bodies held still
    pub blocked: usize,
}

impl FrameStats {
    /// Accumulate another frame into running totals
    pub fn add(&mut self, other: &FrameStats) {
        self.candidate_pairs += other.candidate_pairs;
        self.overlaps += other.overlaps;
        self.islands += other.islands;
        self.settled_bodies += other.settled_bodies;
        self.blocked += other.blocked;
    }
}

/// Advance the world by one frame
pub fn tick(world: &mut World) -> FrameStats {
    let World {
        settings,
        bodies,
        colors,
        frame,
        rng,
        grid,
        graph,
        settled,
    } = world;

    // Broad phase
    grid.clear();
    grid.reserve(bodies.len());
    for (i, body) in bodies.iter().enumerate() {
        grid.insert(i, body);
    }

    // Narrow-phase confirmed pairs become graph edges
    graph.clear();
    let candidate_pairs = grid.query(bodies, |i, j| graph.add_edge(i, j));

    // Islands
    settled.clear();
    settled.resize(bodies.len(), false);
    let params = settings.settle_params();
    let mut settled_bodies = 0;
    let mut blocked = 0;
    let islands = graph.query_islands(|vertices, edges| {
        let outcome = settle_island(bodies, vertices, edges, params);
        let color = rng.random_color();
        for &v in vertices {
            colors[v] = color;
            settled[v] = true;
        }
        settled_bodies += outcome.bodies;
        blocked += outcome.blocked;
    });

    // Everything else moves freely
    for (body, _) in bodies.iter_mut().zip(settled.iter()).filter(|(_, s)| !**s) {
        integrate_free(body, settings, rng);
    }

    *frame += 1;

    let stats = FrameStats {
        candidate_pairs,
        overlaps: graph.edge_count(),
        islands,
        settled_bodies,
        blocked,
    };
    log::trace!("Frame {}: {:?}", frame, stats);
    stats
}

/// Move a body by its full velocity and handle the world edges
///
/// A body at rest occasionally gets a fresh random velocity.
pub fn integrate_free(body: &mut Body, settings: &Settings, rng: &mut WorldRng) {
    body.pos += body.vel;

    if body.is_resting()
        && rng.random_bool()
        && rng.random_bool()
        && rng.random_bool()
        && rng.random_bool()
    {
        body.vel = rng.random_velocity(settings.max_velocity);
    }

    bounce_off_walls(body, settings, rng);
}

/// Point the velocity back into the world (or stop) on each crossed edge
pub fn bounce_off_walls(body: &mut Body, settings: &Settings, rng: &mut WorldRng) {
    let speed = settings.max_velocity;
    let mut wall = |inward: f32| if rng.random_bool() { inward } else { 0.0 };

    if body.pos.x < 0.0 {
        body.vel.x = wall(speed);
    }
    if body.pos.x > settings.world_width {
        body.vel.x = wall(-speed);
    }
    if body.pos.y < 0.0 {
        body.vel.y = wall(speed);
    }
    if body.pos.y > settings.world_height {
        body.vel.y = wall(-speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn body(x: f32, y: f32, r: f32, vx: f32, vy: f32) -> Body {
        Body::new(Vec2::new(x, y), r, Vec2::new(vx, vy))
    }

    fn world_with(bodies: Vec<Body>) -> World {
        World::from_bodies(Settings::default(), bodies)
    }

    #[test]
    fn test_closing_pair_settles() {
        let mut world = world_with(vec![
            body(0.0, 0.0, 1.0, 1.0, 0.0),
            body(3.0, 0.0, 1.0, -1.0, 0.0),
        ]);

        // Distance 3 > 2: no edge, both move freely
        let stats = tick(&mut world);
        assert_eq!(stats.overlaps, 0);
        assert_eq!(stats.islands, 0);
        assert_eq!(world.bodies[0].pos, Vec2::new(1.0, 0.0));
        assert_eq!(world.bodies[1].pos, Vec2::new(2.0, 0.0));

        // Distance 1 < 2: one island, held in place and stopped
        let stats = tick(&mut world);
        assert_eq!(stats.islands, 1);
        assert_eq!(stats.settled_bodies, 2);
        assert_eq!(world.bodies[0].pos, Vec2::new(1.0, 0.0));
        assert_eq!(world.bodies[1].pos, Vec2::new(2.0, 0.0));
        assert!(world.bodies.iter().all(|b| b.vel == Vec2::ZERO));
        assert!(world.was_settled(0) && world.was_settled(1));
        // One shared island color
        assert_eq!(world.colors[0], world.colors[1]);
    }

    #[test]
    fn test_settled_bodies_skip_free_integration() {
        let mut world = world_with(vec![
            body(100.0, 100.0, 2.0, 0.5, 0.0),
            body(101.0, 100.0, 2.0, -0.5, 0.0),
            body(200.0, 200.0, 2.0, 0.0, 0.75),
        ]);
        tick(&mut world);

        // Embedded pair stays put with zero velocity even after the frame
        assert_eq!(world.bodies[0].pos, Vec2::new(100.0, 100.0));
        assert!(world.bodies[0].is_resting());
        assert!(world.bodies[1].is_resting());
        // Free body moved by its full velocity
        assert_eq!(world.bodies[2].pos, Vec2::new(200.0, 200.75));
        assert!(!world.was_settled(2));
    }

    #[test]
    fn test_separate_islands_get_own_colors_per_island() {
        let mut world = world_with(vec![
            body(50.0, 50.0, 2.0, 0.0, 0.0),
            body(51.0, 50.0, 2.0, 0.0, 0.0),
            body(52.0, 50.0, 2.0, 0.0, 0.0),
            body(300.0, 200.0, 2.0, 0.0, 0.0),
            body(301.0, 200.0, 2.0, 0.0, 0.0),
        ]);
        let stats = tick(&mut world);
        assert_eq!(stats.islands, 2);
        assert_eq!(stats.settled_bodies, 5);
        assert_eq!(world.colors[0], world.colors[1]);
        assert_eq!(world.colors[1], world.colors[2]);
        assert_eq!(world.colors[3], world.colors[4]);
    }

    #[test]
    fn test_left_wall_never_leaves_negative_velocity() {
        let settings = Settings::default();
        for seed in 0..64 {
            let mut rng = WorldRng::new(seed);
            let mut b = body(0.2, 100.0, 1.0, -1.0, 0.0);
            integrate_free(&mut b, &settings, &mut rng);
            assert!(b.pos.x < 0.0);
            assert!(b.vel.x == 0.0 || b.vel.x == settings.max_velocity);
        }
    }

    #[test]
    fn test_all_walls_point_inward() {
        let settings = Settings::default();
        let mut saw_bounce = false;
        let mut saw_stop = false;
        for seed in 0..64 {
            let mut rng = WorldRng::new(seed);
            let mut b = body(
                settings.world_width + 0.5,
                settings.world_height + 0.5,
                1.0,
                1.0,
                1.0,
            );
            bounce_off_walls(&mut b, &settings, &mut rng);
            assert!(b.vel.x == 0.0 || b.vel.x == -settings.max_velocity);
            assert!(b.vel.y == 0.0 || b.vel.y == -settings.max_velocity);
            saw_bounce |= b.vel.x < 0.0;
            saw_stop |= b.vel.x == 0.0;

            let mut b = body(50.0, -0.5, 1.0, 0.3, -0.3);
            bounce_off_walls(&mut b, &settings, &mut rng);
            assert_eq!(b.vel.x, 0.3);
            assert!(b.vel.y == 0.0 || b.vel.y == settings.max_velocity);
        }
        assert!(saw_bounce && saw_stop);
    }

    #[test]
    fn test_resting_bodies_wake_up_eventually() {
        let mut world = world_with(vec![body(100.0, 100.0, 1.0, 0.0, 0.0)]);
        let woke = (0..200).any(|_| {
            tick(&mut world);
            !world.bodies[0].is_resting()
        });
        assert!(woke);
    }

    #[test]
    fn test_free_body_moves_full_velocity() {
        let mut world = world_with(vec![body(100.0, 100.0, 1.0, 0.5, -0.25)]);
        for _ in 0..4 {
            tick(&mut world);
        }
        assert_eq!(world.bodies[0].pos, Vec2::new(102.0, 99.0));
        assert_eq!(world.frame, 4);
    }

    #[test]
    fn test_overlapping_neighbors_hold_position() {
        // Both movers already overlap the resting body in the middle
        let mut world = world_with(vec![
            body(100.0, 100.0, 2.0, 0.0, 0.0),
            body(103.5, 100.0, 2.0, -1.0, 0.0),
            body(96.5, 100.0, 2.0, 1.0, 0.0),
        ]);
        let before: Vec<Vec2> = world.bodies.iter().map(|b| b.pos).collect();
        tick(&mut world);
        for (b, p) in world.bodies.iter().zip(&before) {
            assert_eq!(b.pos, *p);
            assert!(b.is_resting());
        }
    }

    #[test]
    fn test_determinism() {
        let settings = Settings {
            body_count: 300,
            seed: 99999,
            ..Settings::default()
        };
        let mut world1 = World::new(settings.clone()).unwrap();
        let mut world2 = World::new(settings).unwrap();

        let mut totals1 = FrameStats::default();
        let mut totals2 = FrameStats::default();
        for _ in 0..120 {
            totals1.add(&tick(&mut world1));
            totals2.add(&tick(&mut world2));
        }

        assert_eq!(totals1, totals2);
        assert_eq!(world1.snapshot(), world2.snapshot());
    }

    #[test]
    fn test_random_world_velocities_zero_after_settling() {
        let mut world = World::new(Settings {
            body_count: 400,
            seed: 5,
            ..Settings::default()
        })
        .unwrap();
        for _ in 0..200 {
            tick(&mut world);
            for (i, b) in world.bodies.iter().enumerate() {
                if world.was_settled(i) {
                    assert_eq!(b.vel, Vec2::ZERO);
                }
            }
        }
    }
}
