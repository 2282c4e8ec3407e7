//! Island settling
//!
//! An island of overlapping bodies is advanced in small sub-steps. In each
//! sub-step every edge gets a conservative swept test; both ends of a
//! blocking edge hold still while the rest of the island moves. After the
//! last sub-step the whole island is stopped. There is no convergence check,
//! so an island may still overlap when it comes to rest.

use std::collections::HashSet;

use glam::Vec2;

use super::state::Body;
use crate::consts::{SETTLE_DT, SETTLE_SUBSTEPS};

/// Sub-step count and duration for settling an island
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleParams {
    pub substeps: u32,
    /// Fraction of the per-frame velocity applied per sub-step
    pub dt: f32,
}

impl Default for SettleParams {
    fn default() -> Self {
        Self {
            substeps: SETTLE_SUBSTEPS,
            dt: SETTLE_DT,
        }
    }
}

/// Summary of one island resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IslandOutcome {
    pub bodies: usize,
    pub edges: usize,
    /// Sum over sub-steps of bodies held still
    pub blocked: usize,
}

/// Swept overlap test over one sub-step
///
/// Checks both circles at their current and advanced positions in all four
/// combinations; any overlap blocks the pair.
pub fn is_blocking_step(a: &Body, b: &Body, dt: f32) -> bool {
    let a0 = a.circle();
    let b0 = b.circle();
    let a1 = a0.translated(a.vel * dt);
    let b1 = b0.translated(b.vel * dt);
    a0.overlaps(&b0) || a0.overlaps(&b1) || a1.overlaps(&b0) || a1.overlaps(&b1)
}

/// Collect both ends of every blocking edge into `blocked` (cleared first)
pub fn collect_blocked(
    bodies: &[Body],
    edges: &[(usize, usize)],
    dt: f32,
    blocked: &mut HashSet<usize>,
) {
    blocked.clear();
    for &(i, j) in edges {
        if is_blocking_step(&bodies[i], &bodies[j], dt) {
            blocked.insert(i);
            blocked.insert(j);
        }
    }
}

/// Run one sub-step: advance every unblocked vertex by `dt * vel`
///
/// Leaves the blocked set in `blocked` and returns its size.
pub fn settle_substep(
    bodies: &mut [Body],
    vertices: &[usize],
    edges: &[(usize, usize)],
    dt: f32,
    blocked: &mut HashSet<usize>,
) -> usize {
    collect_blocked(bodies, edges, dt, blocked);
    for &v in vertices {
        if !blocked.contains(&v) {
            let body = &mut bodies[v];
            body.pos += body.vel * dt;
        }
    }
    blocked.len()
}

/// Settle one island in place and stop all of its bodies
pub fn settle_island(
    bodies: &mut [Body],
    vertices: &[usize],
    edges: &[(usize, usize)],
    params: SettleParams,
) -> IslandOutcome {
    let mut blocked = HashSet::with_capacity(vertices.len());
    let mut outcome = IslandOutcome {
        bodies: vertices.len(),
        edges: edges.len(),
        blocked: 0,
    };

    for _ in 0..params.substeps {
        outcome.blocked += settle_substep(bodies, vertices, edges, params.dt, &mut blocked);
    }

    for &v in vertices {
        bodies[v].vel = Vec2::ZERO;
    }

    outcome
}
