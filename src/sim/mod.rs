//! Collision pipeline
//!
//! Everything here is pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by body index, then first occurrence)
//! - No rendering or platform dependencies

pub mod geom;
pub mod graph;
pub mod grid;
pub mod settle;
pub mod state;
pub mod tick;

pub use geom::{Circle, circles_overlap};
pub use graph::OverlapGraph;
pub use grid::SpatialGrid;
pub use settle::{
    IslandOutcome, SettleParams, collect_blocked, is_blocking_step, settle_island, settle_substep,
};
pub use state::{Body, Rgba, World, WorldRng, WorldSnapshot};
pub use tick::{FrameStats, bounce_off_walls, integrate_free, tick};
