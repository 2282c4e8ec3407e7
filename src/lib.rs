//! Circle Islands - overlap islands for large populations of moving circles
//!
//! Core modules:
//! - `sim`: Per-frame collision pipeline (spatial grid, overlap graph, island settling)
//! - `settings`: World constraints and settling tuning, loadable from JSON

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// World configuration constants
pub mod consts {
    /// World dimensions (valid positions are `[0, WIDTH] x [0, HEIGHT]`)
    pub const WORLD_WIDTH: f32 = 640.0;
    pub const WORLD_HEIGHT: f32 = 360.0;

    /// Body extent bounds; the largest extent also sizes the grid cells
    pub const MIN_EXTENT: f32 = 2.0;
    pub const MAX_EXTENT: f32 = 8.0;

    /// Maximum velocity magnitude (world units per frame)
    pub const MAX_VELOCITY: f32 = 1.0;

    /// Default population
    pub const BODY_COUNT: usize = 512;
    /// Default run seed
    pub const DEFAULT_SEED: u64 = 0x5EED_1514;

    /// Settling sub-steps per island per frame
    pub const SETTLE_SUBSTEPS: u32 = 8;
    /// Duration of one settling sub-step, as a fraction of a frame
    pub const SETTLE_DT: f32 = 0.125;

    /// Spawned bodies keep this many max extents away from every wall
    pub const SPAWN_MARGIN_EXTENTS: f32 = 5.0;
    /// Rejection-sampling attempts per body before placement gives up
    pub const SPAWN_ATTEMPTS: u32 = 10_000;

    /// Radius range as fractions of the extent bounds
    pub const RADIUS_MIN_FACTOR: f32 = 0.55;
    pub const RADIUS_MAX_FACTOR: f32 = 0.45;
}
