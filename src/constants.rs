// --- Global Simulation Constants ---

// Field dimensions double as the window size; the window is not resizable so
// one field cell always maps to one pixel of the accumulation target.
pub const FIELD_WIDTH: u32 = 1024;
pub const FIELD_HEIGHT: u32 = 512;

pub const MAX_ITERATIONS: u32 = 1000;
pub const MAX_WALKERS: usize = 100;
pub const INITIAL_WALKER_COUNT: usize = 3;

// Number of random cell draws performed by a field reseed. Draws are with
// replacement, so the number of distinct ignition cells can be lower.
pub const RESEED_DRAWS: usize = 16;

// Upper bound on random probes when a seeking walker hunts for a set cell.
// Exhausting it is a normal outcome; the walker retries next tick.
pub const FIND_START_ATTEMPTS: usize = 1000;

// Each behavior flag (per-walker and global) comes up true with this
// probability whenever it is re-rolled.
pub const TRAIT_PROBABILITY: f64 = 0.2;

pub const SEEK_ANGULAR_VEL_RANGE: f32 = 0.1;
pub const WALK_ANGULAR_VEL_RANGE: f32 = 0.3;
pub const TWIRL_IN_FACTOR: f32 = 1.001;
pub const TWIRL_OUT_FACTOR: f32 = 0.999;

// --- Rendering Constants ---

pub const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};
// Half-extent of a walker point quad, in pixels (2 px points).
pub const POINT_HALF_SIZE: f32 = 1.0;
pub const TRAIL_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
// Translucent white wash drawn over the accumulation target on regeneration.
pub const FADE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.5];

pub const FPS_UPDATE_INTERVAL_SECS: f64 = 0.5;
