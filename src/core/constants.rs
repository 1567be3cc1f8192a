// Landscape configuration constants
// Defaults and valid ranges for every tunable value used by the streaming core

// === WINDOW AND DISPLAY ===
pub const WINDOW_TITLE: &str = "Procedural Landscape";
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 720.0;

// === LANDSCAPE STREAMING ===
pub mod landscape {
    pub const DEFAULT_LOAD_RADIUS: f32 = 1000.0;
    pub const DEFAULT_UNLOAD_RADIUS: f32 = 1333.0; // Keep > load radius so edge chunks don't flicker
    pub const DEFAULT_CHUNK_SIZE: f32 = 100.0;
    pub const DEFAULT_STEPS_PER_CHUNK: u32 = 16;
    pub const DEFAULT_HORIZONTAL_NOISE_SCALE: f32 = 400.0;
    pub const DEFAULT_VERTICAL_SCALE: f32 = 30.0;
    pub const DEFAULT_NOISE_SEED: u32 = 42;

    // Valid ranges, checked when settings are loaded
    pub const MIN_RADIUS: f32 = 1.0;
    pub const MAX_RADIUS: f32 = 10_000_000.0;
    pub const MIN_CHUNK_SIZE: f32 = 1.0;
    pub const MAX_CHUNK_SIZE: f32 = 100_000.0;
    pub const MIN_STEPS_PER_CHUNK: u32 = 1;
    pub const MAX_STEPS_PER_CHUNK: u32 = 255;
    pub const MIN_HORIZONTAL_NOISE_SCALE: f32 = 0.001;
    pub const MAX_HORIZONTAL_NOISE_SCALE: f32 = 10_000_000.0;
    pub const MAX_VERTICAL_SCALE: f32 = 100_000.0; // Symmetric: negative inverts the terrain
}

// === MESH SYNTHESIS ===
pub mod mesh {
    /// World units covered by one UV unit (100 units = 1 texture repeat)
    pub const UV_UNITS_PER_WORLD_UNIT: f32 = 0.01;
    pub const VERTEX_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Placeholder; real tangents are not computed
    pub const PLACEHOLDER_TANGENT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
}

// === BACKGROUND WORKER ===
pub mod worker {
    pub const THREAD_NAME: &str = "landscape-mesh-worker";
}

// === DEMO CAMERA ===
pub mod camera {
    pub const START_HEIGHT: f32 = 120.0;
    pub const FLY_SPEED: f32 = 150.0;
    pub const FAST_MULTIPLIER: f32 = 5.0; // Shift key multiplier
    pub const LOOK_SENSITIVITY: f32 = 0.003;
    pub const PITCH_LIMIT: f32 = 1.5; // Maximum pitch angle in radians
}

// === HOTKEYS ===
pub mod hotkeys {
    use bevy::prelude::KeyCode;

    pub const WIREFRAME_TOGGLE: KeyCode = KeyCode::KeyT;
    pub const FLY_UP: KeyCode = KeyCode::KeyE;
    pub const FLY_DOWN: KeyCode = KeyCode::KeyQ;
}

// === FILES ===
pub mod files {
    pub const SETTINGS_PATH: &str = "assets/landscape.toml";
    pub const FLAME_OUTPUT_PATH: &str = "landscape.folded";
}
