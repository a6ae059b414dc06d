use glam::Vec3;

// Shared tuning constants used by the simulations, the router and both front-ends.

// Frame timing
pub const REFERENCE_FRAME_DT: f32 = 1.0 / 60.0; // per-frame rates below are tuned at 60 Hz
pub const MAX_FRAME_DT: f32 = 0.1; // clamp long stalls (tab switches) to one sane step
pub const MAX_DRAIN_FRAMES: u32 = 10_000; // upper bound when fast-forwarding a teardown

// Camera defaults matching the reading room
pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 7.0, 13.0);
pub const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const CAMERA_FOVY_DEG: f32 = 70.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Hover feedback
pub const HOVER_RAISE: f32 = 0.3; // world units an interactable lifts when hovered
pub const HOVER_SMOOTHING: f32 = 0.1; // fraction of remaining distance per 60 Hz frame
pub const DEFAULT_PICK_RADIUS: f32 = 0.5;

// Heart convergence
pub const HEART_COUNT: usize = 3_500;
pub const HEART_SCALE: f32 = 23.0;
pub const HEART_ORIGIN: Vec3 = Vec3::new(3.0, 8.5, 3.0);
pub const HEART_DAMPING: Vec3 = Vec3::new(0.009, 0.01, 0.009);
pub const HEART_OPACITY: f32 = 0.9;
pub const HEART_POINT_SIZE: f32 = 0.08;
pub const HEART_SPAWN_FRAMES: u32 = 30;
pub const HEART_OUTRO_FRAMES: u32 = 50; // outro progress advances 0.02 per frame
pub const HEART_SPIN: f32 = 0.0015;
pub const HEART_OUTRO_SPIN: f32 = 0.004;
pub const HEART_CONVERGED_EPSILON: f32 = 0.5;

// Audio wave
pub const WAVE_LAYERS: usize = 20;
pub const WAVE_POINTS_PER_LAYER: usize = 400;
pub const WAVE_WIDTH: f32 = 16.0;
pub const WAVE_DEPTH: f32 = 8.0;
pub const WAVE_AMPLITUDE: f32 = 1.0;
pub const WAVE_HEIGHT_SCALE: f32 = 3.0;
pub const WAVE_AUDIO_GAIN: f32 = 1.0; // k in the displacement formula, must stay <= 1
pub const WAVE_SMOOTHING: f32 = 0.12;
pub const WAVE_SPAWN_SECONDS: f32 = 1.5;
pub const WAVE_EXIT_SECONDS: f32 = 2.5;
pub const WAVE_POINT_SIZE: f32 = 0.06;
pub const WAVE_AMBIENT_BATCH: usize = 40;
pub const WAVE_AMBIENT_MAX: usize = 4_000;
pub const WAVE_AMBIENT_BASE_RADIUS: f32 = 6.0;
pub const WAVE_AMBIENT_RADIUS_STEP: f32 = 0.004;
pub const WAVE_AMBIENT_JITTER: f32 = 0.3;
pub const WAVE_TRACK: &str = "sounds/wave.mp3";

// Glyph liberation
pub const LIBERATION_LABEL: &str = "Aquarius Independence";
pub const LIBERATION_INSTANCES: usize = 2;
pub const LIBERATION_GLYPH_SPACING: f32 = 0.18;
pub const LIBERATION_DEPTH_STEP: f32 = 0.35;
pub const LIBERATION_DISTANCE: f32 = 2.2;
pub const LIBERATION_FADE_IN: f32 = 0.02; // additive opacity per frame while anchored
pub const LIBERATION_DECAY: f32 = 0.985; // multiplicative opacity per frame once launched
pub const LIBERATION_MIN_SPEED: f32 = 0.06;
pub const LIBERATION_SPEED_SPREAD: f32 = 0.04;
pub const LIBERATION_EXIT_SECONDS: f32 = 0.4;
pub const LIBERATION_SPRITE_SIZE: f32 = 0.55;

// Presentation
pub const DEFAULT_BACKGROUND: [f32; 3] = [0.529, 0.808, 0.922]; // #87ceeb
pub const NIGHT_BACKGROUND: [f32; 3] = [0.043, 0.118, 0.247]; // #0b1e3f
pub const NIGHT_VISION_FOG: [f32; 3] = [0.267, 0.267, 0.267]; // #444444
pub const SKY_TIME_STEP: f32 = 0.0005; // tie-dye sky phase per 60 Hz frame
pub const DAISY_TRACK: &str = "sounds/DAISIES.mp3";
pub const AMBIENT_TRACK: &str = "sounds/ambient.mp3";
