/// Host mixing rate, in samples per second per channel.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Emulated video frame rate driving chunk production.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Samples per channel rendered for one emulated frame (44100 / 60).
pub const DEFAULT_CHUNK_SIZE: usize = 735;

/// Samples per channel consumed by one driver callback.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

pub const STEREO_CHANNELS: usize = 2;

/// Backlog high-water mark, in blocks, past which pull skips ahead.
pub const DEFAULT_DRIFT_FACTOR: usize = 6;

/// Ring capacity as a multiple of the chunk size.
pub const DEFAULT_CAPACITY_MULTIPLIER: usize = 4;

/// Tolerance for comparing float samples in tests.
pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-6;
