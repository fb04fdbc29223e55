// World constants
pub const CHUNK_SIZE: i32 = 16;
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;
pub const STREAM_RADIUS: i32 = 4;
// Terrain above this chunk-y is all air, below zero all stone
pub const GEN_HEIGHT: f32 = 2.25;
pub const GEN_DEPTH: i32 = 0;

// Streaming constants
pub const MAX_INSTALLS_PER_TICK: usize = 32;
pub const REQUEST_QUEUE_CAPACITY: usize = 256;
pub const RESULT_QUEUE_CAPACITY: usize = 64;
pub const RESERVED_THREADS: usize = 2;
// Halo beyond the window where queued placements stay alive
pub const EVICT_MARGIN: i32 = 1;
