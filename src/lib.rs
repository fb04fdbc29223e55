// Core module with fundamental types
pub mod core;

// World module with generation and streaming
pub mod world;

// Other modules
pub mod config;
pub mod constants;
pub mod raycast;

// Re-exports
pub use crate::core::{
    Block, BlockInfo, BlockKind, Chunk, ChunkCoord, Direction, WallMask, split_block_pos,
};
pub use config::{WorldSettings, load_settings, save_settings};
pub use constants::*;
pub use raycast::RayHit;
pub use world::{
    Biome, GenerationPool, NoiseField, PendingPlacement, PlacementQueue, RestitchEvent,
    StreamingGrid, TerrainGenerator, TickStats, WorldStreamer,
};
