//! World generation and streaming modules.
//! Contains terrain noise, chunk generation, storage and the sliding window.

pub mod generator;
pub mod grid;
pub mod loader;
pub mod noise;
pub mod placements;
pub mod store;
pub mod streamer;

// Re-export commonly used types
pub use generator::{Biome, TerrainGenerator};
pub use grid::{RestitchEvent, StreamingGrid};
pub use loader::GenerationPool;
pub use noise::NoiseField;
pub use placements::{PendingPlacement, PlacementQueue};
pub use store::{ChunkStore, SlotId};
pub use streamer::{TickStats, WorldStreamer};
