//! Core data structures for the voxel world
//! Contains fundamental types like blocks, chunks, coordinates and face masks.

pub mod block;
pub mod chunk;
pub mod coord;

// Re-export commonly used types
pub use block::{Block, BlockInfo, BlockKind};
pub use chunk::Chunk;
pub use coord::{ChunkCoord, Direction, WallMask, split_block_pos, wrap_local};
