use glam::IVec3;

use crate::constants::{CHUNK_SIZE, CHUNK_VOLUME};
use crate::core::block::Block;
use crate::core::coord::ChunkCoord;

/// A cube of `CHUNK_SIZE`³ blocks at a fixed chunk coordinate.
///
/// Chunks are produced whole by the terrain generator on worker threads and
/// then owned by the streaming grid; they carry no references back into the
/// grid, so they can move freely across threads.
pub struct Chunk {
    coord: ChunkCoord,
    blocks: [Block; CHUNK_VOLUME],
    empty: bool,
}

impl Chunk {
    /// An all-air chunk.
    pub fn new(coord: ChunkCoord) -> Self {
        Chunk {
            coord,
            blocks: [Block::AIR; CHUNK_VOLUME],
            empty: true,
        }
    }

    /// A chunk uniformly filled with one block.
    pub fn filled(coord: ChunkCoord, block: Block) -> Self {
        Chunk {
            coord,
            blocks: [block; CHUNK_VOLUME],
            empty: block.is_air(),
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// True when the last scan found no non-air block. Cleared eagerly on
    /// solid writes; only [`Chunk::scan_empty`] sets it back.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn in_bounds(pos: IVec3) -> bool {
        pos.min_element() >= 0 && pos.max_element() < CHUNK_SIZE
    }

    fn index(pos: IVec3) -> usize {
        (pos.x * CHUNK_SIZE * CHUNK_SIZE + pos.y * CHUNK_SIZE + pos.z) as usize
    }

    pub fn block(&self, pos: IVec3) -> Option<Block> {
        if Self::in_bounds(pos) {
            Some(self.blocks[Self::index(pos)])
        } else {
            None
        }
    }

    /// Writes one block; returns false if the position is out of range.
    pub fn set_block(&mut self, pos: IVec3, block: Block) -> bool {
        if !Self::in_bounds(pos) {
            return false;
        }
        self.blocks[Self::index(pos)] = block;
        self.empty = self.empty && block.is_air();
        true
    }

    /// Recomputes the is-empty flag with a full scan.
    pub fn scan_empty(&mut self) {
        self.empty = !self.blocks.iter().any(|b| !b.is_air());
    }
}
