//! Deferred block placements that cross chunk borders during generation.

use glam::IVec3;
use parking_lot::Mutex;

use crate::core::block::Block;
use crate::core::coord::ChunkCoord;

/// A block write aimed at a chunk other than the one being generated, held
/// until that chunk is resident.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PendingPlacement {
    pub chunk: ChunkCoord,
    /// In-chunk position, already wrapped into `[0, N)`.
    pub pos: IVec3,
    pub block: Block,
}

/// Shared queue between generation workers (producers) and the streaming
/// thread (consumer). All operations are a single short critical section;
/// workers batch their placements so generation itself never holds the lock.
#[derive(Default)]
pub struct PlacementQueue {
    entries: Mutex<Vec<PendingPlacement>>,
}

impl PlacementQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, placement: PendingPlacement) {
        self.entries.lock().push(placement);
    }

    /// Moves a whole batch in at once, draining `batch`.
    pub fn push_batch(&self, batch: &mut Vec<PendingPlacement>) {
        if batch.is_empty() {
            return;
        }
        self.entries.lock().append(batch);
    }

    /// Takes every queued entry; the caller applies or requeues them
    /// outside the lock.
    pub fn take_all(&self) -> Vec<PendingPlacement> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Returns entries that could not be applied yet.
    pub fn requeue(&self, mut kept: Vec<PendingPlacement>) {
        if kept.is_empty() {
            return;
        }
        self.entries.lock().append(&mut kept);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
