//! Slab storage for resident chunks with free-list slot reuse.

use crate::core::chunk::Chunk;

/// Index of an occupied slot in a [`ChunkStore`]. Only the streaming grid
/// creates these, so a live id always points at an occupied slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SlotId(u32);

impl SlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fixed-capacity arena of chunk payloads.
///
/// Capacity equals the streaming window volume, so the window geometry
/// guarantees a free slot for every legal allocation; running out means the
/// grid bookkeeping is corrupt and is treated as fatal.
pub struct ChunkStore {
    slots: Vec<Option<Chunk>>,
    open: Vec<u32>,
}

impl ChunkStore {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        ChunkStore {
            slots,
            open: (0..capacity as u32).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len() - self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves a chunk into a free slot.
    pub fn allocate(&mut self, chunk: Chunk) -> SlotId {
        let Some(index) = self.open.pop() else {
            panic!(
                "chunk store exhausted at capacity {}; window bookkeeping is corrupt",
                self.capacity()
            );
        };
        debug_assert!(self.slots[index as usize].is_none());
        self.slots[index as usize] = Some(chunk);
        SlotId(index)
    }

    /// Moves the chunk out and returns the slot to the free list.
    pub fn release(&mut self, id: SlotId) -> Chunk {
        let Some(chunk) = self.slots[id.index()].take() else {
            panic!("released unoccupied chunk slot {}", id.index());
        };
        self.open.push(id.0);
        chunk
    }

    pub fn get(&self, id: SlotId) -> &Chunk {
        match &self.slots[id.index()] {
            Some(chunk) => chunk,
            None => panic!("read of unoccupied chunk slot {}", id.index()),
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> &mut Chunk {
        match &mut self.slots[id.index()] {
            Some(chunk) => chunk,
            None => panic!("write to unoccupied chunk slot {}", id.index()),
        }
    }
}
