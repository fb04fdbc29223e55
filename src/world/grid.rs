//! Sliding-window grid that tracks which chunks are resident around the
//! observer and owns their storage.

use glam::IVec3;

use crate::core::block::Block;
use crate::core::chunk::Chunk;
use crate::core::coord::{ChunkCoord, Direction, WallMask, split_block_pos};
use crate::world::store::{ChunkStore, SlotId};

/// Lifecycle state of one window cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
enum CellState {
    /// Nothing resident and no generation job in flight.
    #[default]
    Empty,
    /// A generation job for this coordinate has been submitted.
    Requested,
    /// Chunk data lives in the store; the mask tracks which faces still
    /// wait for a neighbor to be stitched against.
    Resident { slot: SlotId, walls: WallMask },
}

/// A chunk boundary whose both sides are now resident and whose shared wall
/// must be re-stitched by the mesh layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RestitchEvent {
    pub chunk: ChunkCoord,
    pub face: Direction,
}

/// Cubic window of side `2r + 1` centered on the observer's chunk.
///
/// The grid is single-owner state: workers never touch it, they hand
/// finished chunks to the owning thread which installs them here. Cells map
/// world coordinates to store slots; recentering slides cell contents
/// instead of moving chunk payloads.
pub struct StreamingGrid {
    center: ChunkCoord,
    radius: i32,
    row: i32,
    cells: Vec<CellState>,
    store: ChunkStore,
    restitch: Vec<RestitchEvent>,
}

impl StreamingGrid {
    pub fn new(center: ChunkCoord, radius: i32) -> Self {
        assert!(radius >= 1, "window radius must be at least 1");
        let row = 2 * radius + 1;
        let volume = (row * row * row) as usize;
        StreamingGrid {
            center,
            radius,
            row,
            cells: vec![CellState::Empty; volume],
            store: ChunkStore::new(volume),
            restitch: Vec::new(),
        }
    }

    pub fn center(&self) -> ChunkCoord {
        self.center
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Total number of window cells.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn resident_count(&self) -> usize {
        self.store.len()
    }

    /// Window-relative position of a coordinate, if it lies inside.
    fn local_of(&self, coord: ChunkCoord) -> Option<IVec3> {
        let local = IVec3::new(
            coord.x - self.center.x + self.radius,
            coord.y - self.center.y + self.radius,
            coord.z - self.center.z + self.radius,
        );
        (local.min_element() >= 0 && local.max_element() < self.row).then_some(local)
    }

    fn cell_index(&self, local: IVec3) -> usize {
        (local.x + local.y * self.row + local.z * self.row * self.row) as usize
    }

    fn coord_of_index(&self, index: usize) -> ChunkCoord {
        let index = index as i32;
        let base = self.center - ChunkCoord::new(self.radius, self.radius, self.radius);
        base + ChunkCoord::new(
            index % self.row,
            (index / self.row) % self.row,
            index / (self.row * self.row),
        )
    }

    pub fn in_window(&self, coord: ChunkCoord) -> bool {
        self.local_of(coord).is_some()
    }

    fn state(&self, coord: ChunkCoord) -> Option<CellState> {
        self.local_of(coord).map(|l| self.cells[self.cell_index(l)])
    }

    /// True when the chunk at `coord` is resident.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        matches!(self.state(coord), Some(CellState::Resident { .. }))
    }

    pub fn is_requested(&self, coord: ChunkCoord) -> bool {
        matches!(self.state(coord), Some(CellState::Requested))
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        match self.state(coord)? {
            CellState::Resident { slot, .. } => Some(self.store.get(slot)),
            _ => None,
        }
    }

    /// Mutable chunk access. Callers that change boundary blocks follow up
    /// with [`StreamingGrid::notify_block_changed`].
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        match self.state(coord)? {
            CellState::Resident { slot, .. } => Some(self.store.get_mut(slot)),
            _ => None,
        }
    }

    /// Wall-dirty mask of a resident chunk.
    pub fn dirty_walls(&self, coord: ChunkCoord) -> Option<WallMask> {
        match self.state(coord)? {
            CellState::Resident { walls, .. } => Some(walls),
            _ => None,
        }
    }

    /// True when every cell of the window is resident.
    pub fn fully_resident(&self) -> bool {
        self.store.len() == self.cells.len()
    }

    /// Coordinates with neither a resident chunk nor an in-flight job.
    pub fn missing(&self) -> Vec<ChunkCoord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| matches!(state, CellState::Empty))
            .map(|(index, _)| self.coord_of_index(index))
            .collect()
    }

    /// All currently resident coordinates.
    pub fn resident_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| matches!(state, CellState::Resident { .. }))
            .map(|(index, _)| self.coord_of_index(index))
    }

    /// All currently resident chunks.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.cells.iter().filter_map(|state| match state {
            CellState::Resident { slot, .. } => Some(self.store.get(*slot)),
            _ => None,
        })
    }

    /// Records that a generation job was submitted for `coord`.
    pub fn mark_requested(&mut self, coord: ChunkCoord) -> bool {
        let Some(local) = self.local_of(coord) else {
            return false;
        };
        let index = self.cell_index(local);
        if matches!(self.cells[index], CellState::Empty) {
            self.cells[index] = CellState::Requested;
            true
        } else {
            false
        }
    }

    /// Installs a finished chunk. Returns false when the chunk is no longer
    /// wanted (left the window while generating, or the cell is already
    /// resident); such chunks are simply dropped by the caller.
    pub fn install(&mut self, chunk: Chunk) -> bool {
        let coord = chunk.coord();
        let Some(local) = self.local_of(coord) else {
            return false;
        };
        let index = self.cell_index(local);
        if matches!(self.cells[index], CellState::Resident { .. }) {
            return false;
        }

        let slot = self.store.allocate(chunk);
        self.cells[index] = CellState::Resident {
            slot,
            walls: WallMask::ALL,
        };
        self.propagate_walls(coord);
        true
    }

    /// Block lookup across chunks by world block position.
    pub fn block(&self, world: IVec3) -> Option<Block> {
        let (coord, local) = split_block_pos(world);
        self.get(coord)?.block(local)
    }

    /// Block write across chunks. Returns false when the target chunk is
    /// not resident. Edits flow through wall-dirty notification.
    pub fn set_block(&mut self, world: IVec3, block: Block) -> bool {
        let (coord, local) = split_block_pos(world);
        let Some(chunk) = self.get_mut(coord) else {
            return false;
        };
        chunk.set_block(local, block);
        self.notify_block_changed(coord, local);
        true
    }

    /// Marks walls dirty after a content change at `pos` inside `coord`:
    /// the chunk's own six faces, plus the facing wall of every resident
    /// neighbor whose boundary layer the position touches.
    pub fn notify_block_changed(&mut self, coord: ChunkCoord, pos: IVec3) {
        self.mark_all_walls(coord);
        let touching = WallMask::touching(pos);
        for dir in Direction::ALL {
            if touching.is_set(dir) {
                let neighbor = coord.neighbor(dir);
                self.mark_wall(neighbor, dir.opposite());
                self.propagate_walls(neighbor);
            }
        }
        self.propagate_walls(coord);
    }

    fn mark_all_walls(&mut self, coord: ChunkCoord) {
        if let Some(local) = self.local_of(coord) {
            let index = self.cell_index(local);
            if let CellState::Resident { walls, .. } = &mut self.cells[index] {
                *walls = WallMask::ALL;
            }
        }
    }

    fn mark_wall(&mut self, coord: ChunkCoord, dir: Direction) {
        if let Some(local) = self.local_of(coord) {
            let index = self.cell_index(local);
            if let CellState::Resident { walls, .. } = &mut self.cells[index] {
                walls.set(dir);
            }
        }
    }

    /// Consults each resident neighbor of `coord` for its dirty faces:
    /// the shared wall's bits clear on both sides and the pair becomes a
    /// restitch event (skipped when both sides are empty chunks). Faces
    /// whose neighbor is absent stay dirty until it streams in.
    fn propagate_walls(&mut self, coord: ChunkCoord) {
        let Some(local) = self.local_of(coord) else {
            return;
        };
        let index = self.cell_index(local);
        let CellState::Resident { slot, walls } = self.cells[index] else {
            return;
        };

        for dir in Direction::ALL {
            if !walls.is_set(dir) {
                continue;
            }
            let neighbor = coord.neighbor(dir);
            let Some(neighbor_local) = self.local_of(neighbor) else {
                continue;
            };
            let neighbor_index = self.cell_index(neighbor_local);
            let CellState::Resident {
                slot: neighbor_slot,
                walls: neighbor_walls,
            } = &mut self.cells[neighbor_index]
            else {
                continue;
            };

            let neighbor_empty = self.store.get(*neighbor_slot).is_empty();
            neighbor_walls.clear(dir.opposite());

            if let CellState::Resident { walls, .. } = &mut self.cells[index] {
                walls.clear(dir);
            }

            if !(self.store.get(slot).is_empty() && neighbor_empty) {
                self.restitch.push(RestitchEvent { chunk: coord, face: dir });
            }
        }
    }

    /// Drained by the mesh layer; order follows discovery.
    pub fn take_restitch_events(&mut self) -> Vec<RestitchEvent> {
        std::mem::take(&mut self.restitch)
    }

    /// Slides the window to a new center. Overlapping cells shift in place,
    /// everything that leaves the window is released back to the store.
    /// Requested markers shift too: their jobs are still in flight and
    /// deliver by coordinate. A move with no overlap clears the window.
    pub fn recenter(&mut self, new_center: ChunkCoord) {
        if new_center == self.center {
            return;
        }
        let delta = new_center - self.center;
        let overlaps = delta.x.abs() <= 2 * self.radius
            && delta.y.abs() <= 2 * self.radius
            && delta.z.abs() <= 2 * self.radius;

        if !overlaps {
            let mut evicted = 0usize;
            for index in 0..self.cells.len() {
                if let CellState::Resident { slot, .. } =
                    std::mem::take(&mut self.cells[index])
                {
                    self.store.release(slot);
                    evicted += 1;
                }
            }
            self.center = new_center;
            tracing::debug!(?new_center, evicted, "window teleported, cleared");
            return;
        }

        let mut evicted = 0usize;
        let mut carried = 0usize;

        // Walk each axis away from the motion so targets are always cells
        // this pass has already vacated.
        let row = self.row;
        let order = |d: i32, i: i32| if d > 0 { i } else { row - 1 - i };

        for zi in 0..row {
            let z = order(delta.z, zi);
            for yi in 0..row {
                let y = order(delta.y, yi);
                for xi in 0..row {
                    let x = order(delta.x, xi);
                    let source = self.cell_index(IVec3::new(x, y, z));
                    let state = std::mem::take(&mut self.cells[source]);
                    let target = IVec3::new(x - delta.x, y - delta.y, z - delta.z);
                    let inside =
                        target.min_element() >= 0 && target.max_element() < row;
                    match state {
                        CellState::Empty => {}
                        CellState::Requested => {
                            if inside {
                                let target_index = self.cell_index(target);
                                self.cells[target_index] = CellState::Requested;
                            }
                        }
                        CellState::Resident { slot, walls } => {
                            if inside {
                                let target_index = self.cell_index(target);
                                self.cells[target_index] =
                                    CellState::Resident { slot, walls };
                                carried += 1;
                            } else {
                                self.store.release(slot);
                                evicted += 1;
                            }
                        }
                    }
                }
            }
        }

        self.center = new_center;
        tracing::debug!(?new_center, carried, evicted, "window recentered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CHUNK_SIZE;
    use crate::core::block::BlockKind;

    fn marked_chunk(coord: ChunkCoord) -> Chunk {
        // marker block encodes the coordinate so shifts can be verified
        let mut chunk = Chunk::new(coord);
        chunk.set_block(
            IVec3::new(
                coord.x.rem_euclid(CHUNK_SIZE),
                coord.y.rem_euclid(CHUNK_SIZE),
                coord.z.rem_euclid(CHUNK_SIZE),
            ),
            Block::new(BlockKind::Stone),
        );
        chunk
    }

    fn fill(grid: &mut StreamingGrid) {
        for coord in grid.missing() {
            assert!(grid.install(marked_chunk(coord)));
        }
    }

    fn assert_marker(grid: &StreamingGrid, coord: ChunkCoord) {
        let chunk = grid.get(coord).expect("chunk should be resident");
        assert_eq!(chunk.coord(), coord);
        let pos = IVec3::new(
            coord.x.rem_euclid(CHUNK_SIZE),
            coord.y.rem_euclid(CHUNK_SIZE),
            coord.z.rem_euclid(CHUNK_SIZE),
        );
        assert_eq!(chunk.block(pos).unwrap().kind, BlockKind::Stone);
    }

    #[test]
    fn test_window_bijection_after_recenters() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 2);
        fill(&mut grid);

        let moves = [
            ChunkCoord::new(1, 0, 0),
            ChunkCoord::new(1, 1, -1),
            ChunkCoord::new(-2, 1, 0),
            ChunkCoord::new(-2, 1, 0),
            ChunkCoord::new(40, -7, 3),
            ChunkCoord::new(41, -7, 2),
        ];
        for center in moves {
            grid.recenter(center);
            fill(&mut grid);
            assert!(grid.fully_resident());
            assert_eq!(grid.chunks().count(), grid.capacity());
            for dx in -2..=2 {
                for dy in -2..=2 {
                    for dz in -2..=2 {
                        let coord = center + ChunkCoord::new(dx, dy, dz);
                        assert_marker(&grid, coord);
                    }
                }
            }
            // nothing outside the window answers
            assert!(grid.get(center + ChunkCoord::new(3, 0, 0)).is_none());
            assert!(!grid.contains(center + ChunkCoord::new(0, -3, 0)));
        }
    }

    #[test]
    fn test_recenter_same_center_is_noop() {
        let mut grid = StreamingGrid::new(ChunkCoord::new(4, 0, -4), 2);
        fill(&mut grid);
        let before: Vec<_> = grid.resident_coords().collect();
        grid.recenter(ChunkCoord::new(4, 0, -4));
        let after: Vec<_> = grid.resident_coords().collect();
        assert_eq!(before, after);
        assert!(grid.fully_resident());
    }

    #[test]
    fn test_shift_preserves_surviving_chunks() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 2);
        fill(&mut grid);

        grid.recenter(ChunkCoord::new(1, 0, 0));

        // the x = -2 slice left the window, everything else survived
        for dx in -1..=2 {
            for dy in -2..=2 {
                for dz in -2..=2 {
                    assert_marker(&grid, ChunkCoord::new(dx, dy, dz));
                }
            }
        }
        assert!(!grid.contains(ChunkCoord::new(-2, 0, 0)));
        assert_eq!(grid.resident_count(), 100);

        // the vacated slice is reported missing, at the leading edge
        let missing = grid.missing();
        assert_eq!(missing.len(), 25);
        assert!(missing.iter().all(|c| c.x == 3));
    }

    #[test]
    fn test_teleport_clears_window() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 2);
        fill(&mut grid);
        grid.recenter(ChunkCoord::new(100, 0, 0));
        assert_eq!(grid.resident_count(), 0);
        assert_eq!(grid.missing().len(), grid.capacity());
    }

    #[test]
    fn test_requested_markers_shift() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 2);
        assert!(grid.mark_requested(ChunkCoord::new(2, 0, 0)));
        assert!(!grid.mark_requested(ChunkCoord::new(2, 0, 0)));

        grid.recenter(ChunkCoord::new(1, 0, 0));
        assert!(grid.is_requested(ChunkCoord::new(2, 0, 0)));

        // the marker left the window with this move
        grid.recenter(ChunkCoord::new(5, 0, 0));
        assert!(!grid.is_requested(ChunkCoord::new(2, 0, 0)));
    }

    #[test]
    fn test_stale_install_is_discarded() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 1);
        assert!(grid.mark_requested(ChunkCoord::new(1, 0, 0)));
        grid.recenter(ChunkCoord::new(10, 10, 10));
        // result arrives for a coordinate that left the window
        assert!(!grid.install(marked_chunk(ChunkCoord::new(1, 0, 0))));
        assert_eq!(grid.resident_count(), 0);
    }

    #[test]
    fn test_double_install_is_discarded() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 1);
        assert!(grid.install(marked_chunk(ChunkCoord::ZERO)));
        assert!(!grid.install(marked_chunk(ChunkCoord::ZERO)));
        assert_eq!(grid.resident_count(), 1);
    }

    #[test]
    fn test_cross_chunk_block_access() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 1);
        fill(&mut grid);

        let world = IVec3::new(-1, 5, 17);
        assert!(grid.set_block(world, Block::new(BlockKind::Sand)));
        assert_eq!(grid.block(world).unwrap().kind, BlockKind::Sand);

        // outside residency lookups return None, writes report failure
        assert_eq!(grid.block(IVec3::new(100, 0, 0)), None);
        assert!(!grid.set_block(IVec3::new(100, 0, 0), Block::AIR));
    }

    #[test]
    fn test_wall_dirty_lifecycle() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 1);
        assert!(grid.install(marked_chunk(ChunkCoord::ZERO)));

        // alone in the window: all six faces wait for neighbors
        assert_eq!(grid.dirty_walls(ChunkCoord::ZERO), Some(WallMask::ALL));

        assert!(grid.install(marked_chunk(ChunkCoord::new(1, 0, 0))));
        let walls = grid.dirty_walls(ChunkCoord::ZERO).unwrap();
        assert!(!walls.is_set(Direction::Right));
        assert!(walls.is_set(Direction::Left));
        let neighbor_walls = grid.dirty_walls(ChunkCoord::new(1, 0, 0)).unwrap();
        assert!(!neighbor_walls.is_set(Direction::Left));
        assert!(neighbor_walls.is_set(Direction::Right));

        let events = grid.take_restitch_events();
        assert!(
            events.contains(&RestitchEvent {
                chunk: ChunkCoord::new(1, 0, 0),
                face: Direction::Left,
            }),
            "missing restitch for the shared wall: {events:?}"
        );
        assert!(grid.take_restitch_events().is_empty());
    }

    #[test]
    fn test_boundary_edit_marks_neighbor() {
        let mut grid = StreamingGrid::new(ChunkCoord::ZERO, 1);
        fill(&mut grid);
        grid.take_restitch_events();

        // edit on the shared x boundary re-dirties and re-pairs both sides
        assert!(grid.set_block(IVec3::new(15, 4, 4), Block::new(BlockKind::Log)));
        let events = grid.take_restitch_events();
        assert!(events.iter().any(|e| e.chunk == ChunkCoord::ZERO));
        assert!(
            events
                .iter()
                .any(|e| e.chunk == ChunkCoord::new(1, 0, 0) && e.face == Direction::Left)
        );

        // interior edits re-pair only the chunk's own walls
        assert!(grid.set_block(IVec3::new(8, 8, 8), Block::new(BlockKind::Log)));
        let events = grid.take_restitch_events();
        assert!(events.iter().all(|e| e.chunk == ChunkCoord::ZERO));
    }
}
