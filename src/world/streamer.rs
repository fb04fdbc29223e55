//! Owning facade over the streaming pipeline.
//!
//! `WorldStreamer` runs on one thread and ties the grid, the worker pool
//! and the placement queue together. Each tick installs finished chunks,
//! applies deferred placements and submits missing coordinates; everything
//! else is plain accessors over the grid.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::{IVec3, Vec3};

use crate::config::WorldSettings;
use crate::constants::EVICT_MARGIN;
use crate::core::block::Block;
use crate::core::chunk::Chunk;
use crate::core::coord::ChunkCoord;
use crate::raycast::{self, RayHit};
use crate::world::generator::TerrainGenerator;
use crate::world::grid::{RestitchEvent, StreamingGrid};
use crate::world::loader::{GenerationPool, default_worker_count};
use crate::world::placements::PlacementQueue;

/// What one tick did, for logs and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub installed: usize,
    pub discarded: usize,
    pub placements_applied: usize,
    pub placements_dropped: usize,
    pub requested: usize,
}

pub struct WorldStreamer {
    grid: StreamingGrid,
    pool: GenerationPool,
    placements: Arc<PlacementQueue>,
    install_budget: usize,
    seed: u32,
}

impl WorldStreamer {
    pub fn new(settings: &WorldSettings) -> Self {
        let workers = settings.workers.unwrap_or_else(default_worker_count).max(1);
        let generator = TerrainGenerator::new(settings.seed);
        let placements = Arc::new(PlacementQueue::new());
        let pool = GenerationPool::new(&generator, placements.clone(), workers);
        let grid = StreamingGrid::new(ChunkCoord::ZERO, settings.radius);

        tracing::info!(
            seed = settings.seed,
            radius = settings.radius,
            workers,
            "world streamer ready"
        );
        WorldStreamer {
            grid,
            pool,
            placements,
            install_budget: settings.install_budget.max(1),
            seed: settings.seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn center(&self) -> ChunkCoord {
        self.grid.center()
    }

    pub fn radius(&self) -> i32 {
        self.grid.radius()
    }

    pub fn resident_count(&self) -> usize {
        self.grid.resident_count()
    }

    pub fn pending_count(&self) -> usize {
        self.pool.pending_count()
    }

    pub fn grid(&self) -> &StreamingGrid {
        &self.grid
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.grid.contains(coord)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.grid.get(coord)
    }

    pub fn block(&self, world: IVec3) -> Option<Block> {
        self.grid.block(world)
    }

    /// Player-style block edit; returns false when the chunk holding
    /// `world` is not resident.
    pub fn set_block(&mut self, world: IVec3, block: Block) -> bool {
        self.grid.set_block(world, block)
    }

    pub fn take_restitch_events(&mut self) -> Vec<RestitchEvent> {
        self.grid.take_restitch_events()
    }

    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_length: i32) -> Option<RayHit> {
        raycast::cast(&self.grid, origin, direction, max_length)
    }

    pub fn raycast_between(&self, from: Vec3, to: Vec3) -> Option<RayHit> {
        raycast::cast_between(&self.grid, from, to)
    }

    /// Recenters the window on the chunk containing a world position.
    pub fn update_observer(&mut self, pos: Vec3) {
        self.recenter(ChunkCoord::of_world(pos));
    }

    pub fn recenter(&mut self, center: ChunkCoord) {
        self.grid.recenter(center);
    }

    /// One pipeline step: install finished chunks, apply deferred
    /// placements, then submit missing coordinates nearest-first.
    pub fn tick(&mut self) -> TickStats {
        let mut stats = TickStats::default();
        self.install_finished(&mut stats);
        self.drain_placements(&mut stats);
        self.request_missing(&mut stats);
        stats
    }

    /// Ticks until the window is fully resident and no jobs are in flight,
    /// or `timeout` passes. Returns whether the window settled.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick();
            if self.grid.fully_resident() && self.pool.is_idle() {
                return true;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    resident = self.grid.resident_count(),
                    pending = self.pool.pending_count(),
                    "window failed to settle in time"
                );
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn shutdown(self) {
        self.pool.shutdown();
    }

    fn install_finished(&mut self, stats: &mut TickStats) {
        for chunk in self.pool.poll(self.install_budget) {
            let coord = chunk.coord();
            if self.grid.install(chunk) {
                stats.installed += 1;
            } else {
                // Left the window while generating, or a duplicate
                stats.discarded += 1;
                tracing::trace!(?coord, "discarded unwanted chunk");
            }
        }
    }

    fn drain_placements(&mut self, stats: &mut TickStats) {
        let pending = self.placements.take_all();
        if pending.is_empty() {
            return;
        }

        let center = self.grid.center();
        let keep_radius = self.grid.radius() + EVICT_MARGIN;
        let mut keep = Vec::new();
        for p in pending {
            if let Some(chunk) = self.grid.get_mut(p.chunk) {
                // Overlapping canopies write the same kinds; last one wins
                chunk.set_block(p.pos, p.block);
                self.grid.notify_block_changed(p.chunk, p.pos);
                stats.placements_applied += 1;
            } else if center.chebyshev(p.chunk) > keep_radius {
                stats.placements_dropped += 1;
            } else {
                keep.push(p);
            }
        }
        if stats.placements_applied > 0 || stats.placements_dropped > 0 {
            tracing::debug!(
                applied = stats.placements_applied,
                dropped = stats.placements_dropped,
                requeued = keep.len(),
                "drained deferred placements"
            );
        }
        if !keep.is_empty() {
            self.placements.requeue(keep);
        }
    }

    fn request_missing(&mut self, stats: &mut TickStats) {
        let mut missing = self.grid.missing();
        if missing.is_empty() {
            return;
        }

        // Chunks under the observer first
        let center = self.grid.center();
        missing.sort_by_key(|coord| coord.dist_sq(center));
        for coord in missing {
            if !self.pool.request(coord) {
                // Request queue full; the rest stay Empty until next tick
                break;
            }
            self.grid.mark_requested(coord);
            stats.requested += 1;
        }
    }
}
