//! Background chunk generation workers.
//!
//! A fixed pool of named worker threads receives chunk coordinates over a
//! bounded channel, generates chunks without touching shared grid state and
//! sends them back for the owning thread to install. Uses crossbeam
//! channels for inter-thread communication.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use rustc_hash::FxHashSet;

use crate::constants::{REQUEST_QUEUE_CAPACITY, RESERVED_THREADS, RESULT_QUEUE_CAPACITY};
use crate::core::chunk::Chunk;
use crate::core::coord::ChunkCoord;
use crate::world::generator::TerrainGenerator;
use crate::world::placements::PlacementQueue;

/// Worker threads available after reserving the main thread and a helper.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(RESERVED_THREADS).max(1)
}

/// Manages background chunk generation with worker threads.
pub struct GenerationPool {
    request_tx: Sender<ChunkCoord>,
    result_rx: Receiver<Chunk>,
    pending: FxHashSet<ChunkCoord>,
    workers: Vec<JoinHandle<()>>,
}

impl GenerationPool {
    /// Spawn a pool whose workers each own a clone of the generator and
    /// push cross-chunk placements into the shared queue.
    pub fn new(
        generator: &TerrainGenerator,
        placements: Arc<PlacementQueue>,
        worker_count: usize,
    ) -> Self {
        // Bounded channels keep memory use flat under load
        let (request_tx, request_rx) = bounded::<ChunkCoord>(REQUEST_QUEUE_CAPACITY);
        let (result_tx, result_rx) = bounded::<Chunk>(RESULT_QUEUE_CAPACITY);

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let generator = generator.clone();
            let queue = placements.clone();

            let handle = thread::Builder::new()
                .name(format!("chunk-gen-{}", worker_id))
                .spawn(move || {
                    // Blocks between jobs; a closed request channel means
                    // the pool is shutting down
                    while let Ok(coord) = rx.recv() {
                        let (chunk, mut deferred) = generator.generate(coord);
                        queue.push_batch(&mut deferred);
                        if tx.send(chunk).is_err() {
                            break;
                        }
                    }
                    tracing::debug!(worker = worker_id, "generation worker exiting");
                })
                .expect("failed to spawn chunk generation worker");
            workers.push(handle);
        }

        tracing::info!(worker_count, "generation pool started");
        GenerationPool {
            request_tx,
            result_rx,
            pending: FxHashSet::default(),
            workers,
        }
    }

    /// Submits a coordinate for generation. Returns true when the job is
    /// in flight (newly queued or already pending); false when the request
    /// queue is full, in which case the caller retries a later tick.
    pub fn request(&mut self, coord: ChunkCoord) -> bool {
        if self.pending.contains(&coord) {
            return true;
        }
        match self.request_tx.try_send(coord) {
            Ok(()) => {
                self.pending.insert(coord);
                true
            }
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("request channel disconnected");
                false
            }
        }
    }

    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Poll for completed chunks without blocking, up to `max_results`.
    pub fn poll(&mut self, max_results: usize) -> Vec<Chunk> {
        let mut results = Vec::with_capacity(max_results.min(RESULT_QUEUE_CAPACITY));

        for _ in 0..max_results {
            match self.result_rx.try_recv() {
                Ok(chunk) => {
                    self.pending.remove(&chunk.coord());
                    results.push(chunk);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        results
    }

    /// Stops the pool: closing the channels lets every worker finish its
    /// current job and exit, then the threads are joined.
    pub fn shutdown(self) {
        let GenerationPool {
            request_tx,
            result_rx,
            workers,
            ..
        } = self;
        drop(request_tx);
        drop(result_rx);
        for handle in workers {
            let _ = handle.join();
        }
        tracing::info!("generation pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn pool_with_workers(workers: usize) -> (GenerationPool, Arc<PlacementQueue>) {
        let generator = TerrainGenerator::new(42);
        let placements = Arc::new(PlacementQueue::new());
        let pool = GenerationPool::new(&generator, placements.clone(), workers);
        (pool, placements)
    }

    fn wait_for(pool: &mut GenerationPool, count: usize) -> Vec<Chunk> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut chunks = Vec::new();
        while chunks.len() < count {
            chunks.extend(pool.poll(count - chunks.len()));
            assert!(Instant::now() < deadline, "timed out waiting for chunks");
            thread::sleep(Duration::from_millis(1));
        }
        chunks
    }

    #[test]
    fn test_generates_requested_chunks() {
        let (mut pool, _placements) = pool_with_workers(2);

        let coords = [
            ChunkCoord::new(0, 0, 0),
            ChunkCoord::new(1, 0, 0),
            ChunkCoord::new(0, -1, 3),
        ];
        for coord in coords {
            assert!(pool.request(coord));
        }
        assert_eq!(pool.pending_count(), 3);

        let chunks = wait_for(&mut pool, 3);
        let mut got: Vec<_> = chunks.iter().map(|c| c.coord()).collect();
        got.sort();
        let mut want = coords.to_vec();
        want.sort();
        assert_eq!(got, want);
        assert!(pool.is_idle());

        pool.shutdown();
    }

    #[test]
    fn test_duplicate_requests_are_absorbed() {
        let (mut pool, _placements) = pool_with_workers(1);

        let coord = ChunkCoord::new(2, 0, 2);
        assert!(pool.request(coord));
        assert!(pool.request(coord));
        assert!(pool.is_pending(coord));

        // a single result comes back for the coordinate
        let chunks = wait_for(&mut pool, 1);
        assert_eq!(chunks[0].coord(), coord);
        thread::sleep(Duration::from_millis(20));
        assert!(pool.poll(8).is_empty());

        pool.shutdown();
    }

    #[test]
    fn test_shutdown_joins_workers() {
        let (mut pool, _placements) = pool_with_workers(4);
        assert_eq!(pool.worker_count(), 4);
        for x in 0..8 {
            pool.request(ChunkCoord::new(x, 0, 0));
        }
        // in-flight results are discarded by shutdown without deadlocking
        pool.shutdown();
    }

    #[test]
    fn test_workers_feed_placement_queue() {
        // Find a chunk whose vegetation crosses a border, then run that
        // exact chunk through the pool; generation is deterministic so the
        // worker must produce the same deferred placements.
        let generator = TerrainGenerator::new(42);
        let mut target = None;
        'search: for x in -24..24 {
            for z in -24..24 {
                let coord = ChunkCoord::new(x, 0, z);
                if !generator.generate(coord).1.is_empty() {
                    target = Some(coord);
                    break 'search;
                }
            }
        }
        let target = target.expect("no border-crossing vegetation in 48x48 chunks");

        let (mut pool, placements) = pool_with_workers(2);
        assert!(pool.request(target));
        let chunks = wait_for(&mut pool, 1);
        assert_eq!(chunks[0].coord(), target);
        assert!(!placements.is_empty(), "worker dropped deferred placements");

        pool.shutdown();
    }
}
