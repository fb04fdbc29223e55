//! Procedural terrain and vegetation generation.
//!
//! Generation is pure per chunk: workers call [`TerrainGenerator::generate`]
//! with nothing but a coordinate and get back a finished chunk plus any
//! block placements that landed outside it. No shared world state is read
//! or written while generating.

use glam::IVec3;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::constants::{CHUNK_SIZE, GEN_DEPTH, GEN_HEIGHT};
use crate::core::block::{Block, BlockKind};
use crate::core::chunk::Chunk;
use crate::core::coord::{ChunkCoord, wrap_local};
use crate::world::noise::NoiseField;
use crate::world::placements::PendingPlacement;

const N: usize = CHUNK_SIZE as usize;

/// Climate sample for one terrain column.
#[derive(Clone, Copy, Debug, Default)]
struct ClimatePoint {
    temperature: f32,
    humidity: f32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Biome {
    Forest,
    Desert,
    Hell,
}

/// Seeded generator with one noise channel per terrain input.
pub struct TerrainGenerator {
    noise_small: NoiseField,
    noise_medium: NoiseField,
    noise_large: NoiseField,
    noise_temperature: NoiseField,
    noise_humidity: NoiseField,
    pub seed: u32,
}

impl TerrainGenerator {
    /// Create a new TerrainGenerator with the specified world seed
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            noise_small: NoiseField::new(seed),
            noise_medium: NoiseField::new(seed.wrapping_add(1)),
            noise_large: NoiseField::new(seed.wrapping_add(2)),
            noise_temperature: NoiseField::new(seed.wrapping_add(3)),
            noise_humidity: NoiseField::new(seed.wrapping_add(4)),
            seed,
        }
    }

    /// Generate the chunk at `coord` and collect writes that fell outside
    /// it for deferred application.
    pub fn generate(&self, coord: ChunkCoord) -> (Chunk, Vec<PendingPlacement>) {
        let mut placements = Vec::new();

        // Above the terrain band there is only air
        if coord.y as f32 > GEN_HEIGHT {
            return (Chunk::new(coord), placements);
        }
        // Below the world floor everything is stone, no noise needed
        if coord.y < GEN_DEPTH {
            let chunk = Chunk::filled(coord, Block::new(BlockKind::Stone));
            return (chunk, placements);
        }

        // Pre-compute per-column climate, biome and surface height maps
        let mut climate = [[ClimatePoint::default(); N]; N];
        let mut biomes = [[Biome::Forest; N]; N];
        let mut heights = [[0f32; N]; N];

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let point = ClimatePoint {
                    temperature: self.sample_column(&self.noise_temperature, coord, lx, lz, 0.0136),
                    humidity: self.sample_column(&self.noise_humidity, coord, lx, lz, 0.0073),
                };
                let biome = Self::classify(point);
                climate[lx as usize][lz as usize] = point;
                biomes[lx as usize][lz as usize] = biome;
                heights[lx as usize][lz as usize] = self.column_height(coord, lx, lz, biome);
            }
        }

        // Terrain fill pass
        let mut chunk = Chunk::new(coord);
        for lx in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for lz in 0..CHUNK_SIZE {
                    let height = heights[lx as usize][lz as usize];
                    let world_y = (coord.y * CHUNK_SIZE + y) as f32;
                    if world_y >= height {
                        continue;
                    }

                    let block = match biomes[lx as usize][lz as usize] {
                        Biome::Desert => Block::new(BlockKind::Sand),
                        Biome::Hell => Block::new(BlockKind::Lava),
                        Biome::Forest => {
                            if world_y + 1.0 >= height {
                                Block::grassy_dirt()
                            } else {
                                Block::new(BlockKind::Dirt)
                            }
                        }
                    };
                    chunk.set_block(IVec3::new(lx, y, lz), block);
                }
            }
        }

        // Vegetation pass
        self.scatter_plants(&mut chunk, &climate, &biomes, &mut placements);

        chunk.scan_empty();
        (chunk, placements)
    }

    /// One noise sample per column, continuous across chunk borders.
    fn sample_column(
        &self,
        noise: &NoiseField,
        coord: ChunkCoord,
        lx: i32,
        lz: i32,
        scale: f32,
    ) -> f32 {
        let step = scale / CHUNK_SIZE as f32;
        noise.sample(
            coord.x as f32 * scale + lx as f32 * step,
            coord.z as f32 * scale + lz as f32 * step,
        )
    }

    fn classify(point: ClimatePoint) -> Biome {
        if point.temperature > 0.5 && point.humidity < 0.5 {
            if point.temperature > 0.65 {
                Biome::Hell
            } else {
                Biome::Desert
            }
        } else {
            Biome::Forest
        }
    }

    /// Surface height of a column in world blocks, from three octaves.
    /// Hell terrain uses the dampened variant of the blend.
    fn column_height(&self, coord: ChunkCoord, lx: i32, lz: i32, biome: Biome) -> f32 {
        let small = self.sample_column(&self.noise_small, coord, lx, lz, 1.05) * 0.25;
        let medium = self.sample_column(&self.noise_medium, coord, lx, lz, 0.22);
        let large = self.sample_column(&self.noise_large, coord, lx, lz, 0.005) * 2.0;

        match biome {
            Biome::Hell => (large / 4.0 * medium / 4.0 + small / 4.0) * CHUNK_SIZE as f32,
            _ => (large * medium + small) * CHUNK_SIZE as f32,
        }
    }

    fn scatter_plants(
        &self,
        chunk: &mut Chunk,
        climate: &[[ClimatePoint; N]; N],
        biomes: &[[Biome; N]; N],
        placements: &mut Vec<PendingPlacement>,
    ) {
        let mut rng = StdRng::seed_from_u64(self.scatter_seed(chunk.coord()));

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let humidity = climate[lx as usize][lz as usize].humidity;
                match biomes[lx as usize][lz as usize] {
                    Biome::Desert => {
                        let roll: i32 = rng.random_range(1..=1000);
                        if (roll as f32) < (humidity - 0.10) * 10.0 {
                            let Some(ground) = Self::ground_level(chunk, lx, lz) else {
                                continue;
                            };
                            let height: i32 = 2 + rng.random_range(1..=8);
                            self.place_cactus(chunk, ground, height, placements);
                        }
                    }
                    Biome::Forest => {
                        let roll: i32 = rng.random_range(1..=1000);
                        if (roll as f32) < (humidity - 0.45) * 50.0 {
                            let Some(ground) = Self::ground_level(chunk, lx, lz) else {
                                continue;
                            };
                            let trunk: i32 = rng.random_range(1..=8);
                            self.place_tree(chunk, ground, trunk, placements);
                        }
                    }
                    Biome::Hell => {}
                }
            }
        }
    }

    /// First transparent block scanning up from the chunk floor. Columns
    /// open at the floor itself (or solid to the top) grow nothing.
    fn ground_level(chunk: &Chunk, lx: i32, lz: i32) -> Option<IVec3> {
        for y in 0..CHUNK_SIZE {
            let pos = IVec3::new(lx, y, lz);
            if chunk.block(pos).is_some_and(|b| b.is_transparent()) {
                return (y > 0).then_some(pos);
            }
        }
        None
    }

    fn place_cactus(
        &self,
        chunk: &mut Chunk,
        ground: IVec3,
        height: i32,
        placements: &mut Vec<PendingPlacement>,
    ) {
        for i in 0..height {
            Self::place_block(
                chunk,
                ground + IVec3::new(0, i, 0),
                Block::new(BlockKind::Cactus),
                placements,
            );
        }
    }

    /// Trunk of logs with a square canopy that narrows toward the top and a
    /// single leaf capping the trunk.
    fn place_tree(
        &self,
        chunk: &mut Chunk,
        ground: IVec3,
        trunk: i32,
        placements: &mut Vec<PendingPlacement>,
    ) {
        for i in 0..trunk {
            Self::place_block(
                chunk,
                ground + IVec3::new(0, i, 0),
                Block::new(BlockKind::Log),
                placements,
            );

            let side = (trunk - i).clamp(0, 2) * 2 + 1;
            let half = side / 2;
            for tx in 0..side {
                for tz in 0..side {
                    if tx == half && tz == half {
                        continue;
                    }
                    Self::place_block(
                        chunk,
                        ground + IVec3::new(tx - half, i + 1, tz - half),
                        Block::new(BlockKind::Leaf),
                        placements,
                    );
                }
            }
        }

        Self::place_block(
            chunk,
            ground + IVec3::new(0, trunk, 0),
            Block::new(BlockKind::Leaf),
            placements,
        );
    }

    /// Writes into the chunk when the position is inside it, otherwise
    /// emits a deferred placement for the neighbor the position wraps into.
    fn place_block(
        chunk: &mut Chunk,
        pos: IVec3,
        block: Block,
        placements: &mut Vec<PendingPlacement>,
    ) {
        if Chunk::in_bounds(pos) {
            chunk.set_block(pos, block);
        } else {
            let (offset, local) = wrap_local(pos);
            placements.push(PendingPlacement {
                chunk: chunk.coord() + offset,
                pos: local,
                block,
            });
        }
    }

    /// Per-chunk scatter stream seed derived from the world seed and the
    /// chunk's x/z coordinate.
    fn scatter_seed(&self, coord: ChunkCoord) -> u64 {
        let mut hash = self.seed as u64;
        hash = hash.wrapping_add(coord.x as u32 as u64).wrapping_mul(73_856_093);
        hash = hash.wrapping_add(coord.z as u32 as u64).wrapping_mul(19_349_663);
        hash ^ (hash >> 16)
    }
}

// Allow cloning for worker threads
impl Clone for TerrainGenerator {
    fn clone(&self) -> Self {
        TerrainGenerator::new(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks_equal(a: &Chunk, b: &Chunk) -> bool {
        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    let pos = IVec3::new(x, y, z);
                    if a.block(pos) != b.block(pos) {
                        return false;
                    }
                }
            }
        }
        true
    }

    #[test]
    fn test_deterministic_generation() {
        let generator = TerrainGenerator::new(42);
        let clone = generator.clone();
        for coord in [
            ChunkCoord::new(0, 0, 0),
            ChunkCoord::new(-3, 1, 7),
            ChunkCoord::new(12, 0, -5),
        ] {
            let (a, pa) = generator.generate(coord);
            let (b, pb) = clone.generate(coord);
            assert!(blocks_equal(&a, &b), "blocks differ at {coord:?}");
            assert_eq!(pa, pb, "placements differ at {coord:?}");
            assert_eq!(a.is_empty(), b.is_empty());
        }
    }

    #[test]
    fn test_seeds_differ() {
        let a = TerrainGenerator::new(1);
        let b = TerrainGenerator::new(2);
        let differs = (-6..6).any(|x| {
            let coord = ChunkCoord::new(x, 0, -x);
            !blocks_equal(&a.generate(coord).0, &b.generate(coord).0)
        });
        assert!(differs, "seeds 1 and 2 produced identical terrain");
    }

    #[test]
    fn test_above_gen_height_is_empty() {
        let generator = TerrainGenerator::new(42);
        let (chunk, placements) = generator.generate(ChunkCoord::new(5, 3, -2));
        assert!(chunk.is_empty());
        assert!(placements.is_empty());
        assert_eq!(chunk.block(IVec3::new(8, 8, 8)), Some(Block::AIR));
    }

    #[test]
    fn test_below_floor_is_stone() {
        let generator = TerrainGenerator::new(42);
        let (chunk, placements) = generator.generate(ChunkCoord::new(4, -1, 4));
        assert!(!chunk.is_empty());
        assert!(placements.is_empty());
        for pos in [IVec3::new(0, 0, 0), IVec3::new(15, 15, 15)] {
            assert_eq!(chunk.block(pos).unwrap().kind, BlockKind::Stone);
        }
    }

    #[test]
    fn test_ground_chunk_has_terrain() {
        let generator = TerrainGenerator::new(42);
        let (chunk, _) = generator.generate(ChunkCoord::new(0, 0, 0));
        assert!(!chunk.is_empty());
        // solid terrain sits on the floor, air above the surface follows
        let mut found_solid_floor = false;
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                if !chunk.block(IVec3::new(x, 0, z)).unwrap().is_air() {
                    found_solid_floor = true;
                }
            }
        }
        assert!(found_solid_floor);
    }

    #[test]
    fn test_surface_band_has_grassy_tops() {
        let generator = TerrainGenerator::new(42);
        let mut found_grassy = false;
        'outer: for cx in -2..=2 {
            for cz in -2..=2 {
                for cy in 0..=2 {
                    let (chunk, _) = generator.generate(ChunkCoord::new(cx, cy, cz));
                    for x in 0..CHUNK_SIZE {
                        for y in 0..CHUNK_SIZE {
                            for z in 0..CHUNK_SIZE {
                                let block = chunk.block(IVec3::new(x, y, z)).unwrap();
                                if block.kind == BlockKind::Dirt && block.info.grassy {
                                    found_grassy = true;
                                    break 'outer;
                                }
                            }
                        }
                    }
                }
            }
        }
        assert!(found_grassy, "no grassy dirt in the surface band");
    }

    #[test]
    fn test_placements_stay_adjacent() {
        let generator = TerrainGenerator::new(1337);
        for cx in -4..4 {
            for cz in -4..4 {
                let coord = ChunkCoord::new(cx, 0, cz);
                let (_, placements) = generator.generate(coord);
                for p in placements {
                    assert!(p.chunk != coord, "deferred placement aimed at own chunk");
                    assert!(coord.chebyshev(p.chunk) <= 1, "placement skipped a chunk");
                    assert!(Chunk::in_bounds(p.pos), "unwrapped placement {p:?}");
                    assert!(!p.block.is_air());
                }
            }
        }
    }
}
