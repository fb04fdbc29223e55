//! Chunk-space coordinates, face directions and per-face wall masks.

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use glam::{IVec3, Vec3};

use crate::constants::CHUNK_SIZE;

/// World position of a chunk, in chunk units.
///
/// Ordered lexicographically so it can key ordered maps; hashing is derived
/// for the hash-set bookkeeping in the streaming layer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const ZERO: ChunkCoord = ChunkCoord::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing the given world block position.
    pub fn of_block(block: IVec3) -> Self {
        Self::new(
            block.x.div_euclid(CHUNK_SIZE),
            block.y.div_euclid(CHUNK_SIZE),
            block.z.div_euclid(CHUNK_SIZE),
        )
    }

    /// Chunk containing the given float world position.
    pub fn of_world(pos: Vec3) -> Self {
        Self::of_block(pos.floor().as_ivec3())
    }

    /// Origin of this chunk in world block units.
    pub fn base(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE
    }

    /// Largest per-axis distance, used for eviction range checks.
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Squared euclidean distance, used as generation priority.
    pub fn dist_sq(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Neighboring chunk one step along `dir`.
    pub fn neighbor(self, dir: Direction) -> Self {
        self + dir.offset()
    }
}

impl Add for ChunkCoord {
    type Output = ChunkCoord;
    fn add(self, rhs: ChunkCoord) -> ChunkCoord {
        ChunkCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for ChunkCoord {
    fn add_assign(&mut self, rhs: ChunkCoord) {
        *self = *self + rhs;
    }
}

impl Sub for ChunkCoord {
    type Output = ChunkCoord;
    fn sub(self, rhs: ChunkCoord) -> ChunkCoord {
        ChunkCoord::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for ChunkCoord {
    fn sub_assign(&mut self, rhs: ChunkCoord) {
        *self = *self - rhs;
    }
}

impl Mul<i32> for ChunkCoord {
    type Output = ChunkCoord;
    fn mul(self, rhs: i32) -> ChunkCoord {
        ChunkCoord::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<ChunkCoord> for IVec3 {
    fn from(c: ChunkCoord) -> IVec3 {
        IVec3::new(c.x, c.y, c.z)
    }
}

/// Splits a world block position into its chunk and in-chunk parts.
pub fn split_block_pos(block: IVec3) -> (ChunkCoord, IVec3) {
    (
        ChunkCoord::of_block(block),
        IVec3::new(
            block.x.rem_euclid(CHUNK_SIZE),
            block.y.rem_euclid(CHUNK_SIZE),
            block.z.rem_euclid(CHUNK_SIZE),
        ),
    )
}

/// Rewraps a chunk-relative position that may lie outside `[0, N)` into the
/// chunk offset it lands in plus the in-chunk position there.
pub fn wrap_local(pos: IVec3) -> (ChunkCoord, IVec3) {
    split_block_pos(pos)
}

/// The six face directions of a cube. Left/right span x, down/up span y,
/// back/forward span z.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
    Back,
    Forward,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
        Direction::Back,
        Direction::Forward,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::Back => Direction::Forward,
            Direction::Forward => Direction::Back,
        }
    }

    /// Unit chunk offset toward this direction.
    pub fn offset(self) -> ChunkCoord {
        match self {
            Direction::Left => ChunkCoord::new(-1, 0, 0),
            Direction::Right => ChunkCoord::new(1, 0, 0),
            Direction::Down => ChunkCoord::new(0, -1, 0),
            Direction::Up => ChunkCoord::new(0, 1, 0),
            Direction::Back => ChunkCoord::new(0, 0, -1),
            Direction::Forward => ChunkCoord::new(0, 0, 1),
        }
    }

    /// Direction of travel for a signed step along an axis (0 = x, 1 = y,
    /// 2 = z).
    pub fn from_step(axis: usize, positive: bool) -> Direction {
        match (axis, positive) {
            (0, true) => Direction::Right,
            (0, false) => Direction::Left,
            (1, true) => Direction::Up,
            (1, false) => Direction::Down,
            (2, true) => Direction::Forward,
            (2, false) => Direction::Back,
            _ => unreachable!("axis out of range"),
        }
    }
}

/// Per-face dirty bits of a chunk, one per [`Direction`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct WallMask {
    bits: u8,
}

impl WallMask {
    pub const NONE: WallMask = WallMask { bits: 0 };
    pub const ALL: WallMask = WallMask { bits: 0b0011_1111 };

    fn bit(dir: Direction) -> u8 {
        1 << dir as u8
    }

    pub fn set(&mut self, dir: Direction) {
        self.bits |= Self::bit(dir);
    }

    pub fn clear(&mut self, dir: Direction) {
        self.bits &= !Self::bit(dir);
    }

    pub fn is_set(self, dir: Direction) -> bool {
        self.bits & Self::bit(dir) != 0
    }

    pub fn any(self) -> bool {
        self.bits != 0
    }

    /// Faces of the enclosing chunk an in-chunk position touches.
    pub fn touching(pos: IVec3) -> WallMask {
        let mut mask = WallMask::NONE;
        if pos.x == 0 {
            mask.set(Direction::Left);
        }
        if pos.x == CHUNK_SIZE - 1 {
            mask.set(Direction::Right);
        }
        if pos.y == 0 {
            mask.set(Direction::Down);
        }
        if pos.y == CHUNK_SIZE - 1 {
            mask.set(Direction::Up);
        }
        if pos.z == 0 {
            mask.set(Direction::Back);
        }
        if pos.z == CHUNK_SIZE - 1 {
            mask.set(Direction::Forward);
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_to_chunk_negative() {
        assert_eq!(ChunkCoord::of_block(IVec3::new(0, 0, 0)), ChunkCoord::ZERO);
        assert_eq!(
            ChunkCoord::of_block(IVec3::new(-1, 0, 0)),
            ChunkCoord::new(-1, 0, 0)
        );
        assert_eq!(
            ChunkCoord::of_block(IVec3::new(-16, 31, -17)),
            ChunkCoord::new(-1, 1, -2)
        );
    }

    #[test]
    fn test_split_roundtrip() {
        let block = IVec3::new(-5, 40, 17);
        let (chunk, local) = split_block_pos(block);
        assert_eq!(chunk.base() + local, block);
        assert!(local.min_element() >= 0 && local.max_element() < CHUNK_SIZE);
    }

    #[test]
    fn test_wrap_local_overflow() {
        let (offset, local) = wrap_local(IVec3::new(-2, 17, 5));
        assert_eq!(offset, ChunkCoord::new(-1, 1, 0));
        assert_eq!(local, IVec3::new(14, 1, 5));
    }

    #[test]
    fn test_direction_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.offset() + dir.opposite().offset(), ChunkCoord::ZERO);
        }
    }

    #[test]
    fn test_wall_touching() {
        let mask = WallMask::touching(IVec3::new(0, 15, 7));
        assert!(mask.is_set(Direction::Left));
        assert!(mask.is_set(Direction::Up));
        assert!(!mask.is_set(Direction::Right));
        assert!(!mask.is_set(Direction::Back));
        assert!(!WallMask::touching(IVec3::new(5, 5, 5)).any());
    }
}
