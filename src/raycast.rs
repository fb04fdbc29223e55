//! Block-grid ray marching across chunk boundaries.
//!
//! A 3-D DDA walk: each iteration advances one block along the axis whose
//! next grid line is nearest, wrapping the in-chunk index and switching
//! chunks when it crosses a boundary. Used for look-at picking and for
//! point-to-point collision probes.

use glam::{IVec3, Vec3};

use crate::constants::CHUNK_SIZE;
use crate::core::block::Block;
use crate::core::coord::{ChunkCoord, Direction, split_block_pos};
use crate::world::grid::StreamingGrid;

/// First non-air block met along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub chunk: ChunkCoord,
    /// Block position local to `chunk`.
    pub pos: IVec3,
    pub block: Block,
    /// Face through which the ray entered the block.
    pub face: Direction,
    /// Distance from the origin to the entry face, in blocks.
    pub distance: f32,
}

/// Marches from `origin` along `direction` for at most `max_length` blocks.
///
/// Returns `None` for a zero direction, when the range runs out, or when
/// the march reaches a chunk that is not resident (leaving the loaded
/// world is not an error). The origin block itself is never tested; the
/// walk starts at the first boundary crossing.
pub fn cast(
    grid: &StreamingGrid,
    origin: Vec3,
    direction: Vec3,
    max_length: i32,
) -> Option<RayHit> {
    let dir = direction.try_normalize()?;
    let limit = max_length as f32;

    let base = origin.floor();
    let (start, mut local) = split_block_pos(base.as_ivec3());
    let mut chunk = IVec3::from(start);

    // Per axis: distance along the ray to the next grid line, the distance
    // between consecutive lines, and the sign of travel. A zero component
    // never reaches a wall on its axis.
    let mut t_max = Vec3::ZERO;
    let mut t_delta = Vec3::ZERO;
    let mut step = IVec3::ZERO;
    for axis in 0..3 {
        if dir[axis] > 0.0 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / dir[axis];
            t_max[axis] = (base[axis] + 1.0 - origin[axis]) / dir[axis];
        } else if dir[axis] < 0.0 {
            step[axis] = -1;
            t_delta[axis] = -1.0 / dir[axis];
            t_max[axis] = (origin[axis] - base[axis]) / -dir[axis];
        } else {
            t_delta[axis] = f32::MAX;
            t_max[axis] = f32::MAX;
        }
    }

    // The integer budget bounds boundary crossings; the range check against
    // `limit` is what actually ends an in-range miss.
    let mut budget = (max_length.max(0) as i64) * 3 + 3;
    while budget > 0 {
        budget -= 1;

        let axis = if t_max.x <= t_max.y {
            if t_max.x <= t_max.z { 0 } else { 2 }
        } else if t_max.y <= t_max.z {
            1
        } else {
            2
        };

        let t = t_max[axis];
        if t > limit {
            return None;
        }
        t_max[axis] += t_delta[axis];

        local[axis] += step[axis];
        if local[axis] < 0 {
            local[axis] = CHUNK_SIZE - 1;
            chunk[axis] -= 1;
        } else if local[axis] == CHUNK_SIZE {
            local[axis] = 0;
            chunk[axis] += 1;
        }

        let coord = ChunkCoord::new(chunk.x, chunk.y, chunk.z);
        let block = grid.get(coord)?.block(local)?;
        if !block.is_air() {
            return Some(RayHit {
                chunk: coord,
                pos: local,
                block,
                face: Direction::from_step(axis, step[axis] > 0).opposite(),
                distance: t,
            });
        }
    }

    None
}

/// Casts along the segment `from → to`, rejecting anything past `to`.
/// Start equal to end is an immediate miss.
pub fn cast_between(grid: &StreamingGrid, from: Vec3, to: Vec3) -> Option<RayHit> {
    let segment = to - from;
    let length = segment.length();
    let hit = cast(grid, from, segment, length.ceil() as i32)?;
    (hit.distance <= length).then_some(hit)
}
