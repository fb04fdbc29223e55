//! Seeded 2-D gradient noise used by the terrain generator.

// Raw gradient noise stays within +-sqrt(2)/4 for this gradient set
const RAW_BOUND: f32 = std::f32::consts::SQRT_2 / 4.0;

/// A deterministic gradient-noise field over the plane, remapped to [0, 1].
///
/// Distinct seeds give independent fields; the generator owns one field per
/// terrain channel.
#[derive(Clone, Copy, Debug)]
pub struct NoiseField {
    seed: u32,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Hash of one lattice point, mixed with the seed. Cheap bit mixing
    /// only, no table lookups.
    fn lattice_hash(&self, x: i32, y: i32) -> u32 {
        let mut h = (x as u32).wrapping_mul(73_856_093)
            ^ (y as u32).wrapping_mul(19_349_663)
            ^ self.seed.wrapping_mul(83_492_791);
        h ^= h << 13;
        h ^= h >> 17;
        h ^= h << 5;
        h
    }

    /// Dot product of the pseudo-random unit gradient at a lattice point
    /// with the offset from that point to the sample position.
    fn gradient_dot(&self, cx: i32, cy: i32, dx: f32, dy: f32) -> f32 {
        let gx = self.lattice_hash(cx, cy) as f32 / u32::MAX as f32;
        let gy = (1.0 - gx * gx).max(0.0).sqrt();
        gx * dx + gy * dy
    }

    /// Noise value at (x, y), in [0, 1]. Exact lattice points evaluate to
    /// 0.5 because every corner offset dot is zero there.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let cx = x.floor();
        let cy = y.floor();
        let fx = x - cx;
        let fy = y - cy;
        let (cx, cy) = (cx as i32, cy as i32);

        let d00 = self.gradient_dot(cx, cy, fx, fy);
        let d10 = self.gradient_dot(cx + 1, cy, fx - 1.0, fy);
        let d01 = self.gradient_dot(cx, cy + 1, fx, fy - 1.0);
        let d11 = self.gradient_dot(cx + 1, cy + 1, fx - 1.0, fy - 1.0);

        let sx = smoothstep(fx);
        let sy = smoothstep(fy);
        let value = lerp(lerp(d00, d10, sx), lerp(d01, d11, sx), sy);

        ((RAW_BOUND + value) / (2.0 * RAW_BOUND)).clamp(0.0, 1.0)
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
