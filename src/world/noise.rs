//! Seeded value noise
//!
//! Lattice values come from an integer hash of (x, y, seed) and are blended
//! with a smoothstep curve, so the field is continuous. Several octaves are
//! summed for a less blobby result.

/// Deterministic 2D noise field with output in [-1, 1]
#[derive(Debug, Clone, Copy)]
pub struct NoiseField {
    seed: u64,
    scale: f32,
    octaves: u32,
}

impl NoiseField {
    /// `scale` is the distance in world units between lattice points of the
    /// first octave.
    pub fn new(seed: u64, scale: f32, octaves: u32) -> Self {
        Self {
            seed,
            scale: scale.max(f32::EPSILON),
            octaves: octaves.max(1),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sample at world coordinate (x, y)
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut norm = 0.0;
        let mut frequency = 1.0 / self.scale;

        for octave in 0..self.octaves {
            let octave_seed = self.seed.wrapping_add(u64::from(octave).wrapping_mul(0x9e37_79b9));
            total += lattice_noise(x * frequency, y * frequency, octave_seed) * amplitude;
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        (total / norm * 2.0 - 1.0).clamp(-1.0, 1.0)
    }
}

/// Smoothly interpolated lattice value in [0, 1]
fn lattice_noise(x: f32, y: f32, seed: u64) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let ix = x0 as i32;
    let iy = y0 as i32;
    let fx = x - x0;
    let fy = y - y0;
    let ux = fx * fx * (3.0 - 2.0 * fx);
    let uy = fy * fy * (3.0 - 2.0 * fy);

    let v00 = hash(ix, iy, seed);
    let v10 = hash(ix.wrapping_add(1), iy, seed);
    let v01 = hash(ix, iy.wrapping_add(1), seed);
    let v11 = hash(ix.wrapping_add(1), iy.wrapping_add(1), seed);

    let v0 = v00 + ux * (v10 - v00);
    let v1 = v01 + ux * (v11 - v01);
    v0 + uy * (v1 - v0)
}

fn hash(x: i32, y: i32, seed: u64) -> f32 {
    let mut n = (x as u32 as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ (y as u32 as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f)
        ^ seed;
    // splitmix64 finalizer
    n ^= n >> 30;
    n = n.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    n ^= n >> 27;
    n = n.wrapping_mul(0x94d0_49bb_1331_11eb);
    n ^= n >> 31;
    (n & 0x00FF_FFFF) as f32 / 0x00FF_FFFF as f32
}
