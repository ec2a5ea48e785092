//! Seeded simplex noise in two and three dimensions.
//!
//! Output is continuous, lies in `[-1, 1]`, and is identical on every
//! platform for a given seed. Particle seeding samples a [`NoiseField`], which
//! applies a frequency to the input coordinates before sampling.

/// Skewing factor for the 2D simplex grid, `(sqrt(3) - 1) / 2`.
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskewing factor for the 2D simplex grid, `(3 - sqrt(3)) / 6`.
const G2: f64 = 0.211_324_865_405_187_1;
const F3: f64 = 1.0 / 3.0;
const G3: f64 = 1.0 / 6.0;

/// Gradients at the midpoints of a cube's 12 edges.
const GRAD3: [[i8; 3]; 12] = [
    [1, 1, 0], [-1, 1, 0], [1, -1, 0], [-1, -1, 0],
    [1, 0, 1], [-1, 0, 1], [1, 0, -1], [-1, 0, -1],
    [0, 1, 1], [0, -1, 1], [0, 1, -1], [0, -1, -1],
];

/// 512-entry permutation table (256 entries, doubled so corner lookups never wrap).
struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    fn new(seed: u64) -> Self {
        let mut perm = [0u8; 512];
        for (i, p) in perm.iter_mut().take(256).enumerate() {
            *p = i as u8;
        }

        // xorshift64 has a fixed point at zero; mix the seed so every seed shuffles.
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0x9E37_79B9_7F4A_7C15;
        }

        // Fisher-Yates
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;

            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        self.perm[index & 511] as usize
    }

    #[inline]
    fn gradient(&self, hash: usize) -> [f64; 3] {
        let g = GRAD3[hash % 12];
        [f64::from(g[0]), f64::from(g[1]), f64::from(g[2])]
    }
}

/// Simplex noise generator.
pub struct SimplexNoise {
    table: PermutationTable,
}

impl SimplexNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D noise. Returns a value in `[-1, 1]`.
    pub fn sample2(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * F2;
        let i = (x + skew).floor();
        let j = (y + skew).floor();

        let unskew = (i + j) * G2;
        let x0 = x - (i - unskew);
        let y0 = y - (j - unskew);

        // Lower or upper triangle of the skewed cell.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + G2;
        let y1 = y0 - f64::from(j1) + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = lattice_index(i);
        let jj = lattice_index(j);
        let t = &self.table;

        let g0 = t.get(ii + t.get(jj));
        let g1 = t.get(ii + i1 as usize + t.get(jj + j1 as usize));
        let g2 = t.get(ii + 1 + t.get(jj + 1));

        let n = self.corner2(x0, y0, g0) + self.corner2(x1, y1, g1) + self.corner2(x2, y2, g2);

        (70.0 * n).clamp(-1.0, 1.0)
    }

    /// Samples 3D noise. Returns a value in `[-1, 1]`.
    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let skew = (x + y + z) * F3;
        let i = (x + skew).floor();
        let j = (y + skew).floor();
        let k = (z + skew).floor();

        let unskew = (i + j + k) * G3;
        let x0 = x - (i - unskew);
        let y0 = y - (j - unskew);
        let z0 = z - (k - unskew);

        // Which of the six tetrahedra of the skewed cube contains the point.
        let ((i1, j1, k1), (i2, j2, k2)) = if x0 >= y0 {
            if y0 >= z0 {
                ((1, 0, 0), (1, 1, 0))
            } else if x0 >= z0 {
                ((1, 0, 0), (1, 0, 1))
            } else {
                ((0, 0, 1), (1, 0, 1))
            }
        } else if y0 < z0 {
            ((0, 0, 1), (0, 1, 1))
        } else if x0 < z0 {
            ((0, 1, 0), (0, 1, 1))
        } else {
            ((0, 1, 0), (1, 1, 0))
        };

        let corners = [
            (x0, y0, z0),
            (
                x0 - f64::from(i1) + G3,
                y0 - f64::from(j1) + G3,
                z0 - f64::from(k1) + G3,
            ),
            (
                x0 - f64::from(i2) + 2.0 * G3,
                y0 - f64::from(j2) + 2.0 * G3,
                z0 - f64::from(k2) + 2.0 * G3,
            ),
            (x0 - 1.0 + 3.0 * G3, y0 - 1.0 + 3.0 * G3, z0 - 1.0 + 3.0 * G3),
        ];

        let ii = lattice_index(i);
        let jj = lattice_index(j);
        let kk = lattice_index(k);
        let t = &self.table;

        let hash = |di: usize, dj: usize, dk: usize| t.get(ii + di + t.get(jj + dj + t.get(kk + dk)));
        let hashes = [
            hash(0, 0, 0),
            hash(i1 as usize, j1 as usize, k1 as usize),
            hash(i2 as usize, j2 as usize, k2 as usize),
            hash(1, 1, 1),
        ];

        let n: f64 = corners
            .iter()
            .zip(hashes)
            .map(|(&(cx, cy, cz), h)| self.corner3(cx, cy, cz, h))
            .sum();

        (32.0 * n).clamp(-1.0, 1.0)
    }

    #[inline]
    fn corner2(&self, x: f64, y: f64, hash: usize) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            return 0.0;
        }
        let g = self.table.gradient(hash);
        let t2 = t * t;
        t2 * t2 * (g[0] * x + g[1] * y)
    }

    #[inline]
    fn corner3(&self, x: f64, y: f64, z: f64, hash: usize) -> f64 {
        let t = 0.6 - x * x - y * y - z * z;
        if t < 0.0 {
            return 0.0;
        }
        let g = self.table.gradient(hash);
        let t2 = t * t;
        t2 * t2 * (g[0] * x + g[1] * y + g[2] * z)
    }
}

/// Simplex noise with a frequency applied to sample coordinates.
pub struct NoiseField {
    noise: SimplexNoise,
    frequency: f64,
}

impl NoiseField {
    pub fn new(seed: u64, frequency: f32) -> Self {
        Self {
            noise: SimplexNoise::new(seed),
            frequency: f64::from(frequency),
        }
    }

    pub fn get2(&self, x: f32, y: f32) -> f32 {
        let f = self.frequency;
        self.noise.sample2(f64::from(x) * f, f64::from(y) * f) as f32
    }

    pub fn get3(&self, x: f32, y: f32, z: f32) -> f32 {
        let f = self.frequency;
        self.noise
            .sample3(f64::from(x) * f, f64::from(y) * f, f64::from(z) * f) as f32
    }
}

/// Wraps a floored lattice coordinate into the permutation table.
///
/// Stays in floating point so coordinates far outside the `i32` range cannot
/// overflow. Non-finite input maps to 0.
#[inline]
fn lattice_index(cell: f64) -> usize {
    cell.rem_euclid(256.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let a = SimplexNoise::new(1337);
        let b = SimplexNoise::new(1337);
        for i in 0..200 {
            let x = i as f64 * 0.37 - 20.0;
            let y = i as f64 * 0.11 + 3.0;
            let z = i as f64 * -0.23;
            assert_eq!(a.sample2(x, y), b.sample2(x, y));
            assert_eq!(a.sample3(x, y, z), b.sample3(x, y, z));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = SimplexNoise::new(1);
        let b = SimplexNoise::new(2);
        let differs = (0..50).any(|i| {
            let p = i as f64 * 0.731 + 0.1;
            a.sample3(p, p * 0.5, -p) != b.sample3(p, p * 0.5, -p)
        });
        assert!(differs);
    }

    #[test]
    fn zero_seed_still_shuffles() {
        let t = PermutationTable::new(0);
        let identity = (0..256).all(|i| t.get(i) == i);
        assert!(!identity);
    }

    #[test]
    fn values_stay_in_range() {
        let n = SimplexNoise::new(42);
        for i in 0..20_000 {
            let x = i as f64 * 0.071 - 700.0;
            let y = i as f64 * 0.053 - 500.0;
            let z = i as f64 * 0.029 + 11.0;
            let v2 = n.sample2(x, y);
            let v3 = n.sample3(x, y, z);
            assert!((-1.0..=1.0).contains(&v2), "2D {v2} at ({x}, {y})");
            assert!((-1.0..=1.0).contains(&v3), "3D {v3} at ({x}, {y}, {z})");
        }
    }

    #[test]
    fn noise_is_continuous() {
        let n = SimplexNoise::new(42);
        let d = 0.0005;
        for &(x, y, z) in &[(10.3, -4.2, 7.7), (0.5, 0.5, 0.5), (-123.4, 56.7, -8.9)] {
            assert!((n.sample2(x, y) - n.sample2(x + d, y)).abs() < 0.01);
            assert!((n.sample3(x, y, z) - n.sample3(x, y + d, z)).abs() < 0.01);
        }
    }

    #[test]
    fn noise_is_not_flat() {
        let n = SimplexNoise::new(7);
        let values: Vec<f64> = (0..100).map(|i| n.sample3(i as f64 * 0.37, 1.3, -2.1)).collect();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.5, "range {min}..{max}");
    }

    #[test]
    fn field_applies_frequency() {
        let field = NoiseField::new(9, 0.5);
        let raw = SimplexNoise::new(9);
        assert_eq!(field.get3(4.0, 2.0, 6.0), raw.sample3(2.0, 1.0, 3.0) as f32);
        assert_eq!(field.get2(4.0, 2.0), raw.sample2(2.0, 1.0) as f32);
    }

    #[test]
    fn lattice_index_wraps_negative_cells() {
        assert_eq!(lattice_index(0.0), 0);
        assert_eq!(lattice_index(255.0), 255);
        assert_eq!(lattice_index(256.0), 0);
        assert_eq!(lattice_index(-1.0), 255);
        assert_eq!(lattice_index(-257.0), 255);
        assert_eq!(lattice_index(f64::NAN), 0);
    }

    #[test]
    fn huge_coordinates_stay_in_range() {
        let n = SimplexNoise::new(3);
        for &c in &[1e10, -1e10, 1e12, -3.5e15, 1e19, -1e30] {
            let v2 = n.sample2(c, c * 0.5);
            let v3 = n.sample3(c, -c, c * 0.25);
            assert!((-1.0..=1.0).contains(&v2), "2D {v2} at {c}");
            assert!((-1.0..=1.0).contains(&v3), "3D {v3} at {c}");
        }
    }
}
