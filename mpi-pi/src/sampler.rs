//! Per-rank quarter-disk sampling.
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws thrown away right after seeding.
pub const WARMUP_DRAWS: usize = 100;

// One past the largest raw output, so draw() never reaches 1.0.
const SCALE: f64 = u32::MAX as f64 + 1.0;

/// A deterministic uniform generator owned by a single rank.
///
/// ChaCha8 keeps the stream for a given seed identical across platforms
/// and `rand` releases, and distinct seeds give independent streams.
#[derive(Clone, Debug)]
pub struct Sampler {
    rng: ChaCha8Rng,
}

impl Sampler {
    /// Seed the generator, then discard [`WARMUP_DRAWS`] values so that
    /// nearby seeds don't start from correlated states.
    pub fn seed(seed: u64) -> Self {
        let mut sampler = Sampler {
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        for _ in 0..WARMUP_DRAWS {
            sampler.draw();
        }
        sampler
    }

    /// Generator for `rank`, seeded with `base_seed + rank`.
    pub fn for_rank(rank: u32, base_seed: u64) -> Self {
        Self::seed(base_seed.wrapping_add(u64::from(rank)))
    }

    /// Uniform value in `[0, 1)`.
    pub fn draw(&mut self) -> f64 {
        f64::from(self.rng.next_u32()) / SCALE
    }

    /// Throw `n` points into `[-1, 1) x [-1, 1)` and count those strictly
    /// inside the unit circle.
    pub fn sample(&mut self, n: u64) -> u64 {
        let mut inside = 0;
        for _ in 0..n {
            let x = 2.0 * (self.draw() - 0.5);
            let y = 2.0 * (self.draw() - 0.5);
            if x * x + y * y < 1.0 {
                inside += 1;
            }
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_stays_in_unit_interval() {
        let mut sampler = Sampler::seed(3);
        for _ in 0..100_000 {
            let v = sampler.draw();
            assert!((0.0..1.0).contains(&v), "{}", v);
        }
    }

    #[test]
    fn same_seed_same_count() {
        let a = Sampler::seed(11).sample(50_000);
        let b = Sampler::seed(11).sample(50_000);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Sampler::seed(0);
        let mut b = Sampler::seed(1);
        let a: Vec<f64> = (0..16).map(|_| a.draw()).collect();
        let b: Vec<f64> = (0..16).map(|_| b.draw()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn seeding_discards_warmup_draws() {
        let mut raw = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..WARMUP_DRAWS {
            raw.next_u32();
        }
        let expected = f64::from(raw.next_u32()) / SCALE;
        assert_eq!(Sampler::seed(5).draw(), expected);
    }

    #[test]
    fn for_rank_offsets_base_seed() {
        assert_eq!(
            Sampler::for_rank(3, 10).sample(1000),
            Sampler::seed(13).sample(1000)
        );
        assert_eq!(
            Sampler::for_rank(2, 0).sample(1000),
            Sampler::seed(2).sample(1000)
        );
    }

    #[test]
    fn count_never_exceeds_samples() {
        for seed in 0..8 {
            for n in [0, 1, 2, 10, 1000] {
                assert!(Sampler::seed(seed).sample(n) <= n);
            }
        }
    }

    #[test]
    fn zero_samples_counts_nothing() {
        assert_eq!(Sampler::seed(0).sample(0), 0);
    }

    #[test]
    fn estimate_converges_to_pi() {
        let n = 1_000_000;
        let inside = Sampler::seed(42).sample(n);
        let estimate = 4.0 * inside as f64 / n as f64;
        assert!(
            (estimate - std::f64::consts::PI).abs() < 0.01,
            "estimate {}",
            estimate
        );
    }
}
