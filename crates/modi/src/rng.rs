use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Seeded generator behind every random choice a modus makes.
#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::thread_rng().next_u64())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform roll in `0..100`.
    pub fn percent(&mut self) -> u32 {
        self.rng.gen_range(0..100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_rolls() {
        let mut a = RngState::from_seed(42);
        let mut b = RngState::from_seed(42);
        let rolls_a: Vec<u32> = (0..16).map(|_| a.percent()).collect();
        let rolls_b: Vec<u32> = (0..16).map(|_| b.percent()).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|roll| *roll < 100));
        assert_eq!(a.seed(), 42);
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
