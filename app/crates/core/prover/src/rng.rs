//! Random source held by the prover session

use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Seedable, cryptographically secure random source
#[derive(Debug)]
pub struct ProverRng(StdRng);

impl ProverRng {
    /// Seeds from operating system entropy (`crypto.getRandomValues` in the browser).
    pub fn from_entropy() -> Result<Self, rand::Error> {
        StdRng::from_rng(rand::rngs::OsRng).map(Self)
    }

    /// Deterministic source, for reproducible runs.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(StdRng::from_seed(seed))
    }

    /// Draws a fresh 32-byte seed.
    pub fn seed(&mut self) -> [u8; 32] {
        let mut seed = [0u8; 32];
        self.0.fill_bytes(&mut seed);
        seed
    }

    /// Derives an independent source for a single request.
    ///
    /// The parent advances, so two forks never share a stream.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.seed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forks_diverge_from_each_other() {
        let mut parent = ProverRng::from_seed([7; 32]);
        let mut first = parent.fork();
        let mut second = parent.fork();
        assert_ne!(first.seed(), second.seed());
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = ProverRng::from_seed([1; 32]);
        let mut b = ProverRng::from_seed([1; 32]);
        assert_eq!(a.seed(), b.seed());
        assert_eq!(a.fork().seed(), b.fork().seed());
    }

    #[test]
    fn entropy_source_is_available() {
        let mut rng = ProverRng::from_entropy().expect("os entropy");
        assert_ne!(rng.seed(), [0u8; 32]);
    }
}
