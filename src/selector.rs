use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Draws allowed before a repeat is accepted.
pub const MAX_DRAW_ATTEMPTS: usize = 32;

/// Picks corpus indices uniformly, avoiding the index it returned last.
#[derive(Debug)]
pub struct TextSelector<R: Rng = StdRng> {
    rng: R,
    last: Option<usize>,
}

impl TextSelector<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for TextSelector<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TextSelector<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, last: None }
    }

    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// Next index in `0..corpus_size`, never equal to the previous one unless
    /// `MAX_DRAW_ATTEMPTS` draws all hit it (always the case for a corpus of one).
    ///
    /// # Panics
    /// If `corpus_size` is zero.
    pub fn pick_next(&mut self, corpus_size: usize) -> usize {
        assert!(corpus_size > 0, "cannot select from an empty corpus");

        let mut idx = self.rng.gen_range(0..corpus_size);
        let mut attempts = 1;
        while Some(idx) == self.last && attempts < MAX_DRAW_ATTEMPTS {
            idx = self.rng.gen_range(0..corpus_size);
            attempts += 1;
        }

        if Some(idx) == self.last {
            debug!(idx, attempts, "accepting repeated selection");
        }

        self.last = Some(idx);
        idx
    }
}
