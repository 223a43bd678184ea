use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::direction::Direction;

/// The center/decoy pair shown for one round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stimulus {
    pub center: Direction,
    pub decoy: Direction,
}

impl Stimulus {
    pub fn is_match(&self) -> bool {
        self.center == self.decoy
    }
}

impl Default for Stimulus {
    fn default() -> Self {
        Self {
            center: Direction::Up,
            decoy: Direction::Up,
        }
    }
}

/// Anything able to hand out the next stimulus
pub trait StimulusSource {
    fn next_stimulus(&mut self) -> Stimulus;
}

/// Random stimulus generator. Holds nothing but its RNG, so draws are
/// independent of each other.
#[derive(Debug)]
pub struct StimulusGenerator<R: Rng = StdRng> {
    rng: R,
}

impl StimulusGenerator<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StimulusGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> StimulusGenerator<R> {
    pub fn next(&mut self) -> Stimulus {
        let index = self.rng.gen_range(0..Direction::ALL.len());
        let center = Direction::ALL[index];

        let decoy = if self.rng.gen_bool(0.5) {
            center
        } else {
            // step 1..=3 places past the center, wrapping
            let step = self.rng.gen_range(1..Direction::ALL.len());
            Direction::ALL[(index + step) % Direction::ALL.len()]
        };

        Stimulus { center, decoy }
    }
}

impl<R: Rng> StimulusSource for StimulusGenerator<R> {
    fn next_stimulus(&mut self) -> Stimulus {
        self.next()
    }
}
