//! Reproducible initial-condition sampling
//!
//! Every run draws its initial states from a generator that is created,
//! seeded, and dropped inside [`sample_initial_states`]. Nothing touches a
//! process-wide generator, so callers' own random streams are unaffected and
//! the same member count always yields the same states.

use crate::physics::math::{Scalar, Vector};
use bevy::prelude::{Deref, DerefMut};
use rand::Rng;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

/// Seed used for every ensemble's initial states
pub const INITIAL_STATE_SEED: u64 = 1;

/// Initial coordinates are drawn from `[-INITIAL_STATE_BOUND, INITIAL_STATE_BOUND]`
pub const INITIAL_STATE_BOUND: Scalar = 15.0;

#[derive(Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct InitialStateRng(pub ChaCha8Rng);

impl InitialStateRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for InitialStateRng {
    fn default() -> Self {
        Self::from_seed(INITIAL_STATE_SEED)
    }
}

/// Draw one state with each coordinate uniform over the sampling box.
///
/// Coordinates are drawn in x, y, z order.
pub fn random_state(rng: &mut InitialStateRng) -> Vector {
    let x = random_coordinate(rng);
    let y = random_coordinate(rng);
    let z = random_coordinate(rng);
    Vector::new(x, y, z)
}

fn random_coordinate(rng: &mut InitialStateRng) -> Scalar {
    let u: Scalar = rng.random();
    -INITIAL_STATE_BOUND + 2.0 * INITIAL_STATE_BOUND * u
}

/// The initial state set for an ensemble of `count` members.
///
/// Deterministic in `count`; a smaller ensemble is always a prefix of a
/// larger one.
pub fn sample_initial_states(count: usize) -> Vec<Vector> {
    let mut rng = InitialStateRng::default();
    (0..count).map(|_| random_state(&mut rng)).collect()
}
