//! Seedable RNG resource for per-point jitter.
//!
//! Wraps `ChaCha8Rng` so that a fixed seed reproduces the same phases and
//! wobble offsets. Values are drawn only when a density point is created;
//! animation ticks never touch the RNG.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
const DEFAULT_SEED: u64 = 42;

/// Systems that build density points take `ResMut<OverlayRng>` and pass
/// `&mut rng.0` down to the builders.
#[derive(Resource)]
pub struct OverlayRng(pub ChaCha8Rng);

impl Default for OverlayRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl OverlayRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}
