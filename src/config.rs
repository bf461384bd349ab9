use crate::constants::TRAIT_PROBABILITY;
use crate::simulation::SimRng;
use rand::Rng;

/// Global growth-mode overrides, re-rolled on every regeneration.
///
/// Each flag, when set, forces the corresponding behavior on *every* walker
/// for the whole generation, regardless of the walker's own flags. A walker
/// checks `global OR own` for each behavior, so a generation where e.g.
/// `turns` comes up true produces uniformly curling trails.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthModeConfig {
    pub turns: bool,
    pub walks: bool,
    pub twirls_in: bool,
    pub twirls_out: bool,
}

impl GrowthModeConfig {
    /// Re-roll all four flags, each true with `TRAIT_PROBABILITY`.
    pub fn roll(rng: &mut SimRng) -> Self {
        Self {
            turns: rng.gen_bool(TRAIT_PROBABILITY),
            walks: rng.gen_bool(TRAIT_PROBABILITY),
            twirls_in: rng.gen_bool(TRAIT_PROBABILITY),
            twirls_out: rng.gen_bool(TRAIT_PROBABILITY),
        }
    }
}
