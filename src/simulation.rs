use crate::config::GrowthModeConfig;
use crate::constants::*;
use crate::field::{Field, FieldError};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::FRAC_PI_2;

pub type SimRng = StdRng;

/// Report handed to the caller after each tick.
///
/// `regenerated` is set on the tick that wrapped the iteration counter and
/// replaced field, growth config and walker population; the renderer uses it
/// to wash the accumulated pattern out before the new one grows.
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub regenerated: bool,
}

/// An independent growth point that advances along a heading and lays trail.
///
/// A walker with `dir == None` is seeking: it spends its ticks probing the
/// field for a set cell to branch out from. Once it has a heading it is
/// active and advances one unit per tick until it collides with an existing
/// trail or leaves the field, at which point it relocates in place.
#[derive(Debug, Clone)]
pub struct Walker {
    pub pos: Vec2,
    pub dir: Option<f32>,
    pub angular_vel: f32,
    pub turns: bool,
    pub walks: bool,
    pub twirls_in: bool,
    pub twirls_out: bool,
}

impl Walker {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            dir: None,
            angular_vel: 0.0,
            turns: false,
            walks: false,
            twirls_in: false,
            twirls_out: false,
        }
    }

    /// Cell under the current position, truncated toward zero.
    #[inline]
    fn cell(&self) -> (i32, i32) {
        (self.pos.x as i32, self.pos.y as i32)
    }

    /// Probe the field for a set cell to branch out from.
    ///
    /// Re-rolls the behavior flags and angular velocity, then tries up to
    /// `FIND_START_ATTEMPTS` random cells. On the first set cell the walker
    /// adopts its integer coordinates and heads off perpendicular to the
    /// stored trail direction (sign 50/50). Exhausting all attempts leaves
    /// the walker seeking; it retries next tick.
    fn find_start(&mut self, field: &Field, rng: &mut SimRng) {
        self.dir = None;
        self.turns = rng.gen_bool(TRAIT_PROBABILITY);
        self.walks = rng.gen_bool(TRAIT_PROBABILITY);
        self.twirls_in = rng.gen_bool(TRAIT_PROBABILITY);
        self.twirls_out = rng.gen_bool(TRAIT_PROBABILITY);
        self.angular_vel = rng.gen_range(-SEEK_ANGULAR_VEL_RANGE..SEEK_ANGULAR_VEL_RANGE);

        for _ in 0..FIND_START_ATTEMPTS {
            let x = rng.gen_range(0..field.width()) as i32;
            let y = rng.gen_range(0..field.height()) as i32;
            if let Ok(Some(angle)) = field.get(x, y) {
                self.pos = Vec2::new(x as f32, y as f32);
                let flip = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                self.dir = Some(angle + flip * FRAC_PI_2);
                break;
            }
        }
    }

    /// Advance one tick. Returns `true` when the walker collided with an
    /// existing trail and a spawn should be granted.
    ///
    /// The trail is written into the cell the walker is *leaving*, so a line
    /// only becomes solid one step behind the leading edge and collisions
    /// leave no stray point at the crash site.
    pub fn advance(
        &mut self,
        field: &mut Field,
        growth: &GrowthModeConfig,
        rng: &mut SimRng,
    ) -> Result<bool, FieldError> {
        let Some(mut dir) = self.dir else {
            self.find_start(field, rng);
            return Ok(false);
        };

        let old_cell = self.cell();
        self.pos += Vec2::from_angle(dir);

        // Trajectory modifiers, fixed order, each gated by global OR own flag.
        if growth.walks || self.walks {
            self.angular_vel = rng.gen_range(-WALK_ANGULAR_VEL_RANGE..WALK_ANGULAR_VEL_RANGE);
        }
        if growth.twirls_in || self.twirls_in {
            self.angular_vel *= TWIRL_IN_FACTOR;
        }
        if growth.twirls_out || self.twirls_out {
            self.angular_vel *= TWIRL_OUT_FACTOR;
        }
        if growth.turns || self.turns {
            dir += self.angular_vel;
        }
        self.dir = Some(dir);

        // Relocate on crashing into a trail or leaving the field. Only the
        // in-bounds collision grants a spawn; a boundary exit never does.
        let new_cell = self.cell();
        if field.contains(new_cell.0, new_cell.1) {
            if new_cell != old_cell && field.get(new_cell.0, new_cell.1)?.is_some() {
                self.find_start(field, rng);
                return Ok(true);
            }
            field.set(old_cell.0, old_cell.1, dir)?;
        } else {
            self.find_start(field, rng);
        }
        Ok(false)
    }
}

/// Simulation controller: owns the field, the growth-mode config and the
/// walker population, and advances everything one tick at a time.
pub struct SimulationState {
    pub walkers: Vec<Walker>,
    field: Field,
    growth: GrowthModeConfig,
    iteration: u32,
    rng: SimRng,
    is_paused: bool,
}

impl SimulationState {
    pub fn new(width: u32, height: u32) -> Self {
        let mut state = Self {
            walkers: Vec::new(),
            field: Field::new(width, height),
            growth: GrowthModeConfig::default(),
            iteration: 0,
            rng: SimRng::from_entropy(),
            is_paused: false,
        };
        state.regenerate();
        state
    }

    /// Start a new generation: fresh growth mode, reseeded field and
    /// `INITIAL_WALKER_COUNT` seeking walkers.
    fn regenerate(&mut self) {
        self.growth = GrowthModeConfig::roll(&mut self.rng);
        self.field.reseed(&mut self.rng);
        self.walkers = (0..INITIAL_WALKER_COUNT).map(|_| Walker::new()).collect();
        log::debug!(
            "Regenerated: {} ignition cells, growth mode {:?}",
            self.field.set_cell_count(),
            self.growth
        );
    }

    /// Advance one tick.
    ///
    /// Walkers update sequentially and in place: a walker moved later in the
    /// tick sees the cells written by walkers moved before it. Each trail
    /// collision grants one fresh seeking walker, up to `MAX_WALKERS`.
    pub fn step(&mut self) -> Result<StepReport, FieldError> {
        if self.is_paused {
            return Ok(StepReport { regenerated: false });
        }

        self.iteration += 1;
        if self.iteration >= MAX_ITERATIONS {
            self.iteration = 0;
            self.regenerate();
            return Ok(StepReport { regenerated: true });
        }

        // Only walkers alive at the start of the tick move; spawns join the
        // population afterwards and take their first step next tick.
        let live = self.walkers.len();
        let mut pending = 0usize;
        for walker in self.walkers.iter_mut() {
            let spawn = walker.advance(&mut self.field, &self.growth, &mut self.rng)?;
            if spawn && live + pending < MAX_WALKERS {
                pending += 1;
            }
        }
        for _ in 0..pending {
            self.walkers.push(Walker::new());
        }

        Ok(StepReport { regenerated: false })
    }

    /// Ordered walker positions, for the renderer.
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.walkers.iter().map(|walker| walker.pos)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.field.width(), self.field.height())
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
        log::info!(
            "Simulation {}",
            if self.is_paused { "paused" } else { "resumed" }
        );
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn restart(&mut self) {
        log::info!("Restarting simulation with new seed...");
        self.rng = SimRng::from_entropy();
        self.iteration = 0;
        self.regenerate();
        self.is_paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_walker(pos: Vec2, dir: f32) -> Walker {
        let mut walker = Walker::new();
        walker.pos = pos;
        walker.dir = Some(dir);
        walker
    }

    #[test]
    fn seeking_walker_adopts_the_only_seed_cell() {
        let mut field = Field::new(4, 4);
        field.set(2, 2, 0.0).unwrap();
        let mut rng = SimRng::seed_from_u64(42);
        let growth = GrowthModeConfig::default();

        let mut walker = Walker::new();
        let spawn = walker.advance(&mut field, &growth, &mut rng).unwrap();
        assert!(!spawn);
        assert_eq!(walker.pos, Vec2::new(2.0, 2.0));
        // Heading is the seed angle rotated a quarter turn either way.
        let dir = walker.dir.expect("walker should have found the seed");
        assert!((dir.abs() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn active_walker_lays_trail_one_step_behind() {
        let mut field = Field::new(4, 4);
        field.set(2, 2, 0.0).unwrap();
        let mut rng = SimRng::seed_from_u64(42);
        let growth = GrowthModeConfig::default();

        let mut walker = Walker::new();
        walker.advance(&mut field, &growth, &mut rng).unwrap();
        // Pin the stochastic parts down so the second tick is pure motion.
        walker.turns = false;
        walker.walks = false;
        walker.twirls_in = false;
        walker.twirls_out = false;
        walker.angular_vel = 0.0;
        let dir = walker.dir.unwrap();

        let spawn = walker.advance(&mut field, &growth, &mut rng).unwrap();
        assert!(!spawn);
        assert_eq!(walker.dir, Some(dir), "no modifier may fire");
        // The cell the walker left records the direction it was traveling.
        assert_eq!(field.get(2, 2), Ok(Some(dir)));
        let expected_y = if dir > 0.0 { 3 } else { 1 };
        assert_eq!((walker.pos.x as i32, walker.pos.y as i32), (2, expected_y));
        assert_eq!(field.get(2, expected_y), Ok(None));
    }

    #[test]
    fn collision_relocates_and_requests_spawn() {
        let mut field = Field::new(4, 4);
        field.set(2, 3, 0.7).unwrap();
        let mut rng = SimRng::seed_from_u64(1);
        let growth = GrowthModeConfig::default();

        // Heading straight into the occupied cell above.
        let mut walker = quiet_walker(Vec2::new(2.0, 2.0), FRAC_PI_2);
        let spawn = walker.advance(&mut field, &growth, &mut rng).unwrap();
        assert!(spawn, "in-bounds trail collision must request a spawn");
        // On the collision path nothing is written to the departed cell.
        assert_eq!(field.get(2, 2), Ok(None));
        // find_start ran: the only set cell is (2, 3), so the walker either
        // relocated there or is seeking again.
        if walker.dir.is_some() {
            assert_eq!(walker.pos, Vec2::new(2.0, 3.0));
        }
    }

    #[test]
    fn boundary_exit_relocates_without_spawn() {
        let mut field = Field::new(4, 4);
        let mut rng = SimRng::seed_from_u64(9);
        let growth = GrowthModeConfig::default();

        // One step east of (3.5, 2.5) leaves the field.
        let mut walker = quiet_walker(Vec2::new(3.5, 2.5), 0.0);
        let spawn = walker.advance(&mut field, &growth, &mut rng).unwrap();
        assert!(!spawn, "boundary exit never grants a spawn");
        // The field is empty, so relocation cannot find a seed: the walker
        // stays seeking, which is a normal outcome rather than an error.
        assert_eq!(walker.dir, None);
        assert_eq!(field.set_cell_count(), 0, "no trail written on exit");
    }

    #[test]
    fn global_growth_mode_overrides_walker_flags() {
        let mut field = Field::new(16, 16);
        let mut rng = SimRng::seed_from_u64(3);
        let growth = GrowthModeConfig {
            turns: true,
            ..GrowthModeConfig::default()
        };

        let mut walker = quiet_walker(Vec2::new(8.0, 8.0), 0.0);
        walker.angular_vel = 0.05;
        walker.advance(&mut field, &growth, &mut rng).unwrap();
        // The walker's own `turns` is false; the global flag forces the turn.
        let dir = walker.dir.unwrap();
        assert!((dir - 0.05).abs() < 1e-6);
        // The departed cell records the post-turn heading.
        let written = field.get(8, 8).unwrap().unwrap();
        assert!((written - 0.05).abs() < 1e-6);
    }

    #[test]
    fn twirl_modifiers_compound_in_order() {
        let mut field = Field::new(16, 16);
        let mut rng = SimRng::seed_from_u64(3);
        let growth = GrowthModeConfig::default();

        let mut walker = quiet_walker(Vec2::new(8.0, 8.0), 0.0);
        walker.angular_vel = 0.1;
        walker.twirls_in = true;
        walker.twirls_out = true;
        walker.advance(&mut field, &growth, &mut rng).unwrap();
        let expected = 0.1 * TWIRL_IN_FACTOR * TWIRL_OUT_FACTOR;
        assert!((walker.angular_vel - expected).abs() < 1e-7);
        // Without `turns` the heading itself is untouched.
        assert_eq!(walker.dir, Some(0.0));
    }

    #[test]
    fn walker_cap_and_regeneration_boundary() {
        let mut state = SimulationState::new(64, 64);
        assert_eq!(state.walkers.len(), INITIAL_WALKER_COUNT);
        assert!(state.field.set_cell_count() >= 1);
        assert!(state.field.set_cell_count() <= RESEED_DRAWS);

        let mut previous_count = state.walkers.len();
        for _ in 0..(MAX_ITERATIONS - 1) {
            let report = state.step().unwrap();
            assert!(!report.regenerated);
            let count = state.walkers.len();
            assert!(count >= previous_count, "population shrank mid-generation");
            assert!(count <= MAX_WALKERS);
            previous_count = count;
        }

        // The wrapping tick regenerates and does not move anyone.
        let report = state.step().unwrap();
        assert!(report.regenerated);
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.walkers.len(), INITIAL_WALKER_COUNT);
        assert!(state.field.set_cell_count() <= RESEED_DRAWS);
        assert!(state.walkers.iter().all(|walker| walker.dir.is_none()));
    }

    #[test]
    fn paused_state_does_not_tick() {
        let mut state = SimulationState::new(32, 32);
        state.toggle_pause();
        assert!(state.is_paused());
        let report = state.step().unwrap();
        assert!(!report.regenerated);
        assert_eq!(state.iteration(), 0);
        state.toggle_pause();
        state.step().unwrap();
        assert_eq!(state.iteration(), 1);
    }

    #[test]
    fn snapshot_matches_walker_order() {
        let mut state = SimulationState::new(32, 32);
        for _ in 0..10 {
            state.step().unwrap();
        }
        let positions: Vec<Vec2> = state.positions().collect();
        assert_eq!(positions.len(), state.walkers.len());
        assert!(positions.len() <= MAX_WALKERS);
        for (position, walker) in positions.iter().zip(&state.walkers) {
            assert_eq!(*position, walker.pos);
        }
    }

    #[test]
    fn heading_sign_flip_occurs_both_ways() {
        // With a quarter-turn seed at angle 0 the adopted heading is ±π/2;
        // over many seeds both signs must show up.
        let mut saw_positive = false;
        let mut saw_negative = false;
        for seed in 0..64 {
            let mut field = Field::new(4, 4);
            field.set(2, 2, 0.0).unwrap();
            let mut rng = SimRng::seed_from_u64(seed);
            let growth = GrowthModeConfig::default();
            let mut walker = Walker::new();
            walker.advance(&mut field, &growth, &mut rng).unwrap();
            match walker.dir {
                Some(dir) if dir > 0.0 => saw_positive = true,
                Some(dir) if dir < 0.0 => saw_negative = true,
                _ => {}
            }
        }
        assert!(saw_positive && saw_negative);
    }
}
