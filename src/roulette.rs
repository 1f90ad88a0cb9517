use std::f64::consts::TAU;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::WheelError;
use crate::participants::ParticipantList;

/// Every spin turns the wheel at least this many times.
pub const MIN_TURNS: f64 = 5.0;
/// Upper bound (exclusive) on the extra whole turns added by the first draw.
pub const EXTRA_TURNS: f64 = 5.0;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Random source backed by an OS-seeded `StdRng`.
pub struct EntropySource {
    rng: StdRng,
}

impl EntropySource {
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

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropySource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// How the wheel moves from where it rests to where it stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub start_degrees: f64,
    pub final_degrees: f64,
    pub duration: Duration,
}

impl SpinPlan {
    pub fn total_degrees(&self) -> f64 {
        self.final_degrees - self.start_degrees
    }

    /// Fraction of the duration that has elapsed, clamped to `[0, 1]`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Wheel rotation at `elapsed` since the animation started.
    pub fn rotation_at(&self, elapsed: Duration) -> f64 {
        let eased = ease_out_cubic(self.progress(elapsed));
        self.start_degrees + self.total_degrees() * eased
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinResult {
    pub total_rotation_radians: f64,
    pub winner_index: usize,
}

/// Fast start, gentle stop: `1 - (1 - p)^3`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Rotation of one spin for draws `turns_draw` and `offset_draw` in `[0, 1)`.
pub fn total_rotation(turns_draw: f64, offset_draw: f64) -> f64 {
    (MIN_TURNS + turns_draw * EXTRA_TURNS) * TAU + offset_draw * TAU
}

/// Index of the winning segment for a spin that turned the wheel by
/// `total_rotation_radians`. `None` on an empty wheel.
pub fn resolve_winner(total_rotation_radians: f64, segments: usize) -> Option<usize> {
    if segments == 0 {
        return None;
    }
    let normalized = total_rotation_radians.rem_euclid(TAU);
    let segment = TAU / segments as f64;
    let provisional = (normalized / segment).floor() as usize;
    // The wheel turns clockwise while segment numbers grow clockwise, so the
    // slice reaching the pointer counts backwards from the top.
    let winner = segments - provisional % segments;
    Some(winner % segments)
}

pub struct Roulette {
    pub spin_duration: Duration,
}

impl Roulette {
    pub fn new(spin_duration: Duration) -> Self {
        Roulette { spin_duration }
    }

    /// Picks how far the wheel turns and who it stops on.
    ///
    /// Draws two values from `random`: the first sets the number of whole
    /// turns, the second the final offset within a turn.
    pub fn spin(
        &self,
        participants: &ParticipantList,
        previous_rotation_degrees: f64,
        random: &mut dyn RandomSource,
    ) -> Result<(SpinPlan, SpinResult), WheelError> {
        if participants.is_empty() {
            return Err(WheelError::NoParticipants);
        }

        let turns_draw = random.next_unit();
        let offset_draw = random.next_unit();
        let total_rotation_radians = total_rotation(turns_draw, offset_draw);
        let final_degrees = previous_rotation_degrees + total_rotation_radians.to_degrees();

        let winner_index = resolve_winner(total_rotation_radians, participants.len())
            .ok_or(WheelError::NoParticipants)?;

        let plan = SpinPlan {
            start_degrees: previous_rotation_degrees,
            final_degrees,
            duration: self.spin_duration,
        };
        let result = SpinResult {
            total_rotation_radians,
            winner_index,
        };
        Ok((plan, result))
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
#[cfg(test)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.to_vec(),
            next: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}
