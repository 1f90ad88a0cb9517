use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::clock::Clock;
use crate::error::WheelError;
use crate::gate::should_show_ad;
use crate::geometry::segment_under_pointer;
use crate::participants::ParticipantList;
use crate::roulette::{ease_out_cubic, RandomSource, Roulette, SpinPlan, SpinResult};

/// Snapshot of the counters a session carries between spins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinState {
    pub is_spinning: bool,
    pub spin_count: u64,
    pub current_rotation_degrees: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpinPhase {
    Idle,
    AwaitingAd,
    Animating {
        plan: SpinPlan,
        result: SpinResult,
        started_at: Duration,
    },
    Resolved {
        result: SpinResult,
    },
}

/// What an accepted spin request needs before the wheel moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    AdRequired,
    Proceed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Cumulative wheel rotation to display.
    pub rotation_degrees: f64,
    pub progress: f64,
    /// Segment under the pointer for the turn made so far in this spin.
    pub pointer_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinReport {
    pub spin_number: u64,
    pub result: SpinResult,
    pub winner: String,
    pub final_frame: Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    Frame(Frame),
    Finished(SpinReport),
}

/// One wheel: its names, its spin counters, and where the current spin is.
pub struct WheelSession {
    participants: ParticipantList,
    spin_count: u64,
    current_rotation_degrees: f64,
    phase: SpinPhase,
    roulette: Roulette,
    random: Box<dyn RandomSource + Send>,
    clock: Arc<dyn Clock>,
}

impl WheelSession {
    pub fn new(
        spin_duration: Duration,
        random: Box<dyn RandomSource + Send>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participants: ParticipantList::new(),
            spin_count: 0,
            current_rotation_degrees: 0.0,
            phase: SpinPhase::Idle,
            roulette: Roulette::new(spin_duration),
            random,
            clock,
        }
    }

    pub fn participants(&self) -> &ParticipantList {
        &self.participants
    }

    pub fn phase(&self) -> &SpinPhase {
        &self.phase
    }

    pub fn state(&self) -> SpinState {
        SpinState {
            is_spinning: matches!(self.phase, SpinPhase::Animating { .. }),
            spin_count: self.spin_count,
            current_rotation_degrees: self.current_rotation_degrees,
        }
    }

    /// True from the moment a request is accepted until its winner is known.
    pub fn in_flight(&self) -> bool {
        matches!(
            self.phase,
            SpinPhase::AwaitingAd | SpinPhase::Animating { .. }
        )
    }

    pub fn add_participant(&mut self, name: &str) -> Result<String, WheelError> {
        if self.in_flight() {
            return Err(WheelError::SpinInProgress);
        }
        let added = self.participants.add(name)?.to_string();
        debug!("added {added:?}, wheel now has {}", self.participants.len());
        Ok(added)
    }

    pub fn remove_participant(&mut self, index: usize) -> Result<String, WheelError> {
        if self.in_flight() {
            return Err(WheelError::SpinInProgress);
        }
        let removed = self.participants.remove(index)?;
        debug!("removed {removed:?}, wheel now has {}", self.participants.len());
        Ok(removed)
    }

    /// Accepts or declines a spin. Declines leave the session untouched.
    ///
    /// The ad gate is read with the count of spins completed so far; the
    /// counter only moves once the animation starts.
    pub fn request_spin(&mut self) -> Result<Admission, WheelError> {
        if self.in_flight() {
            return Err(WheelError::AlreadySpinning);
        }
        if self.participants.is_empty() {
            return Err(WheelError::NoParticipants);
        }

        if should_show_ad(self.spin_count) {
            debug!("spin count {} is gated, waiting for ad", self.spin_count);
            self.phase = SpinPhase::AwaitingAd;
            return Ok(Admission::AdRequired);
        }

        self.start_animation()?;
        Ok(Admission::Proceed)
    }

    /// Releases a spin that was waiting on the ad step.
    pub fn ad_finished(&mut self) -> Result<(), WheelError> {
        if self.phase != SpinPhase::AwaitingAd {
            return Err(WheelError::NotAwaitingAd);
        }
        self.start_animation()
    }

    fn start_animation(&mut self) -> Result<(), WheelError> {
        let (plan, result) = self.roulette.spin(
            &self.participants,
            self.current_rotation_degrees,
            self.random.as_mut(),
        )?;
        self.spin_count += 1;
        let started_at = self.clock.now();
        info!(
            "spin #{} started: {:.1} -> {:.1} degrees over {:?}",
            self.spin_count, plan.start_degrees, plan.final_degrees, plan.duration
        );
        self.phase = SpinPhase::Animating {
            plan,
            result,
            started_at,
        };
        Ok(())
    }

    /// Advances the animation to the clock's current time.
    ///
    /// Each frame depends only on the start time, so skipped or late ticks
    /// are harmless. The last tick resolves the winner exactly once.
    pub fn tick(&mut self) -> Result<Tick, WheelError> {
        let (plan, result, started_at) = match &self.phase {
            SpinPhase::Animating {
                plan,
                result,
                started_at,
            } => (*plan, *result, *started_at),
            _ => return Err(WheelError::NotAnimating),
        };

        let elapsed = self.clock.now().saturating_sub(started_at);
        let frame = self.frame_at(&plan, &result, elapsed);
        if frame.progress < 1.0 {
            return Ok(Tick::Frame(frame));
        }

        let winner = self
            .participants
            .get(result.winner_index)
            .ok_or(WheelError::NoSuchParticipant {
                index: result.winner_index,
                len: self.participants.len(),
            })?
            .to_string();

        self.current_rotation_degrees = plan.final_degrees;
        self.phase = SpinPhase::Resolved { result };
        info!("spin #{} landed on {winner:?}", self.spin_count);

        Ok(Tick::Finished(SpinReport {
            spin_number: self.spin_count,
            result,
            winner,
            final_frame: frame,
        }))
    }

    fn frame_at(&self, plan: &SpinPlan, result: &SpinResult, elapsed: Duration) -> Frame {
        let progress = plan.progress(elapsed);
        // The resting frame always shows the resolved winner.
        let pointer_index = if progress >= 1.0 {
            result.winner_index
        } else {
            let turned = result.total_rotation_radians * ease_out_cubic(progress);
            segment_under_pointer(turned, self.participants.len()).unwrap_or(0)
        };
        Frame {
            rotation_degrees: plan.rotation_at(elapsed),
            progress,
            pointer_index,
        }
    }
}
