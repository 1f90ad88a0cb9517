use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::error::WheelError;
use crate::session::{Admission, Frame, SpinReport, Tick, WheelSession};

/// Where a spin is shown to people.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// `names` is the wheel as it was frozen when the spin was accepted;
    /// `frame.pointer_index` indexes into it.
    async fn render_frame(&self, names: &[String], frame: &Frame) -> Result<()>;

    /// Called exactly once per completed spin.
    async fn winner_resolved(&self, name: &str) -> Result<()>;
}

/// The sponsor interstitial. What it does is opaque to the wheel.
#[async_trait]
pub trait AdGate: Send + Sync {
    async fn open(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinTiming {
    pub spin_duration: Duration,
    pub ad_delay: Duration,
    pub frame_interval: Duration,
}

/// Runs spin requests against one session: gate, ad, frames, winner.
pub struct SpinDriver {
    session: Arc<Mutex<WheelSession>>,
    ad_gate: Arc<dyn AdGate>,
    timing: SpinTiming,
}

impl SpinDriver {
    pub fn new(session: WheelSession, ad_gate: Arc<dyn AdGate>, timing: SpinTiming) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            ad_gate,
            timing,
        }
    }

    pub fn session(&self) -> &Mutex<WheelSession> {
        &self.session
    }

    /// Runs one spin to completion, or declines it without side effects.
    ///
    /// The session lock is only held for state transitions, never while a
    /// collaborator is awaited, so a second request arriving mid-spin sees
    /// the in-flight guard and is declined.
    pub async fn on_spin_requested(
        &self,
        presenter: &dyn Presenter,
    ) -> Result<SpinReport, WheelError> {
        let (admission, names) = {
            let mut session = self.session.lock().await;
            let admission = session.request_spin()?;
            (admission, session.participants().names().to_vec())
        };

        if admission == Admission::AdRequired {
            if let Err(err) = self.ad_gate.open().await {
                warn!("ad step failed, continuing with the spin: {err:#}");
            }
            sleep(self.timing.ad_delay).await;
            self.session.lock().await.ad_finished()?;
        }

        let mut ticker = interval(self.timing.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let tick = self.session.lock().await.tick()?;
            match tick {
                Tick::Frame(frame) => {
                    debug!(
                        "frame at {:.0}% -> {:.1} degrees",
                        frame.progress * 100.0,
                        frame.rotation_degrees
                    );
                    if let Err(err) = presenter.render_frame(&names, &frame).await {
                        warn!("failed to render frame: {err:#}");
                    }
                }
                Tick::Finished(report) => {
                    let final_frame = &report.final_frame;
                    if let Err(err) = presenter.render_frame(&names, final_frame).await {
                        warn!("failed to render final frame: {err:#}");
                    }
                    if let Err(err) = presenter.winner_resolved(&report.winner).await {
                        warn!("failed to announce winner {:?}: {err:#}", report.winner);
                    }
                    info!("spin #{} complete", report.spin_number);
                    return Ok(report);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::roulette::ScriptedSource;
    use crate::session::SpinState;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingPresenter {
        frames: std::sync::Mutex<Vec<Frame>>,
        highlighted: std::sync::Mutex<Vec<String>>,
        winners: std::sync::Mutex<Vec<String>>,
        fail_frames: bool,
    }

    #[async_trait]
    impl Presenter for RecordingPresenter {
        async fn render_frame(&self, names: &[String], frame: &Frame) -> Result<()> {
            self.frames.lock().unwrap().push(*frame);
            self.highlighted
                .lock()
                .unwrap()
                .push(names[frame.pointer_index].clone());
            if self.fail_frames {
                return Err(anyhow!("message was deleted"));
            }
            Ok(())
        }

        async fn winner_resolved(&self, name: &str) -> Result<()> {
            self.winners.lock().unwrap().push(name.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingAdGate {
        opened: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl AdGate for CountingAdGate {
        async fn open(&self) -> Result<()> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("popup blocked"));
            }
            Ok(())
        }
    }

    fn timing() -> SpinTiming {
        SpinTiming {
            spin_duration: Duration::from_millis(6000),
            ad_delay: Duration::from_millis(1500),
            frame_interval: Duration::from_millis(250),
        }
    }

    fn driver(ad_gate: Arc<CountingAdGate>, draws: &[f64]) -> SpinDriver {
        let mut session = WheelSession::new(
            timing().spin_duration,
            Box::new(ScriptedSource::new(draws)),
            Arc::new(TokioClock::new()),
        );
        for name in ["Alice", "Bob", "Carol", "Dave"] {
            session.add_participant(name).unwrap();
        }
        SpinDriver::new(session, ad_gate, timing())
    }

    #[tokio::test(start_paused = true)]
    async fn first_spin_shows_ad_then_announces_winner_once() {
        let ad_gate = Arc::new(CountingAdGate::default());
        let driver = driver(ad_gate.clone(), &[0.0, 0.125]);
        let presenter = RecordingPresenter::default();

        let started = Instant::now();
        let report = driver.on_spin_requested(&presenter).await.unwrap();

        assert_eq!(ad_gate.opened.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= Duration::from_millis(7500));
        assert_eq!(report.winner, "Alice");
        assert_eq!(*presenter.winners.lock().unwrap(), vec!["Alice".to_string()]);

        let frames = presenter.frames.lock().unwrap();
        assert!(frames.len() > 10);
        let last = frames.last().unwrap();
        assert_eq!(last.progress, 1.0);
        assert_eq!(last.pointer_index, report.result.winner_index);
    }

    #[tokio::test(start_paused = true)]
    async fn ad_only_runs_on_gated_spins() {
        let ad_gate = Arc::new(CountingAdGate::default());
        let driver = driver(ad_gate.clone(), &[0.2, 0.7]);
        let presenter = RecordingPresenter::default();

        for _ in 0..5 {
            driver.on_spin_requested(&presenter).await.unwrap();
        }

        // Gated at counts 0 and 4.
        assert_eq!(ad_gate.opened.load(Ordering::SeqCst), 2);
        assert_eq!(presenter.winners.lock().unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_collaborators_do_not_block_the_spin() {
        let ad_gate = Arc::new(CountingAdGate {
            fail: true,
            ..Default::default()
        });
        let driver = driver(ad_gate.clone(), &[0.4, 0.9]);
        let presenter = RecordingPresenter {
            fail_frames: true,
            ..Default::default()
        };

        let started = Instant::now();
        let report = driver.on_spin_requested(&presenter).await.unwrap();

        // The ad delay still runs in full after the ad step fails.
        assert!(started.elapsed() >= timing().ad_delay + timing().spin_duration);
        assert_eq!(ad_gate.opened.load(Ordering::SeqCst), 1);
        assert_eq!(report.spin_number, 1);
        assert_eq!(presenter.winners.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn highlight_follows_the_names_frozen_at_admission() {
        let ad_gate = Arc::new(CountingAdGate::default());
        let driver = Arc::new(driver(ad_gate, &[0.0, 0.125]));
        let presenter = Arc::new(RecordingPresenter::default());

        // The list changes after the presenter exists but before the request.
        driver.session().lock().await.remove_participant(0).unwrap();

        let running = {
            let driver = driver.clone();
            let presenter = presenter.clone();
            tokio::spawn(async move { driver.on_spin_requested(presenter.as_ref()).await })
        };
        sleep(Duration::from_millis(500)).await;
        assert_eq!(
            driver.session().lock().await.add_participant("Erin"),
            Err(WheelError::SpinInProgress)
        );

        let report = running.await.unwrap().unwrap();
        assert_eq!(report.winner, "Bob");
        let highlighted = presenter.highlighted.lock().unwrap();
        assert_eq!(highlighted.last(), Some(&report.winner));
    }

    #[tokio::test(start_paused = true)]
    async fn request_during_the_ad_delay_is_declined() {
        let ad_gate = Arc::new(CountingAdGate::default());
        let driver = Arc::new(driver(ad_gate.clone(), &[0.0, 0.0]));

        let running = {
            let driver = driver.clone();
            tokio::spawn(async move {
                let presenter = RecordingPresenter::default();
                driver.on_spin_requested(&presenter).await
            })
        };
        sleep(Duration::from_millis(500)).await;

        let intruder = RecordingPresenter::default();
        assert_eq!(
            driver.on_spin_requested(&intruder).await,
            Err(WheelError::AlreadySpinning)
        );
        assert!(intruder.frames.lock().unwrap().is_empty());

        let report = running.await.unwrap().unwrap();
        assert_eq!(report.spin_number, 1);
        assert_eq!(ad_gate.opened.load(Ordering::SeqCst), 1);
        let state: SpinState = driver.session().lock().await.state();
        assert_eq!(state.spin_count, 1);
        assert!(!state.is_spinning);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_wheel_is_declined_without_ad() {
        let ad_gate = Arc::new(CountingAdGate::default());
        let session = WheelSession::new(
            timing().spin_duration,
            Box::new(ScriptedSource::new(&[0.0])),
            Arc::new(TokioClock::new()),
        );
        let driver = SpinDriver::new(session, ad_gate.clone(), timing());
        let presenter = RecordingPresenter::default();

        assert_eq!(
            driver.on_spin_requested(&presenter).await,
            Err(WheelError::NoParticipants)
        );
        assert_eq!(ad_gate.opened.load(Ordering::SeqCst), 0);
    }
}
