//! Randomized blink timer.
//!
//! The eyes sit open for a random dwell, close for a fixed window, then
//! re-arm. [`BlinkCycle`] is the timing core and knows nothing about
//! threads, so it can be driven by a simulated clock. [`BlinkScheduler`]
//! runs a cycle on its own thread and publishes the phase through an
//! atomic flag that the frame loop reads without waiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use crossbeam::channel::{self, RecvTimeoutError, Sender};
use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::BlinkTiming;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkPhase {
    Open,
    Closed,
}

/// A phase just entered and how long it lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlinkStep {
    pub phase: BlinkPhase,
    pub dwell: Duration,
}

pub struct BlinkCycle {
    rng: StdRng,
    timing: BlinkTiming,
    phase: BlinkPhase,
}

impl BlinkCycle {
    pub fn new(timing: BlinkTiming, rng: StdRng) -> Self {
        Self {
            rng,
            timing,
            phase: BlinkPhase::Open,
        }
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    /// Enter the open phase and arm the first dwell.
    pub fn start(&mut self) -> BlinkStep {
        self.phase = BlinkPhase::Open;
        self.step()
    }

    /// Flip to the other phase and arm its dwell.
    pub fn advance(&mut self) -> BlinkStep {
        self.phase = match self.phase {
            BlinkPhase::Open => BlinkPhase::Closed,
            BlinkPhase::Closed => BlinkPhase::Open,
        };
        self.step()
    }

    fn step(&mut self) -> BlinkStep {
        let dwell = match self.phase {
            BlinkPhase::Open => {
                let lo = self.timing.open_min.as_millis() as u64;
                let hi = (self.timing.open_max.as_millis() as u64).max(lo.saturating_add(1));
                if hi > lo {
                    Duration::from_millis(self.rng.gen_range(lo..hi))
                } else {
                    Duration::from_millis(lo)
                }
            }
            BlinkPhase::Closed => self.timing.closed,
        };
        BlinkStep {
            phase: self.phase,
            dwell,
        }
    }
}

/// Read side of the blink flag. `true` while the eyes are shut.
#[derive(Clone, Debug, Default)]
pub struct BlinkState(Arc<AtomicBool>);

impl BlinkState {
    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, closed: bool) {
        self.0.store(closed, Ordering::Release);
    }
}

/// Owned handle to the blink thread. Dropping it cancels the chain.
pub struct BlinkScheduler {
    state: BlinkState,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl BlinkScheduler {
    pub fn start(timing: BlinkTiming, seed: Option<u64>) -> anyhow::Result<Self> {
        Self::start_with_state(timing, seed, BlinkState::default())
    }

    /// Run a new chain that publishes into an existing flag, so handles
    /// taken from an earlier scheduler keep tracking the eyes.
    pub fn start_with_state(
        timing: BlinkTiming,
        seed: Option<u64>,
        state: BlinkState,
    ) -> anyhow::Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        debug!("Spawning blink scheduler: {timing:?}");
        let handle = {
            let state = state.clone();
            thread::Builder::new()
                .name("blink-scheduler".into())
                .spawn(move || {
                    debug!("Blink scheduler started");
                    let mut cycle = BlinkCycle::new(timing, rng);
                    let mut step = cycle.start();
                    loop {
                        state.set(step.phase == BlinkPhase::Closed);
                        trace!("Blink {:?} for {:?}", step.phase, step.dwell);

                        // A suspended host just wakes late; there is no catch-up
                        match stop_rx.recv_timeout(step.dwell) {
                            Err(RecvTimeoutError::Timeout) => step = cycle.advance(),
                            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                    state.set(false);
                    debug!("Blink scheduler shutting down");
                })
                .context("failed to spawn blink scheduler thread")?
        };

        Ok(Self {
            state,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn state(&self) -> BlinkState {
        self.state.clone()
    }

    pub fn is_blinking(&self) -> bool {
        self.state.is_closed()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Cancel the pending timer and wait for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Blink scheduler thread panicked");
            }
            info!("Blink scheduler stopped");
        }
    }
}

impl Drop for BlinkScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn cycle(seed: u64) -> BlinkCycle {
        BlinkCycle::new(BlinkTiming::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn simulated_clock_keeps_dwells_in_range() {
        let mut cycle = cycle(11);
        let mut now = Duration::ZERO;
        let mut closed_at = Vec::new();
        let mut step = cycle.start();

        for _ in 0..2_000 {
            match step.phase {
                BlinkPhase::Open => {
                    assert!(step.dwell >= Duration::from_millis(2000));
                    assert!(step.dwell < Duration::from_millis(5000));
                }
                BlinkPhase::Closed => {
                    assert_eq!(step.dwell, Duration::from_millis(150));
                    closed_at.push(now);
                }
            }
            now += step.dwell;
            step = cycle.advance();
        }

        assert_eq!(closed_at.len(), 1_000);
        // Consecutive blinks are separated by one closed window plus an open dwell
        for pair in closed_at.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_millis(2150), "gap {gap:?}");
            assert!(gap < Duration::from_millis(5150), "gap {gap:?}");
        }
    }

    #[test]
    fn phases_strictly_alternate() {
        let mut cycle = cycle(2);
        let mut previous = cycle.start().phase;
        assert_eq!(previous, BlinkPhase::Open);
        for _ in 0..100 {
            let next = cycle.advance().phase;
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn open_dwells_are_spread_across_range() {
        let mut cycle = cycle(5);
        let dwells: Vec<Duration> = (0..500)
            .map(|_| {
                let open = cycle.start().dwell;
                cycle.advance();
                open
            })
            .collect();
        assert!(dwells.iter().any(|d| *d < Duration::from_millis(2500)));
        assert!(dwells.iter().any(|d| *d > Duration::from_millis(4500)));
    }

    #[test]
    fn stop_cancels_pending_timer_promptly() {
        let mut scheduler = BlinkScheduler::start(BlinkTiming::default(), Some(1)).unwrap();
        assert!(scheduler.is_running());
        assert!(!scheduler.is_blinking());

        let started = Instant::now();
        scheduler.stop();
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(!scheduler.is_running());
        assert!(!scheduler.state().is_closed());
    }

    #[test]
    fn saturates_instead_of_overflowing_open_range() {
        let timing = BlinkTiming {
            open_min: Duration::from_millis(u64::MAX),
            open_max: Duration::from_millis(u64::MAX),
            closed: Duration::from_millis(150),
        };
        let mut cycle = BlinkCycle::new(timing, StdRng::seed_from_u64(4));
        let step = cycle.start();
        assert_eq!(step.phase, BlinkPhase::Open);
        assert_eq!(step.dwell, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn restarted_chain_writes_into_shared_flag() {
        let mut first = BlinkScheduler::start(BlinkTiming::default(), Some(3)).unwrap();
        let handle = first.state();
        first.stop();

        let fast = BlinkTiming {
            open_min: Duration::from_millis(1),
            open_max: Duration::from_millis(3),
            closed: Duration::from_millis(40),
        };
        let second = BlinkScheduler::start_with_state(fast, Some(3), handle.clone()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut saw_closed = false;
        while Instant::now() < deadline && !saw_closed {
            saw_closed = handle.is_closed();
            thread::sleep(Duration::from_millis(1));
        }
        assert!(saw_closed, "old handle never saw the new chain blink");
        drop(second);
        assert!(!handle.is_closed());
    }

    #[test]
    fn thread_publishes_closed_phase() {
        let timing = BlinkTiming {
            open_min: Duration::from_millis(1),
            open_max: Duration::from_millis(3),
            closed: Duration::from_millis(40),
        };
        let scheduler = BlinkScheduler::start(timing, Some(9)).unwrap();
        let state = scheduler.state();

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut saw_closed = false;
        while Instant::now() < deadline && !saw_closed {
            saw_closed = state.is_closed();
            thread::sleep(Duration::from_millis(1));
        }
        assert!(saw_closed, "blink never observed");
        drop(scheduler);
        assert!(!state.is_closed());
    }
}
