//! Drives a mouth renderer from a [`Schedule`] and word-boundary events.
//!
//! Each boundary event shows the word's first viseme immediately and arms
//! one timer task for the rest of the word. At most one timer task is live:
//! a new boundary, [`MouthAnimator::begin`] or [`MouthAnimator::cancel`]
//! aborts it, and a generation counter checked under the state lock makes
//! sure an aborted task that already woke up does not touch the sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{ParamsError, ParamsErrorDescription};
use crate::types::{Schedule, VisemeCode};

/// Renderer callbacks. Called with the animator's lock held, so
/// implementations must not call back into the animator.
pub trait VisemeSink: Send + Sync + 'static {
    fn on_viseme(&self, code: VisemeCode);

    /// Back to [`VisemeCode::Rest`].
    fn reset(&self);
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PlaybackParams {
    speaking_rate: f64,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self { speaking_rate: 1.0 }
    }
}

impl PlaybackParams {
    pub fn new(speaking_rate: f64) -> Result<Self, ParamsError> {
        if !speaking_rate.is_finite() || speaking_rate <= 0.0 {
            return Err(ParamsError::new(ParamsErrorDescription::InvalidSpeakingRate(speaking_rate)));
        }
        Ok(Self { speaking_rate })
    }

    pub fn speaking_rate(&self) -> f64 {
        self.speaking_rate
    }

    /// Wall-clock time for `ms` schedule milliseconds at this rate.
    pub fn scale(&self, ms: u64) -> Duration {
        Duration::from_micros((ms as f64 * 1000.0 / self.speaking_rate).round() as u64)
    }
}

struct AnimatorState {
    schedule: Arc<Schedule>,
    generation: u64,
    timers: Option<JoinHandle<()>>,
}

impl AnimatorState {
    /// Invalidates and aborts the live timer task, if any.
    fn clear_timers(&mut self) {
        self.generation += 1;
        if let Some(timers) = self.timers.take() {
            timers.abort();
        }
    }
}

pub struct MouthAnimator<S: VisemeSink> {
    sink: Arc<S>,
    params: PlaybackParams,
    runtime: Handle,
    state: Arc<Mutex<AnimatorState>>,
    switches: Arc<AtomicUsize>,
}

impl<S: VisemeSink> MouthAnimator<S> {
    pub fn new(sink: Arc<S>, params: PlaybackParams, runtime: Handle) -> Self {
        Self {
            sink,
            params,
            runtime,
            state: Arc::new(Mutex::new(AnimatorState {
                schedule: Arc::new(Schedule::new()),
                generation: 0,
                timers: None,
            })),
            switches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn params(&self) -> PlaybackParams {
        self.params
    }

    pub fn set_params(&mut self, params: PlaybackParams) {
        self.params = params;
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Starts a new utterance, dropping whatever was still pending.
    pub fn begin(&self, schedule: Schedule) {
        let mut state = self.state.lock();
        state.clear_timers();
        state.schedule = Arc::new(schedule);
        self.sink.reset();
    }

    /// Handles a boundary event for the word starting at char `offset`.
    pub fn on_word_boundary(&self, offset: usize) {
        let mut state = self.state.lock();
        state.clear_timers();
        let generation = state.generation;

        let record = match state.schedule.get(offset) {
            Some(record) if !record.visemes.is_empty() => record,
            Some(record) => {
                log::debug!("Word {:?} at {} has no visemes", record.word, offset);
                self.sink.reset();
                return;
            }
            None => {
                log::debug!("No word at offset {}, resting", offset);
                self.sink.reset();
                return;
            }
        };

        let start = Instant::now();
        self.sink.on_viseme(record.visemes[0]);
        self.switches.fetch_add(1, Ordering::Relaxed);

        // (deadline, code), None meaning rest
        let mut elapsed = 0u64;
        let mut steps: Vec<(Instant, Option<VisemeCode>)> = Vec::with_capacity(record.visemes.len());
        for (i, duration) in record.durations.iter().enumerate() {
            elapsed += *duration as u64;
            steps.push((start + self.params.scale(elapsed), record.visemes.get(i + 1).copied()));
        }

        let shared = self.state.clone();
        let sink = self.sink.clone();
        let switches = self.switches.clone();
        state.timers = Some(self.runtime.spawn(async move {
            for (deadline, code) in steps {
                tokio::time::sleep_until(deadline).await;
                let state = shared.lock();
                if state.generation != generation {
                    return;
                }
                match code {
                    Some(code) => sink.on_viseme(code),
                    None => sink.reset(),
                }
                switches.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    /// Clears every pending timer and rests the mouth.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.clear_timers();
        self.sink.reset();
    }

    /// Cancels and forgets the current schedule.
    pub fn end(&self) {
        let mut state = self.state.lock();
        state.clear_timers();
        state.schedule = Arc::new(Schedule::new());
        self.sink.reset();
    }

    pub fn is_animating(&self) -> bool {
        self.state.lock().timers.as_ref().map_or(false, |timers| !timers.is_finished())
    }

    /// Viseme changes shown so far, resets included.
    pub fn switches(&self) -> usize {
        self.switches.load(Ordering::Relaxed)
    }

    /// Emits boundary events for the current schedule on its own clock,
    /// each word starting when the previous one's visemes are used up.
    /// For callers without a speech engine to report boundaries.
    pub async fn play_through(&self) {
        let words = {
            let state = self.state.lock();
            state.schedule.iter().map(|(offset, record)| (offset, record.total_ms())).collect::<Vec<_>>()
        };

        let start = Instant::now();
        let mut elapsed = 0u64;
        for (offset, total) in words {
            tokio::time::sleep_until(start + self.params.scale(elapsed)).await;
            self.on_word_boundary(offset);
            elapsed += total;
        }
        tokio::time::sleep_until(start + self.params.scale(elapsed)).await;
        self.cancel();
    }
}

impl<S: VisemeSink> Drop for MouthAnimator<S> {
    fn drop(&mut self) {
        self.state.lock().clear_timers();
    }
}
