//! The cutting station — interactive timing-based cutting sessions.
//!
//! One station drives at most one session at a time. The host game loop
//! calls [`CuttingStation::update`] every tick to advance the oscillating
//! cut marker and the prepare/success timers, and forwards abstract
//! "cut triggered" input events to [`CuttingStation::trigger_cut`]. The
//! session must hit every layer boundary in sequence: a single miss
//! destroys the sample; hitting all of them decomposes it into
//! single-layer artifacts.
//!
//! Everything is cooperative and single-threaded. The pauses between cuts
//! are countdown timers, not blocking waits, and [`CuttingStation::stop`]
//! cancels them immediately.

use crate::decomposer::{ArtifactCollector, SampleDecomposer};
use crate::events::SessionEvent;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use stratacut_logic::boundary::{analyze, SampleAnalysis};
use stratacut_logic::sample::LayeredSample;

/// Session lifecycle.
///
/// `Idle → Preparing → Cutting → {Success → Cutting | Failed} → Completed`.
/// `Success` is the transient pause after a hit; `Failed` and `Completed`
/// are terminal until the next `start` or `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Preparing,
    Cutting,
    Success,
    Failed,
    Completed,
}

/// Which way the cut marker is sweeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerDirection {
    Forward,
    Backward,
}

/// Session timing parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Marker sweep speed in normalized sample lengths per second.
    pub marker_speed: f32,
    /// Analysis delay before the first cut, in seconds.
    pub prepare_delay: f32,
    /// Pause after a successful cut before the next boundary, in seconds.
    pub success_pause: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            marker_speed: 0.5,
            prepare_delay: 1.0,
            success_pause: 1.0,
        }
    }
}

/// Why `start` rejected a sample. The sample is handed back untouched.
#[derive(Debug)]
pub enum StartError {
    /// A session is already preparing, cutting, or pausing. The active
    /// session is left unchanged.
    Busy(LayeredSample),
    /// Fewer than two valid layers; no session was created.
    NotCuttable(LayeredSample),
}

/// Per-session bookkeeping of cut outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingRecord {
    pub sample_id: String,
    /// Layer count of the source sample.
    pub total_layers: usize,
    pub successful_cuts: usize,
    pub failed_cuts: usize,
}

impl CuttingRecord {
    fn new(sample_id: &str, total_layers: usize) -> Self {
        Self {
            sample_id: sample_id.to_string(),
            total_layers,
            successful_cuts: 0,
            failed_cuts: 0,
        }
    }

    /// All boundaries hit, nothing missed.
    pub fn is_complete_success(&self) -> bool {
        self.failed_cuts == 0 && self.successful_cuts == self.total_layers.saturating_sub(1)
    }

    pub fn success_rate(&self) -> f32 {
        let attempts = self.successful_cuts + self.failed_cuts;
        if attempts == 0 {
            0.0
        } else {
            self.successful_cuts as f32 / attempts as f32
        }
    }
}

/// The interactive cutting station.
///
/// Owns the sample for the session's lifetime: moved in on [`start`],
/// moved back out by [`stop`], dropped on a miss, consumed by
/// decomposition on full success.
///
/// [`start`]: CuttingStation::start
/// [`stop`]: CuttingStation::stop
pub struct CuttingStation {
    decomposer: SampleDecomposer,
    config: SessionConfig,
    state: SessionState,
    sample: Option<LayeredSample>,
    analysis: Option<SampleAnalysis>,
    current_boundary: usize,
    marker: f32,
    direction: MarkerDirection,
    /// Remaining prepare/success pause time, in seconds.
    timer: f32,
    record: Option<CuttingRecord>,
    events: VecDeque<SessionEvent>,
}

impl CuttingStation {
    pub fn new(decomposer: SampleDecomposer) -> Self {
        Self::with_config(decomposer, SessionConfig::default())
    }

    pub fn with_config(decomposer: SampleDecomposer, config: SessionConfig) -> Self {
        Self {
            decomposer,
            config,
            state: SessionState::Idle,
            sample: None,
            analysis: None,
            current_boundary: 0,
            marker: 0.0,
            direction: MarkerDirection::Forward,
            timer: 0.0,
            record: None,
            events: VecDeque::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Normalized marker position in [0, 1].
    pub fn marker_position(&self) -> f32 {
        self.marker
    }

    pub fn direction(&self) -> MarkerDirection {
        self.direction
    }

    /// Index of the boundary the session is currently cutting.
    pub fn current_boundary(&self) -> usize {
        self.current_boundary
    }

    /// Analysis of the loaded sample, while a session holds one.
    pub fn analysis(&self) -> Option<&SampleAnalysis> {
        self.analysis.as_ref()
    }

    /// Outcome bookkeeping for the current or most recent session.
    pub fn record(&self) -> Option<&CuttingRecord> {
        self.record.as_ref()
    }

    /// Whether a session is live (preparing, cutting, or pausing).
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            SessionState::Preparing | SessionState::Cutting | SessionState::Success
        )
    }

    /// Drain queued outbound events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    /// Start a cutting session for `sample`.
    ///
    /// Rejected with [`StartError::Busy`] while a session is live (the
    /// active session is untouched) and [`StartError::NotCuttable`] when
    /// the sample has fewer than two valid layers. Either way the sample
    /// is returned to the caller. On success the station takes ownership
    /// and enters `Preparing`.
    pub fn start(&mut self, sample: LayeredSample) -> Result<(), StartError> {
        if self.is_busy() {
            log::warn!(
                "Cutting station busy, rejecting sample '{}' (state {:?})",
                sample.id,
                self.state
            );
            return Err(StartError::Busy(sample));
        }

        let analysis = match analyze(&sample) {
            Ok(a) => a,
            Err(e) => {
                log::info!(
                    "Sample '{}' not cuttable: {} valid layers",
                    sample.id,
                    e.valid_layers
                );
                return Err(StartError::NotCuttable(sample));
            }
        };

        log::info!(
            "Starting cutting session for sample '{}': {} layers, {} boundaries",
            sample.id,
            analysis.layers.len(),
            analysis.boundaries.len()
        );

        self.record = Some(CuttingRecord::new(&sample.id, analysis.layers.len()));
        self.sample = Some(sample);
        self.analysis = Some(analysis);
        self.current_boundary = 0;
        self.enter_preparing();
        Ok(())
    }

    /// Advance timers and the marker by `dt` seconds.
    ///
    /// Marker motion runs continuously while cutting, independent of
    /// trigger events: sweep forward to 1.0, clamp and flip, sweep back
    /// to 0.0, clamp and flip.
    pub fn update(&mut self, dt: f32) {
        match self.state {
            SessionState::Preparing | SessionState::Success => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.enter_cutting();
                }
            }
            SessionState::Cutting => match self.direction {
                MarkerDirection::Forward => {
                    self.marker += self.config.marker_speed * dt;
                    if self.marker >= 1.0 {
                        self.marker = 1.0;
                        self.direction = MarkerDirection::Backward;
                    }
                }
                MarkerDirection::Backward => {
                    self.marker -= self.config.marker_speed * dt;
                    if self.marker <= 0.0 {
                        self.marker = 0.0;
                        self.direction = MarkerDirection::Forward;
                    }
                }
            },
            SessionState::Idle | SessionState::Failed | SessionState::Completed => {}
        }
    }

    /// Handle an abstract "cut triggered" input event.
    ///
    /// Only honored while `Cutting`; triggers during pauses or terminal
    /// states are ignored. A hit inside the current boundary's success
    /// zone (inclusive on both ends) advances the session; a miss fails
    /// it and destroys the sample.
    pub fn trigger_cut(&mut self, collector: &mut dyn ArtifactCollector) {
        if self.state != SessionState::Cutting {
            log::debug!("Cut trigger ignored in state {:?}", self.state);
            return;
        }
        let Some(analysis) = self.analysis.as_ref() else {
            debug_assert!(false, "cutting without an analysis");
            return;
        };
        // Unreachable under the data-model invariants
        let Some(boundary) = analysis.boundaries.get(self.current_boundary).copied() else {
            debug_assert!(false, "boundary index {} out of range", self.current_boundary);
            return;
        };

        let lo = boundary.position - boundary.tolerance_half_width;
        let hi = boundary.position + boundary.tolerance_half_width;
        let hit = self.marker >= lo && self.marker <= hi;

        log::debug!(
            "Cut at {:.4} vs zone [{:.4}, {:.4}]: {}",
            self.marker,
            lo,
            hi,
            if hit { "hit" } else { "miss" }
        );

        if hit {
            self.handle_hit(collector);
        } else {
            self.handle_miss();
        }
    }

    /// Cancel the session and hand the sample back, if one is loaded.
    ///
    /// Forces `Idle` from any state, discarding boundary progress without
    /// emitting artifacts and without destroying the sample, unlike a
    /// miss. No-op when already idle.
    pub fn stop(&mut self) -> Option<LayeredSample> {
        if self.state == SessionState::Idle {
            return None;
        }
        log::info!("Cutting session stopped from state {:?}", self.state);
        self.state = SessionState::Idle;
        self.analysis = None;
        self.record = None;
        self.current_boundary = 0;
        self.marker = 0.0;
        self.direction = MarkerDirection::Forward;
        self.timer = 0.0;
        self.sample.take()
    }

    fn enter_preparing(&mut self) {
        if self.config.prepare_delay > 0.0 {
            self.state = SessionState::Preparing;
            self.timer = self.config.prepare_delay;
        } else {
            self.enter_cutting();
        }
    }

    fn enter_cutting(&mut self) {
        self.state = SessionState::Cutting;
        self.marker = 0.0;
        self.direction = MarkerDirection::Forward;
        self.timer = 0.0;
    }

    fn handle_hit(&mut self, collector: &mut dyn ArtifactCollector) {
        if let Some(record) = self.record.as_mut() {
            record.successful_cuts += 1;
        }
        let index = self.current_boundary;
        self.events.push_back(SessionEvent::BoundaryAdvanced { index });

        let boundary_count = self
            .analysis
            .as_ref()
            .map(|a| a.boundaries.len())
            .unwrap_or(0);

        if index + 1 >= boundary_count {
            self.complete_session(collector);
        } else {
            self.current_boundary = index + 1;
            if self.config.success_pause > 0.0 {
                self.state = SessionState::Success;
                self.timer = self.config.success_pause;
            } else {
                self.enter_cutting();
            }
        }
    }

    fn handle_miss(&mut self) {
        self.state = SessionState::Failed;
        self.analysis = None;
        // A miss destroys the source sample; nothing is salvaged.
        if let Some(record) = self.record.as_mut() {
            record.failed_cuts += 1;
        }
        if let Some(sample) = self.sample.take() {
            log::info!("Cut missed, sample '{}' destroyed", sample.id);
            self.events.push_back(SessionEvent::SessionFailed {
                sample_id: sample.id,
            });
        }
    }

    fn complete_session(&mut self, collector: &mut dyn ArtifactCollector) {
        self.state = SessionState::Completed;
        let (Some(sample), Some(analysis)) = (self.sample.take(), self.analysis.take()) else {
            debug_assert!(false, "completing a session without a sample");
            return;
        };

        // Ownership of the sample ends here: it is consumed into artifacts.
        let artifacts = self.decomposer.decompose(&sample.id, &analysis);
        for artifact in &artifacts {
            collector.collect(artifact.clone());
        }
        self.events.push_back(SessionEvent::SessionCompleted {
            sample_id: sample.id,
            artifacts,
        });
    }
}
