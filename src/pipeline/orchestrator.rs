//! UI-thread side of the analysis cycle.

use image::DynamicImage;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

use super::worker::{spawn_cycle, CycleContext, UiSender};
use super::{AnalysisError, Analyzer, CycleOutcome, CycleState, Decision, PipelineOptions, UiEvent};
use crate::capture::CaptureProvider;
use crate::frontend::{Approval, Frontend};
use crate::imaging::{fit_within, THUMBNAIL_MAX};

pub struct Orchestrator {
    capture: Arc<CaptureProvider>,
    analyzer: Arc<Analyzer>,
    options: PipelineOptions,
    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    state: CycleState,
    busy: bool,
    /// Last approved capture; overwritten every cycle.
    current_screenshot: Option<DynamicImage>,
    current_thumbnail: Option<DynamicImage>,
    last_result: Option<String>,
    pending_outcome: Option<CycleOutcome>,
    worker: Option<JoinHandle<()>>,
}

impl Orchestrator {
    pub fn new(capture: CaptureProvider, analyzer: Analyzer, options: PipelineOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            capture: Arc::new(capture),
            analyzer: Arc::new(analyzer),
            options,
            events_tx,
            events_rx,
            state: CycleState::Idle,
            busy: false,
            current_screenshot: None,
            current_thumbnail: None,
            last_result: None,
            pending_outcome: None,
            worker: None,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn current_screenshot(&self) -> Option<&DynamicImage> {
        self.current_screenshot.as_ref()
    }

    pub fn current_thumbnail(&self) -> Option<&DynamicImage> {
        self.current_thumbnail.as_ref()
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    /// Start a cycle. Returns `false` if one is already running.
    pub fn trigger(&mut self, frontend: &mut dyn Frontend) -> bool {
        if self.busy {
            log::debug!("[PIPELINE] Trigger ignored, cycle in progress ({:?})", self.state);
            return false;
        }

        log::info!(
            "[PIPELINE] Starting cycle (capture: {}, analyzer: {})",
            self.capture.name(),
            self.analyzer.name()
        );

        let ctx = CycleContext {
            capture: Arc::clone(&self.capture),
            analyzer: Arc::clone(&self.analyzer),
            options: self.options,
            ui: UiSender::new(self.events_tx.clone()),
        };

        match spawn_cycle(ctx) {
            Ok(handle) => {
                self.busy = true;
                self.worker = Some(handle);
                frontend.set_status("Capturing screen...");
                true
            }
            Err(e) => {
                log::error!("[PIPELINE] Cannot spawn worker: {}", e);
                frontend.set_status(&format!("Error: {}", AnalysisError::Worker(e.to_string())));
                false
            }
        }
    }

    /// Trigger and pump events until the cycle ends.
    pub fn run_cycle(&mut self, frontend: &mut dyn Frontend) -> Option<CycleOutcome> {
        if !self.trigger(frontend) {
            return None;
        }
        self.wait_until_idle(frontend)
    }

    /// Block the calling thread, dispatching events to `frontend`, until
    /// the running cycle has finished.
    pub fn wait_until_idle(&mut self, frontend: &mut dyn Frontend) -> Option<CycleOutcome> {
        let mut outcome = None;
        while self.busy {
            // Never `None`: we hold a sender ourselves.
            let Some(event) = self.events_rx.blocking_recv() else {
                break;
            };
            if let Some(done) = self.handle_event(event, frontend) {
                outcome = Some(done);
            }
        }
        outcome
    }

    /// Apply one worker event. Returns the outcome once the cycle has finished.
    pub fn handle_event(
        &mut self,
        event: UiEvent,
        frontend: &mut dyn Frontend,
    ) -> Option<CycleOutcome> {
        match event {
            UiEvent::State(state) => {
                log::debug!("[PIPELINE] {:?} -> {:?}", self.state, state);
                self.state = state;
            }
            UiEvent::Progress { percent, status } => frontend.show_progress(percent, &status),
            UiEvent::HideWindow => frontend.hide_window(),
            UiEvent::RestoreWindow => frontend.restore_window(),
            UiEvent::Review { image, reply } => {
                let decision = match frontend.review_capture(&image) {
                    Approval::Proceed => {
                        let thumbnail = fit_within(&image, THUMBNAIL_MAX);
                        frontend.show_thumbnail(&thumbnail);
                        self.current_thumbnail = Some(thumbnail);
                        self.current_screenshot = Some(image.clone());
                        Decision::Proceed(image)
                    }
                    Approval::Retake => Decision::Retake,
                    Approval::Decline => Decision::Decline,
                };
                if reply.send(decision).is_err() {
                    log::warn!("[PIPELINE] Worker stopped before the review was answered");
                }
            }
            UiEvent::Outcome(outcome) => {
                self.present(&outcome, frontend);
                self.pending_outcome = Some(outcome);
            }
            UiEvent::Finished => {
                if let Some(handle) = self.worker.take() {
                    if handle.join().is_err() {
                        log::error!("[PIPELINE] Worker panicked");
                    }
                }
                self.busy = false;
                self.state = CycleState::Idle;
                frontend.reset();
                log::info!("[PIPELINE] Ready");
                return self.pending_outcome.take();
            }
        }
        None
    }

    fn present(&mut self, outcome: &CycleOutcome, frontend: &mut dyn Frontend) {
        match outcome {
            CycleOutcome::Complete(text) => {
                self.last_result = Some(text.clone());
                frontend.show_result(text);
                frontend.set_status("Analysis complete!");
            }
            CycleOutcome::Failed(AnalysisError::CaptureUnavailable) => {
                frontend.set_status(&AnalysisError::CaptureUnavailable.to_string());
            }
            CycleOutcome::Failed(e) => {
                let message = format!("An error occurred: {}", e);
                frontend.show_result(&message);
                self.last_result = Some(message);
                frontend.set_status(&format!("Error: {}", e));
            }
            CycleOutcome::Declined => frontend.set_status("Analysis cancelled"),
        }
    }
}
