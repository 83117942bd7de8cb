//! The analysis cycle: capture, approval, encoding, model call, display.
//!
//! The `Orchestrator` lives on the UI thread. Each cycle runs on one worker
//! thread that owns a small tokio runtime; it talks back through an
//! unbounded channel of `UiEvent`s and waits on a oneshot for the user's
//! review decision. Only the UI thread touches the `Frontend`.

mod analyzer;
mod orchestrator;
mod worker;

pub use analyzer::Analyzer;
pub use orchestrator::Orchestrator;

use image::DynamicImage;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Preparing,
    Capturing,
    PendingApproval,
    Encoding,
    Invoking,
    Complete,
    Failed,
}

/// Worker → UI thread.
#[derive(Debug)]
pub enum UiEvent {
    State(CycleState),
    Progress { percent: u8, status: String },
    HideWindow,
    RestoreWindow,
    Review {
        image: DynamicImage,
        reply: oneshot::Sender<Decision>,
    },
    Outcome(CycleOutcome),
    /// Last event of every cycle.
    Finished,
}

/// UI thread → worker, in answer to `UiEvent::Review`.
#[derive(Debug)]
pub enum Decision {
    Proceed(DynamicImage),
    Retake,
    Decline,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Complete(String),
    Failed(AnalysisError),
    Declined,
}

/// Pauses around the capture. Zero everywhere for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Wait after hiding the window before capturing.
    pub settle_delay: Duration,
    /// Wait after capturing before showing the window again.
    pub restore_delay: Duration,
    pub retake_delay: Duration,
    /// How long Complete/Failed stay on screen before returning to Idle.
    pub reset_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            restore_delay: Duration::from_millis(500),
            retake_delay: Duration::from_millis(500),
            reset_delay: Duration::from_secs(1),
        }
    }
}

impl PipelineOptions {
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            restore_delay: Duration::ZERO,
            retake_delay: Duration::ZERO,
            reset_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Screenshot failed")]
    CaptureUnavailable,

    #[error("Image encoding failed: {0}")]
    Encoding(String),

    #[error("{0}")]
    Network(String),

    #[error("Unexpected model response: {0}")]
    ResponseParse(String),

    #[error("Cannot start analysis worker: {0}")]
    Worker(String),
}
