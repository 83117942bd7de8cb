//! The per-cycle worker thread.

use image::DynamicImage;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

use super::{AnalysisError, Analyzer, CycleOutcome, CycleState, Decision, PipelineOptions, UiEvent};
use crate::capture::CaptureProvider;
use crate::imaging;

pub(crate) struct CycleContext {
    pub capture: Arc<CaptureProvider>,
    pub analyzer: Arc<Analyzer>,
    pub options: PipelineOptions,
    pub ui: UiSender,
}

#[derive(Clone)]
pub(crate) struct UiSender(mpsc::UnboundedSender<UiEvent>);

impl UiSender {
    pub fn new(tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self(tx)
    }

    fn post(&self, event: UiEvent) {
        if self.0.send(event).is_err() {
            log::debug!("[PIPELINE] UI receiver gone, dropping event");
        }
    }

    fn state(&self, state: CycleState) {
        self.post(UiEvent::State(state));
    }

    fn progress(&self, percent: u8, status: &str) {
        self.post(UiEvent::Progress {
            percent,
            status: status.to_string(),
        });
    }
}

/// Sends `Finished` when the worker exits, panics included, so the UI
/// never waits forever.
struct FinishGuard(UiSender);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.post(UiEvent::Finished);
    }
}

pub(crate) fn spawn_cycle(ctx: CycleContext) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("analysis-cycle".to_string())
        .spawn(move || {
            let _finish = FinishGuard(ctx.ui.clone());

            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("[PIPELINE] Cannot build runtime: {}", e);
                    ctx.ui.state(CycleState::Failed);
                    ctx.ui.post(UiEvent::Outcome(CycleOutcome::Failed(
                        AnalysisError::Worker(e.to_string()),
                    )));
                    return;
                }
            };

            runtime.block_on(run_cycle(&ctx));
        })
}

async fn run_cycle(ctx: &CycleContext) {
    let outcome = match review_loop(ctx).await {
        Ok(Some(image)) => match analyze(ctx, image).await {
            Ok(text) => CycleOutcome::Complete(text),
            Err(e) => CycleOutcome::Failed(e),
        },
        Ok(None) => CycleOutcome::Declined,
        Err(e) => CycleOutcome::Failed(e),
    };

    let linger = match &outcome {
        CycleOutcome::Complete(_) => {
            ctx.ui.state(CycleState::Complete);
            true
        }
        CycleOutcome::Failed(e) => {
            log::error!("[PIPELINE] Cycle failed: {}", e);
            ctx.ui.state(CycleState::Failed);
            // A failed capture resets immediately.
            !matches!(e, AnalysisError::CaptureUnavailable)
        }
        CycleOutcome::Declined => {
            log::info!("[PIPELINE] Capture declined");
            false
        }
    };

    ctx.ui.post(UiEvent::Outcome(outcome));
    if linger {
        tokio::time::sleep(ctx.options.reset_delay).await;
    }
}

/// Capture and ask for approval until the user proceeds or declines.
async fn review_loop(ctx: &CycleContext) -> Result<Option<DynamicImage>, AnalysisError> {
    let mut retake = false;
    loop {
        ctx.ui.state(CycleState::Preparing);
        if retake {
            ctx.ui.progress(10, "Preparing to retake screenshot...");
            tokio::time::sleep(ctx.options.retake_delay).await;
        } else {
            ctx.ui.progress(10, "Preparing to capture screen...");
        }

        ctx.ui.post(UiEvent::HideWindow);
        tokio::time::sleep(ctx.options.settle_delay).await;

        ctx.ui.state(CycleState::Capturing);
        ctx.ui.progress(30, "Capturing screen...");
        let screen = ctx.capture.capture_full_screen().await;

        tokio::time::sleep(ctx.options.restore_delay).await;
        ctx.ui.post(UiEvent::RestoreWindow);

        let image = screen.ok_or(AnalysisError::CaptureUnavailable)?;

        ctx.ui.state(CycleState::PendingApproval);
        ctx.ui.progress(50, "Screenshot captured! Review below...");

        let (reply, decision) = oneshot::channel();
        ctx.ui.post(UiEvent::Review { image, reply });

        match decision.await {
            Ok(Decision::Proceed(image)) => return Ok(Some(image)),
            Ok(Decision::Retake) => {
                log::info!("[PIPELINE] Retake requested");
                retake = true;
            }
            // A dropped reply means the UI went away.
            Ok(Decision::Decline) | Err(_) => return Ok(None),
        }
    }
}

async fn analyze(ctx: &CycleContext, image: DynamicImage) -> Result<String, AnalysisError> {
    ctx.ui.state(CycleState::Encoding);
    ctx.ui.progress(60, "Processing image...");
    ctx.ui.progress(70, "Compressing image...");

    let upload =
        imaging::compress_for_upload(&image).map_err(|e| AnalysisError::Encoding(e.to_string()))?;
    drop(image);
    log::info!(
        "[IMAGE] Upload ready: {}x{}, {} bytes{}",
        upload.width,
        upload.height,
        upload.png.len(),
        if upload.downscaled { " (downscaled)" } else { "" }
    );

    ctx.ui.state(CycleState::Invoking);
    ctx.ui.progress(80, "Sending to AI...");
    ctx.ui.progress(90, "AI is analyzing your screen...");

    let text = ctx.analyzer.analyze(&upload).await?;

    ctx.ui.progress(100, "Analysis complete!");
    Ok(text)
}
