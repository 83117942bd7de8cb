//! Screen capture domain — public API.
//!
//! This module owns all screen capture functionality. The provider is
//! chosen once at startup; callers only see `capture_full_screen()`,
//! which yields a well-formed image or nothing.

mod native;
mod screenshot;

pub use native::{NativeCommand, SCREENCAPTURE_TIMEOUT};
pub use screenshot::{capture_display, capture_targets, monitor_index, select_target, CaptureTarget};

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How the screen gets captured.
#[derive(Debug, Clone)]
pub enum CaptureProvider {
    /// OS screenshot command, optionally falling back to the capture library.
    NativeCommand {
        command: NativeCommand,
        library_fallback: bool,
    },
    /// Cross-platform capture library (`xcap`).
    Library,
    /// Decode an existing image file instead of touching the display.
    Replay(PathBuf),
}

impl CaptureProvider {
    /// `screencapture` on macOS (library as fallback), the library elsewhere.
    pub fn for_platform() -> Self {
        if cfg!(target_os = "macos") {
            CaptureProvider::NativeCommand {
                command: NativeCommand::screencapture(),
                library_fallback: true,
            }
        } else {
            CaptureProvider::Library
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CaptureProvider::NativeCommand { .. } => "native-command",
            CaptureProvider::Library => "library",
            CaptureProvider::Replay(_) => "replay",
        }
    }

    /// Capture the full screen as an RGB image.
    ///
    /// Returns `None` on any failure. A returned image always has positive
    /// width and height.
    pub async fn capture_full_screen(&self) -> Option<DynamicImage> {
        let start = Instant::now();

        let image = match self {
            CaptureProvider::NativeCommand {
                command,
                library_fallback,
            } => match command.capture().await {
                Some(image) => Some(image),
                None if *library_fallback => {
                    log::info!("[CAPTURE] Falling back to capture library");
                    capture_with_library().await
                }
                None => None,
            },
            CaptureProvider::Library => capture_with_library().await,
            CaptureProvider::Replay(path) => load_replay(path),
        };

        let image = image.and_then(well_formed);
        match &image {
            Some(img) => log::info!(
                "[CAPTURE] Screen captured ({}x{}) in {}ms via {}",
                img.width(),
                img.height(),
                start.elapsed().as_millis(),
                self.name()
            ),
            None => log::warn!("[CAPTURE] Capture via {} returned nothing", self.name()),
        }
        image
    }
}

async fn capture_with_library() -> Option<DynamicImage> {
    let result = tokio::task::spawn_blocking(capture_display)
        .await
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))
        .and_then(|r| r);

    match result {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("[CAPTURE] Capture library failed: {}", e);
            None
        }
    }
}

fn load_replay(path: &Path) -> Option<DynamicImage> {
    match image::open(path) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("[CAPTURE] Cannot load {}: {}", path.display(), e);
            None
        }
    }
}

/// Normalize to RGB and reject zero-size images.
fn well_formed(image: DynamicImage) -> Option<DynamicImage> {
    if image.width() == 0 || image.height() == 0 {
        log::warn!("[CAPTURE] Discarding zero-size capture");
        return None;
    }
    if matches!(image, DynamicImage::ImageRgb8(_)) {
        Some(image)
    } else {
        Some(DynamicImage::ImageRgb8(image.to_rgb8()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No displays found")]
    NoDisplays,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("Cannot create temp file: {0}")]
    TempFile(String),

    #[error("Capture command failed: {0}")]
    CommandFailed(String),

    #[error("Capture command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Capture command produced no output")]
    NoOutput,

    #[error("Cannot decode capture: {0}")]
    Decode(String),
}
