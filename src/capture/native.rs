//! Capture via the OS screenshot command (`screencapture` on macOS).
//!
//! The command writes a PNG into a scoped temp file which is decoded and
//! then removed. `NamedTempFile` deletes on drop, so every exit path
//! (non-zero exit, timeout, decode error) cleans up.

use image::DynamicImage;
use std::process::Stdio;
use std::time::Duration;

use super::CaptureError;

pub const SCREENCAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// An external command that writes a screenshot to the path given as its last argument.
#[derive(Debug, Clone)]
pub struct NativeCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl NativeCommand {
    /// `screencapture -x -t png <path>`: no shutter sound, PNG output.
    pub fn screencapture() -> Self {
        Self {
            program: "screencapture".to_string(),
            args: vec!["-x".to_string(), "-t".to_string(), "png".to_string()],
            timeout: SCREENCAPTURE_TIMEOUT,
        }
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Run the command and decode its output. `None` on any failure.
    pub async fn capture(&self) -> Option<DynamicImage> {
        match self.try_capture().await {
            Ok(image) => {
                log::info!(
                    "[CAPTURE] {} captured {}x{}",
                    self.program,
                    image.width(),
                    image.height()
                );
                Some(image)
            }
            Err(e) => {
                log::warn!("[CAPTURE] {} failed: {}", self.program, e);
                None
            }
        }
    }

    pub async fn try_capture(&self) -> Result<DynamicImage, CaptureError> {
        let temp = tempfile::Builder::new()
            .prefix("screen-assist-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| CaptureError::TempFile(e.to_string()))?;
        let path = temp.path();

        log::debug!(
            "[CAPTURE] Running: {} {} {}",
            self.program,
            self.args.join(" "),
            path.display()
        );

        let child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::CommandFailed(format!("{}: {}", self.program, e)))?;

        // Dropping the timed-out future drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CaptureError::Timeout(self.timeout))?
            .map_err(|e| CaptureError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let size = std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|_| CaptureError::NoOutput)?;
        if size == 0 {
            return Err(CaptureError::NoOutput);
        }

        image::open(path).map_err(|e| CaptureError::Decode(e.to_string()))
    }
}
