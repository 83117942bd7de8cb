//! The UI seam: everything the orchestrator asks of the user-facing side.
//!
//! A `Frontend` lives on the UI thread and is only ever called from it.
//! The terminal implementation is in `terminal.rs`; tests script their own.

mod terminal;

pub use terminal::{TerminalFrontend, TerminalOptions};

use image::DynamicImage;

/// The user's answer after reviewing a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    /// Send this capture for analysis.
    Proceed,
    /// Throw it away and capture again.
    Retake,
    /// Stop the cycle without analysis.
    Decline,
}

pub trait Frontend {
    /// Get our own window out of the shot.
    fn hide_window(&mut self);

    fn restore_window(&mut self);

    fn show_progress(&mut self, percent: u8, status: &str);

    /// Show the capture and wait for the user's decision.
    fn review_capture(&mut self, image: &DynamicImage) -> Approval;

    /// The "last screenshot" thumbnail of the approved capture.
    fn show_thumbnail(&mut self, thumbnail: &DynamicImage);

    /// Replace the displayed result.
    fn show_result(&mut self, text: &str);

    fn set_status(&mut self, status: &str);

    /// Back to the ready state after a cycle ends.
    fn reset(&mut self);
}
