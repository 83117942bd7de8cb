//! Offline stand-in for the model. No credentials, no network.

use std::time::Duration;

/// Simulated round-trip latency, so the progress flow looks like a real call.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    pub delay: Duration,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self {
            delay: DEFAULT_MOCK_DELAY,
        }
    }
}

impl MockAnalyzer {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// Canned analysis for a capture of the given resolution.
    pub fn respond(&self, width: u32, height: u32) -> String {
        let now = chrono::Local::now();
        format!(
            "I can see your screen capture (resolution: {}x{}).\n\n\
             Based on what I see, here's how I can help:\n\n\
             1. You appear to be working on a project with a desktop application open.\n\
             2. I could help you tidy up the code structure or suggest UI improvements.\n\
             3. Consider adding error handling for edge cases and clearer feedback while operations are in progress.\n\n\
             The current time is {} and I notice you're testing an AI screen assistant.",
            width,
            height,
            now.format("%H:%M:%S")
        )
    }
}
