//! Full-screen capture using the `xcap` crate.
//!
//! This is the infrastructure layer; it talks to the OS. Target selection
//! is kept separate and pure so it can be tested without a display.

use image::DynamicImage;
use xcap::Monitor;

use super::CaptureError;

/// One entry in the capture target list: the aggregate first, then each display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// The whole virtual desktop. Only chosen when no display is listed.
    AllDisplays,
    Display { index: usize, primary: bool },
}

/// Build the target list from each monitor's primary flag.
pub fn capture_targets(primary_flags: &[bool]) -> Vec<CaptureTarget> {
    std::iter::once(CaptureTarget::AllDisplays)
        .chain(
            primary_flags
                .iter()
                .enumerate()
                .map(|(index, &primary)| CaptureTarget::Display { index, primary }),
        )
        .collect()
}

/// Prefer the primary display, then the first concrete display, then the aggregate.
///
/// Taking the primary over list order mirrors "capture the primary monitor";
/// on single-display machines both rules pick the same entry.
pub fn select_target(targets: &[CaptureTarget]) -> Option<CaptureTarget> {
    let concrete = || {
        targets
            .iter()
            .filter(|t| matches!(t, CaptureTarget::Display { .. }))
    };

    concrete()
        .find(|t| matches!(t, CaptureTarget::Display { primary: true, .. }))
        .or_else(|| concrete().next())
        .or_else(|| targets.first())
        .copied()
}

/// Monitor index to capture for the selected target.
///
/// The aggregate is only selected when no display is listed, so it has
/// nothing to capture.
pub fn monitor_index(target: Option<CaptureTarget>) -> Result<usize, CaptureError> {
    match target {
        Some(CaptureTarget::Display { index, .. }) => Ok(index),
        Some(CaptureTarget::AllDisplays) | None => Err(CaptureError::NoDisplays),
    }
}

/// Captures the selected display as an RGB `DynamicImage`.
pub fn capture_display() -> Result<DynamicImage, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;
    log::info!(
        "[CAPTURE] Available monitors: {} (plus 'all displays')",
        monitors.len()
    );

    let flags: Vec<bool> = monitors
        .iter()
        .map(|m| m.is_primary().unwrap_or(false))
        .collect();
    let index = monitor_index(select_target(&capture_targets(&flags)))?;

    let raw = monitors[index]
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(raw).to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_list_puts_aggregate_first() {
        let targets = capture_targets(&[false, true]);
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0], CaptureTarget::AllDisplays);
        assert_eq!(targets[2], CaptureTarget::Display { index: 1, primary: true });
    }

    #[test]
    fn prefers_primary_display() {
        let targets = capture_targets(&[false, true, false]);
        assert_eq!(
            select_target(&targets),
            Some(CaptureTarget::Display { index: 1, primary: true })
        );
    }

    #[test]
    fn falls_back_to_first_display_without_primary() {
        let targets = capture_targets(&[false, false]);
        assert_eq!(
            select_target(&targets),
            Some(CaptureTarget::Display { index: 0, primary: false })
        );
    }

    #[test]
    fn aggregate_only_when_no_display_listed() {
        let targets = capture_targets(&[]);
        assert_eq!(select_target(&targets), Some(CaptureTarget::AllDisplays));
        assert_eq!(select_target(&[]), None);
    }

    #[test]
    fn every_monitor_layout_selects_a_concrete_display() {
        for count in 1..=4 {
            for primary in 0..=count {
                // `primary == count` means no monitor reports itself primary.
                let flags: Vec<bool> = (0..count).map(|i| i == primary).collect();
                let index = monitor_index(select_target(&capture_targets(&flags))).unwrap();
                let expected = if primary < count { primary } else { 0 };
                assert_eq!(index, expected, "{} monitors, primary {}", count, primary);
            }
        }
    }

    #[test]
    fn no_monitors_is_no_displays() {
        let result = monitor_index(select_target(&capture_targets(&[])));
        assert!(matches!(result, Err(CaptureError::NoDisplays)));
        assert!(matches!(monitor_index(None), Err(CaptureError::NoDisplays)));
    }
}
