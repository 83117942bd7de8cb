//! Capture diagnostics. Is screen capture working, and does it see anything?
//!
//! macOS silently hands back a wallpaper-only image when the process lacks
//! Screen Recording permission, so besides success/failure we look at how
//! many distinct colors the capture has.

use image::DynamicImage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::capture::{capture_display, NativeCommand};

pub const SCREEN_RECORDING_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_ScreenCapture";

/// Stop counting once this many distinct colors have been seen.
pub const COLOR_COUNT_CAP: usize = 100;

/// Fewer distinct colors than this looks like a blank desktop.
pub const BLANK_COLOR_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct DoctorOptions {
    pub open_settings: bool,
    pub save: Option<PathBuf>,
}

#[derive(Debug)]
pub struct MethodReport {
    pub method: &'static str,
    pub outcome: Result<CaptureSummary, String>,
}

#[derive(Debug, Clone, Copy)]
pub struct CaptureSummary {
    pub width: u32,
    pub height: u32,
    pub unique_colors: usize,
    pub elapsed_ms: u128,
}

impl CaptureSummary {
    pub fn looks_blank(&self) -> bool {
        self.unique_colors < BLANK_COLOR_THRESHOLD
    }
}

#[derive(Debug)]
pub struct DoctorReport {
    pub platform: &'static str,
    pub screencapture_available: Option<bool>,
    pub monitor_count: Result<usize, String>,
    pub methods: Vec<MethodReport>,
    pub saved_to: Option<PathBuf>,
}

impl DoctorReport {
    /// At least one method produced a non-blank capture.
    pub fn healthy(&self) -> bool {
        self.methods
            .iter()
            .any(|m| matches!(&m.outcome, Ok(s) if !s.looks_blank()))
    }

    pub fn print(&self) {
        println!("Screen capture diagnostics");
        println!("  platform: {}", self.platform);
        if let Some(available) = self.screencapture_available {
            println!(
                "  screencapture: {}",
                if available { "found" } else { "not found" }
            );
        }
        match &self.monitor_count {
            Ok(n) => println!("  monitors: {}", n),
            Err(e) => println!("  monitors: unavailable ({})", e),
        }

        for method in &self.methods {
            match &method.outcome {
                Ok(s) => {
                    println!(
                        "  [{}] ok: {}x{} in {}ms, {}{} unique colors",
                        method.method,
                        s.width,
                        s.height,
                        s.elapsed_ms,
                        if s.unique_colors >= COLOR_COUNT_CAP { ">=" } else { "" },
                        s.unique_colors
                    );
                    if s.looks_blank() {
                        println!(
                            "  [{}] warning: capture may be a blank desktop or permission was denied",
                            method.method
                        );
                    }
                }
                Err(e) => println!("  [{}] failed: {}", method.method, e),
            }
        }

        if let Some(path) = &self.saved_to {
            println!("  test capture saved to {}", path.display());
        }

        if !self.healthy() && cfg!(target_os = "macos") {
            println!();
            println!("Grant Screen Recording permission to your terminal:");
            println!("  System Settings > Privacy & Security > Screen Recording");
            println!("  (run `screen-assist doctor --open-settings` to jump there)");
        }
    }
}

/// Count distinct RGB colors, stopping at `cap`.
pub fn count_unique_colors(image: &DynamicImage, cap: usize) -> usize {
    let rgb = image.to_rgb8();
    let mut seen = HashSet::with_capacity(cap);
    for pixel in rgb.pixels() {
        seen.insert(pixel.0);
        if seen.len() >= cap {
            break;
        }
    }
    seen.len()
}

pub fn summarize(image: &DynamicImage, started: Instant) -> CaptureSummary {
    CaptureSummary {
        width: image.width(),
        height: image.height(),
        unique_colors: count_unique_colors(image, COLOR_COUNT_CAP),
        elapsed_ms: started.elapsed().as_millis(),
    }
}

pub async fn run(options: &DoctorOptions) -> DoctorReport {
    let platform = std::env::consts::OS;
    log::info!("[DOCTOR] Running capture diagnostics on {}", platform);

    let native = NativeCommand::screencapture();
    let screencapture_available = cfg!(target_os = "macos").then(|| native.is_available());

    let monitor_count = xcap::Monitor::all()
        .map(|m| m.len())
        .map_err(|e| e.to_string());

    let mut methods = Vec::new();
    let mut sample: Option<DynamicImage> = None;

    if screencapture_available == Some(true) {
        let started = Instant::now();
        let outcome = match native.try_capture().await {
            Ok(image) => {
                let summary = summarize(&image, started);
                sample.get_or_insert(image);
                Ok(summary)
            }
            Err(e) => Err(e.to_string()),
        };
        methods.push(MethodReport {
            method: "screencapture",
            outcome,
        });
    }

    if monitor_count.is_ok() {
        let started = Instant::now();
        let outcome = match tokio::task::spawn_blocking(capture_display).await {
            Ok(Ok(image)) => {
                let summary = summarize(&image, started);
                sample.get_or_insert(image);
                Ok(summary)
            }
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        methods.push(MethodReport {
            method: "xcap",
            outcome,
        });
    }

    for method in &methods {
        match &method.outcome {
            Ok(s) => log::info!(
                "[DOCTOR] {}: {}x{}, {} colors",
                method.method,
                s.width,
                s.height,
                s.unique_colors
            ),
            Err(e) => log::warn!("[DOCTOR] {}: {}", method.method, e),
        }
    }

    let saved_to = match (&options.save, &sample) {
        (Some(path), Some(image)) => save_sample(image, path),
        (Some(_), None) => {
            log::warn!("[DOCTOR] Nothing captured, nothing to save");
            None
        }
        _ => None,
    };

    if options.open_settings {
        open_settings();
    }

    DoctorReport {
        platform,
        screencapture_available,
        monitor_count,
        methods,
        saved_to,
    }
}

fn save_sample(image: &DynamicImage, path: &Path) -> Option<PathBuf> {
    match image.save(path) {
        Ok(()) => Some(path.to_path_buf()),
        Err(e) => {
            log::warn!("[DOCTOR] Cannot save {}: {}", path.display(), e);
            None
        }
    }
}

fn open_settings() {
    if !cfg!(target_os = "macos") {
        log::info!("[DOCTOR] --open-settings only applies on macOS");
        return;
    }
    match open::that(SCREEN_RECORDING_SETTINGS_URL) {
        Ok(()) => log::info!("[DOCTOR] Opened Screen Recording settings"),
        Err(e) => log::warn!("[DOCTOR] Cannot open settings: {}", e),
    }
}
