//! Terminal front-end: progress bar, review prompt, result on stdout.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tempfile::NamedTempFile;

use super::{Approval, Frontend};
use crate::imaging::{fit_within, PREVIEW_MAX};

#[derive(Debug, Clone, Default)]
pub struct TerminalOptions {
    /// Proceed without asking.
    pub auto_approve: bool,
    /// Open the preview image in the system viewer before asking.
    pub open_preview: bool,
    /// Put the result on the clipboard too.
    pub copy_to_clipboard: bool,
}

pub struct TerminalFrontend {
    options: TerminalOptions,
    progress: Option<ProgressBar>,
    /// Kept alive until the next review so the viewer can still read it.
    preview: Option<NamedTempFile>,
    /// Replaced on the next approval; survives `reset`.
    thumbnail: Option<NamedTempFile>,
}

const REVIEW_CHOICES: [&str; 3] = ["Analyze with AI", "Retake Screenshot", "Cancel"];

impl TerminalFrontend {
    pub fn new(options: TerminalOptions) -> Self {
        Self {
            options,
            progress: None,
            preview: None,
            thumbnail: None,
        }
    }

    fn bar(&mut self) -> &ProgressBar {
        self.progress.get_or_insert_with(|| {
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        })
    }

    fn write_preview(&mut self, image: &DynamicImage) -> Option<std::path::PathBuf> {
        let file = write_temp_png(&fit_within(image, PREVIEW_MAX), "screen-assist-preview-")?;
        let path = file.path().to_path_buf();
        self.preview = Some(file);
        Some(path)
    }

    /// Path of the last screenshot thumbnail, if one was written.
    pub fn thumbnail_path(&self) -> Option<&Path> {
        self.thumbnail.as_ref().map(NamedTempFile::path)
    }

    fn copy(&self, text: &str) {
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string())) {
            Ok(()) => log::info!("[PIPELINE] Result copied to clipboard"),
            Err(e) => log::warn!("[PIPELINE] Clipboard unavailable: {}", e),
        }
    }
}

fn write_temp_png(image: &DynamicImage, prefix: &str) -> Option<NamedTempFile> {
    let file = match tempfile::Builder::new().prefix(prefix).suffix(".png").tempfile() {
        Ok(file) => file,
        Err(e) => {
            log::warn!("[IMAGE] Cannot create temp image: {}", e);
            return None;
        }
    };

    if let Err(e) = image.save(file.path()) {
        log::warn!("[IMAGE] Cannot write {}: {}", file.path().display(), e);
        return None;
    }
    Some(file)
}

impl Frontend for TerminalFrontend {
    fn hide_window(&mut self) {
        log::debug!("[PIPELINE] Hide window (terminal: nothing to hide)");
    }

    fn restore_window(&mut self) {
        log::debug!("[PIPELINE] Restore window");
    }

    fn show_progress(&mut self, percent: u8, status: &str) {
        let pb = self.bar();
        pb.set_position(u64::from(percent));
        pb.set_message(status.to_string());
    }

    fn review_capture(&mut self, image: &DynamicImage) -> Approval {
        eprintln!("Captured {}x{}", image.width(), image.height());

        if self.options.open_preview {
            if let Some(path) = self.write_preview(image) {
                if let Err(e) = open::that(&path) {
                    log::warn!("[IMAGE] Cannot open preview {}: {}", path.display(), e);
                }
            }
        }

        if self.options.auto_approve {
            return Approval::Proceed;
        }

        let choose = || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Review the captured screenshot")
                .items(&REVIEW_CHOICES)
                .default(0)
                .interact()
        };
        let choice = match &self.progress {
            Some(pb) => pb.suspend(choose),
            None => choose(),
        };

        match choice {
            Ok(0) => Approval::Proceed,
            Ok(1) => Approval::Retake,
            Ok(_) => Approval::Decline,
            Err(e) => {
                log::warn!("[PIPELINE] Review prompt failed: {}", e);
                Approval::Decline
            }
        }
    }

    fn show_thumbnail(&mut self, thumbnail: &DynamicImage) {
        self.thumbnail = write_temp_png(thumbnail, "screen-assist-last-");
        if let Some(path) = self.thumbnail_path() {
            eprintln!(
                "Last screenshot ({}x{}): {}",
                thumbnail.width(),
                thumbnail.height(),
                path.display()
            );
        }
    }

    fn show_result(&mut self, text: &str) {
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        println!("\n{}\n", text);

        if self.options.copy_to_clipboard {
            self.copy(text);
        }
    }

    fn set_status(&mut self, status: &str) {
        match &self.progress {
            Some(pb) if !pb.is_finished() => pb.set_message(status.to_string()),
            _ => eprintln!("{}", status),
        }
    }

    fn reset(&mut self) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::THUMBNAIL_MAX;
    use image::RgbImage;

    fn quiet() -> TerminalFrontend {
        TerminalFrontend::new(TerminalOptions {
            auto_approve: true,
            ..TerminalOptions::default()
        })
    }

    #[test]
    fn auto_approve_skips_prompt() {
        let mut frontend = quiet();
        let image = DynamicImage::ImageRgb8(RgbImage::new(16, 9));
        assert_eq!(frontend.review_capture(&image), Approval::Proceed);
    }

    #[test]
    fn reset_drops_progress_and_preview() {
        let mut frontend = quiet();
        frontend.show_progress(50, "half way");
        let image = DynamicImage::ImageRgb8(RgbImage::new(1920, 1080));
        let path = frontend.write_preview(&image).unwrap();

        let preview = image::open(&path).unwrap();
        assert_eq!(preview.width(), 760);

        frontend.reset();
        assert!(frontend.progress.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn thumbnail_outlives_reset_until_replaced() {
        let mut frontend = quiet();
        let thumb = fit_within(&DynamicImage::ImageRgb8(RgbImage::new(800, 600)), THUMBNAIL_MAX);
        frontend.show_thumbnail(&thumb);

        let first = frontend.thumbnail_path().unwrap().to_path_buf();
        let written = image::open(&first).unwrap();
        assert_eq!((written.width(), written.height()), (200, 150));

        frontend.reset();
        assert!(first.exists());

        frontend.show_thumbnail(&thumb);
        assert!(!first.exists());
        assert!(frontend.thumbnail_path().unwrap().exists());
    }
}
