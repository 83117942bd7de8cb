//! Command-line surface.
//!
//! Usage:
//!   screen-assist                          One capture → review → analysis cycle
//!   screen-assist --mock                   Same, with canned responses and no network
//!   screen-assist --from-file shot.png     Analyze an existing image instead of the screen
//!   screen-assist doctor --save test.png   Check that screen capture works

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "screen-assist", version, about)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture the screen and ask the model about it (default).
    Analyze(AnalyzeArgs),
    /// Diagnose screen capture and permissions.
    Doctor(DoctorArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct AnalyzeArgs {
    /// Use canned responses instead of calling the model.
    #[arg(long)]
    pub mock: bool,

    /// Analyze this image file instead of capturing the screen.
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Skip the review prompt and analyze the first capture.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Also copy the result to the clipboard.
    #[arg(long)]
    pub copy: bool,

    /// Don't open the capture preview in an image viewer.
    #[arg(long)]
    pub no_preview: bool,

    /// AWS region, overrides AWS_REGION.
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Model id, overrides SCREEN_ASSIST_MODEL_ID.
    #[arg(long, value_name = "ID")]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DoctorArgs {
    /// Open the macOS Screen Recording settings pane.
    #[arg(long)]
    pub open_settings: bool,

    /// Write the test capture to this file.
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,
}

impl Cli {
    /// The subcommand to run; a bare invocation means `analyze`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Analyze(self.analyze))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().into_command()
    }

    #[test]
    fn bare_invocation_analyzes() {
        match parse(&["screen-assist", "--mock", "-y"]) {
            Command::Analyze(args) => {
                assert!(args.mock);
                assert!(args.yes);
                assert!(args.from_file.is_none());
            }
            other => panic!("expected analyze, got {:?}", other),
        }
    }

    #[test]
    fn analyze_subcommand_takes_overrides() {
        match parse(&[
            "screen-assist",
            "analyze",
            "--region",
            "eu-west-1",
            "--model-id",
            "custom-model",
            "--from-file",
            "shot.png",
        ]) {
            Command::Analyze(args) => {
                assert_eq!(args.region.as_deref(), Some("eu-west-1"));
                assert_eq!(args.model_id.as_deref(), Some("custom-model"));
                assert_eq!(args.from_file, Some(PathBuf::from("shot.png")));
            }
            other => panic!("expected analyze, got {:?}", other),
        }
    }

    #[test]
    fn doctor_subcommand() {
        match parse(&["screen-assist", "doctor", "--open-settings", "--save", "t.png"]) {
            Command::Doctor(args) => {
                assert!(args.open_settings);
                assert_eq!(args.save, Some(PathBuf::from("t.png")));
            }
            other => panic!("expected doctor, got {:?}", other),
        }
    }

    #[test]
    fn top_level_flags_conflict_with_subcommand() {
        assert!(Cli::try_parse_from(["screen-assist", "--mock", "doctor"]).is_err());
    }
}
