//! Screen Assist — capture the screen, approve it, ask a vision model about it.
//!
//! This is the app shell that wires together:
//! - Screen capture domain (capture/)
//! - Upload compression and previews (imaging/)
//! - Bedrock model client and mock (llm/)
//! - The capture → review → analysis cycle (pipeline/)
//! - Terminal front-end (frontend/) and capture diagnostics (doctor.rs)

pub mod capture;
pub mod cli;
pub mod config;
pub mod doctor;
pub mod frontend;
pub mod imaging;
pub mod llm;
pub mod pipeline;

use clap::Parser;
use std::process::ExitCode;

use capture::CaptureProvider;
use cli::{AnalyzeArgs, Cli, Command, DoctorArgs};
use config::{AppConfig, ConfigError};
use frontend::{TerminalFrontend, TerminalOptions};
use llm::{MockAnalyzer, ModelClient};
use pipeline::{Analyzer, CycleOutcome, Orchestrator, PipelineOptions};

/// Entry point, called by `main.rs`.
pub fn run() -> ExitCode {
    env_logger::init();

    match Cli::parse().into_command() {
        Command::Analyze(args) => run_analyze(args),
        Command::Doctor(args) => run_doctor(args),
    }
}

fn run_analyze(args: AnalyzeArgs) -> ExitCode {
    let analyzer = match build_analyzer(&args) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Set AWS_BEARER_TOKEN_BEDROCK (or AWS access keys), or run with --mock.");
            return ExitCode::FAILURE;
        }
    };

    // Nothing to hide from a replayed file.
    let (capture, options) = match args.from_file {
        Some(path) => (CaptureProvider::Replay(path), PipelineOptions::immediate()),
        None => (CaptureProvider::for_platform(), PipelineOptions::default()),
    };

    log::info!(
        "Screen Assist starting up (capture: {}, analyzer: {})",
        capture.name(),
        analyzer.name()
    );

    let mut frontend = TerminalFrontend::new(TerminalOptions {
        auto_approve: args.yes,
        open_preview: !args.no_preview && !args.yes,
        copy_to_clipboard: args.copy,
    });
    let mut orchestrator = Orchestrator::new(capture, analyzer, options);

    match orchestrator.run_cycle(&mut frontend) {
        Some(CycleOutcome::Complete(_)) | Some(CycleOutcome::Declined) => ExitCode::SUCCESS,
        Some(CycleOutcome::Failed(_)) | None => ExitCode::FAILURE,
    }
}

fn build_analyzer(args: &AnalyzeArgs) -> Result<Analyzer, ConfigError> {
    if args.mock {
        log::info!("[LLM] Mock mode enabled");
        return Ok(Analyzer::Mock(MockAnalyzer::default()));
    }

    let mut config = AppConfig::from_env()?;
    if let Some(region) = &args.region {
        config = config.with_region(region)?;
    }
    if let Some(model_id) = &args.model_id {
        config = config.with_model_id(model_id);
    }
    log::debug!("[CONFIG] {:?}", config);

    let client = ModelClient::new(&config)?;
    log::info!(
        "[LLM] Using {} with {:?} auth",
        client.model_id(),
        client.strategy()
    );
    Ok(Analyzer::Bedrock(client))
}

fn run_doctor(args: DoctorArgs) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = doctor::DoctorOptions {
        open_settings: args.open_settings,
        save: args.save,
    };
    let report = runtime.block_on(doctor::run(&options));
    report.print();

    if report.healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
