mod display;
mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reunion_core::{
    load_config, load_default_config, validate_config, Config, ControllerError, FileValidator,
    HttpGateway, InputFile, InputKind, Locale, MessageTable, PipelineOrchestrator, UiController,
};

use display::{progress_printer, TerminalDisplay};

/// Turn a project archive and a meeting transcript into a technical todo list.
#[derive(Debug, Parser)]
#[command(name = "reunion", version, about)]
struct Args {
    /// Project archive (.zip)
    #[arg(long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Meeting transcript (.txt, .md, .docx)
    #[arg(long, value_name = "FILE")]
    transcript: Option<PathBuf>,

    /// Configuration file
    #[arg(long, env = "REUNION_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Display language (en, fr)
    #[arg(long)]
    locale: Option<Locale>,

    /// Export the results as text, into DIR or the configured directory
    #[arg(long, value_name = "DIR", num_args = 0..=1, require_equals = true)]
    export: Option<Option<PathBuf>>,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    print_metrics: bool,

    /// Log as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log_json);

    match run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(json: bool) {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    );

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Returns whether the run completed.
async fn run(args: Args) -> Result<bool> {
    let config = load(&args)?;

    let mut messages = MessageTable::new(config.ui.locale);
    if let Some(path) = &config.ui.messages_path {
        messages = messages
            .with_overrides_file(path)
            .with_context(|| format!("Failed to load messages from {:?}", path))?;
    }

    info!(
        base_url = %config.remote.base_url,
        locale = %config.ui.locale,
        "Configuration loaded"
    );

    let gateway = HttpGateway::new(&config.remote).context("Failed to create HTTP client")?;
    let orchestrator = PipelineOrchestrator::new(Arc::new(gateway))
        .with_update_callback(progress_printer(messages.clone()));

    let mut controller = UiController::new(
        FileValidator::new(&config.validation),
        orchestrator,
        messages.clone(),
        TerminalDisplay::new(messages),
    );

    if let Some(path) = &args.project {
        controller.on_files_selected(InputKind::Project, Some(read_input(path).await?));
    }
    if let Some(path) = &args.transcript {
        controller.on_files_selected(InputKind::Transcript, Some(read_input(path).await?));
    }

    let done = match controller.on_start_requested().await {
        Ok(session) => session.is_done(),
        // The reason was already shown.
        Err(ControllerError::NotReady(_)) => false,
        Err(e) => return Err(e.into()),
    };

    if done {
        if let Some(directory) = &args.export {
            let directory = directory.as_ref().unwrap_or(&config.export.directory);
            controller
                .save_export(directory, Local::now())
                .await
                .context("Failed to export results")?;
        }
    }

    if args.print_metrics {
        print!("{}", metrics::encode_metrics());
    }

    Ok(done)
}

fn load(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_default_config().context("Failed to load default configuration")?,
    };

    if let Some(locale) = args.locale {
        config.ui.locale = locale;
    }

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn read_input(path: &Path) -> Result<InputFile> {
    InputFile::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))
}
