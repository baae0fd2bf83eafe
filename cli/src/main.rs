//! CLI entrypoint for Agent Tribunal
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tribunal_application::{
    NoProgress, ProgressNotifier, RunBatchUseCase, RunPipelineUseCase,
};
use tribunal_domain::{OutputFormat, PromptSet};
use tribunal_infrastructure::{
    ConfigLoader, FileConfig, JsonResultStore, JsonlAuditLogger, OpenAiBackend, PromptLoader,
    load_problems,
};
use tribunal_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        for line in ConfigLoader::describe_sources() {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    info!("Starting Agent Tribunal");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("{}", issue.message);
    }
    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.message.as_str())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let Some(problems_path) = config.paths.problems.clone() else {
        bail!("No problem set given. Pass a path or set paths.problems in the config.");
    };
    let problems = load_problems(&problems_path)
        .with_context(|| format!("Failed to load problems from {}", problems_path.display()))?;
    info!(count = problems.len(), path = %problems_path.display(), "Loaded problems");

    let prompts = match &config.paths.prompts_dir {
        Some(dir) => PromptLoader::load(dir)?,
        None => PromptSet::default(),
    };

    // === Dependency Injection ===
    let backend = Arc::new(OpenAiBackend::from_config(&config.backend)?);
    let mut pipeline = RunPipelineUseCase::new(backend, config.to_pipeline_config(prompts));

    if let Some(path) = &config.paths.audit_log {
        let logger = JsonlAuditLogger::open(path)
            .with_context(|| format!("Failed to open audit log {}", path.display()))?;
        pipeline = pipeline.with_audit_logger(Arc::new(logger));
    }

    let store = match &config.paths.results_dir {
        Some(dir) if !cli.no_save => Some(Arc::new(JsonResultStore::create(dir)?)),
        _ => None,
    };
    if let Some(store) = &store {
        pipeline = pipeline.with_result_store(store.clone());
    }

    let mut batch = RunBatchUseCase::new(Arc::new(pipeline))
        .with_problem_concurrency(config.pipeline.problem_concurrency);
    if let Some(store) = store {
        batch = batch.with_result_store(store);
    }

    let progress: Box<dyn ProgressNotifier> = if cli.quiet || !config.output.show_progress {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new(problems.len()))
    };

    let report = batch.execute_with_progress(problems, progress.as_ref()).await;

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    println!("{}", ConsoleFormatter.render(&report, format));

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path
                .file_name()
                .context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// CLI flags take precedence over every config source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(path) = &cli.problems {
        config.paths.problems = Some(path.clone());
    }
    if let Some(model) = &cli.model {
        config.backend.model = model.clone();
    }
    if let Some(n) = cli.solvers {
        config.pipeline.solver_count = n;
    }
    if let Some(n) = cli.review_concurrency {
        config.pipeline.review_concurrency = n;
    }
    if let Some(n) = cli.problem_concurrency {
        config.pipeline.problem_concurrency = n;
    }
    if let Some(n) = cli.max_attempts {
        config.pipeline.max_attempts = n;
    }
    if let Some(dir) = &cli.prompts_dir {
        config.paths.prompts_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.results_dir {
        config.paths.results_dir = Some(dir.clone());
    }
    if let Some(path) = &cli.audit_log {
        config.paths.audit_log = Some(path.clone());
    }
}
