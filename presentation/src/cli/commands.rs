//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for tribunal results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage: solutions, reviews, refinements and the verdict
    Full,
    /// Only the verdict per problem
    Verdict,
    /// Batch report as JSON
    Json,
}

impl From<OutputFormat> for tribunal_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => tribunal_domain::OutputFormat::Full,
            OutputFormat::Verdict => tribunal_domain::OutputFormat::Verdict,
            OutputFormat::Json => tribunal_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agent-tribunal
#[derive(Parser, Debug)]
#[command(name = "agent-tribunal")]
#[command(author, version, about = "Solve, cross-review, refine and judge with a panel of LLM agents")]
#[command(long_about = r#"
Agent Tribunal runs every problem of a problem set through a panel of solver agents.

Each problem goes through five stages:
1. Role assignment: every solver states which role it would prefer (advisory)
2. Solving: every solver answers the problem independently
3. Peer review: every solver reviews every other solver's answer
4. Refinement: every solver improves its answer using the reviews it received
5. Judging: a judge picks the winning refined answer

Configuration files are loaded from (in priority order):
1. TRIBUNAL_* environment variables (e.g. TRIBUNAL_PIPELINE__SOLVER_COUNT=5)
2. --config <path>     Explicit config file
3. ./tribunal.toml     Project-level config
4. ~/.config/agent-tribunal/config.toml   Global config

Example:
  agent-tribunal problems.json
  agent-tribunal problems.json --solvers 4 --review-concurrency 6 -o full
  agent-tribunal problems.json -o json --results-dir out/ --audit-log out/audit.jsonl
"#)]
pub struct Cli {
    /// Problem set: a JSON array of {"id", "question"} (overrides paths.problems)
    pub problems: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Number of solver agents
    #[arg(short = 'n', long, value_name = "N")]
    pub solvers: Option<usize>,

    /// Parallel review tasks per problem
    #[arg(long, value_name = "N")]
    pub review_concurrency: Option<usize>,

    /// Problems processed at once
    #[arg(long, value_name = "N")]
    pub problem_concurrency: Option<usize>,

    /// Attempts per backend call before a problem is abandoned
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Model used by every agent
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Directory with prompt overrides
    #[arg(long, value_name = "DIR")]
    pub prompts_dir: Option<PathBuf>,

    /// Directory for per-stage result files
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Do not write result files
    #[arg(long, conflicts_with = "results_dir")]
    pub no_save: bool,

    /// Append a JSONL audit trail of every backend call to this file
    #[arg(long, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "agent-tribunal",
            "problems.json",
            "-n",
            "4",
            "-o",
            "json",
            "-vv",
            "--audit-log",
            "audit.jsonl",
        ])
        .unwrap();

        assert_eq!(cli.problems, Some(PathBuf::from("problems.json")));
        assert_eq!(cli.solvers, Some(4));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.audit_log, Some(PathBuf::from("audit.jsonl")));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_no_save_conflicts_with_results_dir() {
        let result = Cli::try_parse_from([
            "agent-tribunal",
            "p.json",
            "--no-save",
            "--results-dir",
            "out",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_maps_to_domain() {
        assert_eq!(
            tribunal_domain::OutputFormat::from(OutputFormat::Verdict),
            tribunal_domain::OutputFormat::Verdict
        );
    }
}
