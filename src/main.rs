use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use axcheck::config::load_config;
use axcheck::discovery::collect_files;
use axcheck::model::builtin_axioms;
use axcheck::Orchestrator;

#[derive(Parser)]
#[command(
    name = "axcheck",
    about = "Compliance axiom checker with a tamper-evident audit trail",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "AXCHECK_LOG", default_value = "warn", global = true)]
    log: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run compliance checks on the specified paths.
    ///
    /// Directories are expanded recursively, keeping *.py files. Prints the
    /// report's one-line summary to stdout; exits 0 when the report has zero
    /// violations, 1 otherwise.
    ///
    /// Examples:
    ///   axcheck check .
    ///   axcheck check src/ --config compliance.yml
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Path to the config file
        #[arg(long, short = 'c', default_value = ".axcheck.yml")]
        config: PathBuf,
    },
}

fn setup_logging(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logging(&args.log);

    let exit_code = match args.command {
        Command::Check { paths, config } => match run_check(&paths, &config).await {
            Ok(code) => code,
            Err(err) => {
                eprintln!("Error running checks: {err:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

async fn run_check(paths: &[PathBuf], config_path: &Path) -> Result<i32> {
    let files = collect_files(paths);
    if files.is_empty() {
        println!("No files found to check.");
        return Ok(0);
    }

    let config = load_config(config_path)?;
    let repo_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let orchestrator = Orchestrator::new(&config, &repo_root).await?;
    let mut report = orchestrator.run(&files).await?;

    for line in report.detail_lines(&builtin_axioms()) {
        tracing::info!("{line}");
    }
    println!("{}", report.generate_summary());
    Ok(if report.violations.is_empty() { 0 } else { 1 })
}
