mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zephyr_lib::{ConfigError, ErrorCode, ZephyrError};

use crate::cmd::DeployArgs;
use crate::output::{OutputFormat, Status, print_status};

/// ze - deploy federated application builds
#[derive(Parser)]
#[command(name = "ze")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Deploy a build output directory
  Deploy {
    /// Build output directory (default: dist)
    #[arg(default_value = "dist")]
    dir: PathBuf,

    /// Federation config as JSON (remotes, exposes, shared)
    #[arg(short, long)]
    federation: Option<PathBuf>,

    /// Directory package.json and git are discovered from
    #[arg(short = 'C', long, default_value = ".")]
    context: PathBuf,

    /// Assemble and print the snapshot without contacting the API
    #[arg(long)]
    dry_run: bool,

    /// Per-request timeout, e.g. "30s" or "2m"
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Maximum number of concurrent asset uploads
    #[arg(long)]
    concurrency: Option<usize>,

    /// Build tool name recorded in the snapshot
    #[arg(long, default_value = "ze-cli")]
    builder: String,
  },

  /// List the content-addressed assets of a build output directory
  Assets {
    /// Build output directory (default: dist)
    #[arg(default_value = "dist")]
    dir: PathBuf,
  },

  /// Print the application UID for an org, project and package name
  Uid { org: String, project: String, name: String },

  /// Replace the runtime placeholders in an emitted bundle
  Inject {
    /// Bundle file containing the placeholders
    bundle: PathBuf,

    /// Published zephyr-manifest.json to take the remotes from
    #[arg(short, long)]
    manifest: PathBuf,

    /// URL the runtime fetches the published manifest from
    #[arg(long)]
    manifest_url: Option<String>,

    /// Rewrite the bundle in place instead of printing it
    #[arg(short, long)]
    write: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      match error_code(&e) {
        Some(code) => print_status(Status::Error, &format!("[{}] {:#}", code, e)),
        None => print_status(Status::Error, &format!("{:#}", e)),
      }
      ExitCode::FAILURE
    }
  }
}

fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
  err
    .downcast_ref::<ZephyrError>()
    .map(ZephyrError::code)
    .or_else(|| err.downcast_ref::<ConfigError>().map(ConfigError::code))
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Deploy {
      dir,
      federation,
      context,
      dry_run,
      timeout,
      concurrency,
      builder,
    } => cmd::cmd_deploy(
      DeployArgs {
        dir,
        federation,
        context,
        dry_run,
        timeout,
        concurrency,
        builder,
      },
      cli.output,
    ),
    Commands::Assets { dir } => cmd::cmd_assets(&dir, cli.verbose, cli.output),
    Commands::Uid { org, project, name } => cmd::cmd_uid(&org, &project, &name, cli.output),
    Commands::Inject {
      bundle,
      manifest,
      manifest_url,
      write,
    } => cmd::cmd_inject(&bundle, &manifest, manifest_url.as_deref(), write, cli.output),
  }
}

fn init_tracing(verbose: bool) {
  let filter = if std::env::var_os("RUST_LOG").is_some() {
    EnvFilter::from_default_env()
  } else {
    EnvFilter::new(default_filter(verbose, std::env::var("DEBUG").ok().as_deref()))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::env::var_os("NO_COLOR").is_none())
    .without_time()
    .init();
}

/// `DEBUG=zephyr*` (or any pattern with `*`) turns on debug logs like `--verbose` does.
fn default_filter(verbose: bool, debug: Option<&str>) -> &'static str {
  let debug = debug.is_some_and(|pattern| pattern.contains("zephyr") || pattern.contains('*'));
  if verbose || debug {
    "zephyr_lib=debug,ze=debug"
  } else {
    "warn"
  }
}
