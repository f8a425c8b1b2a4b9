// manifestrs/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use manifestrs::cli::{
    clean_cache, clear_edited, generate_project, init_project, list_edits, mark_edited,
    status_project, Overrides,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "manifestrs")]
#[command(about = "Incremental code generation from component manifests", long_about = None)]
#[command(version = env!("MANIFESTRS_CLI_VERSION"))]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, value_name = "DIR", global = true)]
    project_dir: Option<PathBuf>,

    /// Upper bound on parallel file writes
    #[arg(long, env = "MANIFESTRS_MAX_CONCURRENCY", global = true)]
    max_concurrency: Option<usize>,

    /// Log every generated file at info level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project
    Init,
    /// Generate source files from the manifest
    Generate {
        /// Regenerate everything, ignoring the hash cache
        #[arg(long)]
        full: bool,
        /// Manifest file (defaults to manifest.json)
        #[arg(short, long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },
    /// Show what the next generation would change
    Status {
        #[arg(short, long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },
    /// Protect a generated file from being overwritten
    MarkEdited {
        path: PathBuf,
        /// Component that generated the file
        #[arg(short, long)]
        component: Option<String>,
    },
    /// Allow a protected file to be regenerated
    ClearEdited { path: PathBuf },
    /// List protected files
    Edits,
    /// Drop the hash cache
    CleanCache,
}

fn entrypoint() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let overrides = Overrides {
        max_concurrency: cli.max_concurrency,
        debug: cli.debug,
    };

    match cli.command {
        Commands::Init => init_project(&project_dir),
        Commands::Generate { full, manifest } => {
            generate_project(&project_dir, manifest.as_deref(), full, &overrides)
        }
        Commands::Status { manifest } => {
            status_project(&project_dir, manifest.as_deref(), &overrides)
        }
        Commands::MarkEdited { path, component } => {
            mark_edited(&project_dir, &path, component.as_deref(), &overrides)
        }
        Commands::ClearEdited { path } => clear_edited(&project_dir, &path, &overrides),
        Commands::Edits => list_edits(&project_dir, &overrides),
        Commands::CleanCache => clean_cache(&project_dir, &overrides),
    }
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
