//! uvbf-pipeline - UVBF sentiment analysis pipeline
//!
//! Runs the whole chain (collection → annotation → preprocessing →
//! vectorization → training → [embedding] → evaluation → report) or a
//! single named stage over a project root of stage directories.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uvbf_common::artifacts::RAW_RECORDS;
use uvbf_common::config::{locate_config_file, LoggingConfig, RootFolderResolver, CONFIG_FILE_NAME};
use uvbf_common::{ArtifactStore, Stage};
use uvbf_pipeline::models::PipelineRun;
use uvbf_pipeline::services::demo_generator::write_demo_dataset;
use uvbf_pipeline::{build_info, AnnotationMode, PipelineConfig, RunOptions, WorkflowOrchestrator};

/// Command-line arguments for uvbf-pipeline
#[derive(Parser, Debug)]
#[command(name = "uvbf-pipeline")]
#[command(about = "Sentiment analysis pipeline for UVBF social media posts")]
#[command(version)]
struct Cli {
    /// Project root holding the stage directories
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Configuration file (default: ./uvbf.toml)
    #[arg(short, long, global = true, env = "UVBF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a configuration file holding the defaults
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run the full pipeline
    Run {
        /// Include the embedding stage
        #[arg(long)]
        bert: bool,

        #[command(flatten)]
        stage_args: StageArgs,
    },
    /// Run exactly one stage
    Stage {
        /// collection, annotation, preprocessing, vectorization, training,
        /// embedding, evaluation or report
        name: Stage,

        #[command(flatten)]
        stage_args: StageArgs,
    },
    /// Annotate records (manual, automatic, or statistics only)
    Annotate {
        #[arg(short, long, value_enum)]
        mode: Option<AnnotationMode>,

        /// Maximum labels (auto) or window length (manual)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// First record of the manual window
        #[arg(short, long)]
        start_index: Option<usize>,
    },
    /// Check for raw records or generate a demo dataset
    Collect {
        /// Number of demo records
        #[arg(short = 'n', long)]
        count: Option<usize>,

        #[arg(short, long)]
        seed: Option<u64>,

        /// Replace existing raw records with a fresh demo dataset
        #[arg(long)]
        force: bool,
    },
}

/// Flags shared by `run` and `stage`
#[derive(Args, Debug)]
struct StageArgs {
    /// Annotate interactively instead of with the keyword heuristic
    #[arg(long)]
    manual: bool,

    /// Generate demo data when no raw records exist
    #[arg(long)]
    generate_demo: bool,

    /// Annotation count
    #[arg(short = 'n', long)]
    count: Option<usize>,
}

impl StageArgs {
    fn apply(&self, options: &mut RunOptions) {
        if self.manual {
            options.annotation_mode = AnnotationMode::Manual;
        }
        options.generate_demo = self.generate_demo;
        if let Some(count) = self.count {
            options.annotation_count = count;
        }
    }
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn finish(run: PipelineRun, store: &ArtifactStore) -> Result<()> {
    println!("{}", run.render_summary(store));
    match &run.failure {
        Some(failure) => bail!("stage '{}' failed: {}", failure.stage, failure.error),
        None => Ok(()),
    }
}

/// Write the default configuration to `--config` or `./uvbf.toml`
fn init_config(explicit: Option<PathBuf>, force: bool) -> Result<()> {
    let path = explicit.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite it", path.display());
    }
    PipelineConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Default configuration written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Runs before loading so a broken file can be replaced
    if let Command::InitConfig { force } = cli.command {
        init_logging(&LoggingConfig::default())?;
        return init_config(cli.config, force);
    }

    let config_path = locate_config_file(cli.config.as_deref());
    let config = PipelineConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("Starting {}", build_info());
    if let Some(path) = &config_path {
        info!("Config: {}", path.display());
    }

    let root = RootFolderResolver::new()
        .with_cli_arg(cli.root.clone())
        .with_toml_value(config.root_folder.clone())
        .resolve();
    info!("Root folder: {}", root.display());
    let store = ArtifactStore::new(root);
    let mut options = RunOptions::from_config(&config);

    match cli.command {
        Command::Collect { count, seed, force } => {
            let count = count.unwrap_or(config.collection.demo_count);
            let seed = seed.unwrap_or(config.collection.seed);
            if store.exists(&RAW_RECORDS) && !force {
                println!(
                    "{} already exists; pass --force to replace it with demo data",
                    store.path(&RAW_RECORDS).display()
                );
                return Ok(());
            }
            let written = write_demo_dataset(&store, count, seed).context("Failed to write demo dataset")?;
            println!("{} demo records written to {}", written, store.path(&RAW_RECORDS).display());
            Ok(())
        }
        Command::Annotate {
            mode,
            count,
            start_index,
        } => {
            if let Some(mode) = mode {
                options.annotation_mode = mode;
            }
            if let Some(count) = count {
                options.annotation_count = count;
            }
            if let Some(start_index) = start_index {
                options.start_index = start_index;
            }
            let mut orchestrator = WorkflowOrchestrator::new(store.clone(), config, options);
            finish(orchestrator.run_stage(Stage::Annotation), &store)
        }
        Command::Run { bert, stage_args } => {
            stage_args.apply(&mut options);
            options.include_embedding = bert;
            let mut orchestrator = WorkflowOrchestrator::new(store.clone(), config, options);
            finish(orchestrator.run_all(), &store)
        }
        Command::Stage { name, stage_args } => {
            stage_args.apply(&mut options);
            let mut orchestrator = WorkflowOrchestrator::new(store.clone(), config, options);
            finish(orchestrator.run_stage(name), &store)
        }
        Command::InitConfig { .. } => Ok(()),
    }
}
