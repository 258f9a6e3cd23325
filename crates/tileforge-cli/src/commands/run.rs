use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tileforge_core::basemap::SidecarGeoProbe;
use tileforge_core::dispatch::ShellRunner;
use tileforge_core::pipeline::config::PipelineConfig;
use tileforge_core::pipeline::{run_pipeline, PipelineStage, ProgressReporter};
use tracing::info;

use crate::summary::{print_pipeline_summary, print_run_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline config file (TOML)
    pub config: PathBuf,

    /// Recompute every artifact even when outputs already exist
    #[arg(long)]
    pub force: bool,

    /// Override the worker-pool size from the config
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Drives one indicatif bar from pipeline stage callbacks.
struct BarReporter {
    bar: Mutex<ProgressBar>,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:32} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self {
            bar: Mutex::new(bar),
        })
    }

    fn finish(&self) {
        self.bar.lock().unwrap().finish_with_message("Done");
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        let bar = self.bar.lock().unwrap();
        bar.set_message(stage.to_string());
        bar.set_length(total_items.unwrap_or(1) as u64);
        bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.lock().unwrap().set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        let bar = self.bar.lock().unwrap();
        let len = bar.length().unwrap_or(1);
        bar.set_position(len);
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let contents = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read config {}", args.config.display()))?;
    let mut config: PipelineConfig =
        toml::from_str(&contents).context("Invalid pipeline config")?;
    if args.force {
        config.force = true;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    info!(config = %args.config.display(), set = %config.set_name, "Loaded pipeline config");

    print_pipeline_summary(&config);

    let reporter = BarReporter::new()?;
    let summary = run_pipeline(&config, &ShellRunner, &SidecarGeoProbe, &reporter)
        .context("Pipeline failed")?;
    reporter.finish();

    print_run_summary(&summary);
    Ok(())
}
