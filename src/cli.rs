use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use archlens::config::{Config, LookupPolicy};
use archlens::core::{
    export_layer_subgraphs, export_report, is_model_file, load_model, load_report,
    render_summary, Engine, LoadedModel,
};
use archlens::error::ArchlensError;

#[derive(Parser)]
#[command(name = "archlens")]
#[command(about = "Risk and complexity analysis for ArchiMate architecture models")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Analyze a model file, or every model file under a directory
    Analyze {
        /// Model file (.xml, .archimate, .json) or directory
        path: PathBuf,

        /// Output file, or output directory when analyzing a directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on relationships that reference unknown elements
        #[arg(long)]
        strict: bool,

        /// Do not print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the summary of a previously exported report
    Summary {
        /// Report JSON written by `analyze`
        report: PathBuf,
    },

    /// Export per-layer subgraphs of a model
    Layers {
        /// Model file
        model: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// `<dir>/<stem><suffix>` next to the model, or inside `dir` when given
fn output_path(model: &Path, dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = model
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let dir = dir.or_else(|| model.parent()).unwrap_or_else(|| Path::new("."));
    dir.join(format!("{}{}", stem, suffix))
}

impl Cli {
    pub fn execute(self, mut config: Config) -> Result<()> {
        match self.command {
            Commands::Init { path, force } => init(path, force),
            Commands::Analyze { path, output, strict, quiet } => {
                if strict {
                    config.analysis.lookup_policy = LookupPolicy::Fail;
                }
                let mut engine = Engine::new(&config)?;

                if path.is_dir() {
                    analyze_directory(&mut engine, &path, output.as_deref(), quiet)
                } else {
                    let output = output.unwrap_or_else(|| {
                        output_path(&path, None, &engine.config().output.report_suffix)
                    });
                    analyze_file(&mut engine, &path, &output, quiet)
                }
            }
            Commands::Summary { report } => {
                let report = load_report(&report)
                    .with_context(|| format!("Failed to read report {}", report.display()))?;
                println!("{}", render_summary(&report));
                Ok(())
            }
            Commands::Layers { model, output } => {
                let mut engine = Engine::new(&config)?;
                let loaded = load_model(&model)
                    .with_context(|| format!("Failed to load model {}", model.display()))?;
                engine.parse(&loaded.source)?;

                let output = output
                    .unwrap_or_else(|| output_path(&model, None, &config.output.layers_suffix));
                export_layer_subgraphs(&engine.layer_subgraphs(), &output)?;
                info!("📊 Layer subgraphs written to {}", output.display());
                Ok(())
            }
        }
    }
}

fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = path.unwrap_or_else(|| PathBuf::from(".")).join("archlens.toml");

    if target.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", target.display());
    }

    Config::default().save(&target)?;
    info!("✅ Wrote default configuration to {}", target.display());
    Ok(())
}

fn analyze_file(engine: &mut Engine, model: &Path, output: &Path, quiet: bool) -> Result<()> {
    let loaded = load_model(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;
    analyze_loaded(engine, &loaded, output, quiet)
}

fn analyze_loaded(engine: &mut Engine, loaded: &LoadedModel, output: &Path, quiet: bool) -> Result<()> {
    info!("🔍 Analyzing {}", loaded.path.display());
    info!("Model fingerprint: {}", loaded.content_hash);

    for warning in engine.parse(&loaded.source)? {
        warn!("Skipped: {}", warning);
    }
    let report = engine.analyze();

    export_report(&report, output)?;
    info!("✅ Analysis written to {}", output.display());

    if !quiet {
        println!("{}", render_summary(&report));
    }
    Ok(())
}

/// JSON documents that hold no model records, such as `package.json`
fn is_foreign_json(loaded: &LoadedModel) -> bool {
    loaded.format == "json"
        && loaded.source.elements.is_empty()
        && loaded.source.relationships.is_empty()
}

fn analyze_directory(
    engine: &mut Engine,
    dir: &Path,
    output_dir: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    if let Some(output_dir) = output_dir {
        std::fs::create_dir_all(output_dir)?;
    }

    let suffix = engine.config().output.report_suffix.clone();
    let layers_suffix = engine.config().output.layers_suffix.clone();
    let candidates: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| is_model_file(path))
        // Skip our own outputs
        .filter(|path| {
            let name = path.to_string_lossy();
            !name.ends_with(&suffix) && !name.ends_with(&layers_suffix)
        })
        .collect();

    info!("Found {} candidate model files under {}", candidates.len(), dir.display());

    let mut analyzed = 0;
    let mut failed = 0;
    for path in &candidates {
        let loaded = match load_model(path) {
            Ok(loaded) if is_foreign_json(&loaded) => {
                debug!("Skipping {}: no model records", path.display());
                continue;
            }
            Ok(loaded) => loaded,
            Err(ArchlensError::Serialization(e)) => {
                debug!("Skipping {}: not a model document ({})", path.display(), e);
                continue;
            }
            Err(e) => {
                error!("❌ Failed to load model {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let output = output_path(path, output_dir, &suffix);
        match analyze_loaded(engine, &loaded, &output, quiet) {
            Ok(()) => analyzed += 1,
            Err(e) => {
                error!("❌ {:#}", e);
                failed += 1;
            }
        }
    }

    info!("Analyzed {} models under {}", analyzed, dir.display());
    if failed > 0 {
        bail!("{} of {} models failed to analyze", failed, analyzed + failed);
    }
    Ok(())
}
