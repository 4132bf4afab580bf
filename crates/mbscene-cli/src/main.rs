//! mbscene CLI - MBDyn input files from scene and model descriptions
//!
//! The scene file stands in for the host application's scene graph; the
//! model file is a plain (not base64-wrapped) snapshot payload.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mbscene::{BuildConfig, Category, ModelContext, NodeClass, Registry, Scene, SceneGraph};
use tracing_subscriber::EnvFilter;

mod scene_file;

#[derive(Parser)]
#[command(name = "mbscene")]
#[command(about = "Multibody model tools for MBDyn", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an MBDyn input file
    Generate {
        /// Scene description (.json)
        #[arg(long)]
        scene: PathBuf,
        /// Model snapshot payload (.json)
        #[arg(long)]
        model: PathBuf,
        /// Build configuration (.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encode a model into a base64 snapshot blob
    Snapshot {
        /// Scene description (.json)
        #[arg(long)]
        scene: PathBuf,
        /// Model snapshot payload (.json)
        #[arg(long)]
        model: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode a base64 snapshot blob back into a model payload
    Restore {
        /// Scene description (.json)
        #[arg(long)]
        scene: PathBuf,
        /// Snapshot blob
        #[arg(long)]
        blob: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show entity counts, node classes and frame order
    Info {
        /// Scene description (.json)
        #[arg(long)]
        scene: PathBuf,
        /// Model snapshot payload (.json)
        #[arg(long)]
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            scene,
            model,
            config,
            output,
        } => generate(&scene, &model, config.as_deref(), output.as_deref())?,
        Commands::Snapshot {
            scene,
            model,
            output,
        } => snapshot(&scene, &model, output.as_deref())?,
        Commands::Restore {
            scene,
            blob,
            output,
        } => restore(&scene, &blob, output.as_deref())?,
        Commands::Info { scene, model } => show_info(&scene, &model)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the scene and open a document holding the model.
fn open(scene_path: &Path, model_path: &Path) -> Result<(Scene, ModelContext)> {
    let scene = scene_file::load(scene_path)?;
    let bytes =
        fs::read(model_path).with_context(|| format!("failed to read {}", model_path.display()))?;
    let registry = mbscene_snapshot::decode(&bytes, &scene)
        .with_context(|| format!("invalid model {}", model_path.display()))?;

    let mut ctx = ModelContext::new();
    ctx.open_document(scene.name());
    *ctx.registry_mut()? = registry;
    Ok((scene, ctx))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn generate(
    scene_path: &Path,
    model_path: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let (scene, ctx) = open(scene_path, model_path)?;
    let config = match config {
        Some(path) => BuildConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => BuildConfig::default(),
    };

    let mut text = Vec::new();
    let report = ctx.generate(&scene, &config, &mut text)?;
    write_output(output, &String::from_utf8_lossy(&text))?;

    for failure in &report.failures {
        tracing::warn!(%failure, "written as error comment");
    }
    tracing::info!(
        frames = report.frames,
        nodes = report.nodes,
        elements = report.elements,
        failures = report.failures.len(),
        "generated input file"
    );
    Ok(())
}

fn snapshot(scene_path: &Path, model_path: &Path, output: Option<&Path>) -> Result<()> {
    let (mut scene, ctx) = open(scene_path, model_path)?;
    let blob = ctx.save(&mut scene)?;
    write_output(output, &blob)
}

fn restore(scene_path: &Path, blob_path: &Path, output: Option<&Path>) -> Result<()> {
    let mut scene = scene_file::load(scene_path)?;
    let blob = fs::read_to_string(blob_path)
        .with_context(|| format!("failed to read {}", blob_path.display()))?;

    let mut ctx = ModelContext::new();
    ctx.open_document(scene.name());
    ctx.load(&blob, &scene)?;

    let payload = mbscene_snapshot::snapshot(ctx.registry()?, &mut scene)?;
    let json = serde_json::to_string_pretty(&payload)?;
    write_output(output, &json)
}

fn show_info(scene_path: &Path, model_path: &Path) -> Result<()> {
    let (scene, ctx) = open(scene_path, model_path)?;
    let registry = ctx.registry()?;

    println!("mbscene model: {}", model_path.display());
    println!("  Scene: {}", ctx.scene_name()?);
    for category in Category::ALL {
        println!("  {}: {}", category, count(registry, category));
    }

    let resolution = ctx.resolve(&scene)?;
    if !resolution.nodes.is_empty() {
        println!("\nStructural nodes:");
        for class in NodeClass::ORDER {
            for object in resolution.nodes.of_class(class) {
                let name = scene.display_name(object).unwrap_or("?");
                println!("  {name} ({})", class.keyword());
            }
        }
    }
    if !resolution.frames.is_empty() {
        println!("\nReference frames:");
        for (i, frame) in resolution.frames.iter().enumerate() {
            println!("  {}: {frame}", i + 1);
        }
    }
    for warning in &resolution.warnings {
        println!("\nWarning: {warning}");
    }

    Ok(())
}

fn count(registry: &Registry, category: Category) -> usize {
    match category {
        Category::Elements => registry.elements().len(),
        Category::Drives => registry.drives().len(),
        Category::Drivers => registry.drivers().len(),
        Category::ConstLaws => registry.const_laws().len(),
        Category::Frames => registry.frames().len(),
        Category::Nodes => registry.nodes().len(),
        Category::Simulations => registry.simulations().len(),
    }
}
