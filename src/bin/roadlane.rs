//! roadlane CLI: render label masks and type descriptors from annotation files.
//!
//! ```text
//! roadlane render     --annotation a.xml --out-dir out [--image a.png] [--config cfg.json]
//! roadlane render-all --annotations dir  --out-dir out [--config cfg.json]
//! roadlane inspect    --annotation a.xml
//! ```
//!
//! Masks go to `<out-dir>/LaneData/<stem>.png`, descriptors to
//! `<out-dir>/TypeData/<stem>.xml`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use roadlane::persistence::read_annotation_file;
use roadlane::raster::{RasterConfig, RenderMask};
use tracing::{info, warn};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

const MASK_DIR: &str = "LaneData";
const DESCRIPTOR_DIR: &str = "TypeData";

#[derive(Parser)]
#[command(name = "roadlane")]
#[command(about = "Rasterize road-lane annotations into label masks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one annotation file.
    Render {
        /// Annotation XML file.
        #[arg(long)]
        annotation: PathBuf,

        /// Output directory; `LaneData/` and `TypeData/` are created inside.
        #[arg(long)]
        out_dir: PathBuf,

        /// Source image. Its size overrides the size stored in the annotation.
        #[arg(long)]
        image: Option<PathBuf>,

        /// Rasterization settings (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render every `*.xml` annotation in a directory.
    RenderAll {
        /// Directory of annotation XML files.
        #[arg(long)]
        annotations: PathBuf,

        /// Output directory; `LaneData/` and `TypeData/` are created inside.
        #[arg(long)]
        out_dir: PathBuf,

        /// Rasterization settings (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the label of every line and marking in an annotation file.
    Inspect {
        /// Annotation XML file.
        #[arg(long)]
        annotation: PathBuf,
    },
}

fn main() {
    // Default: WARN for everything, INFO for roadlane.
    // Override with RUST_LOG (e.g. RUST_LOG=roadlane=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("roadlane=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Render {
            annotation,
            out_dir,
            image,
            config,
        } => run_render(&annotation, &out_dir, image.as_deref(), config.as_deref()),
        Commands::RenderAll {
            annotations,
            out_dir,
            config,
        } => run_render_all(&annotations, &out_dir, config.as_deref()),
        Commands::Inspect { annotation } => run_inspect(&annotation),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> CliResult<RasterConfig> {
    let Some(path) = path else {
        return Ok(RasterConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let config = serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(config)
}

fn output_paths(annotation: &Path, out_dir: &Path) -> CliResult<(PathBuf, PathBuf)> {
    let stem = annotation
        .file_stem()
        .ok_or_else(|| format!("{}: no file name", annotation.display()))?;
    let mask_dir = out_dir.join(MASK_DIR);
    let descriptor_dir = out_dir.join(DESCRIPTOR_DIR);
    fs::create_dir_all(&mask_dir)?;
    fs::create_dir_all(&descriptor_dir)?;
    let named = |ext: &str| {
        let mut name = stem.to_os_string();
        name.push(ext);
        name
    };
    Ok((mask_dir.join(named(".png")), descriptor_dir.join(named(".xml"))))
}

fn render_one(
    annotation: &Path,
    out_dir: &Path,
    image: Option<&Path>,
    config: &RasterConfig,
) -> CliResult<()> {
    let set = read_annotation_file(annotation)?;
    let mut render = RenderMask::new(&set).with_config(config.clone());
    if let Some(image) = image {
        let (width, height) = image::image_dimensions(image)?;
        render = render.with_size(width, height);
    }
    let output = render.execute()?;

    let (mask_path, descriptor_path) = output_paths(annotation, out_dir)?;
    output.mask.save_png(&mask_path)?;
    output.descriptor.write(&descriptor_path)?;
    info!(
        mask = %mask_path.display(),
        descriptor = %descriptor_path.display(),
        "written"
    );
    Ok(())
}

fn run_render(
    annotation: &Path,
    out_dir: &Path,
    image: Option<&Path>,
    config: Option<&Path>,
) -> CliResult<()> {
    let config = load_config(config)?;
    render_one(annotation, out_dir, image, &config)
}

fn run_render_all(annotations: &Path, out_dir: &Path, config: Option<&Path>) -> CliResult<()> {
    let config = load_config(config)?;

    let mut files: Vec<PathBuf> = fs::read_dir(annotations)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        })
        .collect();
    files.sort();

    let mut failed = 0usize;
    for file in &files {
        if let Err(e) = render_one(file, out_dir, None, &config) {
            warn!(file = %file.display(), error = %e, "skipped");
            failed += 1;
        }
    }
    info!(total = files.len(), failed, "batch finished");
    Ok(())
}

fn run_inspect(annotation: &Path) -> CliResult<()> {
    let set = read_annotation_file(annotation)?;
    println!(
        "{} ({}x{}, tool {})",
        annotation.display(),
        set.image_width(),
        set.image_height(),
        set.tool_version()
    );
    match set.vanishing_point() {
        Some((x, y)) => println!("vp: ({x:.1}, {y:.1})"),
        None => println!("vp: none"),
    }
    for (i, lane) in set.lanes().iter().enumerate() {
        println!(
            "lane {i:3}: {:<28} points {:3} occlusions {}",
            lane.info().to_string(),
            lane.len(),
            lane.occlusions().len()
        );
    }
    for (i, boundary) in set.boundaries().iter().enumerate() {
        println!(
            "boundary {i:3}: {:<24} points {:3} occlusions {}",
            boundary.info().to_string(),
            boundary.len(),
            boundary.occlusions().len()
        );
    }
    for (i, marker) in set.markers().iter().enumerate() {
        println!("marking {i:3}: {} vertices {}", marker.kind(), marker.vertices().len());
    }
    Ok(())
}
