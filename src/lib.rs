//! Facebox: label maps and box rendering for a face-detection demo.
//!
//! Facebox turns a label-map definition into a category lookup table and
//! draws detections (boxes with stacked text labels) onto RGB images. Model
//! inference and camera capture live elsewhere; this crate consumes their
//! `(boxes, scores, classes)` output.
//!
//! # Modules
//!
//! - [`label_map`]: Label-map loading and the category index
//! - [`visualize`]: Box and label rendering
//! - [`detection`]: Detection records and engine-output conversion
//! - [`geometry`]: Typed boxes in pixel or normalized space
//! - [`error`]: Error types for facebox operations

pub mod detection;
pub mod error;
pub mod geometry;
pub mod label_map;
pub mod visualize;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::FaceboxError;

use label_map::{convert_label_map_to_categories, create_category_index, CategoryIndex};
use visualize::{BoxAnnotator, LabelFont, LabelStride, VisualizeOptions};

/// The facebox CLI application.
#[derive(Parser)]
#[command(name = "facebox")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the category index built from a label map.
    Categories(CategoriesArgs),
    /// Draw detections onto an image and save it as PNG.
    Annotate(AnnotateArgs),
}

/// Arguments for the categories subcommand.
#[derive(clap::Args)]
struct CategoriesArgs {
    /// Label map file (text or binary protobuf).
    #[arg(env = "FACEBOX_LABEL_MAP")]
    label_map: PathBuf,

    /// Largest class id to keep.
    #[arg(long, env = "FACEBOX_MAX_CLASSES", default_value_t = 2)]
    max_classes: u32,

    /// Use `name` even when an entry has a `display_name`.
    #[arg(long)]
    no_display_name: bool,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the annotate subcommand.
#[derive(clap::Args)]
struct AnnotateArgs {
    /// Image to draw on.
    image: PathBuf,

    /// JSON file with detections in normalized coordinates.
    #[arg(long)]
    detections: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Label map file. Without one, classes are named `category_{id}`.
    #[arg(long, env = "FACEBOX_LABEL_MAP")]
    label_map: Option<PathBuf>,

    /// Largest class id to keep.
    #[arg(long, env = "FACEBOX_MAX_CLASSES", default_value_t = 2)]
    max_classes: u32,

    /// Detections must score above this to be drawn.
    #[arg(long, default_value_t = 0.5)]
    min_score: f32,

    /// Only the first N detections are considered.
    #[arg(long, default_value_t = 20)]
    max_boxes: usize,

    /// Box outline width in pixels.
    #[arg(long, default_value_t = 4)]
    thickness: u32,

    /// Font file name or path for labels.
    #[arg(long, env = "FACEBOX_FONT", default_value = visualize::DEFAULT_FONT_NAME)]
    font: String,

    /// Mirror the image horizontally before drawing.
    #[arg(long)]
    mirror: bool,

    /// Stack labels without overlapping their backgrounds.
    #[arg(long)]
    padded_labels: bool,
}

/// Run the facebox CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), FaceboxError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Categories(args)) => run_categories(args),
        Some(Commands::Annotate(args)) => run_annotate(args),
        None => {
            println!("facebox {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Label maps and box rendering for face detection.");
            println!();
            println!("Run 'facebox --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the categories subcommand.
fn run_categories(args: CategoriesArgs) -> Result<(), FaceboxError> {
    if !matches!(args.output.as_str(), "text" | "json") {
        return Err(FaceboxError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            args.output
        )));
    }

    let index = CategoryIndex::from_label_map_file(
        &args.label_map,
        args.max_classes,
        !args.no_display_name,
    )?;

    if args.output == "json" {
        let json = serde_json::to_string_pretty(&index).map_err(FaceboxError::JsonOutput)?;
        println!("{}", json);
    } else {
        for category in index.iter() {
            println!("{}\t{}", category.id, category.name);
        }
    }

    Ok(())
}

/// Execute the annotate subcommand.
fn run_annotate(args: AnnotateArgs) -> Result<(), FaceboxError> {
    let mut image = image::open(&args.image)
        .map_err(|source| FaceboxError::Image {
            path: args.image.clone(),
            source,
        })?
        .to_rgb8();

    if args.mirror {
        image::imageops::flip_horizontal_in_place(&mut image);
    }

    let category_index = match &args.label_map {
        Some(path) => CategoryIndex::from_label_map_file(path, args.max_classes, true)?,
        None => create_category_index(&convert_label_map_to_categories(
            None,
            args.max_classes,
            true,
        )),
    };

    let detections = detection::read_detections_json(&args.detections)?;
    tracing::debug!(
        count = detections.len(),
        categories = category_index.len(),
        "loaded detections"
    );

    let annotator = BoxAnnotator::with_font(LabelFont::load_or_default(
        &args.font,
        visualize::DEFAULT_FONT_SIZE,
    ));
    let options = VisualizeOptions {
        max_boxes_to_draw: Some(args.max_boxes),
        min_score_thresh: args.min_score,
        agnostic_mode: false,
        line_thickness: args.thickness,
        label_stride: if args.padded_labels {
            LabelStride::Padded
        } else {
            LabelStride::Compatible
        },
    };
    let drawn = annotator.visualize_detections(&mut image, &detections, &category_index, &options);

    visualize::save_image_as_png(&image, &args.out)?;
    println!("Drew {} box(es) to {}", drawn, args.out.display());

    Ok(())
}
