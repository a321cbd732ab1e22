use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use pixview_core::{
    gallery, Adjustments, Config, CropRegion, Document, Edit, ImageProcessor, ImageSize,
    PixView, Point, ResizeTarget, Screen, ViewportSize,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Image viewer with zoom, crop and undoable edits", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Image to open in the viewer when no subcommand is given
    path: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Flags layered over the `PIXVIEW_*` environment configuration.
#[derive(ClapArgs, Debug, Default)]
struct Overrides {
    /// Cap how far fit-to-window may enlarge small images (e.g. 1.5)
    #[arg(long, global = true)]
    upscale_cap: Option<f64>,

    /// Smallest crop side, in screen pixels, that counts as a selection
    #[arg(long, global = true)]
    min_selection: Option<f64>,

    /// Number of undo steps kept per image
    #[arg(long, global = true)]
    history: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the viewer window (default)
    View {
        /// Image to open
        path: Option<PathBuf>,
    },
    /// Print the render size of an image inside a viewport
    Layout {
        /// Source image size, e.g. 1920x1080
        #[arg(long)]
        image: ImageSize,
        /// Viewport size, e.g. 800x600
        #[arg(long)]
        viewport: ViewportSize,
        /// Manual zoom factor; fit-to-window when omitted
        #[arg(long)]
        zoom: Option<f64>,
    },
    /// Crop an image with a drag given in viewport coordinates
    Crop {
        input: PathBuf,
        output: PathBuf,
        /// Viewport size the drag was made in, e.g. 1000x500
        #[arg(long)]
        viewport: ViewportSize,
        /// Drag start, e.g. 400,100
        #[arg(long)]
        from: Point<Screen>,
        /// Drag end, e.g. 600,300
        #[arg(long)]
        to: Point<Screen>,
        /// Manual zoom factor; fit-to-window when omitted
        #[arg(long)]
        zoom: Option<f64>,
    },
    /// Apply a sequence of edits and save the result
    Edit {
        input: PathBuf,
        output: PathBuf,
        /// Edits, applied in order
        #[arg(required = true, value_enum)]
        ops: Vec<EditOp>,
        /// Brightness for `adjust` (-100..=100)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        brightness: f32,
        /// Contrast for `adjust` (-100..=100)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        contrast: f32,
        /// Gamma for `adjust`
        #[arg(long, default_value_t = 1.0)]
        gamma: f32,
        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,
    },
    /// Resize an image, keeping the aspect ratio unless both sides are given
    Resize {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long, conflicts_with_all = ["width", "height"])]
        percent: Option<f64>,
        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,
    },
    /// List the supported images in a folder, in navigation order
    List { dir: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EditOp {
    RotateLeft,
    RotateRight,
    Rotate180,
    FlipH,
    FlipV,
    Grayscale,
    Sepia,
    Invert,
    Blur,
    Sharpen,
    Adjust,
}

impl EditOp {
    fn to_edit(self, adjustments: Adjustments) -> Edit {
        match self {
            Self::RotateLeft => Edit::RotateLeft,
            Self::RotateRight => Edit::RotateRight,
            Self::Rotate180 => Edit::Rotate180,
            Self::FlipH => Edit::FlipHorizontal,
            Self::FlipV => Edit::FlipVertical,
            Self::Grayscale => Edit::Grayscale,
            Self::Sepia => Edit::Sepia,
            Self::Invert => Edit::Invert,
            Self::Blur => Edit::Blur { sigma: 2.0 },
            Self::Sharpen => Edit::Sharpen {
                sigma: 1.5,
                threshold: 2,
            },
            Self::Adjust => Edit::Adjust(adjustments),
        }
    }
}

impl Args {
    /// Resolves the bare `pixview [PATH]` form to `view`.
    fn into_command(self) -> Result<Command> {
        match (self.command, self.path) {
            (Some(command), None) => Ok(command),
            (None, path) => Ok(Command::View { path }),
            (Some(_), Some(path)) => bail!(
                "unexpected argument {} before the subcommand",
                path.display()
            ),
        }
    }
}

fn build_config(overrides: &Overrides) -> Result<Config> {
    let mut builder = Config::load()
        .context("Failed to load configuration")?
        .into_builder();
    if let Some(cap) = overrides.upscale_cap {
        builder = builder.with_fit_upscale_cap(Some(cap));
    }
    if let Some(v) = overrides.min_selection {
        builder = builder.with_min_selection(v);
    }
    if let Some(v) = overrides.history {
        builder = builder.with_history_depth(v);
    }
    Ok(builder.build()?)
}

fn main() -> Result<()> {
    // Setup
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixview=info")),
        )
        .with_target(false)
        .init();
    let args = Args::parse();

    let config = build_config(&args.overrides)?;
    debug!(?config, "configuration loaded");
    let app = PixView::with_config(config);

    match args.into_command()? {
        Command::View { path } => {
            app.run_viewer(path).context("Viewer failed")?;
        }
        Command::Layout {
            image,
            viewport,
            zoom,
        } => {
            let plan = app.layout(image, viewport, zoom)?;
            println!("{} ({}%)", plan.size, plan.percent());
        }
        Command::Crop {
            input,
            output,
            viewport,
            from,
            to,
            zoom,
        } => {
            let mut doc = app
                .open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let region: CropRegion = app
                .map_crop(doc.size(), viewport, zoom, from, to)
                .context("Selection does not cover the image")?;
            info!(%region, "cropping");
            doc.commit_crop(region)?;
            save(&mut doc, &output, None)?;
            println!("{region}");
        }
        Command::Edit {
            input,
            output,
            ops,
            brightness,
            contrast,
            gamma,
            quality,
        } => {
            let adjustments = Adjustments {
                brightness,
                contrast,
                gamma,
            };
            let mut doc = app
                .open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            for op in ops {
                let edit = op.to_edit(adjustments);
                doc.apply(edit)
                    .with_context(|| format!("Failed to apply {edit}"))?;
            }
            save(&mut doc, &output, quality)?;
        }
        Command::Resize {
            input,
            output,
            width,
            height,
            percent,
            quality,
        } => {
            let target = match (width, height, percent) {
                (Some(width), Some(height), _) => ResizeTarget::Exact { width, height },
                (Some(w), None, _) => ResizeTarget::Width(w),
                (None, Some(h), _) => ResizeTarget::Height(h),
                (None, None, Some(p)) => ResizeTarget::Percent(p),
                (None, None, None) => bail!("one of --width, --height or --percent is required"),
            };
            let doc = app
                .open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let (w, h) = doc.dimensions();
            let (nw, nh) = ImageProcessor::resized_dimensions(w, h, target)?;
            doc.export_resized(&output, nw, nh, quality)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{w}x{h} -> {nw}x{nh}");
        }
        Command::List { dir } => {
            let files = gallery::scan_folder(&dir)
                .with_context(|| format!("Failed to read {}", dir.display()))?;
            for file in files {
                println!("{}", file.display());
            }
        }
    }

    Ok(())
}

fn save(doc: &mut Document, output: &Path, quality: Option<u8>) -> Result<()> {
    doc.save_as(output, quality)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(path = %output.display(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn overrides_parse_before_and_after_subcommand() {
        for argv in [
            &["pixview", "--history", "5", "layout", "--image", "1920x1080", "--viewport", "800x600"][..],
            &["pixview", "layout", "--image", "1920x1080", "--viewport", "800x600", "--history", "5"][..],
        ] {
            let args = Args::try_parse_from(argv).unwrap();
            assert_eq!(args.overrides.history, Some(5));
            match args.into_command().unwrap() {
                Command::Layout { image, viewport, zoom } => {
                    assert_eq!(image, ImageSize::new(1920.0, 1080.0));
                    assert_eq!(viewport, ViewportSize::new(800.0, 600.0));
                    assert_eq!(zoom, None);
                }
                other => panic!("expected layout, got {other:?}"),
            }
        }
    }

    #[test]
    fn bare_path_opens_the_viewer() {
        let args = Args::try_parse_from(["pixview", "--upscale-cap", "2", "photo.jpg"]).unwrap();
        assert_eq!(args.overrides.upscale_cap, Some(2.0));
        match args.into_command().unwrap() {
            Command::View { path } => assert_eq!(path, Some(PathBuf::from("photo.jpg"))),
            other => panic!("expected view, got {other:?}"),
        }

        let args = Args::try_parse_from(["pixview"]).unwrap();
        assert!(matches!(args.into_command().unwrap(), Command::View { path: None }));
    }
}
