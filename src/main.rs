use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use docraster::fade::{self, FadeOptions};
use docraster::sheet::{self, SheetMode};
use docraster::tail::{self, TailOptions};
use docraster::{AlphaMode, Background, Direction};

/// PDF page rendering, image merging and spreadsheet conversion
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the last two pages of a PDF and merge them both ways
    Tail {
        /// PDF file to process
        pdf: PathBuf,

        /// Output directory (defaults to the PDF's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Render zoom factor (1.0 = 72 dpi)
        #[arg(short, long, default_value_t = tail::DEFAULT_SCALE)]
        scale: f32,

        /// Canvas background color (hex or name)
        #[arg(short, long, default_value = "white")]
        background: Background,

        /// Alpha handling: discard or blend
        #[arg(short, long, default_value = "discard")]
        alpha: AlphaMode,
    },

    /// Merge two images onto one canvas
    Merge {
        /// First image (left or top)
        first: PathBuf,

        /// Second image (right or bottom)
        second: PathBuf,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,

        /// Layout direction: horizontal or vertical
        #[arg(short, long, default_value = "horizontal")]
        direction: Direction,

        /// Canvas background color (hex or name)
        #[arg(short, long, default_value = "white")]
        background: Background,

        /// Alpha handling: discard or blend
        #[arg(short, long, default_value = "discard")]
        alpha: AlphaMode,
    },

    /// Render a single PDF page to PNG
    Render {
        /// PDF file to render
        pdf: PathBuf,

        /// One-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Output resolution
        #[arg(short, long, default_value_t = fade::DEFAULT_DPI)]
        dpi: u32,

        /// Output PNG path (defaults to the PDF path with .png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the first PDF page as a translucent PNG
    Fade {
        /// PDF file to render
        pdf: PathBuf,

        /// Output resolution
        #[arg(short, long, default_value_t = fade::DEFAULT_DPI)]
        dpi: u32,

        /// Opacity of the result (0.0 - 1.0)
        #[arg(long, default_value_t = fade::DEFAULT_OPACITY)]
        opacity: f32,

        /// Output PNG path (defaults to {name}_transparent.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Delete the plain intermediate render afterwards
        #[arg(long, default_value_t = false)]
        discard_intermediate: bool,
    },

    /// Convert every .xlsx file in a folder to CSV
    Sheets {
        /// Folder to scan for .xlsx files
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Folder for CSV output (defaults to the input folder)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Convert every sheet instead of only the first
        #[arg(long, default_value_t = false)]
        all_sheets: bool,
    },
}

fn require_file(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("file not found: {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!("Document Raster Tools");
    println!("=====================");

    match args.command {
        Command::Tail {
            pdf,
            output_dir,
            scale,
            background,
            alpha,
        } => {
            require_file(&pdf)?;
            println!("Input PDF:       {}", pdf.display());
            println!("Scale:           {}", scale);
            println!();

            let options = TailOptions {
                output_dir,
                scale,
                background,
                alpha,
            };
            let report = tail::run(&pdf, &options)
                .with_context(|| format!("failed to extract pages from {}", pdf.display()))?;

            println!();
            for page in &report.pages {
                println!("✓ Page:          {}", page.display());
            }
            for (direction, path) in &report.merged {
                println!("✓ Merged ({}): {}", direction, path.display());
            }
            for (direction, reason) in &report.failed {
                println!("✗ Merge ({}) failed: {}", direction, reason);
            }
        }

        Command::Merge {
            first,
            second,
            output,
            direction,
            background,
            alpha,
        } => {
            require_file(&first)?;
            require_file(&second)?;
            println!("Images:          {} + {}", first.display(), second.display());
            println!("Direction:       {}", direction);
            println!();

            tail::merge_files(&first, &second, &output, direction, background, alpha)
                .with_context(|| format!("failed to merge into {}", output.display()))?;

            println!("✓ Merged image:  {}", output.display());
        }

        Command::Render {
            pdf,
            page,
            dpi,
            output,
        } => {
            require_file(&pdf)?;
            if page == 0 {
                bail!("page numbers start at 1");
            }
            println!("Input PDF:       {}", pdf.display());
            println!("Page:            {}", page);
            println!("DPI:             {}", dpi);
            println!();

            let out = fade::render_to_png(&pdf, page - 1, dpi, output.as_deref())
                .with_context(|| format!("failed to render {}", pdf.display()))?;

            println!("✓ PNG:           {}", out.display());
        }

        Command::Fade {
            pdf,
            dpi,
            opacity,
            output,
            discard_intermediate,
        } => {
            require_file(&pdf)?;
            println!("Input PDF:       {}", pdf.display());
            println!("DPI:             {}", dpi);
            println!("Opacity:         {}", opacity);
            println!();

            let options = FadeOptions {
                dpi,
                opacity,
                output,
                keep_intermediate: !discard_intermediate,
            };
            let result = fade::fade_pdf(&pdf, &options)
                .with_context(|| format!("failed to fade {}", pdf.display()))?;

            println!("✓ Translucent:   {}", result.faded.display());
            if let Some(plain) = &result.intermediate {
                println!("✓ Plain render:  {}", plain.display());
            }
        }

        Command::Sheets {
            input,
            output,
            all_sheets,
        } => {
            let mode = if all_sheets {
                SheetMode::All
            } else {
                SheetMode::First
            };
            println!("Input folder:    {}", input.display());
            println!();

            let report = sheet::convert_folder(&input, output.as_deref(), mode)
                .with_context(|| format!("failed to scan {}", input.display()))?;

            for (workbook, csv) in &report.converted {
                println!("✓ {} -> {}", workbook.display(), csv.display());
            }
            for (workbook, reason) in &report.failed {
                println!("✗ {}: {}", workbook.display(), reason);
            }
            println!();
            println!(
                "Converted {} sheet(s), {} failure(s)",
                report.converted.len(),
                report.failed.len()
            );
        }
    }

    Ok(())
}
