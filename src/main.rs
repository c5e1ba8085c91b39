use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use qiraster::codec::PngCodec;
use qiraster::config::RenderConfig;
use qiraster::grid::ModuleGrid;
use qiraster::helper::{grid_to_string, render_to_file, resize_file};
use qiraster::resample::Filter;

/// Paint QR module grids as PNG and resize PNG images.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a text grid ('#' dark, '.' light, one row per line) to PNG.
    Render {
        /// Text grid file.
        grid: PathBuf,
        /// Output PNG.
        output: PathBuf,
        /// TOML render configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Pixels per module, overrides the config.
        #[arg(long)]
        scale: Option<u32>,
        /// Resize to WIDTHxHEIGHT, overrides the config.
        #[arg(long, value_parser = parse_size)]
        size: Option<(u32, u32)>,
        /// Print the grid to the console as well.
        #[arg(long, default_value_t = false)]
        preview: bool,
    },
    /// Resize a PNG to WIDTHxHEIGHT.
    Resize {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_parser = parse_size)]
        size: (u32, u32),
        /// auto, tent or box.
        #[arg(long, default_value = "auto", value_parser = parse_filter)]
        filter: Filter,
    },
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}

fn parse_filter(s: &str) -> Result<Filter, String> {
    match s.to_ascii_lowercase().as_str() {
        "auto" => Ok(Filter::Auto),
        "tent" | "linear" => Ok(Filter::Tent),
        "box" | "area" => Ok(Filter::Box),
        other => Err(format!("unknown filter '{other}'")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    match cli.command {
        Command::Render {
            grid,
            output,
            config,
            scale,
            size,
            preview,
        } => {
            let mut render = match config {
                Some(path) => RenderConfig::from_file(&path)?,
                None => RenderConfig::default(),
            };
            if let Some(scale) = scale {
                render.scale = scale;
            }
            if let Some((w, h)) = size {
                render.target_width = Some(w);
                render.target_height = Some(h);
            }
            let text = std::fs::read_to_string(&grid)
                .with_context(|| format!("reading grid {}", grid.display()))?;
            let grid = ModuleGrid::parse(&text)
                .with_context(|| format!("parsing grid {}", grid.display()))?;
            if preview {
                print!("{}", grid_to_string(&grid, 4));
            }
            render_to_file(&grid, &render, &PngCodec, &output)
                .with_context(|| format!("rendering {}", output.display()))?;
        }
        Command::Resize {
            input,
            output,
            size: (w, h),
            filter,
        } => {
            if w == 0 || h == 0 {
                bail!("target size must be at least 1x1");
            }
            resize_file(&PngCodec, &input, &output, w, h, filter)
                .with_context(|| format!("resizing {} to {}", input.display(), output.display()))?;
        }
    }
    Ok(())
}
