// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: measure a room on a floor plan image
//!
//! Usage:
//!   planscale <image> --scale x0,y0,x1,y1 --distance D [--unit ft] --seed x,y
//!   planscale <image> --rect x0,y0,x1,y1 --width W --height H

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use image::ImageReader;
use planscale_core::{
    CanvasLayout, ClickOutcome, Collaborators, CommandRecorder, LengthUnit, MeasureConfig,
    Point2D, Polygon, RasterImage, Session, StaticPrompt, Workflow,
};
use planscale_vision::{DetectorConfig, SeedDetector};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "planscale",
    version,
    about = "Measure room areas on floor plan images"
)]
struct Cli {
    /// Floor plan image (PNG or JPEG)
    image: PathBuf,

    /// Calibration line in image pixels: x0,y0,x1,y1
    #[arg(long = "scale", value_parser = parse_segment, requires_all = ["distance", "seed"])]
    scale: Option<[f64; 4]>,

    /// Real length of the calibration line
    #[arg(short = 'd', long = "distance")]
    distance: Option<String>,

    /// Unit of the calibration distance (m, ft, in)
    #[arg(short = 'u', long = "unit")]
    unit: Option<LengthUnit>,

    /// Point inside the room to detect: x,y
    #[arg(long = "seed", value_parser = parse_point)]
    seed: Option<Point2D>,

    /// Rectangle in image pixels: x0,y0,x1,y1 (manual workflow)
    #[arg(long = "rect", value_parser = parse_segment, conflicts_with = "scale", requires_all = ["width", "height"])]
    rect: Option<[f64; 4]>,

    /// Real width of the rectangle in feet
    #[arg(long = "width")]
    width: Option<String>,

    /// Real height of the rectangle in feet
    #[arg(long = "height")]
    height: Option<String>,

    /// JSON file with "session" and/or "detector" settings
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long = "json")]
    json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    session: MeasureConfig,
    detector: DetectorConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    scale: String,
    area: String,
    area_value: Option<f64>,
    polygon: Option<Polygon>,
    status: String,
}

fn parse_numbers<const N: usize>(value: &str) -> std::result::Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers", N));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
    }
    Ok(out)
}

fn parse_segment(value: &str) -> std::result::Result<[f64; 4], String> {
    parse_numbers::<4>(value)
}

fn parse_point(value: &str) -> std::result::Result<Point2D, String> {
    let [x, y] = parse_numbers::<2>(value)?;
    Ok(Point2D::new(x, y))
}

fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: FileConfig = serde_json::from_str(&json)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    config.session.validate()?;
    config.detector.validate()?;
    Ok(config)
}

fn load_raster(path: &Path) -> Result<RasterImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::info!(width, height, path = %path.display(), "Image loaded");
    Ok(RasterImage::new(width, height, rgba.into_raw())?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,planscale=debug".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = load_config(cli.config.as_deref())?;

    let mut config = file_config.session;
    if let Some(unit) = cli.unit {
        config.unit = unit;
    }

    let raster = load_raster(&cli.image)?;
    let layout = CanvasLayout::unscaled(raster.width() as f64, raster.height() as f64);

    let mut renderer = CommandRecorder::new();
    let mut detector = SeedDetector::new(file_config.detector)?;

    let (session, polygon) = match (cli.scale, cli.rect) {
        (Some(line), None) => {
            let seed = cli.seed.ok_or_else(|| anyhow!("--seed is required with --scale"))?;
            let distance = cli
                .distance
                .ok_or_else(|| anyhow!("--distance is required with --scale"))?;
            config.workflow = Workflow::AutoDetect;

            let mut session = Session::new(config, layout);
            session.load_image(raster, &mut renderer);
            let mut prompt = StaticPrompt::distance(distance);
            let mut host = Collaborators {
                renderer: &mut renderer,
                detector: &mut detector,
                prompt: &mut prompt,
            };

            session.begin_calibration(host.renderer)?;
            session.click(Point2D::new(line[0], line[1]), &mut host)?;
            match session.click(Point2D::new(line[2], line[3]), &mut host)? {
                ClickOutcome::Calibrated(ppu) => {
                    tracing::info!(pixels_per_unit = ppu.get(), "Scale set")
                }
                other => bail!("Calibration did not complete: {:?}", other),
            }

            session.begin_auto_detect()?;
            let polygon = match session.click(seed, &mut host)? {
                ClickOutcome::Measured { polygon, .. } => polygon,
                other => bail!("Detection did not run: {:?}", other),
            };
            (session, Some(polygon))
        }
        (None, Some(rect)) => {
            let width = cli.width.ok_or_else(|| anyhow!("--width is required with --rect"))?;
            let height = cli
                .height
                .ok_or_else(|| anyhow!("--height is required with --rect"))?;
            config.workflow = Workflow::Rectangle;

            let mut session = Session::new(config, layout);
            session.load_image(raster, &mut renderer);
            let mut prompt = StaticPrompt::dimensions(width, height);

            let start = Point2D::new(rect[0], rect[1]);
            let end = Point2D::new(rect[2], rect[3]);
            if !session.pointer_down(start, &mut renderer)? {
                bail!("Rectangle drag could not start at ({}, {})", start.x, start.y);
            }
            session.pointer_move(end, &mut renderer);
            let mut host = Collaborators {
                renderer: &mut renderer,
                detector: &mut detector,
                prompt: &mut prompt,
            };
            session
                .pointer_up(end, &mut host)?
                .ok_or_else(|| anyhow!("Rectangle was not saved"))?;
            (session, None)
        }
        _ => bail!("Pass either --scale/--distance/--seed or --rect/--width/--height"),
    };

    let report = Report {
        scale: session.scale_summary(),
        area: session.area_text(),
        area_value: session.area().map(|a| a.value),
        polygon,
        status: session.status().to_string(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Scale: {}", report.scale);
        if let Some(polygon) = &report.polygon {
            println!("Polygon ({} vertices):", polygon.points.len());
            for p in &polygon.points {
                println!("  {:.1}, {:.1}", p.x, p.y);
            }
        }
        println!("Area: {}", report.area);
    }

    Ok(())
}
