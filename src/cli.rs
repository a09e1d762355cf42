//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use seismap::filters::{BBox, parse_date};
use seismap::output::Format;
use seismap::theme::Theme;

/// Seismic event map tiles and focal-mechanism geometry.
#[derive(Parser, Debug)]
#[command(name = "seismap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Theme override (dark, light, dark-transparent, light-transparent)
    #[arg(long, global = true, value_parser = parse_theme)]
    pub theme: Option<Theme>,

    /// Tile directory override
    #[arg(long, global = true)]
    pub map_dir: Option<PathBuf>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Project a coordinate onto the tile map
    Project(ProjectArgs),

    /// Look up one tile by zoom/x/y
    Tile(TileArgs),

    /// Decode a quadkey into its tile address
    Quadkey(QuadkeyArgs),

    /// List every tile of a zoom level
    Grid(GridArgs),

    /// Build beach-ball geometry for a focal mechanism
    Beachball(BeachballArgs),

    /// List events from a catalog
    Events(EventsArgs),

    /// Place catalog events as map markers
    Markers(MarkersArgs),

    /// Show one event with its marker and beach ball
    Show(ShowArgs),
}

/// Arguments for the `project` command.
#[derive(Parser, Debug)]
pub struct ProjectArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Zoom level
    #[arg(long, short = 'z', default_value = "0", allow_negative_numbers = true)]
    pub zoom: i64,

    /// Also list the tiles a WIDTHxHEIGHT pixel viewport centred here needs
    #[arg(long, value_parser = parse_viewport)]
    pub viewport: Option<Viewport>,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Arguments for the `tile` command.
#[derive(Parser, Debug)]
pub struct TileArgs {
    /// Zoom level
    #[arg(long, short = 'z', allow_negative_numbers = true)]
    pub zoom: i64,

    /// Tile column
    #[arg(long)]
    pub x: u32,

    /// Tile row
    #[arg(long)]
    pub y: u32,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `quadkey` command.
#[derive(Parser, Debug)]
pub struct QuadkeyArgs {
    /// Base-4 key, e.g. 0213 (empty string for the root tile)
    pub key: String,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `grid` command.
#[derive(Parser, Debug)]
pub struct GridArgs {
    /// Zoom level
    #[arg(long, short = 'z', allow_negative_numbers = true)]
    pub zoom: i64,

    /// Only list tiles whose image is missing
    #[arg(long)]
    pub missing: bool,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `beachball` command.
#[derive(Parser, Debug)]
pub struct BeachballArgs {
    /// Strike in degrees (clockwise from north)
    #[arg(long, allow_negative_numbers = true)]
    pub strike: f64,

    /// Dip in degrees
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub dip: f64,

    /// Slip (rake) in degrees
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub slip: f64,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Drawing surface placement for a beach ball.
#[derive(Args, Debug, Clone, Copy)]
pub struct CanvasArgs {
    /// Ball radius in pixels
    #[arg(long, default_value = "60")]
    pub radius: f64,

    /// Center x in pixels
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub cx: f64,

    /// Center y in pixels
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub cy: f64,
}

/// Catalog selection shared by the event commands.
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Event catalog (JSON array or NDJSON)
    #[arg(long, short = 'c')]
    pub catalog: PathBuf,

    /// Minimum magnitude to show
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Maximum depth in km to show
    #[arg(long)]
    pub max_depth: Option<f64>,

    /// Bounding box filter: minlat,minlon,maxlat,maxlon
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: Option<BBox>,

    /// First day of the date range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Text search over magnitude, latitude and longitude
    #[arg(long, allow_hyphen_values = true)]
    pub search: Option<String>,
}

/// Arguments for the `events` command.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `markers` command.
#[derive(Parser, Debug)]
pub struct MarkersArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Zoom level
    #[arg(long, short = 'z', default_value = "0", allow_negative_numbers = true)]
    pub zoom: i64,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Event catalog (JSON array or NDJSON)
    #[arg(long, short = 'c')]
    pub catalog: PathBuf,

    /// Event ID to select
    #[arg(long)]
    pub id: String,

    /// Zoom level for the map marker
    #[arg(long, short = 'z', default_value = "0", allow_negative_numbers = true)]
    pub zoom: i64,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a theme from string.
fn parse_theme(s: &str) -> Result<Theme, String> {
    s.parse()
}

/// Parse a `WIDTHxHEIGHT` viewport size.
fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid viewport '{s}' (expected WIDTHxHEIGHT)"))?;
    let dim = |v: &str| -> Result<f64, String> {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n > 0.0)
            .ok_or_else(|| format!("invalid viewport '{s}': '{v}' is not a positive size"))
    };
    Ok(Viewport {
        width: dim(w)?,
        height: dim(h)?,
    })
}

/// Parse a bounding box from string.
fn parse_bbox(s: &str) -> Result<BBox, String> {
    s.parse()
}
