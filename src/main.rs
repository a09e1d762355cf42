//! seismap - seismic event map tiles and focal-mechanism geometry from your
//! terminal.
//!
//! Projects epicenters onto a quadkey tile set, resolves tile images, and
//! builds beach-ball geometry for events in a local catalog export.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{debug, error, info};

use seismap::catalog::EventCatalog;
use seismap::config::AppConfig;
use seismap::filters::{DateRange, EventFilter};
use seismap::focal::{FocalMechanism, Point2D};
use seismap::markers::{MapMarker, place_markers};
use seismap::output::{self, EventDetail, OutputEvent, ProjectionReport, TileReport};
use seismap::projection::GeoCoordinate;
use seismap::tiles::{TileAddress, TileMapper, TileSource, tile_address_from_pixel};

mod cli;

use cli::{CanvasArgs, CatalogArgs, Cli, Command};

/// Deepest level `grid` will enumerate (4^10 tiles).
const MAX_GRID_ZOOM: i64 = 10;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let config = load_config(&cli)?;
    let mapper = config.mapper().context("invalid tile configuration")?;
    let ctx = App { config, mapper };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::Project(args) => cmd_project(&ctx, &mut handle, &args),
        Command::Tile(args) => cmd_tile(&ctx, &mut handle, &args),
        Command::Quadkey(args) => cmd_quadkey(&ctx, &mut handle, &args),
        Command::Grid(args) => cmd_grid(&ctx, &mut handle, &args),
        Command::Beachball(args) => cmd_beachball(&ctx, &mut handle, &args),
        Command::Events(args) => cmd_events(&ctx, &mut handle, &args),
        Command::Markers(args) => cmd_markers(&ctx, &mut handle, &args),
        Command::Show(args) => cmd_show(&ctx, &mut handle, &args),
    }?;

    handle.flush()?;
    Ok(())
}

/// Resolved configuration shared by every command.
struct App {
    config: AppConfig,
    mapper: TileMapper,
}

impl App {
    fn tiles(&self) -> TileSource {
        self.config.tile_source()
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Config file (if any) with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(dir) = &cli.map_dir {
        config.map_directory.clone_from(dir);
    }
    config.validate()?;

    debug!(
        "config: tiles in {} ({}px, max zoom {}), theme {}",
        config.map_directory.display(),
        config.tile_size,
        config.max_zoom,
        config.theme.as_str()
    );
    Ok(config)
}

/// Build the event filter from catalog args.
fn build_filter(args: &CatalogArgs) -> Result<EventFilter> {
    let date_range = match (args.from, args.to) {
        (None, None) => None,
        (from, to) => {
            let end = to.unwrap_or_else(|| Utc::now().date_naive());
            let start = from.unwrap_or_else(|| DateRange::last_day(end).start);
            Some(DateRange::new(start, end).map_err(anyhow::Error::msg)?)
        }
    };

    Ok(EventFilter {
        min_magnitude: args.min_magnitude,
        max_depth: args.max_depth,
        bbox: args.bbox,
        date_range,
        search: args.search.clone(),
    })
}

fn load_catalog(path: &std::path::Path) -> Result<EventCatalog> {
    EventCatalog::from_path(path)
        .with_context(|| format!("failed to load catalog {}", path.display()))
}

fn canvas_center(canvas: CanvasArgs) -> Point2D {
    Point2D::new(canvas.cx, canvas.cy)
}

/// Execute the `project` command.
fn cmd_project<W: Write>(ctx: &App, out: &mut W, args: &cli::ProjectArgs) -> Result<()> {
    let coordinate = GeoCoordinate::new(args.lat, args.lon);
    let pixel = ctx.mapper.project(coordinate, args.zoom)?;
    let zoom = ctx.mapper.zoom(args.zoom)?;
    let tile = tile_address_from_pixel(pixel, zoom, ctx.mapper.tile_size());
    let viewport = match args.viewport {
        Some(v) => ctx
            .mapper
            .viewport_tiles(coordinate, args.zoom, v.width, v.height)?,
        None => Vec::new(),
    };

    let report = ProjectionReport {
        coordinate,
        zoom,
        pixel,
        tile,
        quad_key: tile.quad_key(),
        image: ctx.tiles().locate(tile),
        viewport,
    };
    output::write_projection(out, &report, args.format)?;
    Ok(())
}

fn tile_report(ctx: &App, source: &TileSource, tile: TileAddress) -> Result<TileReport> {
    Ok(TileReport {
        tile,
        quad_key: tile.quad_key(),
        bounds: ctx.mapper.bounds(tile)?,
        image: source.locate(tile),
    })
}

/// Execute the `tile` command.
fn cmd_tile<W: Write>(ctx: &App, out: &mut W, args: &cli::TileArgs) -> Result<()> {
    let zoom = ctx.mapper.zoom(args.zoom)?;
    let tile = TileAddress::new(zoom, args.x, args.y)?;
    output::write_tiles(out, &[tile_report(ctx, &ctx.tiles(), tile)?], args.format)?;
    Ok(())
}

/// Execute the `quadkey` command.
fn cmd_quadkey<W: Write>(ctx: &App, out: &mut W, args: &cli::QuadkeyArgs) -> Result<()> {
    let tile = TileAddress::from_quad_key(args.key.trim())?;
    ctx.mapper.zoom(i64::from(tile.zoom))?;
    output::write_tiles(out, &[tile_report(ctx, &ctx.tiles(), tile)?], args.format)?;
    Ok(())
}

/// Reports for every tile of a level, optionally only the missing ones.
fn grid_reports(ctx: &App, source: &TileSource, zoom: i64, missing_only: bool) -> Result<Vec<TileReport>> {
    let grid = ctx.mapper.grid(zoom)?;
    if zoom > MAX_GRID_ZOOM {
        anyhow::bail!("grid listing is limited to zoom {MAX_GRID_ZOOM} (requested {zoom})");
    }

    let mut reports = Vec::new();
    for tile in grid {
        let report = tile_report(ctx, source, tile)?;
        if !missing_only || report.image.is_placeholder() {
            reports.push(report);
        }
    }
    Ok(reports)
}

/// Execute the `grid` command.
fn cmd_grid<W: Write>(ctx: &App, out: &mut W, args: &cli::GridArgs) -> Result<()> {
    let source = ctx.tiles();
    let reports = grid_reports(ctx, &source, args.zoom, args.missing)?;

    let missing = reports.iter().filter(|r| r.image.is_placeholder()).count();
    info!(
        "zoom {}: {} tiles listed, {} missing in {}",
        args.zoom,
        reports.len(),
        missing,
        source.directory().display()
    );
    output::write_tiles(out, &reports, args.format)?;
    Ok(())
}

/// Execute the `beachball` command.
fn cmd_beachball<W: Write>(ctx: &App, out: &mut W, args: &cli::BeachballArgs) -> Result<()> {
    let mechanism = FocalMechanism::new(args.strike, args.dip, args.slip);
    let ball = mechanism.beach_ball(canvas_center(args.canvas), args.canvas.radius);
    output::write_beach_ball(out, &ball, args.format, ctx.config.theme)?;
    Ok(())
}

/// Execute the `events` command.
fn cmd_events<W: Write>(ctx: &App, out: &mut W, args: &cli::EventsArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let filter = build_filter(&args.catalog)?;

    let mut events = catalog.filter(&filter);
    debug!("{} of {} events match", events.len(), catalog.len());
    events.truncate(args.limit);

    output::write_events(out, &events, args.format, ctx.config.theme)?;
    Ok(())
}

/// Execute the `markers` command.
fn cmd_markers<W: Write>(ctx: &App, out: &mut W, args: &cli::MarkersArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let filter = build_filter(&args.catalog)?;

    let markers = place_markers(catalog.filter(&filter), &ctx.mapper, args.zoom)
        .context("failed to place markers")?;
    output::write_markers(out, &markers, args.format)?;
    Ok(())
}

/// Execute the `show` command - the selected-event panel.
fn cmd_show<W: Write>(ctx: &App, out: &mut W, args: &cli::ShowArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let event = catalog.get(&args.id)?;

    let marker = MapMarker::place(event, &ctx.mapper, args.zoom)?;
    let beach_ball = event
        .focal_mechanism()
        .beach_ball(canvas_center(args.canvas), args.canvas.radius);

    let detail = EventDetail {
        event: OutputEvent::from(event),
        summary: event.summary(),
        marker,
        beach_ball,
    };
    output::write_event_detail(out, &detail, args.format, ctx.config.theme)?;
    Ok(())
}
