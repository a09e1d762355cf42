//! Output formatters.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::focal::{BeachBall, PathCommand};
use crate::markers::{MagnitudeColor, MapMarker, marker_radius};
use crate::models::SeismicEvent;
use crate::projection::{GeoCoordinate, PixelPoint};
use crate::theme::{Rgba, Theme};
use crate::tiles::{QuadKey, TileAddress, TileBounds, TileImage};

// ANSI escape codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const ICON_QUAKE: &str = "🌍";
const ICON_TILE: &str = "■";
const ICON_MISSING: &str = "▫";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Truecolor foreground escape.
fn fg(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{r};{g};{b}m")
}

fn magnitude_fg(color: MagnitudeColor) -> String {
    let (r, g, b) = color.rgb();
    fg(r, g, b)
}

fn theme_fg(color: Rgba) -> String {
    fg(color.r, color.g, color.b)
}

/// Truecolor background escape. Alpha is ignored by terminals.
fn theme_bg(color: Rgba) -> String {
    format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

/// Get severity label for magnitude.
fn magnitude_label(mag: f64) -> &'static str {
    match mag {
        m if m >= 7.0 => "MAJOR",
        m if m >= 6.0 => "STRONG",
        m if m >= 5.0 => "MODERATE",
        m if m >= 4.0 => "LIGHT",
        m if m >= 3.0 => "MINOR",
        _ => "MICRO",
    }
}

fn json_error(e: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Pretty JSON document.
fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(json_error)?;
    writeln!(writer, "{json}")
}

/// One compact JSON object per line.
fn write_ndjson<W: Write, T: Serialize>(writer: &mut W, items: &[T]) -> io::Result<()> {
    for item in items {
        let json = serde_json::to_string(item).map_err(json_error)?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Normalized event structure emitted in JSON/NDJSON output.
#[derive(Debug, Clone, Serialize)]
pub struct OutputEvent {
    pub id: String,
    pub time: String,
    pub magnitude: f64,
    pub depth_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub strike: f64,
    pub dip: f64,
    pub slip: f64,
    pub region: &'static str,
    pub color: MagnitudeColor,
    pub marker_radius: f64,
}

impl From<&SeismicEvent> for OutputEvent {
    fn from(e: &SeismicEvent) -> Self {
        Self {
            id: e.event_id.clone(),
            time: e.origin_time.to_rfc3339(),
            magnitude: e.magnitude,
            depth_km: e.depth_km,
            latitude: e.latitude,
            longitude: e.longitude,
            strike: e.strike,
            dip: e.dip,
            slip: e.slip,
            region: e.region(),
            color: MagnitudeColor::from_magnitude(e.magnitude),
            marker_radius: marker_radius(e.magnitude),
        }
    }
}

/// Where a coordinate lands on the map.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub coordinate: GeoCoordinate,
    pub zoom: u8,
    pub pixel: PixelPoint,
    pub tile: TileAddress,
    pub quad_key: QuadKey,
    pub image: TileImage,
    /// Tiles covering the requested viewport around the coordinate
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub viewport: Vec<TileAddress>,
}

/// One tile and its lookup result.
#[derive(Debug, Clone, Serialize)]
pub struct TileReport {
    pub tile: TileAddress,
    pub quad_key: QuadKey,
    pub bounds: TileBounds,
    pub image: TileImage,
}

/// Everything shown for a selected event.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: OutputEvent,
    pub summary: String,
    pub marker: MapMarker,
    pub beach_ball: BeachBall,
}

/// Write events in human-readable format, color-coded by magnitude.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human_events<W: Write>(writer: &mut W, events: &[&SeismicEvent], theme: Theme) -> io::Result<()> {
    let palette = theme.palette();
    let accent = theme_fg(palette.accent);
    let sep = format!("{}│{RESET}", theme_fg(palette.border));
    for event in events {
        let color = magnitude_fg(MagnitudeColor::from_magnitude(event.magnitude));
        let label = magnitude_label(event.magnitude);
        let time = event.origin_time.format("%Y-%m-%d %H:%M:%S");

        writeln!(
            writer,
            "{ICON_QUAKE} {color}{BOLD}M{:.1}{RESET} {sep} \
             {color}{label:8}{RESET} {sep} \
             {DIM}{:>5.0}km{RESET} {sep} \
             {time} UTC {sep} \
             {accent}{}{RESET} {DIM}({:.3}, {:.3}) S{:.0} D{:.0} R{:.0}{RESET}",
            event.magnitude,
            event.depth_km,
            event.event_id,
            event.latitude,
            event.longitude,
            event.strike,
            event.dip,
            event.slip,
        )?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[&SeismicEvent],
    format: Format,
    theme: Theme,
) -> io::Result<()> {
    match format {
        Format::Human => write_human_events(writer, events, theme),
        Format::Json | Format::Ndjson => {
            let output: Vec<OutputEvent> = events.iter().map(|e| OutputEvent::from(*e)).collect();
            if format == Format::Json {
                write_json(writer, &output)
            } else {
                write_ndjson(writer, &output)
            }
        }
    }
}

/// Write marker placements.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_markers<W: Write>(writer: &mut W, markers: &[MapMarker], format: Format) -> io::Result<()> {
    match format {
        Format::Json => write_json(writer, markers),
        Format::Ndjson => write_ndjson(writer, markers),
        Format::Human => {
            for m in markers {
                let color = magnitude_fg(m.color);
                writeln!(
                    writer,
                    "{color}●{RESET} {BOLD}{}{RESET} M{:.1} │ px ({:.1}, {:.1}) │ tile {} │ \
                     {DIM}{}{RESET} │ r={:.1} {}",
                    m.event_id,
                    m.magnitude,
                    m.pixel.x,
                    m.pixel.y,
                    m.tile,
                    m.quad_key.file_name(),
                    m.radius,
                    m.color.as_str(),
                )?;
            }
            Ok(())
        }
    }
}

fn write_human_image<W: Write>(writer: &mut W, image: &TileImage) -> io::Result<()> {
    match image {
        TileImage::File { path } => writeln!(writer, "  file:   {}", path.display()),
        TileImage::Placeholder { path, width, height, .. } => writeln!(
            writer,
            "  file:   {} {DIM}(missing, {width}x{height} placeholder){RESET}",
            path.display()
        ),
    }
}

/// Write a projection result.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_projection<W: Write>(writer: &mut W, report: &ProjectionReport, format: Format) -> io::Result<()> {
    match format {
        Format::Json => write_json(writer, report),
        Format::Ndjson => write_ndjson(writer, std::slice::from_ref(report)),
        Format::Human => {
            writeln!(
                writer,
                "{BOLD}({:.4}, {:.4}) @ zoom {}{RESET}",
                report.coordinate.latitude, report.coordinate.longitude, report.zoom
            )?;
            writeln!(writer, "  pixel:  ({:.3}, {:.3})", report.pixel.x, report.pixel.y)?;
            writeln!(writer, "  tile:   {}", report.tile)?;
            writeln!(writer, "  key:    \"{}\"", report.quad_key)?;
            write_human_image(writer, &report.image)?;
            if !report.viewport.is_empty() {
                let tiles: Vec<String> = report.viewport.iter().map(ToString::to_string).collect();
                writeln!(writer, "  view:   {}", tiles.join(" "))?;
            }
            Ok(())
        }
    }
}

/// Write tile lookup results.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_tiles<W: Write>(writer: &mut W, tiles: &[TileReport], format: Format) -> io::Result<()> {
    match format {
        Format::Json => write_json(writer, tiles),
        Format::Ndjson => write_ndjson(writer, tiles),
        Format::Human => {
            for t in tiles {
                let marker = if t.image.is_placeholder() { ICON_MISSING } else { ICON_TILE };
                let (nw, se) = (t.bounds.north_west, t.bounds.south_east);
                writeln!(
                    writer,
                    "{marker} {:<10} {DIM}key{RESET} {:<8} {} {DIM}[{:.4}, {:.4} .. {:.4}, {:.4}]{RESET}",
                    t.tile.to_string(),
                    format!("\"{}\"", t.quad_key),
                    t.image.path().display(),
                    nw.latitude,
                    nw.longitude,
                    se.latitude,
                    se.longitude,
                )?;
            }
            Ok(())
        }
    }
}

fn write_human_beach_ball<W: Write>(writer: &mut W, ball: &BeachBall, theme: Theme) -> io::Result<()> {
    let palette = theme.palette();
    writeln!(
        writer,
        "{}{}{BOLD} {} {RESET}",
        theme_bg(palette.panel),
        theme_fg(palette.text),
        ball.label
    )?;
    writeln!(
        writer,
        "  circle:     center ({:.1}, {:.1}) r={:.1}",
        ball.center.x, ball.center.y, ball.radius
    )?;
    for (name, seg) in [("primary", &ball.planes.primary), ("auxiliary", &ball.planes.auxiliary)] {
        writeln!(
            writer,
            "  {name:<11} ({:.2}, {:.2}) → ({:.2}, {:.2})",
            seg.start.x, seg.start.y, seg.end.x, seg.end.y
        )?;
    }
    let arc = ball.compressional.commands.iter().find_map(|c| match c {
        PathCommand::ArcTo { start_angle, sweep, .. } => Some((*start_angle, *sweep)),
        _ => None,
    });
    if let Some((start, sweep)) = arc {
        writeln!(
            writer,
            "  compression: start {:.1}° sweep {:.1}°",
            start.to_degrees(),
            sweep.to_degrees()
        )?;
    }
    writeln!(
        writer,
        "  colors:     fill {} outline {} compression {}",
        palette.panel.hex(),
        palette.border.hex(),
        palette.accent.hex()
    )
}

/// Write beach-ball geometry.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_beach_ball<W: Write>(writer: &mut W, ball: &BeachBall, format: Format, theme: Theme) -> io::Result<()> {
    match format {
        Format::Json => write_json(writer, ball),
        Format::Ndjson => write_ndjson(writer, std::slice::from_ref(ball)),
        Format::Human => write_human_beach_ball(writer, ball, theme),
    }
}

/// Write the detail view of one event.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_event_detail<W: Write>(
    writer: &mut W,
    detail: &EventDetail,
    format: Format,
    theme: Theme,
) -> io::Result<()> {
    match format {
        Format::Json => write_json(writer, detail),
        Format::Ndjson => write_ndjson(writer, std::slice::from_ref(detail)),
        Format::Human => {
            let color = magnitude_fg(detail.marker.color);
            let palette = theme.palette();
            writeln!(
                writer,
                "{}{}{BOLD} {} {RESET}",
                theme_bg(palette.background),
                theme_fg(palette.text),
                detail.event.time
            )?;
            writeln!(writer, "{}", detail.event.region)?;
            writeln!(writer, "{}", detail.summary)?;
            writeln!(
                writer,
                "FM {color}●{RESET} M {:.1}  D {:.0} km",
                detail.event.magnitude, detail.event.depth_km
            )?;
            write_markers(writer, std::slice::from_ref(&detail.marker), Format::Human)?;
            write_human_beach_ball(writer, &detail.beach_ball, theme)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focal::{FocalMechanism, Point2D};
    use crate::models::tests::sample_event;

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_ndjson_one_line_per_event() {
        let a = sample_event("a", "2024-01-01 00:00:00");
        let b = sample_event("b", "2024-01-02 00:00:00");
        let mut buf = Vec::new();
        write_events(&mut buf, &[&a, &b], Format::Ndjson, Theme::Dark).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], "a");
        assert_eq!(first["color"], "dark_orange");
        assert_eq!(first["region"], "Southern Sumatra, Indonesia");
    }

    #[test]
    fn test_human_event_line() {
        let event = sample_event("ev-7", "2024-01-01 03:04:05");
        let mut buf = Vec::new();
        write_events(&mut buf, &[&event], Format::Human, Theme::Light).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("M5.2"));
        assert!(text.contains("MODERATE"));
        assert!(text.contains("ev-7"));
        assert!(text.contains("2024-01-01 03:04:05 UTC"));
    }

    #[test]
    fn test_human_tiles_show_bounds() {
        let tile = TileAddress::new(1, 1, 0).unwrap();
        let report = TileReport {
            tile,
            quad_key: tile.quad_key(),
            bounds: TileBounds {
                north_west: GeoCoordinate::new(85.0511, 0.0),
                south_east: GeoCoordinate::new(0.0, 180.0),
            },
            image: TileImage::File {
                path: "maps/world1.png".into(),
            },
        };
        let mut buf = Vec::new();
        write_tiles(&mut buf, &[report], Format::Human).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(ICON_TILE));
        assert!(text.contains("\"1\""));
        assert!(text.contains("[85.0511, 0.0000 .. 0.0000, 180.0000]"));
    }

    #[test]
    fn test_human_beach_ball_uses_theme_colors() {
        let ball = FocalMechanism::new(30.0, 45.0, 90.0).beach_ball(Point2D::new(0.0, 0.0), 10.0);
        let mut buf = Vec::new();
        write_beach_ball(&mut buf, &ball, Format::Human, Theme::LightTransparent).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let palette = Theme::LightTransparent.palette();
        assert!(text.contains(&theme_bg(palette.panel)));
        assert!(text.contains(&format!("fill {}", palette.panel.hex())));
        assert!(text.contains(&format!("outline {}", palette.border.hex())));
        assert!(text.contains("S 30° D 45° R 90°"));
    }

    #[test]
    fn test_beach_ball_json() {
        let ball = FocalMechanism::new(0.0, 45.0, 90.0).beach_ball(Point2D::new(0.0, 0.0), 10.0);
        let mut buf = Vec::new();
        write_beach_ball(&mut buf, &ball, Format::Json, Theme::Dark).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["compressional"]["commands"][0]["op"], "move_to");
        assert_eq!(value["compressional"]["commands"][2]["op"], "arc_to");
        assert_eq!(value["label"], "S 0° D 45° R 90°");
    }
}
