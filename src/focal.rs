//! Focal-mechanism ("beach ball") geometry.
//!
//! Builds the drawing primitives for a fault-plane solution. Angles follow the
//! drawing surface: 0 rad points along +x and angles grow towards +y.
//!
//! The construction is deliberately simple: both nodal planes follow the
//! strike only (the auxiliary plane is the strike rotated by 90°), and the
//! compressional region is a half disc. Dip and slip are carried for labels
//! but do not change the geometry.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::Serialize;

/// A point on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `angle` radians on the circle of `radius` around `self`.
    #[must_use]
    pub fn polar(self, radius: f64, angle: f64) -> Self {
        Self::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSegment {
    pub start: Point2D,
    pub end: Point2D,
}

impl LineSegment {
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Direction vector from start to end.
    #[must_use]
    pub fn direction(&self) -> (f64, f64) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point2D {
        Point2D::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}

/// One step of a fill path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo { to: Point2D },
    LineTo { to: Point2D },
    /// Circular arc around `center`, from `start_angle` sweeping `sweep` radians.
    ArcTo {
        center: Point2D,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

/// A closed region to fill, described as a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledRegion {
    pub commands: Vec<PathCommand>,
}

impl FilledRegion {
    /// Total angular sweep of the arcs in this region.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.commands
            .iter()
            .map(|c| match c {
                PathCommand::ArcTo { sweep, .. } => *sweep,
                _ => 0.0,
            })
            .sum()
    }

    /// Start angle of the first arc, if any.
    #[must_use]
    pub fn start_angle(&self) -> Option<f64> {
        self.commands.iter().find_map(|c| match c {
            PathCommand::ArcTo { start_angle, .. } => Some(*start_angle),
            _ => None,
        })
    }
}

/// The two nodal-plane traces of a beach ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodalPlanes {
    pub primary: LineSegment,
    pub auxiliary: LineSegment,
}

/// Diameter through `center` at `angle` radians.
fn diameter(center: Point2D, radius: f64, angle: f64) -> LineSegment {
    LineSegment {
        start: center.polar(radius, angle),
        end: center.polar(-radius, angle),
    }
}

/// Nodal-plane lines for a strike angle.
///
/// The primary plane spans the diameter along the strike; the auxiliary plane
/// is perpendicular to it.
#[must_use]
pub fn build_nodal_planes(strike_deg: f64, center: Point2D, radius: f64) -> NodalPlanes {
    let strike = strike_deg.to_radians();
    NodalPlanes {
        primary: diameter(center, radius, strike),
        auxiliary: diameter(center, radius, strike + FRAC_PI_2),
    }
}

/// Compressional (dark) half of the beach ball.
///
/// A pie from `strike - π/2` sweeping π radians.
#[must_use]
pub fn build_compressional_quadrant(strike_deg: f64, center: Point2D, radius: f64) -> FilledRegion {
    let start_angle = strike_deg.to_radians() - FRAC_PI_2;
    FilledRegion {
        commands: vec![
            PathCommand::MoveTo { to: center },
            PathCommand::LineTo {
                to: center.polar(radius, start_angle),
            },
            PathCommand::ArcTo {
                center,
                radius,
                start_angle,
                sweep: PI,
            },
            PathCommand::LineTo { to: center },
        ],
    }
}

/// Fault-plane solution angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocalMechanism {
    pub strike: f64,
    pub dip: f64,
    pub slip: f64,
}

impl FocalMechanism {
    /// Angles are normalised into [0, 360).
    #[must_use]
    pub fn new(strike: f64, dip: f64, slip: f64) -> Self {
        Self {
            strike: strike.rem_euclid(360.0),
            dip: dip.rem_euclid(360.0),
            slip: slip.rem_euclid(360.0),
        }
    }

    /// Numeric label drawn next to the ball.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "S {:.0}° D {:.0}° R {:.0}°",
            self.strike, self.dip, self.slip
        )
    }

    /// All primitives for one beach ball.
    #[must_use]
    pub fn beach_ball(&self, center: Point2D, radius: f64) -> BeachBall {
        BeachBall {
            mechanism: *self,
            center,
            radius,
            compressional: build_compressional_quadrant(self.strike, center, radius),
            planes: build_nodal_planes(self.strike, center, radius),
            label: self.label(),
        }
    }
}

/// Everything needed to draw a beach ball: outline circle, compressional
/// fill, nodal planes on top, and the label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeachBall {
    pub mechanism: FocalMechanism,
    pub center: Point2D,
    pub radius: f64,
    pub compressional: FilledRegion,
    pub planes: NodalPlanes,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CENTER: Point2D = Point2D::new(100.0, 75.0);

    #[test]
    fn test_zero_strike_is_horizontal() {
        let planes = build_nodal_planes(0.0, CENTER, 60.0);
        assert!((planes.primary.start.x - 160.0).abs() < 1e-9);
        assert!((planes.primary.end.x - 40.0).abs() < 1e-9);
        assert!((planes.primary.start.y - 75.0).abs() < 1e-9);
        assert!((planes.primary.end.y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_ninety_strike_is_vertical() {
        let planes = build_nodal_planes(90.0, CENTER, 60.0);
        assert!((planes.primary.start.x - 100.0).abs() < 1e-9);
        assert!((planes.primary.start.y - 135.0).abs() < 1e-9);
        assert!((planes.primary.end.y - 15.0).abs() < 1e-9);
        // auxiliary is then horizontal
        assert!((planes.auxiliary.start.y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_quadrant_path_shape() {
        let region = build_compressional_quadrant(0.0, CENTER, 60.0);
        assert_eq!(region.commands.len(), 4);
        assert_eq!(region.commands[0], PathCommand::MoveTo { to: CENTER });
        assert_eq!(region.commands[3], PathCommand::LineTo { to: CENTER });
        match region.commands[1] {
            PathCommand::LineTo { to } => {
                // start angle -90° points to -y
                assert!((to.x - 100.0).abs() < 1e-9);
                assert!((to.y - 15.0).abs() < 1e-9);
            }
            other => panic!("expected LineTo, got {other:?}"),
        }
        assert!((region.start_angle().unwrap() + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_mechanism_normalises_angles() {
        let fm = FocalMechanism::new(-30.0, 45.0, 370.0);
        assert!((fm.strike - 330.0).abs() < 1e-9);
        assert!((fm.slip - 10.0).abs() < 1e-9);
        assert_eq!(fm.label(), "S 330° D 45° R 10°");
    }

    #[test]
    fn test_beach_ball_bundles_primitives() {
        let ball = FocalMechanism::new(45.0, 30.0, 90.0).beach_ball(CENTER, 60.0);
        assert_eq!(ball.planes, build_nodal_planes(45.0, CENTER, 60.0));
        assert_eq!(ball.compressional, build_compressional_quadrant(45.0, CENTER, 60.0));
        assert!((ball.radius - 60.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_planes_equal_length_and_perpendicular(
            strike in 0.0f64..360.0,
            radius in 1.0f64..500.0,
        ) {
            let planes = build_nodal_planes(strike, CENTER, radius);
            prop_assert!((planes.primary.length() - 2.0 * radius).abs() < 1e-9 * radius);
            prop_assert!((planes.auxiliary.length() - 2.0 * radius).abs() < 1e-9 * radius);

            let (ax, ay) = planes.primary.direction();
            let (bx, by) = planes.auxiliary.direction();
            let dot = ax * bx + ay * by;
            prop_assert!(dot.abs() < 1e-9 * radius * radius);
        }

        #[test]
        fn prop_planes_cross_at_center(strike in 0.0f64..360.0) {
            let planes = build_nodal_planes(strike, CENTER, 60.0);
            prop_assert!(planes.primary.midpoint().distance(CENTER) < 1e-9);
            prop_assert!(planes.auxiliary.midpoint().distance(CENTER) < 1e-9);
        }

        #[test]
        fn prop_quadrant_spans_half_turn(strike in 0.0f64..360.0) {
            let region = build_compressional_quadrant(strike, CENTER, 60.0);
            prop_assert!((region.sweep() - PI).abs() < 1e-12);
        }
    }
}
