use std::f64::consts::PI;

use plotters::{element::{Drawable, PointCollection}, style::ShapeStyle};
use plotters_backend::{BackendCoord, DrawingBackend, DrawingErrorKind};
use serde::{Deserialize, Serialize};

use super::type_lib::NumericData;

/// Scatter marker shapes, serialized with matplotlib's marker codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    #[serde(rename = "o")]
    Circle,
    #[serde(rename = "x")]
    Cross,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "*")]
    Star,
    #[serde(rename = "D")]
    Diamond,
    #[serde(rename = "h")]
    Hexagon,
}

impl MarkerShape {
    pub fn to_str(&self) -> &str {
        match self {
            MarkerShape::Circle => "o",
            MarkerShape::Cross => "x",
            MarkerShape::Plus => "+",
            MarkerShape::Star => "*",
            MarkerShape::Diamond => "D",
            MarkerShape::Hexagon => "h",
        }
    }
}

/// Radius in pixels for a marker whose area is given in points^2.
pub fn marker_radius(area: NumericData, dpi: NumericData) -> u32 {
    (area.max(0.0).sqrt() / 2.0 * dpi / 72.0).round().max(1.0) as u32
}

fn regular_polygon((x, y): BackendCoord, radius: f64, n: usize, phase: f64) -> Vec<BackendCoord> {
    (0..n)
        .map(|k| {
            let angle = phase + 2.0 * PI * k as f64 / n as f64;
            (x + (radius * angle.cos()).round() as i32, y - (radius * angle.sin()).round() as i32)
        })
        .collect()
}

fn star((x, y): BackendCoord, radius: f64) -> Vec<BackendCoord> {
    let inner = radius * 0.381966;
    (0..10)
        .map(|k| {
            let r = if k % 2 == 0 { radius } else { inner };
            let angle = PI / 2.0 + PI * k as f64 / 5.0;
            (x + (r * angle.cos()).round() as i32, y - (r * angle.sin()).round() as i32)
        })
        .collect()
}

pub struct Marker<Coord> {
    center: Coord,
    shape: MarkerShape,
    radius: u32,
    style: ShapeStyle,
}

impl<Coord> Marker<Coord> {
    pub fn new<S: Into<ShapeStyle>>(center: Coord, shape: MarkerShape, radius: u32, style: S) -> Self {
        Marker { center, shape, radius, style: style.into() }
    }
}

impl<'a, Coord: 'a> PointCollection<'a, Coord> for &'a Marker<Coord> {
    type Point = &'a Coord;
    type IntoIter = std::iter::Once<&'a Coord>;
    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.center)
    }
}

impl<Coord, DB: DrawingBackend> Drawable<DB> for Marker<Coord> {
    fn draw<I: Iterator<Item = BackendCoord>>(&self, mut points: I, backend: &mut DB, _: (u32, u32)) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let Some((x, y)) = points.next() else {
            return Ok(());
        };
        let r = self.radius as i32;
        let rf = self.radius as f64;
        let line = ShapeStyle { stroke_width: self.style.stroke_width.max(1), ..self.style };
        match self.shape {
            MarkerShape::Circle => backend.draw_circle((x, y), self.radius, &self.style, true),
            MarkerShape::Cross => {
                backend.draw_line((x - r, y - r), (x + r, y + r), &line)?;
                backend.draw_line((x - r, y + r), (x + r, y - r), &line)
            }
            MarkerShape::Plus => {
                backend.draw_line((x - r, y), (x + r, y), &line)?;
                backend.draw_line((x, y - r), (x, y + r), &line)
            }
            MarkerShape::Star => backend.fill_polygon(star((x, y), rf), &self.style),
            MarkerShape::Diamond => backend.fill_polygon(regular_polygon((x, y), rf, 4, PI / 2.0), &self.style),
            MarkerShape::Hexagon => backend.fill_polygon(regular_polygon((x, y), rf, 6, PI / 2.0), &self.style),
        }
    }
}

/// A polyline drawn as evenly spaced dots.
pub struct DottedPolyline<Coord> {
    points: Vec<Coord>,
    dot: u32,
    gap: u32,
    style: ShapeStyle,
}

impl<Coord> DottedPolyline<Coord> {
    pub fn new<S: Into<ShapeStyle>>(points: Vec<Coord>, dot: u32, gap: u32, style: S) -> Self {
        DottedPolyline { points, dot: dot.max(1), gap, style: style.into() }
    }
}

impl<'a, Coord: 'a> PointCollection<'a, Coord> for &'a DottedPolyline<Coord> {
    type Point = &'a Coord;
    type IntoIter = &'a [Coord];
    fn point_iter(self) -> Self::IntoIter {
        &self.points
    }
}

impl<Coord, DB: DrawingBackend> Drawable<DB> for DottedPolyline<Coord> {
    fn draw<I: Iterator<Item = BackendCoord>>(&self, points: I, backend: &mut DB, _: (u32, u32)) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let points: Vec<BackendCoord> = points.collect();
        let dot = self.dot as f64;
        let period = dot + self.gap as f64;
        // distance travelled along the whole polyline
        let mut travelled = 0.0;

        for pair in points.windows(2) {
            let (x0, y0) = (pair[0].0 as f64, pair[0].1 as f64);
            let (dx, dy) = (pair[1].0 as f64 - x0, pair[1].1 as f64 - y0);
            let length = (dx * dx + dy * dy).sqrt();
            if length == 0.0 {
                continue;
            }

            let mut s = 0.0;
            while s < length {
                let phase = (travelled + s) % period;
                let step = if phase < dot {
                    let end = (s + dot - phase).min(length);
                    let from = (x0 + dx * s / length, y0 + dy * s / length);
                    let to = (x0 + dx * end / length, y0 + dy * end / length);
                    backend.draw_line(
                        (from.0.round() as i32, from.1.round() as i32),
                        (to.0.round() as i32, to.1.round() as i32),
                        &self.style,
                    )?;
                    end - s
                } else {
                    period - phase
                };
                s += step.max(1e-9);
            }
            travelled += length;
        }
        Ok(())
    }
}
