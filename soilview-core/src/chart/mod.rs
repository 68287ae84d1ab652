//! Chart rendering as pure data: each renderer maps an [`HourlyTimeSeries`]
//! plus canvas [`Dimensions`] to a [`Chart`] of drawing primitives, which can
//! then be serialised to SVG.
//!
//! [`HourlyTimeSeries`]: crate::HourlyTimeSeries

pub mod air;
pub mod axis;
pub mod color;
pub mod moisture;
pub mod scale;
pub mod soil_temperature;
mod svg;

use color::Rgb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Drawing primitive, positioned in plot-area coordinates (origin at the inner top-left).
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgb,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Rgb,
        stroke_width: f64,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Rgb,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Rgb,
    },
    Text {
        at: Point,
        text: String,
        anchor: Anchor,
        size: f64,
        /// Degrees, about `at`.
        rotate: Option<f64>,
    },
}

impl Mark {
    pub fn text(at: Point, text: impl Into<String>, anchor: Anchor) -> Self {
        Mark::Text {
            at,
            text: text.into(),
            anchor,
            size: 10.0,
            rotate: None,
        }
    }

    /// Data points this mark stands for.
    fn data_points(&self) -> usize {
        match self {
            Mark::Rect { .. } => 1,
            Mark::Polyline { points, .. } => points.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Outer canvas size plus the margins reserved for axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Dimensions {
    pub const fn new(width: f64, height: f64, margin: Margin) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub dimensions: Dimensions,
    /// Data marks.
    pub plot: Vec<Mark>,
    pub axes: Vec<Mark>,
    pub legend: Vec<Mark>,
}

impl Chart {
    /// Number of plotted values: one per cell, one per line vertex.
    pub fn data_points(&self) -> usize {
        self.plot.iter().map(Mark::data_points).sum()
    }

    #[cfg(test)]
    pub(crate) fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.plot.iter().filter_map(|m| match m {
            Mark::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Text of every legend label, top to bottom.
    #[cfg(test)]
    pub(crate) fn legend_labels(&self) -> Vec<&str> {
        self.legend
            .iter()
            .filter_map(|m| match m {
                Mark::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Horizontal extent of the legend's anchor points.
    #[cfg(test)]
    pub(crate) fn legend_x_span(&self) -> (f64, f64) {
        self.legend
            .iter()
            .filter_map(|m| match m {
                Mark::Rect { x, .. } => Some(*x),
                Mark::Circle { center, .. } => Some(center.x),
                Mark::Text { at, .. } => Some(at.x),
                _ => None,
            })
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)))
    }

    pub fn to_svg(&self) -> String {
        svg::render(self)
    }
}

/// Colored dot + label rows, stacked downward from `origin`.
pub(crate) fn legend_rows(origin: Point, rows: &[(Rgb, &str)]) -> Vec<Mark> {
    const ROW_HEIGHT: f64 = 20.0;
    rows.iter()
        .enumerate()
        .flat_map(|(i, (color, label))| {
            let y = origin.y + i as f64 * ROW_HEIGHT;
            [
                Mark::Circle {
                    center: Point::new(origin.x, y),
                    radius: 5.0,
                    fill: *color,
                },
                Mark::Text {
                    at: Point::new(origin.x + 10.0, y + 4.0),
                    text: (*label).to_string(),
                    anchor: Anchor::Start,
                    size: 12.0,
                    rotate: None,
                },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_dimensions_subtract_margins() {
        let dims = moisture::DIMENSIONS;
        assert_eq!(dims.inner_width(), 1050.0);
        assert_eq!(dims.inner_height(), 670.0);
    }

    #[test]
    fn data_points_ignore_decorations() {
        let chart = Chart {
            title: "t".into(),
            dimensions: air::DIMENSIONS,
            plot: vec![
                Mark::Polyline {
                    points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                    stroke: Rgb::BLACK,
                    stroke_width: 1.0,
                },
                Mark::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 1.0,
                    height: 1.0,
                    fill: Rgb::BLACK,
                },
                Mark::text(Point::new(0.0, 0.0), "note", Anchor::Start),
            ],
            axes: Vec::new(),
            legend: legend_rows(Point::new(0.0, 0.0), &[(Rgb::GREEN, "a"), (Rgb::BLACK, "b")]),
        };

        assert_eq!(chart.data_points(), 3);
        assert_eq!(chart.legend_labels(), vec!["a", "b"]);
    }
}
