//! Soil moisture heat-grid: one cell per hour and depth band.

use crate::{HourlyTimeSeries, Variable};

use super::{
    Anchor, Chart, Dimensions, Margin, Mark, Point, axis,
    color::Sequential,
    scale::{BandScale, LinearScale, extent},
};

pub const DIMENSIONS: Dimensions = Dimensions::new(
    1200.0,
    720.0,
    Margin {
        top: 20.0,
        right: 100.0,
        bottom: 30.0,
        left: 50.0,
    },
);

const PADDING: f64 = 0.1;
const SWATCH: f64 = 20.0;
const SWATCH_GAP: f64 = 5.0;
/// Space between the grid's right edge and the legend.
const LEGEND_GAP: f64 = 20.0;

/// Value range the colormap (and so the legend) spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorDomain {
    Fixed(f64, f64),
    /// Min/max of the moisture values being drawn.
    Observed,
}

impl Default for ColorDomain {
    /// Moisture is a volume fraction.
    fn default() -> Self {
        ColorDomain::Fixed(0.0, 1.0)
    }
}

impl ColorDomain {
    pub fn resolve(&self, series: &HourlyTimeSeries) -> (f64, f64) {
        match *self {
            ColorDomain::Fixed(lo, hi) => (lo, hi),
            ColorDomain::Observed => extent(
                Variable::soil_moistures()
                    .iter()
                    .flat_map(|v| series.values(*v).iter().copied()),
            )
            .unwrap_or((0.0, 1.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    pub domain: ColorDomain,
    /// Approximate number of legend entries.
    pub legend_ticks: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            domain: ColorDomain::default(),
            legend_ticks: 5,
        }
    }
}

/// Depth bands top to bottom: deepest at the top, surface at the bottom.
pub fn bands() -> impl Iterator<Item = Variable> {
    Variable::soil_moistures().iter().rev().copied()
}

pub fn render(series: &HourlyTimeSeries, dims: Dimensions) -> Chart {
    render_with(series, dims, &Options::default())
}

pub fn render_with(series: &HourlyTimeSeries, dims: Dimensions, options: &Options) -> Chart {
    let (width, height) = (dims.inner_width(), dims.inner_height());
    let (lo, hi) = options.domain.resolve(series);
    let colors = Sequential::new(lo, hi);

    let x = BandScale::new(series.len(), (0.0, width), PADDING);
    let y = BandScale::new(Variable::soil_moistures().len(), (0.0, height), PADDING);

    let mut plot = Vec::with_capacity(series.len() * y.len());
    for (row, variable) in bands().enumerate() {
        for (col, value) in series.values(variable).iter().enumerate() {
            plot.push(Mark::Rect {
                x: x.position(col),
                y: y.position(row),
                width: x.bandwidth(),
                height: y.bandwidth(),
                fill: colors.color(*value),
            });
        }
    }

    let labels: Vec<&str> = bands().map(|v| v.label()).collect();
    let mut axes = axis::bottom_bands(&x, series.time(), height, width, "%H:%M");
    axes.extend(axis::left_bands(&y, &labels, height));

    let legend = legend(&colors, options.legend_ticks, Point::new(width + LEGEND_GAP, 0.0));

    Chart {
        title: "Soil moisture".to_string(),
        dimensions: dims,
        plot,
        axes,
        legend,
    }
}

/// Swatch per tick of the colormap's own domain, so legend and cells always agree.
fn legend(colors: &Sequential, ticks: usize, origin: Point) -> Vec<Mark> {
    LinearScale::new(colors.domain(), (0.0, 1.0))
        .ticks(ticks)
        .into_iter()
        .enumerate()
        .flat_map(|(i, value)| {
            let y = origin.y + i as f64 * (SWATCH + SWATCH_GAP);
            [
                Mark::Rect {
                    x: origin.x,
                    y,
                    width: SWATCH,
                    height: SWATCH,
                    fill: colors.color(value),
                },
                Mark::text(
                    Point::new(origin.x + SWATCH + SWATCH_GAP, y + SWATCH / 2.0 + 3.5),
                    format!("{value:.2}"),
                    Anchor::Start,
                ),
            ]
        })
        .collect()
}
