//! Soil temperature at four depths as overlaid lines on one shared axis.

use crate::{HourlyTimeSeries, Variable};

use super::{
    Chart, Dimensions, Margin, Mark, Point, axis, legend_rows,
    color::category10,
    scale::{LinearScale, TimeScale, extent},
};

pub const DIMENSIONS: Dimensions = Dimensions::new(
    960.0,
    480.0,
    Margin {
        top: 20.0,
        right: 90.0,
        bottom: 30.0,
        left: 50.0,
    },
);

/// Shared y scale: zero to the warmest reading (or down to the coldest, below zero), niced.
pub fn y_scale(series: &HourlyTimeSeries, height: f64) -> LinearScale {
    let (lo, hi) = extent(
        Variable::soil_temperatures()
            .iter()
            .flat_map(|v| series.values(*v).iter().copied()),
    )
    .unwrap_or((0.0, 1.0));
    let (lo, hi) = (lo.min(0.0), hi.max(0.0));
    let domain = if lo == hi { (0.0, 1.0) } else { (lo, hi) };

    LinearScale::new(domain, (height, 0.0)).nice(10)
}

pub fn render(series: &HourlyTimeSeries, dims: Dimensions) -> Chart {
    let (width, height) = (dims.inner_width(), dims.inner_height());
    let x = TimeScale::from_times(series.time(), (0.0, width));
    let y = y_scale(series, height);

    let plot = Variable::soil_temperatures()
        .iter()
        .enumerate()
        .map(|(i, variable)| Mark::Polyline {
            points: series
                .time()
                .iter()
                .zip(series.values(*variable))
                .map(|(t, v)| Point::new(x.map(*t), y.map(*v)))
                .collect(),
            stroke: category10(i),
            stroke_width: 2.0,
        })
        .collect();

    let mut axes = axis::bottom_time(&x, height, width, "%H:%M");
    axes.extend(axis::vertical(&y, 0.0, axis::Side::Left, 10));
    axes.push(axis::vertical_title(12.0, "Soil temperature (°C)"));

    let rows: Vec<_> = Variable::soil_temperatures()
        .iter()
        .enumerate()
        .map(|(i, v)| (category10(i), v.label()))
        .collect();
    let legend = legend_rows(Point::new(width + 20.0, 10.0), &rows);

    Chart {
        title: "Soil temperature".to_string(),
        dimensions: dims,
        plot,
        axes,
        legend,
    }
}
