//! Air temperature and relative humidity on independent left/right axes.

use crate::{HourlyTimeSeries, Variable};

use super::{
    Chart, Dimensions, Margin, Mark, Point, axis, legend_rows,
    color::Rgb,
    scale::{LinearScale, TimeScale, extent},
};

pub const DIMENSIONS: Dimensions = Dimensions::new(
    800.0,
    400.0,
    Margin {
        top: 20.0,
        right: 160.0,
        bottom: 30.0,
        left: 50.0,
    },
);

const TEMPERATURE: Rgb = Rgb::STEELBLUE;
const HUMIDITY: Rgb = Rgb::GREEN;

/// Scale spanning only `variable`'s own observed range.
pub fn own_scale(series: &HourlyTimeSeries, variable: Variable, height: f64) -> LinearScale {
    let domain = extent(series.values(variable).iter().copied()).unwrap_or((0.0, 1.0));
    LinearScale::new(domain, (height, 0.0))
}

fn line(
    series: &HourlyTimeSeries,
    variable: Variable,
    x: &TimeScale,
    y: &LinearScale,
    stroke: Rgb,
) -> Mark {
    Mark::Polyline {
        points: series
            .time()
            .iter()
            .zip(series.values(variable))
            .map(|(t, v)| Point::new(x.map(*t), y.map(*v)))
            .collect(),
        stroke,
        stroke_width: 1.5,
    }
}

pub fn render(series: &HourlyTimeSeries, dims: Dimensions) -> Chart {
    let (width, height) = (dims.inner_width(), dims.inner_height());
    let x = TimeScale::from_times(series.time(), (0.0, width));
    let temperature = own_scale(series, Variable::Temperature2m, height);
    let humidity = own_scale(series, Variable::RelativeHumidity2m, height);

    let plot = vec![
        line(series, Variable::Temperature2m, &x, &temperature, TEMPERATURE),
        line(series, Variable::RelativeHumidity2m, &x, &humidity, HUMIDITY),
    ];

    let mut axes = axis::bottom_time(&x, height, width, "%a %H:%M");
    axes.extend(axis::vertical(&temperature, 0.0, axis::Side::Left, 10));
    axes.push(axis::vertical_title(12.0, "Temperature (°C)"));
    axes.extend(axis::vertical(&humidity, width, axis::Side::Right, 10));
    axes.push(axis::vertical_title(width - 6.0, "Humidity (%)"));

    // Clear of the humidity tick labels.
    let legend = legend_rows(
        Point::new(width + 55.0, 10.0),
        &[(TEMPERATURE, "Temperature"), (HUMIDITY, "Humidity")],
    );

    Chart {
        title: "Air temperature and humidity".to_string(),
        dimensions: dims,
        plot,
        axes,
        legend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing;

    fn temperature(i: usize) -> f64 {
        12.0 + (i as f64 / 4.0).sin() * 6.0
    }

    #[test]
    fn one_vertex_per_hour_per_variable() {
        let series = testing::series(72, |_, i| temperature(i));
        let chart = render(&series, DIMENSIONS);

        assert_eq!(chart.polylines().count(), 2);
        assert_eq!(chart.data_points(), 72 * 2);
        assert_eq!(chart.legend_labels(), vec!["Temperature", "Humidity"]);
    }

    #[test]
    fn humidity_range_does_not_distort_temperature() {
        let narrow = testing::series(72, |v, i| match v {
            Variable::RelativeHumidity2m => 40.0 + i as f64 * 0.1,
            _ => temperature(i),
        });
        let wide = testing::series(72, |v, i| match v {
            Variable::RelativeHumidity2m => 5.0 + (i % 7) as f64 * 14.0,
            _ => temperature(i),
        });

        let a = render(&narrow, DIMENSIONS);
        let b = render(&wide, DIMENSIONS);
        let lines_a: Vec<_> = a.polylines().collect();
        let lines_b: Vec<_> = b.polylines().collect();

        assert_eq!(lines_a[0], lines_b[0]);
        assert_ne!(lines_a[1], lines_b[1]);
    }

    #[test]
    fn legend_clears_the_plot_and_the_right_axis() {
        let series = testing::series(24, |_, i| temperature(i));
        let chart = render(&series, DIMENSIONS);

        let axis_labels_end = chart
            .axes
            .iter()
            .filter_map(|m| match m {
                Mark::Text { at, rotate: None, .. } if at.x > DIMENSIONS.inner_width() => {
                    Some(at.x)
                }
                _ => None,
            })
            .fold(f64::NEG_INFINITY, f64::max);

        let (left, right) = chart.legend_x_span();
        assert!(left > axis_labels_end + 20.0);
        assert!(right < DIMENSIONS.inner_width() + DIMENSIONS.margin.right);
    }

    #[test]
    fn each_line_fills_its_own_axis() {
        let series = testing::series(24, |v, i| match v {
            Variable::RelativeHumidity2m => 60.0 + i as f64,
            _ => -2.0 + i as f64 * 0.5,
        });
        let chart = render(&series, DIMENSIONS);
        let height = DIMENSIONS.inner_height();

        for line in chart.polylines() {
            let ys: Vec<f64> = line.iter().map(|p| p.y).collect();
            let top = ys.iter().copied().fold(f64::INFINITY, f64::min);
            let bottom = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(top, 0.0);
            assert_eq!(bottom, height);
        }
    }
}
