use chrono::NaiveDateTime;

use super::{
    Anchor, Mark, Point,
    color::Rgb,
    scale::{BandScale, LinearScale, TimeScale},
};

const TICK: f64 = 6.0;

/// Which side of the axis line ticks and labels go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

fn line(from: Point, to: Point) -> Mark {
    Mark::Line {
        from,
        to,
        stroke: Rgb::BLACK,
    }
}

/// Decimals needed to tell adjacent ticks apart.
fn tick_decimals(ticks: &[f64]) -> usize {
    match ticks {
        [a, b, ..] => {
            let step = (b - a).abs();
            if step > 0.0 {
                (-step.log10().floor()).max(0.0) as usize
            } else {
                0
            }
        }
        _ => 0,
    }
}

fn horizontal(
    labels: impl IntoIterator<Item = (f64, String)>,
    y: f64,
    span: (f64, f64),
) -> Vec<Mark> {
    let mut marks = vec![line(Point::new(span.0, y), Point::new(span.1, y))];
    for (x, label) in labels {
        marks.push(line(Point::new(x, y), Point::new(x, y + TICK)));
        marks.push(Mark::text(Point::new(x, y + TICK + 12.0), label, Anchor::Middle));
    }
    marks
}

/// Time axis along the bottom edge at `y`.
pub fn bottom_time(scale: &TimeScale, y: f64, width: f64, format: &str) -> Vec<Mark> {
    let max_ticks = ((width / 60.0).floor() as usize).max(2);
    let labels = scale
        .ticks(max_ticks)
        .into_iter()
        .map(|t| (scale.map(t), t.format(format).to_string()));
    horizontal(labels, y, (0.0, width))
}

/// Categorical time axis; labels are thinned so neighbours don't overlap.
pub fn bottom_bands(
    scale: &BandScale,
    times: &[NaiveDateTime],
    y: f64,
    width: f64,
    format: &str,
) -> Vec<Mark> {
    let max_labels = ((width / 50.0).floor() as usize).max(1);
    let every = times.len().div_ceil(max_labels).max(1);
    let labels = times
        .iter()
        .enumerate()
        .step_by(every)
        .map(|(i, t)| (scale.center(i), t.format(format).to_string()));
    horizontal(labels, y, (0.0, width))
}

/// Vertical numeric axis at `x`.
pub fn vertical(scale: &LinearScale, x: f64, side: Side, count: usize) -> Vec<Mark> {
    let (r0, r1) = scale.range();
    let ticks = scale.ticks(count);
    let decimals = tick_decimals(&ticks);
    let (dx, anchor) = match side {
        Side::Left => (-TICK, Anchor::End),
        Side::Right => (TICK, Anchor::Start),
    };

    let mut marks = vec![line(Point::new(x, r0), Point::new(x, r1))];
    for t in ticks {
        let y = scale.map(t);
        marks.push(line(Point::new(x, y), Point::new(x + dx, y)));
        marks.push(Mark::text(
            Point::new(x + dx * 1.5, y + 3.0),
            format!("{t:.decimals$}"),
            anchor,
        ));
    }
    marks
}

/// Vertical categorical axis on the left edge, one label per band.
pub fn left_bands(scale: &BandScale, labels: &[&str], height: f64) -> Vec<Mark> {
    let mut marks = vec![line(Point::new(0.0, 0.0), Point::new(0.0, height))];
    for (i, label) in labels.iter().enumerate() {
        let y = scale.center(i);
        marks.push(line(Point::new(0.0, y), Point::new(-TICK, y)));
        marks.push(Mark::text(Point::new(-TICK * 1.5, y + 3.0), *label, Anchor::End));
    }
    marks
}

/// Axis caption rotated to run along a vertical axis, ending at the top.
pub fn vertical_title(x: f64, text: &str) -> Mark {
    Mark::Text {
        at: Point::new(x, 6.0),
        text: text.to_string(),
        anchor: Anchor::End,
        size: 10.0,
        rotate: Some(-90.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(marks: &[Mark]) -> Vec<String> {
        marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn vertical_axis_labels_use_step_precision() {
        let y = LinearScale::new((0.0, 1.0), (100.0, 0.0));
        let marks = vertical(&y, 0.0, Side::Left, 5);
        assert_eq!(labels(&marks), vec!["0.0", "0.2", "0.4", "0.6", "0.8", "1.0"]);

        let y = LinearScale::new((0.0, 24.0), (100.0, 0.0));
        let marks = vertical(&y, 0.0, Side::Right, 10);
        assert_eq!(labels(&marks).last().map(String::as_str), Some("24"));
    }

    #[test]
    fn band_labels_are_thinned() {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let times: Vec<_> = (0..72).map(|h| start + chrono::Duration::hours(h)).collect();
        let x = BandScale::new(times.len(), (0.0, 500.0), 0.1);
        let marks = bottom_bands(&x, &times, 100.0, 500.0, "%H:%M");

        let text = labels(&marks);
        assert!(text.len() <= 10);
        assert_eq!(text[0], "00:00");
    }
}
