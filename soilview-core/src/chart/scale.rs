//! Domain → pixel mappings for the charts.
//!
//! Tick and nice-bound rules follow the usual "1, 2, 5 × 10ⁿ" stepping so axis
//! labels land on round numbers.

use chrono::{DateTime, NaiveDateTime};

/// Smallest and largest finite value, `None` when there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Tick spacing, kept as a divisor for fractional steps to avoid drift like 0.30000000000000004.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Multiply(f64),
    Divide(f64),
}

fn tick_step(start: f64, stop: f64, count: usize) -> Option<Step> {
    if count == 0 || start.is_nan() || stop.is_nan() || stop <= start {
        return None;
    }
    let raw = (stop - start) / count as f64;
    let power = raw.log10().floor();
    let error = raw / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        Some(Step::Multiply(factor * 10f64.powf(power)))
    } else {
        Some(Step::Divide(10f64.powf(-power) / factor))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// A degenerate domain maps everything to the middle of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + t * (r1 - r0)
    }

    /// Widen the domain outward to round tick boundaries.
    pub fn nice(self, count: usize) -> Self {
        let (d0, d1) = self.domain;
        let (mut lo, mut hi) = (d0.min(d1), d0.max(d1));
        let (orig_lo, orig_hi) = (lo, hi);
        let mut previous = None;

        for _ in 0..10 {
            let Some(step) = tick_step(lo, hi, count) else {
                break;
            };
            if previous == Some(step) {
                break;
            }
            match step {
                Step::Multiply(s) => {
                    lo = (lo / s).floor() * s;
                    hi = (hi / s).ceil() * s;
                }
                Step::Divide(s) => {
                    lo = (lo * s).floor() / s;
                    hi = (hi * s).ceil() / s;
                }
            }
            previous = Some(step);
        }

        // Float guard: rounding must never cut off data.
        let lo = lo.min(orig_lo);
        let hi = hi.max(orig_hi);
        let domain = if d0 <= d1 { (lo, hi) } else { (hi, lo) };
        Self { domain, ..self }
    }

    /// Round values spanning the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = (d0.min(d1), d0.max(d1));
        if lo == hi {
            return vec![lo];
        }

        match tick_step(lo, hi, count) {
            None => Vec::new(),
            Some(Step::Multiply(s)) => {
                let (i0, i1) = ((lo / s).ceil() as i64, (hi / s).floor() as i64);
                (i0..=i1).map(|i| i as f64 * s).collect()
            }
            Some(Step::Divide(s)) => {
                let (i0, i1) = ((lo * s).ceil() as i64, (hi * s).floor() as i64);
                (i0..=i1).map(|i| i as f64 / s).collect()
            }
        }
    }
}

/// Evenly spaced categorical bands with equal inner and outer padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        let n = count as f64;
        let span = range.1 - range.0;
        let step = span / (n - padding + 2.0 * padding).max(1.0);
        let start = range.0 + (span - step * (n - padding)) * 0.5;
        Self {
            count,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Leading edge of band `index`.
    pub fn position(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    pub fn center(&self, index: usize) -> f64 {
        self.position(index) + self.bandwidth / 2.0
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

/// Continuous time axis over naive (service-local) timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: NaiveDateTime,
    end: NaiveDateTime,
    range: (f64, f64),
}

/// Candidate tick spacings, in hours.
const TICK_HOURS: [i64; 8] = [1, 2, 3, 6, 12, 24, 48, 168];

impl TimeScale {
    /// Scale over the extent of `times`; an hour from the epoch when empty.
    pub fn from_times(times: &[NaiveDateTime], range: (f64, f64)) -> Self {
        let start = times.iter().min().copied().unwrap_or_default();
        let end = times
            .iter()
            .max()
            .copied()
            .unwrap_or_else(|| start + chrono::Duration::hours(1));
        Self { start, end, range }
    }

    pub fn map(&self, t: NaiveDateTime) -> f64 {
        let span = (self.end - self.start).num_seconds() as f64;
        let offset = (t - self.start).num_seconds() as f64;
        let frac = if span == 0.0 { 0.5 } else { offset / span };
        self.range.0 + frac * (self.range.1 - self.range.0)
    }

    /// Hour-aligned ticks, at most `max_ticks` of them.
    pub fn ticks(&self, max_ticks: usize) -> Vec<NaiveDateTime> {
        let start = self.start.and_utc().timestamp();
        let end = self.end.and_utc().timestamp();
        let span_hours = (end - start) / 3600;
        let max_ticks = max_ticks.max(1) as i64;

        let step_hours = TICK_HOURS
            .iter()
            .copied()
            .find(|h| span_hours / h < max_ticks)
            .unwrap_or(TICK_HOURS[TICK_HOURS.len() - 1]);
        let step = step_hours * 3600;

        let first = if start.rem_euclid(step) == 0 {
            start
        } else {
            start.div_euclid(step) * step + step
        };
        (0..)
            .map(|i| first + i * step)
            .take_while(|s| *s <= end)
            .filter_map(|s| DateTime::from_timestamp(s, 0).map(|d| d.naive_utc()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn extent_skips_non_finite_values() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 2.0]), Some((-1.0, 3.0)));
        assert_eq!(extent(Vec::<f64>::new()), None);
    }

    #[test]
    fn linear_maps_inverted_pixel_range() {
        let y = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(y.map(0.0), 100.0);
        assert_eq!(y.map(10.0), 0.0);
        assert_eq!(y.map(2.5), 75.0);

        let flat = LinearScale::new((4.0, 4.0), (100.0, 0.0));
        assert_eq!(flat.map(4.0), 50.0);
    }

    #[test]
    fn nice_rounds_outward() {
        let y = LinearScale::new((0.0, 23.7), (0.0, 1.0)).nice(10);
        assert_eq!(y.domain(), (0.0, 24.0));

        let y = LinearScale::new((0.13, 0.87), (0.0, 1.0)).nice(10);
        assert_eq!(y.domain(), (0.1, 0.9));

        let y = LinearScale::new((-3.2, 17.9), (0.0, 1.0)).nice(10);
        assert_eq!(y.domain(), (-4.0, 18.0));
    }

    #[test]
    fn nice_upper_bound_never_truncates() {
        for i in 1..500 {
            let max = i as f64 * 0.173;
            let (_, hi) = LinearScale::new((0.0, max), (0.0, 1.0)).nice(10).domain();
            assert!(hi >= max, "nice bound {hi} below data max {max}");
        }
    }

    #[test]
    fn ticks_are_round_and_within_domain() {
        let ticks = LinearScale::new((0.0, 1.0), (0.0, 1.0)).ticks(5);
        assert_eq!(ticks, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

        let ticks = LinearScale::new((0.0, 24.0), (0.0, 1.0)).ticks(10);
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&24.0));
        assert_eq!(ticks.len(), 13);

        assert_eq!(LinearScale::new((2.0, 2.0), (0.0, 1.0)).ticks(5), vec![2.0]);
    }

    #[test]
    fn band_geometry_matches_padding() {
        let x = BandScale::new(10, (0.0, 1010.0), 0.1);
        assert!((x.position(0) - 10.0).abs() < 1e-9);
        assert!((x.bandwidth() - 90.0).abs() < 1e-9);
        assert!((x.position(9) + x.bandwidth() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn time_ticks_are_hour_aligned() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let times: Vec<_> = (0..72).map(|h| start + Duration::hours(h)).collect();
        let x = TimeScale::from_times(&times, (0.0, 710.0));

        assert_eq!(x.map(times[0]), 0.0);
        assert_eq!(x.map(times[71]), 710.0);

        let ticks = x.ticks(12);
        assert!(ticks.len() <= 12);
        assert_eq!(ticks[0], start);
        assert_eq!(ticks[1] - ticks[0], Duration::hours(6));
    }
}
