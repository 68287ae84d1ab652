/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const STEELBLUE: Rgb = Rgb(70, 130, 180);
    pub const GREEN: Rgb = Rgb(0, 128, 0);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Weighted brightness, 0 (black) to 255 (white).
    #[cfg(test)]
    pub(crate) fn luma(&self) -> f64 {
        0.2126 * f64::from(self.0) + 0.7152 * f64::from(self.1) + 0.0722 * f64::from(self.2)
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// Yellow → green → blue ramp, light to dark.
const YL_GN_BU: [Rgb; 9] = [
    Rgb(0xff, 0xff, 0xd9),
    Rgb(0xed, 0xf8, 0xb1),
    Rgb(0xc7, 0xe9, 0xb4),
    Rgb(0x7f, 0xcd, 0xbb),
    Rgb(0x41, 0xb6, 0xc4),
    Rgb(0x1d, 0x91, 0xc0),
    Rgb(0x22, 0x5e, 0xa8),
    Rgb(0x25, 0x34, 0x94),
    Rgb(0x08, 0x1d, 0x58),
];

pub const CATEGORY10: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

pub fn category10(index: usize) -> Rgb {
    CATEGORY10[index % CATEGORY10.len()]
}

/// Position `t` in `[0, 1]` on the YlGnBu ramp. Out-of-range input is clamped, NaN is 0.
pub fn yl_gn_bu(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let segments = (YL_GN_BU.len() - 1) as f64;
    let scaled = t * segments;
    let i = (scaled.floor() as usize).min(YL_GN_BU.len() - 2);
    Rgb::lerp(YL_GN_BU[i], YL_GN_BU[i + 1], scaled - i as f64)
}

/// Sequential colormap over a value domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sequential {
    lo: f64,
    hi: f64,
}

impl Sequential {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    pub fn color(&self, value: f64) -> Rgb {
        let span = self.hi - self.lo;
        let t = if span == 0.0 { 0.5 } else { (value - self.lo) / span };
        yl_gn_bu(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints_match_scheme() {
        assert_eq!(yl_gn_bu(0.0), YL_GN_BU[0]);
        assert_eq!(yl_gn_bu(1.0), YL_GN_BU[8]);
        assert_eq!(yl_gn_bu(-3.0), YL_GN_BU[0]);
        assert_eq!(yl_gn_bu(7.0), YL_GN_BU[8]);
        assert_eq!(yl_gn_bu(0.5), YL_GN_BU[4]);
    }

    #[test]
    fn higher_values_are_strictly_darker() {
        let map = Sequential::new(0.0, 1.0);
        let lumas: Vec<f64> = (0..=20).map(|i| map.color(i as f64 / 20.0).luma()).collect();

        for pair in lumas.windows(2) {
            assert!(pair[1] < pair[0], "luma not decreasing: {pair:?}");
        }
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb::STEELBLUE.hex(), "#4682b4");
        assert_eq!(category10(10), category10(0));
    }
}
