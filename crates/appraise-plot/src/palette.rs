//! Colours shared across charts.

use plotters::style::RGBColor;

pub(crate) const NEGATIVE: RGBColor = RGBColor(33, 102, 172);
pub(crate) const NEUTRAL: RGBColor = RGBColor(255, 255, 255);
pub(crate) const POSITIVE: RGBColor = RGBColor(178, 24, 43);
pub(crate) const MISSING: RGBColor = RGBColor(200, 200, 200);
pub(crate) const BAR: RGBColor = RGBColor(70, 130, 180);
pub(crate) const POINT: RGBColor = RGBColor(31, 119, 180);
pub(crate) const REFERENCE: RGBColor = RGBColor(214, 39, 40);
pub(crate) const TREND: RGBColor = RGBColor(44, 160, 44);

/// Blue-white-red colour for a coefficient in `[-1, 1]`; grey for `NaN`.
pub(crate) fn diverging(r: f64) -> RGBColor {
    if r.is_nan() {
        return MISSING;
    }
    let t = r.clamp(-1.0, 1.0);
    let end = if t < 0.0 { NEGATIVE } else { POSITIVE };
    let w = t.abs();
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * w).round() as u8;
    RGBColor(
        mix(NEUTRAL.0, end.0),
        mix(NEUTRAL.1, end.1),
        mix(NEUTRAL.2, end.2),
    )
}
