//! Color conversion.

use crate::array::Rgb;

/// Convert hue, saturation and value, each in `[0, 1]`, to RGB.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb {
    if saturation <= 0.0 {
        return Rgb::new(value, value, value);
    }

    let scaled = hue.rem_euclid(1.0) * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    match sector as u8 % 6 {
        0 => Rgb::new(value, t, p),
        1 => Rgb::new(q, value, p),
        2 => Rgb::new(p, value, t),
        3 => Rgb::new(p, q, value),
        4 => Rgb::new(t, p, value),
        _ => Rgb::new(value, p, q),
    }
}

/// Map an intensity to the ring palette at the given hue.
///
/// Intensities up to 0.5 brighten a fully saturated color; from 0.5 to 1 the
/// color washes out towards white.
pub fn ring_color(intensity: f64, hue: f64) -> Rgb {
    let saturation = (intensity * -2.0).clamp(-2.0, -1.0) + 2.0;
    let value = (intensity * 2.0).clamp(0.0, 1.0);
    hsv_to_rgb(hue, saturation, value)
}
