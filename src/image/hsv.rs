//! RGB to HSV conversion
//!
//! Hue is expressed as a fraction of the colour wheel, so all three
//! components share the `[0, 1]` range.

/// Hue, saturation and value, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Convert normalized RGB (`[0, 1]` per channel) to HSV
///
/// Greys (including black) have hue 0 and saturation 0.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let value = max;
    if max == min {
        return Hsv {
            hue: 0.0,
            saturation: 0.0,
            value,
        };
    }
    let span = max - min;
    let saturation = span / max;
    let rc = (max - r) / span;
    let gc = (max - g) / span;
    let bc = (max - b) / span;
    let sector = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    Hsv {
        hue: (sector / 6.0).rem_euclid(1.0),
        saturation,
        value,
    }
}
