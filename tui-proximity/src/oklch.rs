use std::f32::consts::PI;

use ratatui::style::Color;

/// Oklch color: perceptually uniform lightness, chroma and hue (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklch {
    pub l: f32,
    pub c: f32,
    pub h: f32,
}

impl Oklch {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let [r, g, b] = [r, g, b].map(|c| decode_srgb(c as f32 / 255.0));

        let l = (0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b).cbrt();
        let m = (0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b).cbrt();
        let s = (0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b).cbrt();

        let lightness = 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s;
        let a = 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s;
        let b = 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s;

        let c = (a * a + b * b).sqrt();
        let h = if c < 1e-8 { 0.0 } else { b.atan2(a) };

        Self { l: lightness, c, h }
    }

    pub fn to_rgb(self) -> (u8, u8, u8) {
        let a = self.c * self.h.cos();
        let b = self.c * self.h.sin();

        let l = (self.l + 0.3963377774 * a + 0.2158037573 * b).powi(3);
        let m = (self.l - 0.1055613458 * a - 0.0638541728 * b).powi(3);
        let s = (self.l - 0.0894841775 * a - 1.2914855480 * b).powi(3);

        let to_u8 = |c: f32| (encode_srgb(c.clamp(0.0, 1.0)) * 255.0 + 0.5) as u8;

        (
            to_u8(4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s),
            to_u8(-1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s),
            to_u8(-0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s),
        )
    }

    /// Hue travels the shortest arc.
    pub fn lerp(self, other: Oklch, t: f32) -> Oklch {
        let mut dh = other.h - self.h;

        if dh > PI {
            dh -= 2.0 * PI;
        } else if dh < -PI {
            dh += 2.0 * PI;
        }

        Oklch {
            l: self.l + (other.l - self.l) * t,
            c: self.c + (other.c - self.c) * t,
            h: self.h + dh * t,
        }
    }
}

fn decode_srgb(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn encode_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Two endpoint colors, blended in Oklch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    rest: Oklch,
    peak: Oklch,
}

impl ColorRamp {
    pub fn new(rest: (u8, u8, u8), peak: (u8, u8, u8)) -> Self {
        Self {
            rest: Oklch::from_rgb(rest.0, rest.1, rest.2),
            peak: Oklch::from_rgb(peak.0, peak.1, peak.2),
        }
    }

    /// `t` is clamped to `[0.0, 1.0]`.
    pub fn at(&self, t: f32) -> Color {
        let (r, g, b) = self.rest.lerp(self.peak, t.clamp(0.0, 1.0)).to_rgb();
        Color::Rgb(r, g, b)
    }
}
