//! RGBA color for entity and particle tints
//!
//! Components are f32 in [0, 1]; alpha is written every frame by the
//! particle update rule.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Transparent white, not transparent black: fading an entity in by
    /// lerping from transparent black would darken its RGB on the way.
    pub const TRANSPARENT_WHITE: Color = Color::new(1.0, 1.0, 1.0, 0.0);
    pub const LIGHT_BLUE: Color = Color::rgb(0.68, 0.85, 0.9);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Componentwise linear interpolation
    pub fn lerp(a: Color, b: Color, t: f32) -> Color {
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }

    /// HSV to RGB with hue in [0, 6) (one unit per 60 degrees)
    pub fn hsv(hue: f32, saturation: f32, value: f32) -> Color {
        let h = hue.rem_euclid(6.0);
        let c = value * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = value - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Color::rgb(r + m, g + m, b + m)
    }

    pub fn with_alpha(self, a: f32) -> Color {
        Color { a, ..self }
    }

    /// Multiply every component by `f` (premultiplied-style fade)
    pub fn faded(self, f: f32) -> Color {
        Color::new(self.r * f, self.g * f, self.b * f, self.a * f)
    }
}
