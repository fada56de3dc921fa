use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;

use crate::oklch::ColorRamp;
use crate::settings::parse_variations;
use crate::terminal::CellGlyph;

/// How font-variation axis values map onto terminal styling.
///
/// The weight axis picks a color along `ramp` and turns on bold past `bold_from`. A non-zero
/// `slnt` or an `ital` of at least 0.5 turns on italics.
#[derive(Debug, Clone)]
pub struct VariationStyle {
    pub weight_axis: String,
    /// Axis values mapped to the ends of `ramp`.
    pub weight_range: (f64, f64),
    pub ramp: ColorRamp,
    /// Fraction of `weight_range` at which glyphs turn bold.
    pub bold_from: f64,
    pub base: Style,
}

impl Default for VariationStyle {
    fn default() -> Self {
        Self {
            weight_axis: "wght".to_owned(),
            weight_range: (100.0, 900.0),
            ramp: ColorRamp::new((88, 92, 112), (255, 214, 102)),
            bold_from: 0.6,
            base: Style::new(),
        }
    }
}

impl VariationStyle {
    /// Terminal style for a serialized `'<axis>' <value>, ...` string.
    ///
    /// Unknown axes and `NaN` values leave the base style untouched.
    pub fn style_for(&self, variations: &str) -> Style {
        let mut style = self.base;

        for (axis, value) in parse_variations(variations) {
            if value.is_nan() {
                continue;
            }

            if axis == self.weight_axis {
                let t = self.weight_fraction(value);
                style = style.fg(self.ramp.at(t as f32));

                if t >= self.bold_from {
                    style = style.add_modifier(Modifier::BOLD);
                }
            } else if (axis == "slnt" && value != 0.0) || (axis == "ital" && value >= 0.5) {
                style = style.add_modifier(Modifier::ITALIC);
            }
        }

        style
    }

    fn weight_fraction(&self, value: f64) -> f64 {
        let (lo, hi) = self.weight_range;

        if hi == lo {
            return if value >= hi { 1.0 } else { 0.0 };
        }

        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

/// Renders glyphs at their placed positions. Positions outside the render area are skipped.
pub struct ProximityLabel<'a> {
    glyphs: &'a [Option<CellGlyph>],
    style: &'a VariationStyle,
}

impl<'a> ProximityLabel<'a> {
    pub fn new(glyphs: &'a [Option<CellGlyph>], style: &'a VariationStyle) -> Self {
        Self { glyphs, style }
    }
}

impl Widget for ProximityLabel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for glyph in self.glyphs.iter().flatten() {
            let position = glyph.position();

            if !area.contains(position) || !buf.area().contains(position) {
                continue;
            }

            let style = if glyph.style().is_empty() {
                self.style.base
            } else {
                self.style.style_for(glyph.style())
            };

            let cell = &mut buf[position];
            cell.set_symbol(glyph.symbol());
            cell.set_style(style);
        }
    }
}
