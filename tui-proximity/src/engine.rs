use std::fmt::Write;

use crate::geometry::Point;
use crate::settings::AxisSetting;
use crate::target::{Boundable, RenderTarget};

/// Distance at which a glyph stops reacting to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityConfig {
    pub radius: f64,
}

/// `1.0` at the pointer, falling linearly to `0.0` at `radius` and beyond.
///
/// A non-positive or `NaN` radius gives zero falloff everywhere.
pub fn falloff(distance: f64, radius: f64) -> f64 {
    if !(radius > 0.0) {
        return 0.0;
    }

    (1.0 - distance / radius).clamp(0.0, 1.0)
}

pub fn interpolate(setting: &AxisSetting, falloff: f64) -> f64 {
    setting.from_value + (setting.to_value - setting.from_value) * falloff
}

/// Append `'<axis>' <value>` pairs, joined by `", "`, in settings order.
pub fn write_style(out: &mut String, settings: &[AxisSetting], falloff: f64) {
    for (i, setting) in settings.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }

        // Writing to a String cannot fail.
        let _ = write!(out, "'{}' {}", setting.axis, interpolate(setting, falloff));
    }
}

/// Restyles glyphs by pointer proximity. Holds one scratch buffer reused across glyphs and frames.
#[derive(Debug, Clone)]
pub struct ProximityEngine {
    config: ProximityConfig,
    scratch: String,
}

impl ProximityEngine {
    pub fn new(config: ProximityConfig) -> Self {
        Self {
            config,
            scratch: String::new(),
        }
    }

    pub fn config(&self) -> ProximityConfig {
        self.config
    }

    /// Style every mounted target for the pointer at `pointer` (container space).
    ///
    /// Does nothing while the container is absent or unmounted. Returns the number of targets styled.
    pub fn tick<T: RenderTarget>(
        &mut self,
        container: Option<&dyn Boundable>,
        pointer: Point,
        settings: &[AxisSetting],
        targets: &mut [Option<T>],
    ) -> usize {
        let Some(container) = container.and_then(|c| c.bounds()) else {
            return 0;
        };

        let origin = container.origin();
        let mut styled = 0;

        for target in targets.iter_mut().flatten() {
            let center = target.bounds().center().relative_to(origin);
            let falloff = falloff(pointer.distance(center), self.config.radius);

            self.scratch.clear();
            write_style(&mut self.scratch, settings, falloff);
            target.set_style(&self.scratch);
            styled += 1;
        }

        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::settings::parse;

    #[derive(Debug, Default)]
    struct Recorder {
        bounds: Bounds,
        style: Option<String>,
    }

    impl Recorder {
        fn centered_at(x: f64, y: f64) -> Self {
            Self {
                bounds: Bounds::new(x - 1.0, y - 1.0, 2.0, 2.0),
                style: None,
            }
        }
    }

    impl RenderTarget for Recorder {
        fn bounds(&self) -> Bounds {
            self.bounds
        }

        fn set_style(&mut self, style: &str) {
            self.style = Some(style.to_owned());
        }
    }

    const CONTAINER: Bounds = Bounds {
        left: 0.0,
        top: 0.0,
        width: 200.0,
        height: 50.0,
    };

    fn style_at(pointer: Point, glyph: (f64, f64), from: &str, to: &str, radius: f64) -> String {
        let mut engine = ProximityEngine::new(ProximityConfig { radius });
        let mut targets = [Some(Recorder::centered_at(glyph.0, glyph.1))];

        engine.tick(Some(&CONTAINER), pointer, &parse(from, to), &mut targets);

        targets[0]
            .as_ref()
            .and_then(|t| t.style.clone())
            .unwrap_or_default()
    }

    #[test]
    fn falloff_boundaries() {
        assert_eq!(falloff(0.0, 100.0), 1.0);
        assert_eq!(falloff(100.0, 100.0), 0.0);
        assert_eq!(falloff(250.0, 100.0), 0.0);
        assert!((falloff(25.0, 100.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn degenerate_radius_gives_zero_falloff() {
        assert_eq!(falloff(0.0, 0.0), 0.0);
        assert_eq!(falloff(5.0, -10.0), 0.0);
        assert_eq!(falloff(0.0, f64::NAN), 0.0);
    }

    #[test]
    fn halfway_glyph_gets_midpoint_weight() {
        let style = style_at(Point::ORIGIN, (50.0, 0.0), "'wght' 400", "'wght' 800", 100.0);
        assert_eq!(style, "'wght' 600");
    }

    #[test]
    fn glyph_at_radius_rests() {
        let style = style_at(
            Point::ORIGIN,
            (100.0, 0.0),
            "'wght' 400, 'wdth' 100",
            "'wght' 900, 'wdth' 50",
            100.0,
        );
        assert_eq!(style, "'wght' 400, 'wdth' 100");
    }

    #[test]
    fn glyph_under_pointer_peaks() {
        let style = style_at(
            Point::new(30.0, 20.0),
            (30.0, 20.0),
            "'wght' 400, 'wdth' 100",
            "'wght' 900, 'wdth' 50",
            100.0,
        );
        assert_eq!(style, "'wght' 900, 'wdth' 50");
    }

    #[test]
    fn values_are_monotonic_in_distance() {
        let setting = &parse("'wght' 100", "'wght' 900")[0];
        let mut prev = interpolate(setting, falloff(0.0, 100.0));

        for d in 1..100 {
            let value = interpolate(setting, falloff(d as f64, 100.0));
            assert!(value < prev, "not decreasing at d={d}: {prev} -> {value}");
            prev = value;
        }
    }

    #[test]
    fn serialization_keeps_from_order() {
        let settings = parse("'wdth' 100, 'opsz' 12, 'wght' 400", "'wght' 800, 'wdth' 100");
        let mut out = String::new();

        write_style(&mut out, &settings, 0.5);
        assert_eq!(out, "'wdth' 100, 'opsz' 12, 'wght' 600");
    }

    #[test]
    fn nan_values_are_serialized_not_dropped() {
        let style = style_at(Point::ORIGIN, (0.0, 0.0), "'wght' bold", "'wght' 900", 10.0);
        assert_eq!(style, "'wght' NaN");
    }

    #[test]
    fn pointer_is_compared_in_container_space() {
        let container = Bounds::new(100.0, 100.0, 200.0, 50.0);
        let mut engine = ProximityEngine::new(ProximityConfig { radius: 100.0 });
        let mut targets = [Some(Recorder::centered_at(150.0, 100.0))];

        // Glyph center (150, 100) is (50, 0) inside the container.
        engine.tick(
            Some(&container),
            Point::ORIGIN,
            &parse("'wght' 400", "'wght' 800"),
            &mut targets,
        );

        assert_eq!(targets[0].as_ref().unwrap().style.as_deref(), Some("'wght' 600"));
    }

    #[test]
    fn unmounted_container_skips_the_tick() {
        let mut engine = ProximityEngine::new(ProximityConfig { radius: 100.0 });
        let mut targets = [Some(Recorder::centered_at(0.0, 0.0))];
        let settings = parse("'wght' 400", "'wght' 800");

        assert_eq!(engine.tick(None, Point::ORIGIN, &settings, &mut targets), 0);

        let unmounted = std::cell::Cell::new(None::<Bounds>);
        assert_eq!(engine.tick(Some(&unmounted), Point::ORIGIN, &settings, &mut targets), 0);
        assert!(targets[0].as_ref().unwrap().style.is_none());
    }

    #[test]
    fn missing_targets_are_skipped() {
        let mut engine = ProximityEngine::new(ProximityConfig { radius: 100.0 });
        let mut targets = [
            Some(Recorder::centered_at(0.0, 0.0)),
            None,
            Some(Recorder::centered_at(200.0, 0.0)),
        ];

        let styled = engine.tick(
            Some(&CONTAINER),
            Point::ORIGIN,
            &parse("'wght' 400", "'wght' 800"),
            &mut targets,
        );

        assert_eq!(styled, 2);
        assert_eq!(targets[0].as_ref().unwrap().style.as_deref(), Some("'wght' 800"));
        assert_eq!(targets[2].as_ref().unwrap().style.as_deref(), Some("'wght' 400"));
    }
}
