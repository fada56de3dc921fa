use log::debug;

/// One axis to interpolate: rest value at `from_value`, peak value at `to_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSetting {
    pub axis: String,
    pub from_value: f64,
    pub to_value: f64,
}

/// Ordered as the axes appear in the "from" string.
pub type ParsedSettings = Vec<AxisSetting>;

const QUOTES: [char; 2] = ['\'', '"'];

/// One `AxisSetting` per token of `from`. Axes missing from `to` keep their rest value.
///
/// If `to` names an axis more than once, the last occurrence is used. Nothing is rejected: a
/// value that does not start with a number reads as `NaN` and flows through as-is.
pub fn parse(from: &str, to: &str) -> ParsedSettings {
    from.split(',')
        .map(|token| {
            let (axis, from_value) = split_token(token);
            let axis = axis.replace(QUOTES, "");
            let to_value = lookup(to, &axis).unwrap_or(from_value);

            AxisSetting {
                axis,
                from_value,
                to_value,
            }
        })
        .collect()
}

/// Read a serialized style string back into `(axis, value)` pairs.
pub fn parse_variations(style: &str) -> impl Iterator<Item = (&str, f64)> {
    style
        .split(',')
        .map(split_token)
        .map(|(axis, value)| (axis.trim_matches(QUOTES), value))
}

fn lookup(settings: &str, axis: &str) -> Option<f64> {
    settings
        .split(',')
        .map(split_token)
        .filter(|(name, _)| name.chars().filter(|c| !QUOTES.contains(c)).eq(axis.chars()))
        .last()
        .map(|(_, value)| value)
}

/// The axis is everything before the first space, the value everything between the first and second.
fn split_token(token: &str) -> (&str, f64) {
    let mut parts = token.trim().split(' ');
    let axis = parts.next().unwrap_or_default();
    let value = parts.next().map_or(f64::NAN, parse_leading_float);

    (axis, value)
}

/// Parse the longest numeric prefix of `text`, ignoring whatever follows it.
///
/// Returns `NaN` when no prefix is numeric.
pub fn parse_leading_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = end;
    end = skip_digits(bytes, end);
    let mut digits = end - digits_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = skip_digits(bytes, end + 1);
        digits += fraction_end - (end + 1);
        end = fraction_end;
    }

    if digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;

        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }

        let exponent_end = skip_digits(bytes, exponent);

        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

fn skip_digits(bytes: &[u8], mut at: usize) -> usize {
    while bytes.get(at).is_some_and(u8::is_ascii_digit) {
        at += 1;
    }

    at
}

/// Holds the parse of the last `(from, to)` pair and re-parses only when either string changes.
#[derive(Debug, Clone)]
pub struct SettingsCache {
    from: String,
    to: String,
    parsed: ParsedSettings,
}

impl SettingsCache {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            parsed: parse(from, to),
        }
    }

    /// Returns `true` if the inputs changed and the settings were re-parsed.
    pub fn update(&mut self, from: &str, to: &str) -> bool {
        if self.from == from && self.to == to {
            return false;
        }

        self.from = from.to_owned();
        self.to = to.to_owned();
        self.parsed = parse(from, to);
        debug!("re-parsed {} axis settings", self.parsed.len());

        true
    }

    pub fn settings(&self) -> &[AxisSetting] {
        &self.parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(axis: &str, from_value: f64, to_value: f64) -> AxisSetting {
        AxisSetting {
            axis: axis.to_owned(),
            from_value,
            to_value,
        }
    }

    #[test]
    fn unspecified_axis_freezes_at_rest_value() {
        let parsed = parse("'wght' 400, 'wdth' 100", "'wght' 900");

        assert_eq!(
            parsed,
            vec![setting("wght", 400.0, 900.0), setting("wdth", 100.0, 100.0)]
        );
    }

    #[test]
    fn order_follows_from_string() {
        let parsed = parse("'opsz' 9, 'wght' 400, 'wdth' 100", "'wdth' 150, 'wght' 1000, 'opsz' 40");
        let axes: Vec<_> = parsed.iter().map(|s| s.axis.as_str()).collect();

        assert_eq!(axes, ["opsz", "wght", "wdth"]);
        assert_eq!(parsed[1].to_value, 1000.0);
    }

    #[test]
    fn both_quote_styles_are_stripped() {
        let parsed = parse("\"wght\" 300, 'GRAD' -50", "wght 700, \"GRAD\" 150");

        assert_eq!(
            parsed,
            vec![setting("wght", 300.0, 700.0), setting("GRAD", -50.0, 150.0)]
        );
    }

    #[test]
    fn fractional_and_negative_values() {
        let parsed = parse("'slnt' -10.5", "'slnt' 0.25");
        assert_eq!(parsed, vec![setting("slnt", -10.5, 0.25)]);
    }

    #[test]
    fn malformed_value_degrades_to_nan() {
        let parsed = parse("'wght' heavy, 'wdth'", "'wght' 900");

        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].from_value.is_nan());
        assert_eq!(parsed[0].to_value, 900.0);
        assert!(parsed[1].from_value.is_nan());
        assert!(parsed[1].to_value.is_nan());
    }

    #[test]
    fn duplicate_from_axes_are_kept() {
        let parsed = parse("'wght' 400, 'wght' 500", "'wght' 600, 'wght' 800");

        assert_eq!(
            parsed,
            vec![setting("wght", 400.0, 800.0), setting("wght", 500.0, 800.0)]
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let a = parse("'wght' 400, 'wdth' 100", "'wght' 900");
        let b = parse("'wght' 400, 'wdth' 100", "'wght' 900");
        assert_eq!(a, b);
    }

    #[test]
    fn leading_float_ignores_trailing_text() {
        assert_eq!(parse_leading_float("400px"), 400.0);
        assert_eq!(parse_leading_float(".5"), 0.5);
        assert_eq!(parse_leading_float("-3.25e2x"), -325.0);
        assert_eq!(parse_leading_float("7e"), 7.0);
        assert_eq!(parse_leading_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_leading_float("").is_nan());
        assert!(parse_leading_float("-").is_nan());
        assert!(parse_leading_float(".").is_nan());
        assert!(parse_leading_float("abc").is_nan());
    }

    #[test]
    fn variations_read_back_serialized_style() {
        let pairs: Vec<_> = parse_variations("'wght' 600, 'wdth' 87.5").collect();
        assert_eq!(pairs, vec![("wght", 600.0), ("wdth", 87.5)]);
    }

    #[test]
    fn cache_reparses_only_on_change() {
        let mut cache = SettingsCache::new("'wght' 400", "'wght' 800");

        assert!(!cache.update("'wght' 400", "'wght' 800"));
        assert_eq!(cache.settings(), [setting("wght", 400.0, 800.0)]);

        assert!(cache.update("'wght' 400", "'wght' 700"));
        assert_eq!(cache.settings(), [setting("wght", 400.0, 700.0)]);
    }
}
