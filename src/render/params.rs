//! Reading the form into a validated [`RenderParams`] record.

use crate::core::config::{RenderDefaults, MAX_LOGO_SCALE, MAX_SIZE, MIN_SIZE};
use crate::core::error::{AppError, AppResult};
use crate::core::models::{FormInput, RenderParams, Rgb};

impl RenderParams {
    /// Validate raw form values against the configured defaults.
    ///
    /// Numeric fields that fail to parse fall back to their defaults and are
    /// then clamped. Only empty text is an error.
    pub fn from_form(form: &FormInput, defaults: &RenderDefaults) -> AppResult<Self> {
        let text = form.text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let size = parse_int(form.size.as_deref())
            .unwrap_or(i64::from(defaults.default_size))
            .clamp(i64::from(MIN_SIZE), i64::from(MAX_SIZE)) as u32;

        // Border never eats more than a quarter of the canvas on each side.
        let border = parse_int(form.border.as_deref())
            .unwrap_or(i64::from(defaults.default_border))
            .clamp(0, i64::from(size / 4)) as u32;

        let fg = parse_color(form.fg.as_deref()).unwrap_or_else(|| defaults.fg());
        let bg = parse_color(form.bg.as_deref()).unwrap_or_else(|| defaults.bg());

        let logo_scale = form
            .logo_scale
            .as_deref()
            .and_then(|s| s.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(defaults.default_logo_scale)
            .clamp(0.0, MAX_LOGO_SCALE);

        Ok(Self {
            text: text.to_string(),
            size,
            border,
            fg,
            bg,
            logo_scale,
        })
    }
}

/// Integer parse that tolerates a trailing fraction ("400.7" reads as 400),
/// matching what a number input may hand over.
fn parse_int(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

fn parse_color(raw: Option<&str>) -> Option<Rgb> {
    raw.filter(|s| !s.trim().is_empty()).and_then(Rgb::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn form(text: &str) -> FormInput {
        FormInput::with_text(text)
    }

    #[test]
    fn test_defaults_applied() {
        let params = RenderParams::from_form(&form("hello"), &RenderDefaults::default()).unwrap();

        assert_eq!(params.text, "hello");
        assert_eq!(params.size, 400);
        assert_eq!(params.border, 4);
        assert_eq!(params.fg, Rgb::BLACK);
        assert_eq!(params.bg, Rgb::WHITE);
        assert!((params.logo_scale - 0.18).abs() < f32::EPSILON);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn test_empty_text_is_rejected(#[case] text: &str) {
        let err = RenderParams::from_form(&form(text), &RenderDefaults::default()).unwrap_err();
        assert!(matches!(err, AppError::EmptyInput));
        assert!(err.to_string().contains("enter text"));
    }

    #[test]
    fn test_text_is_trimmed() {
        let params = RenderParams::from_form(&form("  abc \n"), &RenderDefaults::default()).unwrap();
        assert_eq!(params.text, "abc");
    }

    #[rstest]
    #[case(Some("50"), 128)]
    #[case(Some("128"), 128)]
    #[case(Some("640"), 640)]
    #[case(Some("5000"), 1200)]
    #[case(Some("-3"), 128)]
    #[case(Some("abc"), 400)]
    #[case(Some(""), 400)]
    #[case(Some("300.9"), 300)]
    #[case(None, 400)]
    fn test_size_parsing(#[case] raw: Option<&str>, #[case] expected: u32) {
        let mut input = form("x");
        input.size = raw.map(str::to_string);
        let params = RenderParams::from_form(&input, &RenderDefaults::default()).unwrap();
        assert_eq!(params.size, expected);
    }

    #[rstest]
    #[case(Some("0"), 0)]
    #[case(Some("10"), 10)]
    #[case(Some("-5"), 0)]
    #[case(Some("nope"), 4)]
    #[case(Some("1000"), 100)]
    fn test_border_parsing(#[case] raw: Option<&str>, #[case] expected: u32) {
        let mut input = form("x");
        input.border = raw.map(str::to_string);
        let params = RenderParams::from_form(&input, &RenderDefaults::default()).unwrap();
        assert_eq!(params.border, expected);
    }

    #[test]
    fn test_colors_default_when_empty_or_invalid() {
        let mut input = form("x");
        input.fg = Some(String::new());
        input.bg = Some("not-a-color".into());
        let params = RenderParams::from_form(&input, &RenderDefaults::default()).unwrap();
        assert_eq!(params.fg, Rgb::BLACK);
        assert_eq!(params.bg, Rgb::WHITE);

        input.fg = Some("#ff0000".into());
        input.bg = Some("#00f".into());
        let params = RenderParams::from_form(&input, &RenderDefaults::default()).unwrap();
        assert_eq!(params.fg, Rgb::new(255, 0, 0));
        assert_eq!(params.bg, Rgb::new(0, 0, 255));
    }

    #[rstest]
    #[case(Some("0.25"), 0.25)]
    #[case(Some("0"), 0.0)]
    #[case(Some("-1"), 0.0)]
    #[case(Some("0.9"), 0.5)]
    #[case(Some("NaN"), 0.18)]
    #[case(Some("inf"), 0.18)]
    #[case(Some("x"), 0.18)]
    fn test_logo_scale_parsing(#[case] raw: Option<&str>, #[case] expected: f32) {
        let mut input = form("x");
        input.logo_scale = raw.map(str::to_string);
        let params = RenderParams::from_form(&input, &RenderDefaults::default()).unwrap();
        assert!((params.logo_scale - expected).abs() < 1e-6);
    }

    #[test]
    fn test_configured_defaults_are_used() {
        let defaults = RenderDefaults {
            default_size: 256,
            default_border: 0,
            default_fg: "#123456".into(),
            ..RenderDefaults::default()
        };
        let params = RenderParams::from_form(&form("x"), &defaults).unwrap();
        assert_eq!(params.size, 256);
        assert_eq!(params.border, 0);
        assert_eq!(params.fg, Rgb::new(0x12, 0x34, 0x56));
    }
}
