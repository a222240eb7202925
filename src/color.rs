use std::str::FromStr;

use palette::Srgb;
use plotters::style::RGBColor;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("unrecognized color: {0:?}")]
    Unrecognized(String),
}

/// Parses a color spec: CSS color names, `#rgb`/`#rrggbb` hex, the single-letter
/// base colors (`k`, `w`, `r`, ...) or a gray level such as `"0.75"`.
pub fn parse_color(spec: &str) -> Result<RGBColor, ColorError> {
    let name = spec.trim().to_ascii_lowercase();
    let unrecognized = || ColorError::Unrecognized(spec.to_string());

    if name.starts_with('#') {
        let rgb = Srgb::<u8>::from_str(&name).map_err(|_| unrecognized())?;
        return Ok(to_plotters(rgb));
    }

    if let Some(rgb) = base_color(&name) {
        return Ok(rgb);
    }

    if let Some(rgb) = palette::named::from_str(&name) {
        return Ok(to_plotters(rgb));
    }

    // Gray levels are decimal strings in [0, 1].
    if let Ok(level) = name.parse::<f32>()
        && (0.0..=1.0).contains(&level)
    {
        let v = (level * 255.0).round() as u8;
        return Ok(RGBColor(v, v, v));
    }

    Err(unrecognized())
}

fn to_plotters(c: Srgb<u8>) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

fn base_color(name: &str) -> Option<RGBColor> {
    let rgb = match name {
        "b" => RGBColor(0, 0, 255),
        "g" => RGBColor(0, 128, 0),
        "r" => RGBColor(255, 0, 0),
        "c" => RGBColor(0, 191, 191),
        "m" => RGBColor(191, 0, 191),
        "y" => RGBColor(191, 191, 0),
        "k" => RGBColor(0, 0, 0),
        "w" => RGBColor(255, 255, 255),
        _ => return None,
    };
    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_ignore_case_and_whitespace() {
        assert_eq!(parse_color("white").unwrap(), RGBColor(255, 255, 255));
        assert_eq!(parse_color(" Black ").unwrap(), RGBColor(0, 0, 0));
        assert_eq!(parse_color("lightgray").unwrap(), RGBColor(211, 211, 211));
    }

    #[test]
    fn hex_codes() {
        assert_eq!(parse_color("#ff8000").unwrap(), RGBColor(255, 128, 0));
        assert_eq!(parse_color("#FFF").unwrap(), RGBColor(255, 255, 255));
        assert!(parse_color("#zzzzzz").is_err());
    }

    #[test]
    fn base_letters_and_gray_levels() {
        assert_eq!(parse_color("k").unwrap(), RGBColor(0, 0, 0));
        assert_eq!(parse_color("w").unwrap(), RGBColor(255, 255, 255));
        assert_eq!(parse_color("0.5").unwrap(), RGBColor(128, 128, 128));
        assert!(parse_color("1.5").is_err());
    }

    #[test]
    fn unknown_names_are_errors() {
        assert_eq!(
            parse_color("not-a-color"),
            Err(ColorError::Unrecognized("not-a-color".to_string()))
        );
        assert!(parse_color("").is_err());
    }
}
