//! Inline `style` attribute handling.

use crate::editing::style::{Align, FontSize, Highlight, Rgb, RunStyle};

/// Splits a `style` attribute into lowercased property names and values.
pub fn declarations(style: &str) -> impl Iterator<Item = (String, &str)> {
    style.split(';').filter_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        let value = value.trim();
        let value = value
            .strip_suffix("!important")
            .map_or(value, str::trim_end);
        Some((prop.trim().to_ascii_lowercase(), value))
    })
}

/// Applies the run-level properties of a `style` attribute to `style`.
///
/// Values that fail to parse are skipped.
pub fn apply(css: &str, style: &mut RunStyle) {
    for (prop, value) in declarations(css) {
        let applied = match prop.as_str() {
            "font-size" => value
                .parse::<FontSize>()
                .map(|size| style.font_size = size)
                .is_ok(),
            "color" => value
                .parse::<Rgb>()
                .map(|rgb| style.text_color = rgb)
                .is_ok(),
            "background-color" | "background" => value
                .parse::<Highlight>()
                .map(|highlight| style.highlight = highlight)
                .is_ok(),
            "font-weight" => match font_weight(value) {
                Some(bold) => {
                    style.bold = bold;
                    true
                }
                None => false,
            },
            "font-style" => {
                style.italic = matches!(value.to_ascii_lowercase().as_str(), "italic" | "oblique");
                true
            }
            "text-decoration" | "text-decoration-line" => {
                style.underline = value.to_ascii_lowercase().contains("underline");
                true
            }
            _ => true,
        };
        if !applied {
            log::debug!("ignoring unparseable css {prop}: {value}");
        }
    }
}

/// `text-align` of a `style` attribute, if present and understood.
pub fn text_align(css: &str) -> Option<Align> {
    declarations(css)
        .filter(|(prop, _)| prop == "text-align")
        .filter_map(|(_, value)| value.parse().ok())
        .last()
}

fn font_weight(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "bold" | "bolder" => Some(true),
        "normal" | "lighter" => Some(false),
        number => number.parse::<u16>().ok().map(|weight| weight >= 600),
    }
}
