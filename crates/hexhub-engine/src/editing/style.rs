use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// Errors raised when a style value is constructed from untrusted input.
///
/// Values are validated at construction, so the command engine never sees an
/// ill-formed color or size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
    #[error("invalid font size: {0:?}")]
    InvalidFontSize(String),
    #[error("invalid alignment: {0:?}")]
    InvalidAlign(String),
}

/// An sRGB color, displayed as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn from_hex_digits(hex: &str) -> Option<Self> {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => Some(Self::new(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            // `#abc` is shorthand for `#aabbcc`
            3 => {
                let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Self::new(
                    channels.next()??,
                    channels.next()??,
                    channels.next()??,
                ))
            }
            _ => None,
        }
    }

    fn from_rgb_function(s: &str) -> Option<Self> {
        static RGB_FUNCTION: OnceLock<Regex> = OnceLock::new();
        let re = RGB_FUNCTION.get_or_init(|| {
            Regex::new(
                r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*[0-9.]+\s*)?\)$",
            )
            .expect("Invalid rgb() regex")
        });
        let caps = re.captures(s)?;
        let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
        Some(Self::new(channel(1)?, channel(2)?, channel(3)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ValueError;

    /// Accepts `#rrggbb`, `#rgb` and `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix('#') {
            Some(hex) => Self::from_hex_digits(hex),
            None => Self::from_rgb_function(&trimmed.to_ascii_lowercase()),
        };
        parsed.ok_or_else(|| ValueError::InvalidColor(s.to_string()))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Font size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FontSize(u16);

impl FontSize {
    pub const DEFAULT: FontSize = FontSize(16);
    pub const MIN_PX: u16 = 1;
    pub const MAX_PX: u16 = 400;

    pub fn new(px: u16) -> Result<Self, ValueError> {
        if (Self::MIN_PX..=Self::MAX_PX).contains(&px) {
            Ok(Self(px))
        } else {
            Err(ValueError::InvalidFontSize(px.to_string()))
        }
    }

    pub fn px(self) -> u16 {
        self.0
    }

    /// Maps the legacy HTML `<font size="1..7">` scale to pixels.
    pub fn from_html_size(size: u8) -> Self {
        let px = match size {
            0 | 1 => 10,
            2 => 13,
            3 => 16,
            4 => 18,
            5 => 24,
            6 => 32,
            _ => 48,
        };
        Self(px)
    }

    /// Moves the size by `delta` pixels, saturating at the valid range.
    pub fn step(self, delta: i32) -> Self {
        let (min, max) = (i32::from(Self::MIN_PX), i32::from(Self::MAX_PX));
        let px = (i32::from(self.0) + delta).clamp(min, max);
        Self(px as u16)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

impl FromStr for FontSize {
    type Err = ValueError;

    /// Accepts `18`, `18px` and fractional pixel values such as `13.5px`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidFontSize(s.to_string());
        let number = s.trim();
        let number = number.strip_suffix("px").unwrap_or(number).trim();
        let px: f64 = number.parse().map_err(|_| invalid())?;
        let range = f64::from(Self::MIN_PX)..=f64::from(Self::MAX_PX);
        if !px.is_finite() || !range.contains(&px.round()) {
            return Err(invalid());
        }
        Ok(Self(px.round() as u16))
    }
}

/// Background highlight behind a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Transparent,
    Color(Rgb),
}

impl fmt::Display for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Highlight::Transparent => f.write_str("transparent"),
            Highlight::Color(rgb) => rgb.fmt(f),
        }
    }
}

impl FromStr for Highlight {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("transparent") {
            return Ok(Highlight::Transparent);
        }
        s.parse().map(Highlight::Color)
    }
}

impl Serialize for Highlight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Block-level horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

impl FromStr for Align {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" | "end" => Ok(Align::Right),
            _ => Err(ValueError::InvalidAlign(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub href: String,
}

/// The boolean attributes a toggle command can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFlag {
    Bold,
    Italic,
    Underline,
}

/// The uniform style shared by every character of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size: FontSize,
    pub text_color: Rgb,
    pub highlight: Highlight,
    pub link: Option<Link>,
}

impl RunStyle {
    pub fn is_default(&self) -> bool {
        *self == RunStyle::default()
    }

    pub fn has(&self, flag: StyleFlag) -> bool {
        match flag {
            StyleFlag::Bold => self.bold,
            StyleFlag::Italic => self.italic,
            StyleFlag::Underline => self.underline,
        }
    }

    pub fn set(&mut self, flag: StyleFlag, on: bool) {
        match flag {
            StyleFlag::Bold => self.bold = on,
            StyleFlag::Italic => self.italic = on,
            StyleFlag::Underline => self.underline = on,
        }
    }
}

/// A contiguous span of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::default())
    }

    /// Length in Unicode scalar values, the unit of every offset in a document.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Splits the run at character `offset`, returning the tail as a new run.
    pub(crate) fn split_off(&mut self, offset: usize) -> Run {
        let byte = byte_index(&self.text, offset);
        let tail = self.text.split_off(byte);
        Run::new(tail, self.style.clone())
    }
}

/// Byte index of the `offset`-th character, clamped to the end of `s`.
pub(crate) fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map_or(s.len(), |(i, _)| i)
}
