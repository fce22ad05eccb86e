//! Colours for terminal output.
//!
//! [`Color`] wraps the `DynamicColor` type from the color crate so palette
//! entries can be written as CSS colour strings. [`Palette`] holds one colour
//! per rendered element and comes in a dark and a light variant.

use std::{env, fmt, str::FromStr};

use color::{DynamicColor, Srgb};
use serde::Deserialize;

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a CSS color string such as `"#ff0000"`,
    /// `"rgb(255, 0, 0)"` or `"red"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dottie::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// The color as 8-bit sRGB channels
    pub fn rgb(self) -> (u8, u8, u8) {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        (rgba.r, rgba.g, rgba.b)
    }

    /// Wrap `text` in 24-bit ANSI foreground escapes.
    pub fn paint(self, text: &str) -> String {
        let (r, g, b) = self.rgb();
        format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
    }

    /// Like [`paint`](Self::paint), also turning on bold.
    pub fn paint_bold(self, text: &str) -> String {
        let (r, g, b) = self.rgb();
        format!("\x1b[1;38;2;{r};{g};{b}m{text}\x1b[0m")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

fn builtin(css: &str) -> Color {
    Color::new(css).expect("built-in palette colors are valid CSS colors")
}

/// Terminal background the palette is chosen for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Pick from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

impl Theme {
    /// Resolve [`Theme::Auto`] from the `COLORFGBG` variable set by many
    /// terminals. Unknown backgrounds are treated as dark.
    pub fn resolve(self) -> Theme {
        match self {
            Theme::Auto => Self::from_colorfgbg(env::var("COLORFGBG").ok().as_deref()),
            theme => theme,
        }
    }

    /// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); backgrounds 7
    /// and 9 to 15 are light.
    fn from_colorfgbg(value: Option<&str>) -> Theme {
        let background = value
            .and_then(|value| value.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());
        match background {
            Some(7 | 9..=15) => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

/// One colour per rendered element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub key: Color,
    pub value: Color,
    pub comment: Color,
    pub annotation: Color,
    pub banner: Color,
    pub disabled: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            key: builtin("#7dcfff"),
            value: builtin("#c3e88d"),
            comment: builtin("#7f849c"),
            annotation: builtin("#f5a97f"),
            banner: builtin("#c099ff"),
            disabled: builtin("#5c6370"),
        }
    }

    pub fn light() -> Self {
        Self {
            key: builtin("#005f87"),
            value: builtin("#3a7d00"),
            comment: builtin("#6c6f85"),
            annotation: builtin("#b35900"),
            banner: builtin("#7030a0"),
            disabled: builtin("#9ca0b0"),
        }
    }

    /// The palette for a theme, resolving [`Theme::Auto`] first.
    pub fn for_theme(theme: Theme) -> Self {
        match theme.resolve() {
            Theme::Light => Self::light(),
            Theme::Dark | Theme::Auto => Self::dark(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
