//! Configuration types for dottie.
//!
//! All types implement [`serde::Deserialize`] and every section defaults, so
//! an empty TOML file is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`RenderConfig`] - Default filters used when printing documents.
//! - [`StyleConfig`] - Theme and colour overrides for colorized output.
//! - [`InterpolationConfig`] - How unset names are resolved.
//! - [`ValidationConfig`] - Values treated as "not set" when merging.
//!
//! # Example
//!
//! ```
//! # use dottie::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.render().show_comments());
//! assert!(config.style().palette().is_ok());
//! ```

use serde::Deserialize;

use crate::{
    color::{Color, Palette, Theme},
    render::Settings,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    render: RenderConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    interpolation: InterpolationConfig,

    #[serde(default)]
    validation: ValidationConfig,
}

impl AppConfig {
    pub fn new(
        render: RenderConfig,
        style: StyleConfig,
        interpolation: InterpolationConfig,
        validation: ValidationConfig,
    ) -> Self {
        Self {
            render,
            style,
            interpolation,
            validation,
        }
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn interpolation(&self) -> &InterpolationConfig {
        &self.interpolation
    }

    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }
}

fn enabled() -> bool {
    true
}

/// Default filters for printing.
///
/// Disabled assignments are hidden unless enabled here; everything else is
/// shown.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "enabled")]
    show_comments: bool,

    #[serde(default = "enabled")]
    show_blank_lines: bool,

    #[serde(default = "enabled")]
    show_group_banners: bool,

    #[serde(default)]
    include_disabled: bool,

    #[serde(default)]
    use_interpolated_values: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_comments: true,
            show_blank_lines: true,
            show_group_banners: true,
            include_disabled: false,
            use_interpolated_values: false,
        }
    }
}

impl RenderConfig {
    pub fn show_comments(&self) -> bool {
        self.show_comments
    }

    pub fn show_blank_lines(&self) -> bool {
        self.show_blank_lines
    }

    pub fn show_group_banners(&self) -> bool {
        self.show_group_banners
    }

    pub fn include_disabled(&self) -> bool {
        self.include_disabled
    }

    pub fn use_interpolated_values(&self) -> bool {
        self.use_interpolated_values
    }

    /// Renderer settings carrying these defaults.
    pub fn settings(&self) -> Settings {
        Settings::new()
            .with_comments(self.show_comments)
            .with_blank_lines(self.show_blank_lines)
            .with_group_banners(self.show_group_banners)
            .with_disabled(self.include_disabled)
            .with_interpolated_values(self.use_interpolated_values)
    }
}

/// Theme and colour overrides for colorized output.
///
/// Overrides are CSS colour strings; unset entries come from the theme's
/// palette.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    theme: Theme,

    #[serde(default)]
    key: Option<String>,

    #[serde(default)]
    value: Option<String>,

    #[serde(default)]
    comment: Option<String>,

    #[serde(default)]
    annotation: Option<String>,

    #[serde(default)]
    banner: Option<String>,

    #[serde(default)]
    disabled: Option<String>,
}

impl StyleConfig {
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The theme's palette with the configured overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error naming the entry when an override is not a valid
    /// colour.
    pub fn palette(&self) -> Result<Palette, String> {
        let mut palette = Palette::for_theme(self.theme);
        let overrides = [
            ("key", &self.key, &mut palette.key),
            ("value", &self.value, &mut palette.value),
            ("comment", &self.comment, &mut palette.comment),
            ("annotation", &self.annotation, &mut palette.annotation),
            ("banner", &self.banner, &mut palette.banner),
            ("disabled", &self.disabled, &mut palette.disabled),
        ];
        for (name, configured, slot) in overrides {
            if let Some(css) = configured {
                *slot = Color::new(css)
                    .map_err(|err| format!("Invalid {name} color in config: {err}"))?;
            }
        }
        Ok(palette)
    }
}

/// How names that no enabled assignment defines are resolved.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InterpolationConfig {
    /// Fall back to the process environment.
    #[serde(default)]
    env_fallback: bool,
}

impl InterpolationConfig {
    pub fn new(env_fallback: bool) -> Self {
        Self { env_fallback }
    }

    pub fn env_fallback(&self) -> bool {
        self.env_fallback
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Literals that count as "not set" when merging, such as `changeme`.
    #[serde(default)]
    empty_sentinels: Vec<String>,
}

impl ValidationConfig {
    pub fn new(empty_sentinels: Vec<String>) -> Self {
        Self { empty_sentinels }
    }

    pub fn empty_sentinels(&self) -> &[String] {
        &self.empty_sentinels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_overrides() {
        let style = StyleConfig {
            theme: Theme::Light,
            key: Some("red".to_string()),
            ..StyleConfig::default()
        };
        let palette = style.palette().unwrap();
        assert_eq!(palette.key, Color::new("red").unwrap());
        assert_eq!(palette.value, Palette::light().value);
    }

    #[test]
    fn test_invalid_override() {
        let style = StyleConfig {
            banner: Some("nope".to_string()),
            ..StyleConfig::default()
        };
        let err = style.palette().unwrap_err();
        assert!(err.starts_with("Invalid banner color in config"));
    }

    #[test]
    fn test_render_defaults_hide_disabled() {
        let settings = RenderConfig::default().settings();
        assert!(!settings.include_disabled());
        assert!(settings.show_comments());
        assert!(!settings.use_interpolated_values());
    }
}
