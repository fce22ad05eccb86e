use dottie_core::Selector;

use crate::color::Palette;

/// Which backend turns statements into text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum OutputKind {
    #[default]
    Plain,
    /// ANSI colours from the palette
    Colorized(Palette),
    /// Assignment names only, one per line, for shell completion
    CompletionKeys,
}

/// Renderer settings.
///
/// [`Settings::new`] shows everything, renders literals and keeps the
/// source layout, so rendering a parsed document reproduces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    retain_key_prefix: Option<String>,
    retain_group: Option<String>,
    include_disabled: bool,
    show_blank_lines: bool,
    show_comments: bool,
    show_group_banners: bool,
    show_hidden: bool,
    format_output: bool,
    use_interpolated_values: bool,
    export: bool,
    output: OutputKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    pub fn new() -> Self {
        Self {
            retain_key_prefix: None,
            retain_group: None,
            include_disabled: true,
            show_blank_lines: true,
            show_comments: true,
            show_group_banners: true,
            show_hidden: true,
            format_output: false,
            use_interpolated_values: false,
            export: false,
            output: OutputKind::Plain,
        }
    }

    /// Only render assignments whose name starts with `prefix`.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.retain_key_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Only render statements of the named group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.retain_group = (!group.is_empty()).then_some(group);
        self
    }

    pub fn with_disabled(mut self, include_disabled: bool) -> Self {
        self.include_disabled = include_disabled;
        self
    }

    pub fn with_blank_lines(mut self, show_blank_lines: bool) -> Self {
        self.show_blank_lines = show_blank_lines;
        self
    }

    pub fn with_comments(mut self, show_comments: bool) -> Self {
        self.show_comments = show_comments;
        self
    }

    pub fn with_group_banners(mut self, show_group_banners: bool) -> Self {
        self.show_group_banners = show_group_banners;
        self
    }

    /// Whether assignments annotated with `@dottie/hidden` are rendered.
    pub fn with_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    /// Use the formatter layout instead of the source layout.
    pub fn with_format_output(mut self, format_output: bool) -> Self {
        self.format_output = format_output;
        self
    }

    pub fn with_interpolated_values(mut self, use_interpolated_values: bool) -> Self {
        self.use_interpolated_values = use_interpolated_values;
        self
    }

    /// Prefix assignments with `export `.
    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    pub fn with_output(mut self, output: OutputKind) -> Self {
        self.output = output;
        self
    }

    /// Shorthand for colorized output with `palette`.
    pub fn with_colors(self, palette: Palette) -> Self {
        self.with_output(OutputKind::Colorized(palette))
    }

    pub fn retain_key_prefix(&self) -> Option<&str> {
        self.retain_key_prefix.as_deref()
    }

    pub fn retain_group(&self) -> Option<&str> {
        self.retain_group.as_deref()
    }

    pub fn include_disabled(&self) -> bool {
        self.include_disabled
    }

    pub fn show_blank_lines(&self) -> bool {
        self.show_blank_lines
    }

    pub fn show_colors(&self) -> bool {
        matches!(self.output, OutputKind::Colorized(_))
    }

    pub fn show_comments(&self) -> bool {
        self.show_comments
    }

    pub fn show_group_banners(&self) -> bool {
        self.show_group_banners
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn format_output(&self) -> bool {
        self.format_output
    }

    pub fn use_interpolated_values(&self) -> bool {
        self.use_interpolated_values
    }

    pub fn export(&self) -> bool {
        self.export
    }

    pub fn output(&self) -> OutputKind {
        self.output
    }

    /// Returns `true` when a prefix or group filter narrows the output.
    pub(crate) fn is_narrowed(&self) -> bool {
        self.retain_key_prefix.is_some() || self.retain_group.is_some()
    }

    /// The statement filters these settings imply.
    pub fn selectors(&self) -> Vec<Selector> {
        let mut selectors = Vec::new();
        if !self.include_disabled {
            selectors.push(Selector::ExcludeDisabled);
        }
        if !self.show_comments {
            selectors.push(Selector::ExcludeComments);
        }
        if !self.show_blank_lines {
            selectors.push(Selector::ExcludeBlankLines);
        }
        if !self.show_hidden {
            selectors.push(Selector::ExcludeHidden);
        }
        if let Some(prefix) = &self.retain_key_prefix {
            selectors.push(Selector::RetainKeyPrefix(prefix.clone()));
        }
        if let Some(group) = &self.retain_group {
            selectors.push(Selector::RetainGroup(group.clone()));
        }
        selectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_have_no_filters() {
        let settings = Settings::default();
        assert!(settings.selectors().is_empty());
        assert!(!settings.show_colors());
        assert!(!settings.is_narrowed());
    }

    #[test]
    fn test_selectors_follow_settings() {
        let settings = Settings::new()
            .with_disabled(false)
            .with_hidden(false)
            .with_key_prefix("DB_");
        assert_eq!(
            settings.selectors(),
            [
                Selector::ExcludeDisabled,
                Selector::ExcludeHidden,
                Selector::RetainKeyPrefix("DB_".to_string()),
            ]
        );
        assert!(settings.is_narrowed());
    }

    #[test]
    fn test_empty_prefix_is_no_filter() {
        assert_eq!(Settings::new().with_key_prefix("").retain_key_prefix(), None);
    }
}
