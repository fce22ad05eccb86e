//! Output backends.
//!
//! A backend turns one statement into text. It never decides what is shown
//! or where blank lines go; that is up to the renderer and its policy.

use dottie_core::{Banner, Comment, Layout};

use crate::color::Palette;

/// Width of the `#` rule above and below a group name.
pub const BANNER_WIDTH: usize = 80;

/// Layout of assignments that are not written as in their source.
pub(crate) static CANONICAL: Layout = Layout::new();

/// An assignment ready to be written: the value is already escaped and
/// quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssignmentLine<'a> {
    pub name: &'a str,
    pub value: Option<String>,
    pub enabled: bool,
    pub export: bool,
    pub layout: &'a Layout,
}

impl AssignmentLine<'_> {
    /// Indent and disable marker.
    fn lead(&self) -> String {
        let mut out = self.layout.indent().to_string();
        if !self.enabled {
            out.push_str(self.layout.marker());
        }
        if self.export {
            out.push_str("export ");
        }
        out
    }

    /// Everything after the name, with `paint` applied to the value.
    fn tail(&self, paint: impl Fn(&str) -> String) -> String {
        let layout = self.layout;
        match &self.value {
            Some(value) => format!(
                "{}={}{}{}",
                layout.before_assign(),
                layout.after_assign(),
                paint(value),
                layout.trailing()
            ),
            None => layout.before_assign().to_string(),
        }
    }
}

pub(crate) trait Output {
    fn assignment(&self, line: &AssignmentLine<'_>) -> Option<String>;

    fn comment(&self, comment: &Comment) -> Option<String>;

    /// The three banner lines, joined by newlines. `written` holds the lines
    /// as they appeared in the source, if they are to be kept.
    fn banner(&self, name: &str, written: Option<&Banner>) -> Option<String>;

    fn blank(&self) -> Option<String> {
        Some(String::new())
    }
}

fn rule() -> String {
    "#".repeat(BANNER_WIDTH)
}

fn banner_lines(name: &str, written: Option<&Banner>) -> [String; 3] {
    match written {
        Some(banner) => [
            banner.opening().to_string(),
            banner.title().to_string(),
            banner.closing().to_string(),
        ],
        None => [rule(), format!("# {name}"), rule()],
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Plain;

impl Output for Plain {
    fn assignment(&self, line: &AssignmentLine<'_>) -> Option<String> {
        let tail = line.tail(str::to_string);
        Some(format!("{}{}{tail}", line.lead(), line.name))
    }

    fn comment(&self, comment: &Comment) -> Option<String> {
        Some(comment.value().to_string())
    }

    fn banner(&self, name: &str, written: Option<&Banner>) -> Option<String> {
        Some(banner_lines(name, written).join("\n"))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Colorized {
    palette: Palette,
}

impl Colorized {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl Output for Colorized {
    fn assignment(&self, line: &AssignmentLine<'_>) -> Option<String> {
        if !line.enabled {
            let plain = Plain.assignment(line)?;
            return Some(self.palette.disabled.paint(&plain));
        }

        let key = self.palette.key.paint_bold(line.name);
        let tail = line.tail(|value| self.palette.value.paint(value));
        Some(format!("{}{key}{tail}", line.lead()))
    }

    fn comment(&self, comment: &Comment) -> Option<String> {
        let Some(annotation) = comment.annotation() else {
            return Some(self.palette.comment.paint(comment.value()));
        };
        let key = self.palette.annotation.paint_bold(annotation.key());
        let mut out = format!("{} {key}", self.palette.comment.paint("# @"));
        if !annotation.value().is_empty() {
            out.push(' ');
            out.push_str(&self.palette.comment.paint(annotation.value()));
        }
        Some(out)
    }

    fn banner(&self, name: &str, written: Option<&Banner>) -> Option<String> {
        let [opening, title, closing] = banner_lines(name, written);
        Some(format!(
            "{}\n{}\n{}",
            self.palette.banner.paint(&opening),
            self.palette.banner.paint_bold(&title),
            self.palette.banner.paint(&closing)
        ))
    }
}

/// Assignment names only.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CompletionKeys;

impl Output for CompletionKeys {
    fn assignment(&self, line: &AssignmentLine<'_>) -> Option<String> {
        Some(line.name.to_string())
    }

    fn comment(&self, _comment: &Comment) -> Option<String> {
        None
    }

    fn banner(&self, _name: &str, _written: Option<&Banner>) -> Option<String> {
        None
    }

    fn blank(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(enabled: bool, export: bool) -> AssignmentLine<'static> {
        AssignmentLine {
            name: "PORT",
            value: Some("\"8080\"".to_string()),
            enabled,
            export,
            layout: &CANONICAL,
        }
    }

    #[test]
    fn test_plain_assignment() {
        assert_eq!(Plain.assignment(&line(true, false)).unwrap(), "PORT=\"8080\"");
        assert_eq!(Plain.assignment(&line(false, false)).unwrap(), "#PORT=\"8080\"");
        assert_eq!(
            Plain.assignment(&line(true, true)).unwrap(),
            "export PORT=\"8080\""
        );
    }

    #[test]
    fn test_plain_incomplete_assignment() {
        let line = AssignmentLine {
            value: None,
            ..line(true, false)
        };
        assert_eq!(Plain.assignment(&line).unwrap(), "PORT");
    }

    #[test]
    fn test_plain_assignment_keeps_layout() {
        let layout = Layout::new()
            .with_indent("  ")
            .with_marker("# ")
            .with_assign_spacing(" ", " ")
            .with_trailing("\t");
        let disabled = AssignmentLine {
            layout: &layout,
            ..line(false, false)
        };
        assert_eq!(
            Plain.assignment(&disabled).unwrap(),
            "  # PORT = \"8080\"\t"
        );

        let incomplete = AssignmentLine {
            value: None,
            enabled: true,
            ..disabled
        };
        assert_eq!(Plain.assignment(&incomplete).unwrap(), "  PORT ");
    }

    #[test]
    fn test_plain_banner() {
        let banner = Plain.banner("Database", None).unwrap();
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), BANNER_WIDTH);
        assert_eq!(lines[1], "# Database");
    }

    #[test]
    fn test_plain_banner_as_written() {
        let written = Banner::new("###", "#   Database", "###");
        assert_eq!(
            Plain.banner("Database", Some(&written)).unwrap(),
            "###\n#   Database\n###"
        );
    }

    #[test]
    fn test_colorized_annotation_key_is_emphasised() {
        let palette = Palette::dark();
        let comment = Comment::new("# @dottie/validate required");
        let rendered = Colorized::new(palette).comment(&comment).unwrap();
        assert!(rendered.contains(&palette.annotation.paint_bold("dottie/validate")));
        assert!(rendered.contains("required"));
    }

    #[test]
    fn test_completion_keys_only_names() {
        assert_eq!(
            CompletionKeys.assignment(&line(true, true)).unwrap(),
            "PORT"
        );
        assert!(CompletionKeys.comment(&Comment::new("# x")).is_none());
        assert!(CompletionKeys.banner("Database", None).is_none());
        assert!(CompletionKeys.blank().is_none());
    }
}
