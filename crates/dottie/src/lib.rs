//! Dottie - structured editing of `.env` files.
//!
//! Parsing, interpolation, validation, editing and rendering of env files
//! that keep their comments, groups and disabled entries intact. The
//! [`Dottie`] type ties the pipeline together under one [`AppConfig`].

pub mod color;
pub mod config;
pub mod merge;
pub mod render;

mod error;

pub use dottie_core;
pub use dottie_core::{
    Annotation, Assignment, CancellationToken, Comment, Document, EnvFallback, Group, Placement,
    Quote, Selector, Statement, UpsertSettings, ValidationError, Warning,
};

pub use error::DottieError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use dottie_core::upsert::UpserterBuilder;

use config::AppConfig;
use merge::{MergeOptions, MergeReport};
use render::Settings;

/// Entry point for working with env documents.
///
/// # Examples
///
/// ```
/// use dottie::{Dottie, config::AppConfig};
///
/// let dottie = Dottie::new(AppConfig::default());
///
/// let mut document = dottie
///     .parse("HOST=db\nURL=\"postgres://${HOST}:${PORT:-5432}\"\n", ".env")
///     .expect("Failed to parse");
///
/// let warnings = dottie.interpolate(&mut document).expect("Failed to interpolate");
/// assert!(warnings.is_empty());
/// assert_eq!(
///     document.get("URL").unwrap().interpolated(),
///     "postgres://db:5432"
/// );
///
/// let text = dottie.render(&document);
/// assert_eq!(text, "HOST=db\nURL=\"postgres://${HOST}:${PORT:-5432}\"\n");
/// ```
#[derive(Default)]
pub struct Dottie {
    config: AppConfig,
}

impl Dottie {
    /// Create a new instance with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a document.
    ///
    /// The document falls back to the process environment for unset names
    /// when `[interpolation] env_fallback` is on.
    ///
    /// # Errors
    ///
    /// Returns [`DottieError::Parse`] carrying the source for reporting.
    pub fn parse(&self, source: &str, filename: &str) -> Result<Document, DottieError> {
        info!(file = filename; "Parsing document");

        let document = dottie_parser::parse(source, filename)
            .map_err(|err| DottieError::new_parse_error(err, source))?;

        debug!(file = filename; "Document parsed successfully");
        trace!(document:?; "Parsed document");
        Ok(self.with_fallback(document))
    }

    /// Read and parse a file. Invalid UTF-8 is reported as a parse error.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Document, DottieError> {
        let path = path.as_ref();
        let filename = path.display().to_string();
        info!(file = filename.as_str(); "Reading document");

        let bytes = fs::read(path)?;
        let document = dottie_parser::parse_bytes(&bytes, &filename).map_err(|err| {
            DottieError::new_parse_error(err, String::from_utf8_lossy(&bytes))
        })?;
        Ok(self.with_fallback(document))
    }

    fn with_fallback(&self, document: Document) -> Document {
        if self.config.interpolation().env_fallback() {
            document.with_env_fallback(EnvFallback::Process)
        } else {
            document
        }
    }

    /// Evaluate every enabled assignment.
    ///
    /// Returns the accumulated warnings; the document is untouched on error.
    pub fn interpolate(&self, document: &mut Document) -> Result<Vec<Warning>, DottieError> {
        let warnings = document.interpolate_all()?;
        debug!(warnings = warnings.len(); "Interpolated document");
        Ok(warnings)
    }

    /// Renderer settings from the configuration.
    pub fn settings(&self) -> Settings {
        self.config.render().settings()
    }

    /// Settings for colorized output using the configured theme and
    /// overrides.
    pub fn colorized_settings(&self) -> Result<Settings, DottieError> {
        let palette = self.config.style().palette().map_err(DottieError::Config)?;
        Ok(self.settings().with_colors(palette))
    }

    /// Render with the configured defaults.
    pub fn render(&self, document: &Document) -> String {
        self.render_with(document, &self.settings())
    }

    pub fn render_with(&self, document: &Document, settings: &Settings) -> String {
        info!(file = document.file(); "Rendering document");
        render::render(document, settings)
    }

    /// Render with normalised spacing, showing everything.
    pub fn format(&self, document: &Document) -> String {
        info!(file = document.file(); "Formatting document");
        render::format(document, &Settings::new())
    }

    /// An upserter builder preloaded with the configured empty sentinels.
    pub fn upserter(&self) -> UpserterBuilder {
        dottie_core::Upserter::builder()
            .empty_sentinels(self.config.validation().empty_sentinels().iter().cloned())
    }

    /// Validate every enabled assignment.
    ///
    /// # Errors
    ///
    /// Returns [`DottieError::Validation`] with every violation in document
    /// order.
    pub fn validate(&self, document: &Document) -> Result<(), DottieError> {
        let errors: Vec<ValidationError> = document
            .validate()
            .into_iter()
            .map(|(_, error)| error)
            .collect();
        info!(file = document.file(), violations = errors.len(); "Validated document");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DottieError::Validation(errors))
        }
    }

    /// Merge `local` into `upstream` with the configured empty sentinels.
    pub fn merge(
        &self,
        local: &Document,
        upstream: &mut Document,
        validate: bool,
    ) -> Result<MergeReport, DottieError> {
        let options = MergeOptions::new()
            .with_validation(validate)
            .with_empty_sentinels(self.config.validation().empty_sentinels().to_vec());
        merge::merge_from_upstream(local, upstream, &options)
    }
}
