//! CLI logic for the dottie env file tool.
//!
//! Every subcommand reads the env file, runs one library operation and either
//! prints the result or writes the file back. Files are written back with
//! all-on direct rendering so nothing the command did not touch changes.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, PrintArgs, QuoteStyle, SetArgs};

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};

use dottie::{
    Assignment, Comment, Document, Dottie, DottieError, Placement, Quote, UpsertSettings,
    Warning,
    render::{self, OutputKind, Settings},
};

/// Run the dottie CLI application, printing to stdout.
///
/// # Errors
///
/// Returns `DottieError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Interpolation, upsert, validation and merge errors
pub fn run(args: &Args) -> Result<(), DottieError> {
    let stdout = io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// Run the dottie CLI application, printing to `out`.
pub fn run_with_output(args: &Args, out: &mut impl Write) -> Result<(), DottieError> {
    info!(file = args.file, command:? = args.command; "Running command");

    let app_config = config::load_config(args.config.as_ref())?;
    let dottie = Dottie::new(app_config);
    let mut document = dottie.read(&args.file)?;

    match &args.command {
        Command::Print(print) => {
            let settings = print_settings(&dottie, print)?;
            if settings.use_interpolated_values() {
                report_warnings(&dottie.interpolate(&mut document)?);
            }
            out.write_all(dottie.render_with(&document, &settings).as_bytes())?;
        }
        Command::Fmt => {
            write_file(&args.file, &dottie.format(&document))?;
            info!(file = args.file; "Formatted file");
        }
        Command::Value { key, literal } => {
            let assignment = document.get(key).ok_or_else(|| missing(key))?;
            let value = if *literal {
                assignment.literal().to_string()
            } else {
                report_warnings(&document.interpolate_statement(key)?);
                document
                    .get(key)
                    .map(|assignment| assignment.interpolated().to_string())
                    .unwrap_or_default()
            };
            writeln!(out, "{value}")?;
        }
        Command::Set(set) => {
            let warnings = set_value(&dottie, &mut document, set)?;
            report_warnings(&warnings);
            save(&args.file, &document)?;
        }
        Command::Enable { key } => {
            document.enable(key)?;
            save(&args.file, &document)?;
        }
        Command::Disable { key } => {
            document.disable(key)?;
            save(&args.file, &document)?;
        }
        Command::Validate => {
            report_warnings(&dottie.interpolate(&mut document)?);
            dottie.validate(&document)?;
            writeln!(out, "{}: no validation errors", args.file)?;
        }
        Command::Groups => {
            for group in document.groups() {
                writeln!(out, "{}", group.name())?;
            }
        }
        Command::Update { source, strict } => {
            let mut upstream = dottie.read(source)?;
            let report = if *strict {
                let options = dottie::merge::MergeOptions::new()
                    .with_validation(true)
                    .with_fail_on_violation(true)
                    .with_empty_sentinels(
                        dottie.config().validation().empty_sentinels().to_vec(),
                    );
                dottie::merge::merge_from_upstream(&document, &mut upstream, &options)?
            } else {
                dottie.merge(&document, &mut upstream, true)?
            };

            report_warnings(&report.warnings);
            for violation in &report.violations {
                warn!("{violation}");
            }
            for skipped in report.skipped.iter().filter(|skipped| skipped.is_warning()) {
                warn!(name = skipped.name(); "{skipped}");
            }
            for name in dottie::merge::missing_upstream(&document, &upstream) {
                warn!(name = name; "Key is not in the upstream file and was dropped");
            }

            save(&args.file, &upstream)?;
            writeln!(
                out,
                "updated {} key(s), kept {} upstream value(s)",
                report.changed.len(),
                report.skipped.len()
            )?;
        }
    }

    Ok(())
}

fn print_settings(dottie: &Dottie, print: &PrintArgs) -> Result<Settings, DottieError> {
    let mut settings = if print.color {
        dottie.colorized_settings()?
    } else {
        dottie.settings()
    };
    let config = dottie.config().render();

    settings = settings
        .with_disabled(print.with_disabled || config.include_disabled())
        .with_format_output(print.pretty)
        .with_export(print.export)
        .with_interpolated_values(print.interpolate || config.use_interpolated_values());
    if print.no_comments {
        settings = settings.with_comments(false);
    }
    if print.no_blank_lines {
        settings = settings.with_blank_lines(false);
    }
    if let Some(group) = &print.group {
        settings = settings.with_group(group.as_str());
    }
    if let Some(prefix) = &print.key_prefix {
        settings = settings.with_key_prefix(prefix.as_str());
    }
    if print.keys_only {
        settings = settings.with_output(OutputKind::CompletionKeys);
    }
    Ok(settings)
}

fn set_value(
    dottie: &Dottie,
    document: &mut Document,
    set: &SetArgs,
) -> Result<Vec<Warning>, DottieError> {
    let quote = match set.quote {
        QuoteStyle::Double => Quote::Double,
        QuoteStyle::Single => Quote::Single,
        QuoteStyle::None => Quote::Unquoted,
    };
    let comments: Vec<Comment> = set.comment.iter().map(Comment::new).collect();

    let mut settings = UpsertSettings::empty();
    if !set.no_validate {
        settings |= UpsertSettings::VALIDATE;
    }
    if !comments.is_empty() {
        settings |= UpsertSettings::UPDATE_COMMENTS;
    }

    let mut builder = dottie.upserter().settings(settings);
    if let Some(key) = &set.before {
        builder = builder.placement(Placement::AddBeforeKey(key.clone()));
    } else if let Some(key) = &set.after {
        builder = builder.placement(Placement::AddAfterKey(key.clone()));
    }
    if let Some(group) = &set.group {
        builder = builder.group(group.as_str()).create_group(true);
    }

    let input = Assignment::new(set.key.as_str(), set.value.as_str())
        .with_quote(quote)
        .with_enabled(!set.disabled)
        .with_comments(comments);

    let upserter = builder.build(document)?;
    let outcome = upserter.upsert(document, input)?;
    Ok(outcome.warnings().to_vec())
}

fn missing(key: &str) -> DottieError {
    DottieError::Upsert(dottie::dottie_core::UpsertError::Missing {
        name: key.to_string(),
    })
}

fn report_warnings(warnings: &[Warning]) {
    for warning in warnings {
        warn!("{warning}");
    }
}

fn save(path: &str, document: &Document) -> Result<(), DottieError> {
    write_file(path, &render::render(document, &Settings::new()))?;
    info!(file = path; "Saved file");
    Ok(())
}

fn write_file(path: &str, contents: &str) -> Result<(), DottieError> {
    fs::write(path, contents)?;
    Ok(())
}
