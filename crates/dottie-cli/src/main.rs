//! dottie CLI entry point.

use std::{env, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::{GraphicalReportHandler, GraphicalTheme};

use dottie::DottieError;
use dottie_cli::{Args, error_adapter::to_reportables};

/// Exit status when the file was read but breaks its validation rules.
const EXIT_INVALID: i32 = 1;
/// Exit status for every other failure.
const EXIT_FAILURE: i32 = 2;

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("unknown log level `{}`, falling back to warn", args.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(log_level:?, args:?; "dottie starting");

    match dottie_cli::run(&args) {
        Ok(()) => info!("done"),
        Err(err) => {
            report(&err);
            process::exit(exit_code(&err));
        }
    }
}

fn report(err: &DottieError) {
    let handler = if env::var_os("NO_COLOR").is_some() {
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
    } else {
        GraphicalReportHandler::new()
    };

    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        handler
            .render_report(&mut rendered, &reportable)
            .expect("rendering into a String cannot fail");
        error!("{rendered}");
    }
}

fn exit_code(err: &DottieError) -> i32 {
    match err {
        DottieError::Validation(_) => EXIT_INVALID,
        _ => EXIT_FAILURE,
    }
}
