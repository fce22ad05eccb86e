//! Command-line argument definitions for the dottie CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options select the env file, the configuration file
//! and the logging verbosity; the [`Command`] says what to do with the file.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

/// Command-line arguments for the dottie env file tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the env file
    #[arg(short, long, global = true, default_value = ".env")]
    pub file: String,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the file, optionally filtered
    Print(PrintArgs),

    /// Rewrite the file with normalised spacing
    Fmt,

    /// Print the value of a key
    Value {
        key: String,

        /// Print the value as written instead of interpolated
        #[arg(long)]
        literal: bool,
    },

    /// Create or update a key
    Set(SetArgs),

    /// Enable a disabled key
    Enable { key: String },

    /// Disable a key, keeping its value
    Disable { key: String },

    /// Check every key against its `@dottie/validate` rule
    Validate,

    /// List the groups of the file
    Groups,

    /// Merge the values of the file into a newer upstream file and replace
    /// the file with the result
    Update {
        /// Path to the upstream env file
        #[arg(long)]
        source: String,

        /// Abort on the first validation error instead of reporting it
        #[arg(long)]
        strict: bool,
    },
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct PrintArgs {
    /// Include disabled keys
    #[arg(long)]
    pub with_disabled: bool,

    /// Leave out comments
    #[arg(long)]
    pub no_comments: bool,

    /// Leave out blank lines
    #[arg(long)]
    pub no_blank_lines: bool,

    /// Only print keys of this group
    #[arg(long)]
    pub group: Option<String>,

    /// Only print keys starting with this prefix
    #[arg(long)]
    pub key_prefix: Option<String>,

    /// Print interpolated values
    #[arg(long)]
    pub interpolate: bool,

    /// Prefix every key with `export`
    #[arg(long)]
    pub export: bool,

    /// Colorize the output
    #[arg(long)]
    pub color: bool,

    /// Print key names only
    #[arg(long, conflicts_with = "color")]
    pub keys_only: bool,

    /// Use formatter spacing
    #[arg(long)]
    pub pretty: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SetArgs {
    pub key: String,

    pub value: String,

    /// Quote style used when the key is written
    #[arg(long, value_enum, default_value_t = QuoteStyle::Double)]
    pub quote: QuoteStyle,

    /// Group for a new key; created when missing
    #[arg(long)]
    pub group: Option<String>,

    /// Insert a new key before this key
    #[arg(long, conflicts_with = "after")]
    pub before: Option<String>,

    /// Insert a new key after this key
    #[arg(long)]
    pub after: Option<String>,

    /// Write the key disabled
    #[arg(long)]
    pub disabled: bool,

    /// Comment lines to put above the key
    #[arg(long)]
    pub comment: Vec<String>,

    /// Skip validation of the new value
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    Single,
    None,
}
