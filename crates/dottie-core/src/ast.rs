//! Abstract syntax tree for env documents.
//!
//! A [`Document`] owns an ordered list of top-level [`Statement`]s followed by
//! its [`Group`]s, each of which owns the statements between its banner and
//! the next one. Statements refer back to their group by name only, so
//! ownership always flows from the document downwards.
//!
//! # Overview
//!
//! - [`Assignment`] - a `KEY=value` pair, possibly disabled (`#KEY=value`)
//! - [`Comment`] - a `#` line, optionally carrying an [`Annotation`]
//! - [`Newline`] - a blank line kept for round-trip rendering
//! - [`Group`] - a named region introduced by a banner
//! - [`Quote`] - the quoting style of a value
//! - [`Layout`] and [`Banner`] - source whitespace kept for direct rendering

mod annotation;
mod assignment;
mod comment;
mod document;
mod group;
mod layout;
mod newline;
mod quote;
mod statement;

pub use annotation::Annotation;
pub use assignment::Assignment;
pub use comment::Comment;
pub use document::Document;
pub use group::Group;
pub use layout::{Banner, Layout};
pub use newline::Newline;
pub use quote::Quote;
pub use statement::Statement;
