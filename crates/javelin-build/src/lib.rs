//! The incremental build pass for Javelin.
//!
//! "Build" here means re-validation: edits mark files dirty, the
//! [`ProjectBuilder`] drains the dirty queue, asks the parsed-unit
//! collaborator for each file's current error list, and reconciles the
//! result into the project's issue registry. Nothing is compiled or
//! executed.

mod builder;
mod parser;

pub use builder::{BuildOutcome, BuildProgress, BuildReport, JavaFileBuilder, ProjectBuilder};
pub use parser::{DelimiterParser, ParsedUnit, UnitError, UnitParser};
