//! Core shared types for Javelin.
//!
//! This crate is intentionally small and dependency-free apart from serde.

pub mod paths;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a build issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        f.write_str(s)
    }
}

/// A half-open column span on a single line, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRange {
    pub start: u32,
    pub end: u32,
}

impl ColumnRange {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A one-column span at `column`.
    #[inline]
    pub const fn at(column: u32) -> Self {
        Self {
            start: column,
            end: column + 1,
        }
    }
}
