//! Project model for Javelin.
//!
//! This crate turns a file tree into a [`Project`]:
//! - per-project configuration (source root, output root, libraries,
//!   sibling projects) with typed change notifications
//! - the classpath contributed by the project and its dependencies
//! - the per-project [`BuildIssues`] and [`Breakpoints`] registries

mod breakpoints;
mod config;
mod dependency;
mod issues;
mod project;
mod project_set;
mod registry;

pub use breakpoints::{Breakpoint, BreakpointKind, Breakpoints};
pub use config::{BuildPathKind, ConfigChange, ProjectConfig, DEFAULT_BUILD_DIR, DEFAULT_SOURCE_DIR};
pub use dependency::BuildDependency;
pub use issues::{BuildIssue, BuildIssues, IssueSummary};
pub use project::{Project, ProjectError, BREAKPOINTS_FILE, ISSUES_FILE, SETTINGS_DIR};
pub use project_set::ProjectSet;
pub use registry::ProjectRegistry;
