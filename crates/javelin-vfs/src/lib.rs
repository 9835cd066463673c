//! File-tree storage abstraction for Javelin.
//!
//! Projects never touch the OS file system directly; they go through the
//! [`SiteTree`] trait, which is intentionally narrow: existence checks, text
//! read/write, directory creation/listing, and a stable identity for the
//! tree root. Two implementations are provided: [`MemoryTree`] for tests and
//! embedding, and [`LocalTree`] over a local directory.

mod local;
mod memory;
mod path;
mod tree;

pub use local::LocalTree;
pub use memory::MemoryTree;
pub use path::TreePath;
pub use tree::{collect_files_with_extension, SiteTree, TreeIdentity};
