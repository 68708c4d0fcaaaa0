//! Package management module
//!
//! This module provides abstractions for the packages installed into a
//! project, including metadata discovery, version resolution and the
//! dependency tree linking them to the manifest.

mod discovery;
mod meta;
mod tree;
mod version;

pub use discovery::{find_package, scan_packages};
pub use meta::{InstalledPackage, Requirement, is_plain_entry, normalize_name, top_level_entries};
pub use tree::{DependencyTree, TreeNode};
pub use version::{PackageVersion, RangeExpr, ResolveError, VersionResolver};
