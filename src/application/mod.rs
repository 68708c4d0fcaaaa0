//! Application layer - Use cases that coordinate the package services.
//!
//! Each action operates on one [`ProjectContext`](crate::project::ProjectContext)
//! and returns data; printing is left to the command layer.

mod install;
mod list;
mod outdated;
mod prune;
mod remove;

pub use install::{InstallAction, InstallOutcome};
pub use list::ListAction;
pub use outdated::{OutdatedAction, OutdatedEntry};
pub use prune::PruneAction;
pub use remove::{RemoveAction, RemoveOutcome};
