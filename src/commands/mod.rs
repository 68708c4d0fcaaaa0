//! Command handlers: resolve configuration, run a use case, print the result.

pub mod config;
mod init;
mod install;
mod list;
mod outdated;
mod prune;
mod remove;
mod services;

pub use config::Config;
pub use init::init;
pub use install::install;
pub use list::list;
pub use outdated::outdated;
pub use prune::prune;
pub use remove::remove;
