use anyhow::Result;
use log::info;

use crate::application::{RemoveAction, RemoveOutcome};
use crate::runtime::Runtime;

use super::config::Config;

/// Remove an installed package; with `save`, also from the manifest
#[tracing::instrument(skip(runtime, config))]
pub fn remove<R: Runtime>(runtime: R, name: &str, save: bool, config: Config) -> Result<()> {
    let project = config.project();
    let action = RemoveAction::new(&runtime, &project);

    match action.remove(name, save)? {
        RemoveOutcome::Removed(package) => info!(
            "Removed {} {}",
            package.name,
            package.version.as_deref().unwrap_or("(unknown)")
        ),
        RemoveOutcome::NotInstalled => println!("package {} is not installed", name),
    }
    Ok(())
}
