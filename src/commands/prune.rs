use anyhow::Result;
use log::debug;

use crate::application::PruneAction;
use crate::runtime::Runtime;

use super::config::Config;

/// Remove installed packages that no declared dependency needs
#[tracing::instrument(skip(runtime, config))]
pub fn prune<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let project = config.project();
    debug!("Pruning {:?}", project.modules_dir);

    let pruned = PruneAction::new(&runtime, &project).prune()?;
    for package in &pruned {
        println!("Removed {}", package.name);
    }
    Ok(())
}
