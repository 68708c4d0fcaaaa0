use anyhow::Result;
use log::debug;

use crate::manifest::ManifestStore;
use crate::runtime::Runtime;

use super::config::Config;

/// Create `package.json` with empty dependency sections
#[tracing::instrument(skip(runtime, config))]
pub fn init<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let project = config.project();
    let store = ManifestStore::new(&runtime, project.manifest_path);

    if store.init()? {
        debug!("Created {:?}", store.path());
    } else {
        println!("package.json already exists");
    }
    Ok(())
}
