use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Settings pip reads from `PIP_CONFIG_FILE` while installing into a target
/// directory. An inherited `prefix` (set by some system Pythons) conflicts
/// with `--target`, so it is cleared.
pub const PIP_CONFIG: &str = "[install]\nprefix=\n";

/// A pip config file that exists only as long as this guard does.
pub struct PipConfigGuard<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> PipConfigGuard<'a, R> {
    /// Write the config file to `path`.
    pub fn create(runtime: &'a R, path: PathBuf) -> Result<Self> {
        debug!("Writing pip config {:?}", path);
        runtime.write(&path, PIP_CONFIG.as_bytes())?;
        Ok(Self { runtime, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Runtime> Drop for PipConfigGuard<'_, R> {
    fn drop(&mut self) {
        debug!("Removing pip config {:?}", self.path);
        if let Err(e) = self.runtime.remove_file(&self.path) {
            debug!("Failed to remove {:?}: {}", self.path, e);
        }
    }
}
