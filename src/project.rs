//! Paths of the project a command operates on.

use std::path::{Path, PathBuf};

use crate::installer::MODULES_DIR;
use crate::manifest::MANIFEST_FILE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Project directory (e.g., /home/user/app)
    pub root: PathBuf,
    /// The manifest (e.g., /home/user/app/package.json)
    pub manifest_path: PathBuf,
    /// Install directory (e.g., /home/user/app/python_modules)
    pub modules_dir: PathBuf,
}

impl ProjectContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            manifest_path: root.join(MANIFEST_FILE),
            modules_dir: root.join(MODULES_DIR),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
