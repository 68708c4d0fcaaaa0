//! List action - reconciles the manifest with the install directory.

use anyhow::Result;
use log::debug;

use crate::manifest::ManifestStore;
use crate::package::{DependencyTree, scan_packages};
use crate::project::ProjectContext;
use crate::runtime::Runtime;

/// List action - builds the dependency tree of a project
pub struct ListAction<'a, R: Runtime> {
    runtime: &'a R,
    project: &'a ProjectContext,
}

impl<'a, R: Runtime> ListAction<'a, R> {
    pub fn new(runtime: &'a R, project: &'a ProjectContext) -> Self {
        Self { runtime, project }
    }

    /// Build the tree of declared dependencies; the root is labelled with
    /// the project directory.
    #[tracing::instrument(skip(self))]
    pub fn dependency_tree(&self) -> Result<DependencyTree> {
        let store = ManifestStore::new(self.runtime, self.project.manifest_path.clone());
        let declared = store.dependencies()?;
        let installed = scan_packages(self.runtime, &self.project.modules_dir)?;
        debug!(
            "{} declared, {} installed",
            declared.len(),
            installed.len()
        );

        Ok(DependencyTree::build(&declared, &installed)
            .with_root_label(self.project.root.display().to_string()))
    }
}
