//! Install use case - resolves versions on the index and runs the installer.

use anyhow::Result;
use log::{debug, info};

use crate::index::{Lookup, PackageIndex};
use crate::installer::{InstallConfig, InstallRequest, Installer};
use crate::manifest::ManifestStore;
use crate::package::{RangeExpr, VersionResolver, normalize_name, scan_packages};
use crate::project::ProjectContext;
use crate::runtime::Runtime;

/// What happened to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { name: String, version: String },
    /// The index does not know the package
    NotFound { name: String },
    /// The package has no releases
    NoReleases { name: String },
}

/// Install use case - one per command invocation
pub struct InstallAction<'a, R: Runtime, P: PackageIndex, I: Installer> {
    runtime: &'a R,
    project: &'a ProjectContext,
    index: &'a P,
    installer: &'a I,
    config: &'a InstallConfig,
}

impl<'a, R: Runtime, P: PackageIndex, I: Installer> InstallAction<'a, R, P, I> {
    pub fn new(
        runtime: &'a R,
        project: &'a ProjectContext,
        index: &'a P,
        installer: &'a I,
        config: &'a InstallConfig,
    ) -> Self {
        Self {
            runtime,
            project,
            index,
            installer,
            config,
        }
    }

    /// Install every declared dependency that is not installed yet, each at
    /// the highest version its range allows.
    ///
    /// Packages unknown to the index, or without releases, are skipped and
    /// reported. A range no published version satisfies is an error.
    #[tracing::instrument(skip(self))]
    pub async fn install_declared(&self) -> Result<Vec<InstallOutcome>> {
        let store = ManifestStore::new(self.runtime, self.project.manifest_path.clone());
        let declared = store.dependencies()?;
        let installed: Vec<String> = scan_packages(self.runtime, &self.project.modules_dir)?
            .iter()
            .map(|p| p.key())
            .collect();

        let mut outcomes = Vec::new();
        for (name, range) in &declared {
            if installed.contains(&normalize_name(name)) {
                debug!("{} is already installed", name);
                continue;
            }

            let versions = match self.index.available_versions(name).await? {
                Lookup::NotFound => {
                    outcomes.push(InstallOutcome::NotFound { name: name.clone() });
                    continue;
                }
                Lookup::Empty => {
                    outcomes.push(InstallOutcome::NoReleases { name: name.clone() });
                    continue;
                }
                lookup @ Lookup::Found(_) => lookup.versions(),
            };

            let wanted = VersionResolver::wanted(range, &versions)?;
            self.installer
                .install(self.config, &InstallRequest::pinned(name, &wanted))?;
            outcomes.push(InstallOutcome::Installed {
                name: name.clone(),
                version: wanted,
            });
        }

        Ok(outcomes)
    }

    /// Install (or upgrade to) the latest version of `name`. With `save`,
    /// record `^<latest>` in the manifest.
    #[tracing::instrument(skip(self))]
    pub async fn install_latest(&self, name: &str, save: bool) -> Result<InstallOutcome> {
        let versions = match self.index.available_versions(name).await? {
            Lookup::NotFound => return Ok(InstallOutcome::NotFound { name: name.into() }),
            Lookup::Empty => return Ok(InstallOutcome::NoReleases { name: name.into() }),
            lookup @ Lookup::Found(_) => lookup.versions(),
        };

        let Some(latest) = VersionResolver::latest(&versions) else {
            return Ok(InstallOutcome::NoReleases { name: name.into() });
        };

        self.installer.install(
            self.config,
            &InstallRequest::pinned(name, &latest).upgrade(),
        )?;
        info!("Installed {} {}", name, latest);

        if save {
            let store = ManifestStore::new(self.runtime, self.project.manifest_path.clone());
            let mut dependencies = store.dependencies()?;
            dependencies.insert(name.to_string(), RangeExpr::compatible_with(&latest));
            store.write_dependencies(dependencies)?;
        }

        Ok(InstallOutcome::Installed {
            name: name.to_string(),
            version: latest,
        })
    }
}
