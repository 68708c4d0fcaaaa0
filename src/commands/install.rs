use anyhow::Result;
use log::debug;

use crate::application::{InstallAction, InstallOutcome};
use crate::index::PackageIndex;
use crate::installer::{Installer, PipInstaller};
use crate::runtime::Runtime;

use super::config::Config;
use super::services::build_index;

/// Install one package at its latest version, or every declared dependency
/// that is missing when `name` is `None`
#[tracing::instrument(skip(runtime, config))]
pub async fn install<R: Runtime>(
    runtime: R,
    name: Option<&str>,
    save: bool,
    config: Config,
) -> Result<()> {
    let index = build_index(&config)?;
    let installer = PipInstaller::new(&runtime);
    run(&runtime, &index, &installer, name, save, &config).await
}

pub(crate) async fn run<R: Runtime, P: PackageIndex, I: Installer>(
    runtime: &R,
    index: &P,
    installer: &I,
    name: Option<&str>,
    save: bool,
    config: &Config,
) -> Result<()> {
    let project = config.project();
    let install_config = config.install_config();
    let action = InstallAction::new(runtime, &project, index, installer, &install_config);

    match name {
        Some(name) => report(&action.install_latest(name, save).await?),
        None => {
            if save {
                debug!("--save has no effect without a package name");
            }
            for outcome in action.install_declared().await? {
                report(&outcome);
            }
        }
    }
    Ok(())
}

fn report(outcome: &InstallOutcome) {
    match outcome {
        InstallOutcome::Installed { name, version } => debug!("{} {} installed", name, version),
        InstallOutcome::NotFound { name } => println!("Unable to find package {}", name),
        InstallOutcome::NoReleases { name } => {
            println!("Unable to find releases for package {}", name)
        }
    }
}
