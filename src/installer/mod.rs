//! Installing packages with pip.
//!
//! pip is invoked as `<python> -m pip install <name>==<version>
//! --target=<project>/python_modules`. Everything the invocation needs is
//! carried by an explicit [`InstallConfig`].

mod pip_config;

use anyhow::{Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub use pip_config::{PIP_CONFIG, PipConfigGuard};

pub const DEFAULT_PYTHON: &str = "python3";
pub const MODULES_DIR: &str = "python_modules";
const PIP_CONFIG_FILE: &str = ".piton-pip.conf";

/// Settings shared by every install call of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Python interpreter used to run pip
    pub python: String,
    /// Directory passed to `--target`
    pub target: PathBuf,
    /// Where the temporary pip config file is written
    pub pip_config: PathBuf,
}

impl InstallConfig {
    pub fn new(python: impl Into<String>, project_root: &Path) -> Self {
        Self {
            python: python.into(),
            target: project_root.join(MODULES_DIR),
            pip_config: project_root.join(PIP_CONFIG_FILE),
        }
    }
}

/// One package to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub name: String,
    pub version: Option<String>,
    pub upgrade: bool,
}

impl InstallRequest {
    pub fn pinned(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: Some(version.to_string()),
            upgrade: false,
        }
    }

    pub fn upgrade(mut self) -> Self {
        self.upgrade = true;
        self
    }

    /// The requirement passed to pip: `name` or `name==version`.
    pub fn item(&self) -> String {
        match &self.version {
            Some(version) => format!("{}=={}", self.name, version),
            None => self.name.clone(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Installer {
    fn install(&self, config: &InstallConfig, request: &InstallRequest) -> Result<()>;
}

/// Installs through `python -m pip`.
pub struct PipInstaller<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> PipInstaller<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    fn pip_args(config: &InstallConfig, request: &InstallRequest) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            request.item(),
            format!("--target={}", config.target.display()),
        ];
        if request.upgrade {
            args.push("--upgrade".to_string());
        }
        args
    }
}

impl<R: Runtime> Installer for PipInstaller<'_, R> {
    #[tracing::instrument(skip(self, config))]
    fn install(&self, config: &InstallConfig, request: &InstallRequest) -> Result<()> {
        println!("{}", request.item());

        let guard = PipConfigGuard::create(self.runtime, config.pip_config.clone())?;
        let envs = vec![(
            "PIP_CONFIG_FILE".to_string(),
            guard.path().display().to_string(),
        )];
        let args = Self::pip_args(config, request);

        debug!("Running {} {}", config.python, args.join(" "));
        let code = self.runtime.run_command(&config.python, &args, &envs)?;
        drop(guard);

        if code != 0 {
            bail!("pip failed to install {} (exit code {})", request.item(), code);
        }
        info!("Installed {} into {:?}", request.item(), config.target);
        Ok(())
    }
}
