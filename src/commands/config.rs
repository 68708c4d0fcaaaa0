use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::index::DEFAULT_INDEX_URL;
use crate::installer::{DEFAULT_PYTHON, InstallConfig};
use crate::project::ProjectContext;
use crate::runtime::Runtime;

/// Settings resolved from the command line (and its environment variables).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Project directory holding `package.json` and `python_modules/`
    pub root: PathBuf,
    /// Base URL of the package index
    pub index_url: String,
    /// Python interpreter used to run pip
    pub python: String,
}

impl Config {
    /// Fill in defaults for options that were not given. The project root
    /// defaults to the current directory.
    pub fn load<R: Runtime>(
        runtime: &R,
        root: Option<PathBuf>,
        index_url: Option<String>,
        python: Option<String>,
    ) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => runtime
                .current_dir()
                .context("Could not determine the current directory")?,
        };
        let config = Self {
            root,
            index_url: index_url.unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),
            python: python.unwrap_or_else(|| DEFAULT_PYTHON.to_string()),
        };
        debug!("Using {:?}", config);
        Ok(config)
    }

    pub fn project(&self) -> ProjectContext {
        ProjectContext::new(&self.root)
    }

    pub fn install_config(&self) -> InstallConfig {
        InstallConfig::new(&self.python, &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    #[test]
    fn test_load_defaults() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/home/user/app")));

        let config = Config::load(&runtime, None, None, None).unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user/app"));
        assert_eq!(config.index_url, "https://pypi.org");
        assert_eq!(config.python, "python3");
        assert_eq!(
            config.project().modules_dir,
            PathBuf::from("/home/user/app/python_modules")
        );
    }

    #[test]
    fn test_load_explicit_values() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().never();

        let config = Config::load(
            &runtime,
            Some(PathBuf::from("/srv/app")),
            Some("https://mirror.local".into()),
            Some("/usr/bin/python3.12".into()),
        )
        .unwrap();

        let install = config.install_config();
        assert_eq!(install.python, "/usr/bin/python3.12");
        assert_eq!(install.target, PathBuf::from("/srv/app/python_modules"));
        assert_eq!(config.index_url, "https://mirror.local");
    }

    #[test]
    fn test_load_without_current_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Err(anyhow::anyhow!("No such file or directory")));

        let err = Config::load(&runtime, None, None, None).unwrap_err();
        assert!(err.to_string().contains("current directory"));
    }
}
