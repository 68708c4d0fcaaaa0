//! The project manifest (`package.json`).
//!
//! Declared dependencies live under `pythonDependencies` and
//! `pythonDevDependencies`. The file may be shared with npm, so every other
//! top-level key is kept as-is when the manifest is rewritten.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub const MANIFEST_FILE: &str = "package.json";

/// Declared dependencies: package name -> range expression.
pub type Dependencies = BTreeMap<String, String>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    #[serde(rename = "pythonDependencies", default)]
    pub python_dependencies: Dependencies,

    #[serde(rename = "pythonDevDependencies", default)]
    pub python_dev_dependencies: Dependencies,

    /// Keys owned by other tools
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Reads and writes the manifest of one project.
pub struct ManifestStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> ManifestStore<'a, R> {
    pub fn new(runtime: &'a R, path: PathBuf) -> Self {
        Self { runtime, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.runtime.exists(&self.path)
    }

    /// Load the manifest; a missing file reads as an empty manifest.
    #[tracing::instrument(skip(self))]
    pub fn read(&self) -> Result<Manifest> {
        if !self.exists() {
            debug!("No manifest at {:?}", self.path);
            return Ok(Manifest::default());
        }

        let content = self.runtime.read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// Replace the manifest on disk.
    #[tracing::instrument(skip(self, manifest))]
    pub fn write(&self, manifest: &Manifest) -> Result<()> {
        let json = manifest.to_json()?;
        let tmp_path = self.path.with_extension("json.tmp");

        self.runtime.write(&tmp_path, json.as_bytes())?;
        self.runtime
            .rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!("Wrote manifest {:?}", self.path);
        Ok(())
    }

    pub fn dependencies(&self) -> Result<Dependencies> {
        Ok(self.read()?.python_dependencies)
    }

    /// Replace the runtime dependencies, keeping everything else in the file.
    pub fn write_dependencies(&self, dependencies: Dependencies) -> Result<()> {
        let mut manifest = self.read()?;
        manifest.python_dependencies = dependencies;
        self.write(&manifest)
    }

    /// Create an empty manifest. Returns `false` if one already exists.
    #[tracing::instrument(skip(self))]
    pub fn init(&self) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }
        self.write(&Manifest::default())?;
        Ok(true)
    }
}
