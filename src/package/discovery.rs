use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::runtime::Runtime;

use super::meta::{
    CoreMetadata, DIST_INFO_SUFFIX, InstalledPackage, Requirement, is_plain_entry,
    normalize_name, parse_requires_txt, split_metadata_dir_name, top_level_from_record,
};

/// Find all installed packages by scanning for metadata directories
///
/// Directory structure: `<modules>/<name>-<version>.dist-info/`
#[tracing::instrument(skip(runtime, modules_dir))]
pub fn scan_packages<R: Runtime>(runtime: &R, modules_dir: &Path) -> Result<Vec<InstalledPackage>> {
    let mut packages = Vec::new();

    if !runtime.exists(modules_dir) {
        return Ok(packages);
    }

    for entry in runtime.read_dir(modules_dir)? {
        let Some(dir_name) = entry.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if split_metadata_dir_name(dir_name).is_none() || !runtime.is_dir(&entry) {
            continue;
        }

        match read_package(runtime, &entry, dir_name) {
            Some(package) => packages.push(package),
            None => debug!("Skipping unreadable metadata directory {:?}", entry),
        }
    }

    debug!("Found {} installed package(s) in {:?}", packages.len(), modules_dir);
    Ok(packages)
}

/// Find one installed package by (normalized) name.
#[tracing::instrument(skip(runtime, modules_dir))]
pub fn find_package<R: Runtime>(
    runtime: &R,
    modules_dir: &Path,
    name: &str,
) -> Result<Option<InstalledPackage>> {
    let key = normalize_name(name);
    Ok(scan_packages(runtime, modules_dir)?
        .into_iter()
        .find(|p| p.key() == key))
}

fn read_package<R: Runtime>(runtime: &R, dir: &Path, dir_name: &str) -> Option<InstalledPackage> {
    let (dir_package_name, dir_version) = split_metadata_dir_name(dir_name)?;
    let is_dist_info = dir_name.ends_with(DIST_INFO_SUFFIX);

    let metadata_file = if is_dist_info { "METADATA" } else { "PKG-INFO" };
    let core = read_optional(runtime, &dir.join(metadata_file))
        .map(|content| CoreMetadata::parse(&content))
        .unwrap_or_default();

    let name = core.name.unwrap_or(dir_package_name);
    let version = core.version.or(dir_version);

    let requires = if is_dist_info {
        core.requires_dist
            .iter()
            .filter_map(|line| Requirement::parse(line))
            .collect()
    } else {
        read_optional(runtime, &dir.join("requires.txt"))
            .map(|content| parse_requires_txt(&content))
            .unwrap_or_default()
    };

    let top_level = read_optional(runtime, &dir.join("top_level.txt"))
        .map(|content| {
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .or_else(|| {
            read_optional(runtime, &dir.join("RECORD")).map(|c| top_level_from_record(&c))
        })
        .map(|names| plain_entries(dir, names))
        .filter(|names| !names.is_empty())
        .unwrap_or_else(|| plain_entries(dir, vec![normalize_name(&name).replace('-', "_")]));

    Some(InstalledPackage {
        name,
        version,
        top_level,
        dist_info: dir_name.to_string(),
        requires,
    })
}

/// Keep only entries that stay inside the install directory.
fn plain_entries(dir: &Path, names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|entry| {
            let plain = is_plain_entry(entry);
            if !plain {
                debug!("Ignoring top-level entry {:?} of {:?}", entry, dir);
            }
            plain
        })
        .collect()
}

fn read_optional<R: Runtime>(runtime: &R, path: &Path) -> Option<String> {
    if !runtime.exists(path) {
        return None;
    }
    match runtime.read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}
