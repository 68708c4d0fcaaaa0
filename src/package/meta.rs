//! Metadata of packages installed into `python_modules/`.
//!
//! pip writes one `<name>-<version>.dist-info` directory per installed
//! distribution (older installs use `.egg-info`). Everything we know about an
//! installed package is read back from that directory on every run.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};

/// Suffix of wheel metadata directories.
pub const DIST_INFO_SUFFIX: &str = ".dist-info";
/// Suffix of legacy setuptools metadata directories.
pub const EGG_INFO_SUFFIX: &str = ".egg-info";

/// Normalize a package name for comparison (PEP 503).
///
/// `Foo_Bar`, `foo.bar` and `foo-bar` all normalize to `foo-bar`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_separator = true;
            continue;
        }
        if pending_separator && !normalized.is_empty() {
            normalized.push('-');
        }
        pending_separator = false;
        normalized.push(c.to_ascii_lowercase());
    }

    normalized
}

/// A requirement declared by an installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    /// Version specifier as written, e.g. `>=2.5,<4`; empty when unconstrained
    pub specifier: String,
}

impl Requirement {
    /// Parse a `Requires-Dist` value (or a `requires.txt` line).
    ///
    /// Returns `None` for blank lines and for requirements that only apply to
    /// an optional extra (`; extra == "socks"`).
    pub fn parse(line: &str) -> Option<Self> {
        let (spec, marker) = match line.split_once(';') {
            Some((spec, marker)) => (spec.trim(), Some(marker)),
            None => (line.trim(), None),
        };

        if marker.is_some_and(|m| m.contains("extra")) {
            return None;
        }

        let name_end = spec
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(spec.len());
        let name = &spec[..name_end];
        if name.is_empty() {
            return None;
        }

        let mut rest = spec[name_end..].trim();
        // Skip "[extra1,extra2]"
        if rest.starts_with('[') {
            rest = rest.find(']').map_or("", |end| rest[end + 1..].trim());
        }
        let specifier = rest
            .trim_start_matches('(')
            .trim_end_matches(')')
            .replace(' ', "");

        Some(Self {
            name: name.to_string(),
            specifier,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.specifier)
    }
}

/// Metadata of one installed package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstalledPackage {
    pub name: String,
    /// `None` when the metadata does not record a version
    pub version: Option<String>,
    /// Top-level modules/packages owned by this distribution
    pub top_level: Vec<String>,
    /// Name of the metadata directory (`six-1.16.0.dist-info`)
    pub dist_info: String,
    pub requires: Vec<Requirement>,
}

impl InstalledPackage {
    /// Normalized name used for matching.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Paths (relative to the install directory) that removing this package deletes.
    pub fn owned_entries(&self) -> Vec<String> {
        let mut entries = self.top_level.clone();
        entries.push(self.dist_info.clone());
        entries
    }
}

/// Whether `entry` names a single file or directory directly inside the
/// install directory.
///
/// Empty, absolute, `.`/`..` and multi-component entries are rejected.
pub fn is_plain_entry(entry: &str) -> bool {
    let mut components = Path::new(entry).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Top-level entries owned by any of `packages`.
pub fn top_level_entries<'a>(
    packages: impl IntoIterator<Item = &'a InstalledPackage>,
) -> HashSet<String> {
    packages
        .into_iter()
        .flat_map(|p| p.top_level.iter().cloned())
        .collect()
}

/// Headers of a core metadata file (`METADATA` / `PKG-INFO`).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CoreMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub requires_dist: Vec<String>,
}

impl CoreMetadata {
    /// Parse the RFC 822 style header block; the body after the first blank
    /// line (the long description) is ignored.
    pub fn parse(content: &str) -> Self {
        let mut meta = CoreMetadata::default();

        for line in content.lines() {
            if line.trim().is_empty() {
                break;
            }
            // Continuation lines of folded headers
            if line.starts_with([' ', '\t']) {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "name" => meta.name = Some(value),
                "version" => meta.version = Some(value),
                "requires-dist" => meta.requires_dist.push(value),
                _ => {}
            }
        }

        meta
    }
}

/// Split a metadata directory name into `(name, version)`.
///
/// `requests-2.31.0.dist-info` -> `("requests", Some("2.31.0"))`.
/// Returns `None` if `dir_name` is not a metadata directory.
pub fn split_metadata_dir_name(dir_name: &str) -> Option<(String, Option<String>)> {
    let stem = dir_name
        .strip_suffix(DIST_INFO_SUFFIX)
        .or_else(|| dir_name.strip_suffix(EGG_INFO_SUFFIX))?;

    if stem.is_empty() {
        return None;
    }

    // Egg-info names may carry a python tag: foo-1.0-py3.11.egg-info
    let mut parts = stem.splitn(3, '-');
    let name = parts.next().unwrap_or_default().to_string();
    let version = parts.next().filter(|v| !v.is_empty()).map(str::to_string);
    Some((name, version))
}

/// Requirements listed in an egg-info `requires.txt`; sections (`[extra]`)
/// hold optional requirements and end the list.
pub fn parse_requires_txt(content: &str) -> Vec<Requirement> {
    content
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with('['))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(Requirement::parse)
        .collect()
}

/// Top-level names from a `RECORD` file: first path components, minus
/// metadata directories, `__pycache__` and parent references.
pub fn top_level_from_record(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for line in content.lines() {
        let path = line.split(',').next().unwrap_or_default().trim();
        let Some(first) = path.split('/').next() else {
            continue;
        };
        if first.is_empty()
            || first == ".."
            || first == "__pycache__"
            || first.ends_with(DIST_INFO_SUFFIX)
            || first.ends_with(EGG_INFO_SUFFIX)
        {
            continue;
        }
        let name = first.strip_suffix(".py").unwrap_or(first).to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("requests"), "requests");
        assert_eq!(normalize_name("Foo_Bar"), "foo-bar");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a--_.b"), "a-b");
        assert_eq!(normalize_name(" PyYAML "), "pyyaml");
    }

    #[test]
    fn test_requirement_parse() {
        let req = Requirement::parse("idna<4,>=2.5").unwrap();
        assert_eq!(req.name, "idna");
        assert_eq!(req.specifier, "<4,>=2.5");

        let req = Requirement::parse("chardet (>=3.0.2, <6)").unwrap();
        assert_eq!(req.name, "chardet");
        assert_eq!(req.specifier, ">=3.0.2,<6");

        let req = Requirement::parse("urllib3[socks] >=1.21.1").unwrap();
        assert_eq!(req.name, "urllib3");
        assert_eq!(req.specifier, ">=1.21.1");

        let req = Requirement::parse("six").unwrap();
        assert_eq!(req.specifier, "");
        assert_eq!(req.to_string(), "six");
    }

    #[test]
    fn test_requirement_parse_markers() {
        assert!(Requirement::parse("PySocks!=1.5.7,>=1.5.6; extra == 'socks'").is_none());

        let req = Requirement::parse("importlib-metadata; python_version < \"3.8\"").unwrap();
        assert_eq!(req.name, "importlib-metadata");

        assert!(Requirement::parse("").is_none());
    }

    #[test]
    fn test_core_metadata_parse() {
        let content = "Metadata-Version: 2.1\n\
            Name: requests\n\
            Version: 2.31.0\n\
            Summary: Python HTTP for Humans.\n\
            Requires-Dist: charset-normalizer (<4,>=2)\n\
            Requires-Dist: idna (<4,>=2.5)\n\
            Requires-Dist: PySocks (!=1.5.7,>=1.5.6) ; extra == 'socks'\n\
            \n\
            Name: not-a-header\n";

        let meta = CoreMetadata::parse(content);
        assert_eq!(meta.name.as_deref(), Some("requests"));
        assert_eq!(meta.version.as_deref(), Some("2.31.0"));
        assert_eq!(meta.requires_dist.len(), 3);
    }

    #[test]
    fn test_split_metadata_dir_name() {
        assert_eq!(
            split_metadata_dir_name("requests-2.31.0.dist-info"),
            Some(("requests".to_string(), Some("2.31.0".to_string())))
        );
        assert_eq!(
            split_metadata_dir_name("foo-1.0-py3.11.egg-info"),
            Some(("foo".to_string(), Some("1.0".to_string())))
        );
        assert_eq!(
            split_metadata_dir_name("bare.egg-info"),
            Some(("bare".to_string(), None))
        );
        assert_eq!(split_metadata_dir_name("requests"), None);
        assert_eq!(split_metadata_dir_name(".dist-info"), None);
    }

    #[test]
    fn test_parse_requires_txt() {
        let reqs = parse_requires_txt("six>=1.5\n\n# comment\nattrs\n[test]\npytest\n");
        let names: Vec<_> = reqs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["six", "attrs"]);
    }

    #[test]
    fn test_top_level_from_record() {
        let record = "six.py,sha256=abc,1234\n\
            six-1.16.0.dist-info/METADATA,sha256=def,99\n\
            __pycache__/six.cpython-311.pyc,,\n\
            ../../bin/tool,,\n\
            dateutil/__init__.py,sha256=x,1\n\
            dateutil/parser.py,sha256=y,2\n";

        assert_eq!(top_level_from_record(record), vec!["six", "dateutil"]);
    }

    #[test]
    fn test_is_plain_entry() {
        assert!(is_plain_entry("six"));
        assert!(is_plain_entry("python_dateutil-2.8.2.dist-info"));
        assert!(is_plain_entry("dateutil/"));

        assert!(!is_plain_entry(""));
        assert!(!is_plain_entry("."));
        assert!(!is_plain_entry(".."));
        assert!(!is_plain_entry("../src"));
        assert!(!is_plain_entry("/etc"));
        assert!(!is_plain_entry("google/protobuf"));
    }

    #[test]
    fn test_top_level_entries() {
        let a = InstalledPackage {
            name: "protobuf".into(),
            top_level: vec!["google".into()],
            ..Default::default()
        };
        let b = InstalledPackage {
            name: "six".into(),
            top_level: vec!["six".into()],
            ..Default::default()
        };

        let entries = top_level_entries([&a, &b]);
        assert_eq!(entries.len(), 2);
        assert!(entries.contains("google"));
        assert!(entries.contains("six"));
    }

    #[test]
    fn test_owned_entries() {
        let pkg = InstalledPackage {
            name: "python-dateutil".into(),
            version: Some("2.8.2".into()),
            top_level: vec!["dateutil".into()],
            dist_info: "python_dateutil-2.8.2.dist-info".into(),
            requires: vec![],
        };
        assert_eq!(pkg.key(), "python-dateutil");
        assert_eq!(
            pkg.owned_entries(),
            vec!["dateutil", "python_dateutil-2.8.2.dist-info"]
        );
    }
}
