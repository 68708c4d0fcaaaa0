//! Version ordering and range resolution.
//!
//! Python release strings are mapped onto semantic versions so they can be
//! ordered and matched against npm-style range expressions (`^1.2.0`):
//!
//! - missing release components are padded (`2.1` -> `2.1.0`)
//! - release components past the third become build metadata (`1.2.3.4` -> `1.2.3+4`)
//! - `aN`/`bN`/`rcN` become pre-release identifiers, `devN` sorts below them
//! - `.postN` sorts above its base release, `.postN.devM` just below `.postN`
//! - an epoch (`1!2.0`) outranks every version of a lower epoch
//!
//! Strings that cannot be mapped sort below every parseable version and
//! never satisfy a range.

use semver::{BuildMetadata, Prerelease, Version, VersionReq};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Errors from range resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("No version satisfies '{range}' (available: {available})")]
    NoSatisfyingVersion { range: String, available: String },
}

/// A published or installed version string together with its semantic reading.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    raw: String,
    epoch: u64,
    semantic: Option<Version>,
}

impl PackageVersion {
    pub fn parse(raw: &str) -> Self {
        let (epoch, semantic) = match split_epoch(raw) {
            Some((epoch, rest)) => (epoch, to_semver(rest)),
            None => (0, None),
        };
        Self {
            raw: raw.to_string(),
            epoch,
            semantic,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn semantic(&self) -> Option<&Version> {
        self.semantic.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.semantic, &other.semantic) {
            (Some(a), Some(b)) => self
                .epoch
                .cmp(&other.epoch)
                .then_with(|| a.cmp(b))
                .then_with(|| self.raw.cmp(&other.raw)),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.raw.cmp(&other.raw),
        }
    }
}

/// A version range expression, e.g. `^1.2.0`, `>=2.0, <3`, `~=1.4.2`.
#[derive(Debug, Clone)]
pub struct RangeExpr {
    raw: String,
    req: VersionReq,
}

impl RangeExpr {
    pub fn parse(expr: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: String| ResolveError::InvalidRange {
            range: expr.to_string(),
            reason,
        };

        let normalized = expr
            .split(',')
            .map(|part| normalize_comparator(part.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?
            .join(", ");

        let req = VersionReq::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            raw: expr.to_string(),
            req,
        })
    }

    /// The expression recorded for a freshly installed version (`^<version>`).
    pub fn compatible_with(version: &str) -> String {
        format!("^{}", version)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Ranges carry no epoch, so only epoch 0 versions can match.
    pub fn matches(&self, version: &PackageVersion) -> bool {
        version.epoch == 0
            && version
                .semantic()
                .is_some_and(|semantic| self.req.matches(semantic))
    }
}

impl FromStr for RangeExpr {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeExpr::parse(s)
    }
}

impl fmt::Display for RangeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Version resolver - pure functions over lists of version strings.
pub struct VersionResolver;

impl VersionResolver {
    /// Sort versions in ascending semantic order.
    pub fn sort<S: AsRef<str>>(versions: &[S]) -> Vec<String> {
        let mut parsed: Vec<PackageVersion> = versions
            .iter()
            .map(|v| PackageVersion::parse(v.as_ref()))
            .collect();
        parsed.sort();
        parsed.into_iter().map(PackageVersion::into_string).collect()
    }

    /// The highest version, or `None` for an empty list.
    pub fn latest<S: AsRef<str>>(versions: &[S]) -> Option<String> {
        versions
            .iter()
            .map(|v| PackageVersion::parse(v.as_ref()))
            .max()
            .map(PackageVersion::into_string)
    }

    /// The highest version satisfying `range`.
    pub fn wanted<S: AsRef<str>>(range: &str, versions: &[S]) -> Result<String, ResolveError> {
        let expr = RangeExpr::parse(range)?;

        versions
            .iter()
            .map(|v| PackageVersion::parse(v.as_ref()))
            .filter(|v| expr.matches(v))
            .max()
            .map(PackageVersion::into_string)
            .ok_or_else(|| ResolveError::NoSatisfyingVersion {
                range: range.to_string(),
                available: if versions.is_empty() {
                    "none".to_string()
                } else {
                    versions
                        .iter()
                        .map(|v| v.as_ref())
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            })
    }
}

/// Operators accepted in a range, longest first.
const OPERATORS: [&str; 9] = ["~=", "==", ">=", "<=", "^", "~", ">", "<", "="];

fn normalize_comparator(part: &str) -> Result<String, String> {
    if part.is_empty() {
        return Err("empty comparator".to_string());
    }

    let (op, version) = OPERATORS
        .iter()
        .find_map(|&op| part.strip_prefix(op).map(|rest| (op, rest.trim())))
        .unwrap_or(("", part));

    if version.contains(['*', 'x', 'X']) {
        // Wildcards only make sense as an exact match
        return match op {
            "" | "=" | "==" => Ok(version.to_string()),
            _ => Err(format!("wildcard not allowed after '{}'", op)),
        };
    }

    if op == "~=" {
        return compatible_release(version);
    }

    let op = match op {
        "==" => "=",
        "" => "^",
        other => other,
    };

    Ok(format!("{}{}", op, comparator_version(version)))
}

/// PEP 440 `~=X.Y[.Z]`: at least the given version, same release prefix.
fn compatible_release(version: &str) -> Result<String, String> {
    let parts = release_components(version)
        .ok_or_else(|| format!("'{}' is not a release version", version))?;
    if parts.len() < 2 {
        return Err("'~=' needs at least two release components".to_string());
    }

    let mut upper = parts[..parts.len() - 1].to_vec();
    if let Some(last) = upper.last_mut() {
        *last = last
            .checked_add(1)
            .ok_or_else(|| format!("'{}' has no upper bound", version))?;
    }
    while upper.len() < 3 {
        upper.push(0);
    }

    Ok(format!(
        ">={}, <{}",
        comparator_version(version),
        upper
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".")
    ))
}

/// Rewrites a Python version into something a semver comparator accepts.
/// Plain `1`, `1.2`, `1.2.3` are left untouched so partial comparators keep
/// their meaning (`~1` is not `~1.0.0`).
fn comparator_version(version: &str) -> String {
    let plain = release_components(version).is_some_and(|parts| parts.len() <= 3);
    if plain {
        return version.to_string();
    }

    match to_semver(version) {
        Some(v) if v.pre.is_empty() => format!("{}.{}.{}", v.major, v.minor, v.patch),
        Some(v) => format!("{}.{}.{}-{}", v.major, v.minor, v.patch, v.pre),
        None => version.to_string(),
    }
}

/// Numeric release components if `version` is nothing but a dotted release.
fn release_components(version: &str) -> Option<Vec<u64>> {
    if version.is_empty() {
        return None;
    }
    version.split('.').map(|p| p.parse::<u64>().ok()).collect()
}

/// Splits a leading `N!` epoch off `raw`; versions without one are epoch 0.
fn split_epoch(raw: &str) -> Option<(u64, &str)> {
    match raw.trim().split_once('!') {
        Some((epoch, rest)) => Some((epoch.parse().ok()?, rest)),
        None => Some((0, raw)),
    }
}

/// Maps a Python version string (without epoch) onto a semantic version.
fn to_semver(raw: &str) -> Option<Version> {
    let s = raw.trim().to_ascii_lowercase();
    let s = s.strip_prefix('v').unwrap_or(&s);

    // Epochs are split off by the caller
    if s.contains('!') {
        return None;
    }

    let (s, local) = match s.split_once('+') {
        Some((head, local)) => (head, Some(local)),
        None => (s, None),
    };

    let release_end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (release, suffix) = s.split_at(release_end);
    let release = release.trim_end_matches('.');

    let parts = release_components(release)?;
    let suffix = parse_suffix(suffix)?;

    // Build identifiers: extra release components, then post, then local.
    // A leading "0" keeps 1.0.post1 below 1.0.0.1.
    let mut build: Vec<String> = parts.iter().skip(3).map(u64::to_string).collect();
    if build.is_empty() && (suffix.post.is_some() || local.is_some()) {
        build.push("0".to_string());
    }
    if let Some(post) = suffix.post {
        build.push("post".to_string());
        build.push(post.to_string());
        // "dev" < "z", so 1.0.post1.dev2 < 1.0.post1
        match suffix.dev {
            Some(dev) => {
                build.push("dev".to_string());
                build.push(dev.to_string());
            }
            None => build.push("z".to_string()),
        }
    }
    if let Some(local) = local {
        build.push("local".to_string());
        build.extend(
            local
                .split(['.', '-', '_'])
                .filter(|p| !p.is_empty())
                .map(|p| p.replace(|c: char| !c.is_ascii_alphanumeric(), "-")),
        );
    }

    let pre = match (suffix.pre, suffix.dev) {
        (Some((label, n)), _) => format!("{}.{}", label, n),
        // numeric identifiers sort below alphanumeric ones, so dev < a < b < rc
        (None, Some(n)) if suffix.post.is_none() => format!("0.dev.{}", n),
        _ => String::new(),
    };

    Some(Version {
        major: parts.first().copied().unwrap_or(0),
        minor: parts.get(1).copied().unwrap_or(0),
        patch: parts.get(2).copied().unwrap_or(0),
        pre: Prerelease::new(&pre).ok()?,
        build: BuildMetadata::new(&build.join(".")).ok()?,
    })
}

#[derive(Default)]
struct Suffix {
    pre: Option<(&'static str, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
}

fn parse_suffix(mut rest: &str) -> Option<Suffix> {
    let mut suffix = Suffix::default();

    loop {
        rest = rest.trim_start_matches(['-', '_', '.']);
        if rest.is_empty() {
            return Some(suffix);
        }

        let label_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (label, tail) = rest.split_at(label_end);
        let num_end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (num, tail) = tail.split_at(num_end);

        if label.is_empty() && num.is_empty() {
            return None;
        }
        let n = if num.is_empty() { 0 } else { num.parse().ok()? };

        match label {
            "a" | "alpha" => suffix.pre = Some(("a", n)),
            "b" | "beta" => suffix.pre = Some(("b", n)),
            "rc" | "c" | "pre" | "preview" => suffix.pre = Some(("rc", n)),
            "post" | "rev" | "r" => suffix.post = Some(n),
            "dev" => suffix.dev = Some(n),
            // "1.0-1" is an implicit post release
            "" => suffix.post = Some(n),
            _ => return None,
        }

        rest = tail;
    }
}
