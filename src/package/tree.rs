//! Dependency tree reconciliation.
//!
//! Links installed packages to the project's declared dependencies and,
//! transitively, to their own requirements. Installed packages that are not
//! reachable from any declared dependency are orphans.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use super::meta::{InstalledPackage, normalize_name, top_level_entries};

/// A node of the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Declared (root children) or installed name
    pub name: String,
    /// Range from the manifest; only set on root children
    pub range: Option<String>,
    /// `None` when the dependency is declared but not installed
    pub package: Option<InstalledPackage>,
    /// Reached again after its first expansion; children are not repeated
    pub deduped: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn declared(name: &str, range: &str, package: Option<&InstalledPackage>) -> Self {
        Self {
            name: package.map_or_else(|| name.to_string(), |p| p.name.clone()),
            range: Some(range.to_string()),
            package: package.cloned(),
            deduped: false,
            children: vec![],
        }
    }

    fn installed(package: &InstalledPackage, deduped: bool) -> Self {
        Self {
            name: package.name.clone(),
            range: None,
            package: Some(package.clone()),
            deduped,
            children: vec![],
        }
    }

    pub fn is_installed(&self) -> bool {
        self.package.is_some()
    }

    fn label(&self) -> String {
        let mut label = match (&self.package, &self.range) {
            (Some(pkg), _) => format!(
                "{}@{}",
                self.name,
                pkg.version.as_deref().unwrap_or("(unknown)")
            ),
            (None, Some(range)) => format!("{}@{} (not installed)", self.name, range),
            (None, None) => format!("{} (not installed)", self.name),
        };
        if self.deduped {
            label.push_str(" (deduped)");
        }
        label
    }
}

/// Result of reconciling declared dependencies with installed packages.
#[derive(Debug, Clone, Default)]
pub struct DependencyTree {
    /// Label of the synthetic root (the project)
    pub root_label: String,
    /// One child per declared dependency, sorted by name
    pub children: Vec<TreeNode>,
    /// Normalized names of every installed package reached from the root
    pub touched: HashSet<String>,
    /// Installed packages never reached, in scan order
    pub orphans: Vec<InstalledPackage>,
    /// Every installed package the tree was built over
    pub installed: Vec<InstalledPackage>,
}

impl DependencyTree {
    /// Build the tree for `declared` dependencies over the `installed` pool.
    ///
    /// Every installed package is expanded at most once; later encounters are
    /// recorded as deduped leaves, which also makes requirement cycles finite.
    pub fn build(declared: &BTreeMap<String, String>, installed: &[InstalledPackage]) -> Self {
        let pool: HashMap<String, &InstalledPackage> =
            installed.iter().map(|p| (p.key(), p)).collect();
        let mut touched: HashSet<String> = HashSet::new();

        let mut children: Vec<TreeNode> = Vec::with_capacity(declared.len());
        let mut to_expand: Vec<bool> = Vec::with_capacity(declared.len());

        // Declared dependencies are touched before any subtree is expanded,
        // so they are only expanded as root children.
        for (name, range) in declared {
            let key = normalize_name(name);
            let package = pool.get(&key).copied();
            let mut node = TreeNode::declared(name, range, package);

            let first = package.is_some() && touched.insert(key);
            if package.is_some() && !first {
                node.deduped = true;
            }
            to_expand.push(first);
            children.push(node);
        }

        for (node, expand) in children.iter_mut().zip(to_expand) {
            if expand {
                expand_node(node, &pool, &mut touched);
            }
        }

        let orphans = installed
            .iter()
            .filter(|p| !touched.contains(&p.key()))
            .cloned()
            .collect();

        Self {
            root_label: String::new(),
            children,
            touched,
            orphans,
            installed: installed.to_vec(),
        }
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(&normalize_name(name))
    }

    /// Top-level entries owned by packages reached from the root. Removing
    /// an orphan must leave these in place.
    pub fn retained_entries(&self) -> HashSet<String> {
        top_level_entries(
            self.installed
                .iter()
                .filter(|p| self.touched.contains(&p.key())),
        )
    }

    /// Names of orphaned packages.
    pub fn orphan_names(&self) -> Vec<String> {
        self.orphans.iter().map(|p| p.name.clone()).collect()
    }
}

fn expand_node(
    node: &mut TreeNode,
    pool: &HashMap<String, &InstalledPackage>,
    touched: &mut HashSet<String>,
) {
    let Some(package) = node.package.as_ref() else {
        return;
    };

    let mut children = Vec::new();
    for requirement in &package.requires {
        let key = normalize_name(&requirement.name);
        let Some(required) = pool.get(&key) else {
            continue;
        };

        if touched.insert(key) {
            let mut child = TreeNode::installed(required, false);
            expand_node(&mut child, pool, touched);
            children.push(child);
        } else {
            children.push(TreeNode::installed(required, true));
        }
    }

    node.children = children;
}

impl fmt::Display for DependencyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.root_label)?;
        if self.children.is_empty() {
            return writeln!(f, "└── (empty)");
        }
        write_children(f, &self.children, "")
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, nodes: &[TreeNode], prefix: &str) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        writeln!(f, "{}{}{}", prefix, branch, node.label())?;
        write_children(f, &node.children, &format!("{}{}", prefix, indent))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Requirement;

    fn pkg(name: &str, version: &str, requires: &[&str]) -> InstalledPackage {
        InstalledPackage {
            name: name.to_string(),
            version: Some(version.to_string()),
            top_level: vec![name.replace('-', "_")],
            dist_info: format!("{}-{}.dist-info", name.replace('-', "_"), version),
            requires: requires
                .iter()
                .map(|r| Requirement {
                    name: r.to_string(),
                    specifier: String::new(),
                })
                .collect(),
        }
    }

    fn declared(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(n, r)| (n.to_string(), r.to_string()))
            .collect()
    }

    #[test]
    fn test_declared_but_not_installed() {
        let tree = DependencyTree::build(&declared(&[("foo", "^1.0.0")]), &[]);

        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "foo");
        assert!(!tree.children[0].is_installed());
        assert!(tree.touched.is_empty());
        assert!(tree.orphans.is_empty());
    }

    #[test]
    fn test_transitive_requirements_are_touched() {
        let installed = vec![
            pkg("requests", "2.31.0", &["idna", "urllib3", "not-installed"]),
            pkg("idna", "3.4", &[]),
            pkg("urllib3", "2.0.4", &[]),
            pkg("leftover", "0.1.0", &[]),
        ];

        let tree = DependencyTree::build(&declared(&[("requests", "^2.0.0")]), &installed);

        let root = &tree.children[0];
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["idna", "urllib3"]);
        assert!(tree.is_touched("requests"));
        assert!(tree.is_touched("idna"));
        assert!(tree.is_touched("urllib3"));
        assert_eq!(tree.orphan_names(), vec!["leftover"]);
    }

    #[test]
    fn test_orphans_are_complement_of_touched() {
        let installed = vec![
            pkg("a", "1.0.0", &["b"]),
            pkg("b", "1.0.0", &[]),
            pkg("c", "1.0.0", &["d"]),
            pkg("d", "1.0.0", &[]),
        ];

        let tree = DependencyTree::build(&declared(&[("a", "^1")]), &installed);

        for p in &installed {
            let orphan = tree.orphans.iter().any(|o| o.name == p.name);
            assert_ne!(orphan, tree.is_touched(&p.name), "{}", p.name);
        }
        assert_eq!(tree.orphan_names(), vec!["c", "d"]);
    }

    #[test]
    fn test_retained_entries_cover_touched_packages_only() {
        let mut protobuf = pkg("protobuf", "4.25.0", &[]);
        protobuf.top_level = vec!["google".into()];
        let mut google_auth = pkg("google-auth", "2.23.0", &[]);
        google_auth.top_level = vec!["google".into()];
        let installed = vec![protobuf, google_auth, pkg("leftover", "0.1.0", &[])];

        let tree = DependencyTree::build(&declared(&[("protobuf", "^4")]), &installed);

        let retained = tree.retained_entries();
        assert!(retained.contains("google"));
        assert!(!retained.contains("leftover"));
        assert_eq!(tree.orphan_names(), vec!["google-auth", "leftover"]);
    }

    #[test]
    fn test_cycle_terminates_and_dedupes() {
        let installed = vec![pkg("a", "1.0.0", &["b"]), pkg("b", "1.0.0", &["a"])];

        let tree = DependencyTree::build(&declared(&[("a", "^1.0.0")]), &installed);

        let a = &tree.children[0];
        let b = &a.children[0];
        assert_eq!(b.name, "b");
        assert_eq!(b.children.len(), 1);
        assert!(b.children[0].deduped);
        assert!(b.children[0].children.is_empty());
        assert!(tree.orphans.is_empty());
    }

    #[test]
    fn test_shared_requirement_expanded_once() {
        let installed = vec![
            pkg("a", "1.0.0", &["shared"]),
            pkg("b", "1.0.0", &["shared"]),
            pkg("shared", "1.0.0", &["leaf"]),
            pkg("leaf", "1.0.0", &[]),
        ];

        let tree = DependencyTree::build(&declared(&[("a", "*"), ("b", "*")]), &installed);

        let under_a = &tree.children[0].children[0];
        let under_b = &tree.children[1].children[0];
        assert!(!under_a.deduped);
        assert_eq!(under_a.children.len(), 1);
        assert!(under_b.deduped);
        assert!(under_b.children.is_empty());
        assert_eq!(tree.touched.len(), 4);
    }

    #[test]
    fn test_declared_dependency_reached_from_another_is_still_a_root() {
        let installed = vec![pkg("a", "1.0.0", &["b"]), pkg("b", "1.0.0", &["c"]), pkg("c", "1.0.0", &[])];

        let tree = DependencyTree::build(&declared(&[("a", "*"), ("b", "*")]), &installed);

        // b is expanded as a root child, and only referenced under a
        assert!(tree.children[0].children[0].deduped);
        assert_eq!(tree.children[1].children[0].name, "c");
        assert!(tree.orphans.is_empty());
    }

    #[test]
    fn test_name_normalization() {
        let installed = vec![pkg("python-dateutil", "2.8.2", &["Six"]), pkg("six", "1.16.0", &[])];

        let tree = DependencyTree::build(&declared(&[("Python_Dateutil", "^2.8.0")]), &installed);

        assert!(tree.children[0].is_installed());
        assert_eq!(tree.children[0].name, "python-dateutil");
        assert!(tree.orphans.is_empty());
    }

    #[test]
    fn test_display() {
        let installed = vec![pkg("a", "1.0.0", &["b"]), pkg("b", "2.0.0", &[])];
        let tree = DependencyTree::build(&declared(&[("a", "^1.0.0"), ("z", "^3.0.0")]), &installed)
            .with_root_label("/home/user/project");

        let expected = "/home/user/project\n\
            ├── a@1.0.0\n\
            │   └── b@2.0.0\n\
            └── z@^3.0.0 (not installed)\n";
        assert_eq!(tree.to_string(), expected);
    }

    #[test]
    fn test_display_empty() {
        let tree = DependencyTree::build(&BTreeMap::new(), &[]).with_root_label("/p");
        assert_eq!(tree.to_string(), "/p\n└── (empty)\n");
    }
}
