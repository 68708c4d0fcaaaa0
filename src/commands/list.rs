use anyhow::Result;
use log::debug;

use crate::application::ListAction;
use crate::package::DependencyTree;
use crate::runtime::Runtime;

use super::config::Config;

/// Print the dependency tree and any packages nothing depends on
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let project = config.project();
    let tree = ListAction::new(&runtime, &project).dependency_tree()?;
    debug!("{} orphan(s)", tree.orphans.len());

    print!("{}", render(&tree));
    Ok(())
}

pub(crate) fn render(tree: &DependencyTree) -> String {
    let mut out = tree.to_string();
    if !tree.orphans.is_empty() {
        out.push_str("Unwanted:\n");
        for name in tree.orphan_names() {
            out.push_str(&format!("  {}\n", name));
        }
    }
    out
}
