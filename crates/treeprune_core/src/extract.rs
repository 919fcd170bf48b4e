use anyhow::{Result, bail};
use log::{debug, trace, warn};

use crate::tree::{NodeId, PathTree};

/// What to do when nothing in the tree is reserved.
///
/// The traversal never emits the root, so this case needs an explicit answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyTreePolicy {
    /// Return no exclusions; the project stays fully visible.
    #[default]
    ExcludeNothing,
    /// Exclude every direct child of the root.
    ExcludeEverything,
    /// Treat the situation as an error.
    Reject,
}

/// Computes the highest nodes whose subtree holds no reserved node.
///
/// Pre-order over the tree: an unreserved node is emitted without visiting
/// its children (none of them can be reserved); a reserved node has every
/// child visited. Result order follows sibling insertion order.
pub fn exclusion_roots(tree: &PathTree, policy: EmptyTreePolicy) -> Result<Vec<NodeId>> {
    let root = tree.root();
    if !tree.is_reserved(root) {
        warn!("No reserved paths under {}", tree.root_name());
        return match policy {
            EmptyTreePolicy::ExcludeNothing => Ok(Vec::new()),
            EmptyTreePolicy::ExcludeEverything => Ok(tree.node(root).children().collect()),
            EmptyTreePolicy::Reject => {
                bail!("No reserved paths under {}; nothing in the tree is used", tree.root_name())
            }
        };
    }

    let mut roots = Vec::new();
    let mut stack: Vec<NodeId> = tree.node(root).children().collect();
    stack.reverse();

    while let Some(id) = stack.pop() {
        if !tree.is_reserved(id) {
            trace!("Exclusion root: {}", tree.relative_path(id));
            roots.push(id);
            continue;
        }
        let children: Vec<NodeId> = tree.node(id).children().collect();
        stack.extend(children.into_iter().rev());
    }

    debug!("Found {} exclusion roots", roots.len());
    Ok(roots)
}

/// [`exclusion_roots`] rendered as full paths.
pub fn extract_exclusions(tree: &PathTree, policy: EmptyTreePolicy) -> Result<Vec<String>> {
    Ok(exclusion_roots(tree, policy)?.into_iter().map(|id| tree.full_path(id)).collect())
}
