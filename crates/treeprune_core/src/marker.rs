use anyhow::Result;
use globset::GlobSet;
use log::{debug, trace};
use std::ops::AddAssign;

use crate::{
    config::build_glob_set,
    tree::{NodeId, PathTree},
};

/// Configuration for [`ReservationMarker`].
#[derive(Debug, Clone)]
pub struct MarkerConfig {
    /// Root-relative patterns whose matching nodes are reserved together with
    /// everything beneath them.
    pub preserve: GlobSet,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self { preserve: GlobSet::empty() }
    }
}

impl MarkerConfig {
    pub fn from_patterns<S: AsRef<str>>(preserve: &[S]) -> Result<Self> {
        Ok(Self { preserve: build_glob_set(preserve)? })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MarkStats {
    /// Paths looked up.
    pub requested: usize,
    /// Paths that exist in the tree.
    pub found: usize,
    /// Paths absent from the tree, silently skipped.
    pub missing: usize,
    /// Nodes whose flag flipped from unreserved to reserved.
    pub newly_reserved: usize,
}

impl AddAssign for MarkStats {
    fn add_assign(&mut self, other: Self) {
        self.requested += other.requested;
        self.found += other.found;
        self.missing += other.missing;
        self.newly_reserved += other.newly_reserved;
    }
}

/// Marks the paths a build depends on, plus pinned paths, as reserved.
#[derive(Debug, Clone, Default)]
pub struct ReservationMarker {
    config: MarkerConfig,
}

impl ReservationMarker {
    pub fn new(config: MarkerConfig) -> Self {
        Self { config }
    }

    /// Reserves every path of `source` that exists in `tree`, along with its
    /// ancestors. Paths outside the tree or absent from it are skipped.
    pub fn mark<I, S>(&self, tree: &mut PathTree, source: I) -> MarkStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = MarkStats::default();
        for path in source {
            let path = path.as_ref();
            stats.requested += 1;

            let found = tree.segments_of(path).and_then(|segments| tree.find_path(segments));
            match found {
                Some(id) => {
                    stats.found += 1;
                    stats.newly_reserved += tree.mark_reserved_upward(id);
                }
                None => {
                    trace!("Not in tree, skipping: {}", path);
                    stats.missing += 1;
                }
            }
        }
        debug!(
            "Marked {} of {} paths ({} missing, {} nodes newly reserved)",
            stats.found, stats.requested, stats.missing, stats.newly_reserved
        );
        stats
    }

    /// Applies [`Self::mark`] to each source in turn.
    pub fn mark_all<'s, I, S>(&self, tree: &mut PathTree, sources: I) -> MarkStats
    where
        I: IntoIterator<Item = &'s [S]>,
        S: AsRef<str> + 's,
    {
        let mut total = MarkStats::default();
        for source in sources {
            total += self.mark(tree, source);
        }
        total
    }

    /// Reserves every node matching a preserve pattern and its whole subtree.
    pub fn mark_preserved(&self, tree: &mut PathTree) -> MarkStats {
        let mut stats = MarkStats::default();
        if self.config.preserve.is_empty() {
            return stats;
        }

        let pinned = self.pinned_nodes(tree);
        for id in pinned {
            stats.requested += 1;
            stats.found += 1;
            let subtree: Vec<NodeId> = tree.descendants(id).collect();
            for node in subtree {
                stats.newly_reserved += tree.mark_reserved_upward(node);
            }
        }
        debug!("Pinned {} preserved subtree(s)", stats.found);
        stats
    }

    /// Highest nodes whose root-relative path matches a preserve pattern.
    fn pinned_nodes(&self, tree: &PathTree) -> Vec<NodeId> {
        let mut pinned = Vec::new();
        let mut stack: Vec<NodeId> = tree.node(tree.root()).children().collect();
        stack.reverse();

        while let Some(id) = stack.pop() {
            let relative = tree.relative_path(id);
            if self.config.preserve.is_match(&relative) {
                trace!("Preserving {}", relative);
                pinned.push(id);
                continue;
            }
            let children: Vec<NodeId> = tree.node(id).children().collect();
            stack.extend(children.into_iter().rev());
        }
        pinned
    }
}
