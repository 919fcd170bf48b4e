use anyhow::Result;
use globset::GlobSet;
use log::{debug, trace};

use crate::{config::build_glob_set, tree::PathTree};

/// Configuration for [`TreeBuilder`].
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Matched against root-relative paths. A path is skipped when it or any
    /// of its ancestors matches.
    pub discard: GlobSet,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { discard: GlobSet::empty() }
    }
}

impl BuilderConfig {
    pub fn from_patterns<S: AsRef<str>>(discard: &[S]) -> Result<Self> {
        Ok(Self { discard: build_glob_set(discard)? })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub inserted: usize,
    pub discarded: usize,
    pub outside_root: usize,
}

/// Turns a flat list of path strings into a [`PathTree`].
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    config: BuilderConfig,
}

impl TreeBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Builds a tree rooted at `root_name` from `paths`.
    ///
    /// Paths may arrive in any order; only the order in which siblings first
    /// appear depends on it.
    pub fn build<I, S>(&self, root_name: &str, paths: I) -> (PathTree, BuildStats)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = PathTree::new(root_name);
        let mut stats = BuildStats::default();

        for path in paths {
            let path = path.as_ref();
            let Some(segments) = tree.segments_of(path) else {
                trace!("Skipping path outside {}: {}", root_name, path);
                stats.outside_root += 1;
                continue;
            };

            if self.is_discarded(&segments) {
                trace!("Discarding path: {}", path);
                stats.discarded += 1;
                continue;
            }

            tree.ensure_path(segments);
            stats.inserted += 1;
        }

        debug!(
            "Built tree with {} nodes from {} paths ({} discarded, {} outside root)",
            tree.len(),
            stats.inserted,
            stats.discarded,
            stats.outside_root
        );
        (tree, stats)
    }

    fn is_discarded(&self, segments: &[&str]) -> bool {
        if self.config.discard.is_empty() {
            return false;
        }
        let mut prefix = String::new();
        for segment in segments {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            if self.config.discard.is_match(&prefix) {
                return true;
            }
        }
        false
    }
}
