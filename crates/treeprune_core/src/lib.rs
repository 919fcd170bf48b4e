//! Core of treeprune: reduce a project's file tree to what a build uses.
//!
//! The crate provides:
//! - A path tree with per-node reservation flags ([`PathTree`])
//! - Building that tree from a flat path list ([`TreeBuilder`])
//! - Marking build dependencies and pinned paths as reserved ([`ReservationMarker`])
//! - Extracting the minimal set of collapsible paths ([`exclusion_roots`])
//! - Filesystem enumeration and shared configuration helpers
//!
//! # Examples
//!
//! ```
//! use treeprune_core::{EmptyTreePolicy, ReservationMarker, TreeBuilder, extract_exclusions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let files = ["/a/b/c.c", "/a/b/c.h", "/a/d/e.h", "/x/y/z.txt"];
//! let (mut tree, _) = TreeBuilder::default().build("/", files);
//!
//! ReservationMarker::default().mark(&mut tree, ["/a/b/c.c"]);
//!
//! let exclusions = extract_exclusions(&tree, EmptyTreePolicy::ExcludeNothing)?;
//! assert_eq!(exclusions, ["/a/b/c.h", "/a/d", "/x"]);
//! # Ok(())
//! # }
//! ```

mod builder;
mod collector;
mod config;
mod constants;
mod extract;
mod marker;
mod paths;
mod tree;

// Re-export public API
pub use builder::{BuildStats, BuilderConfig, TreeBuilder};
pub use collector::{CollectedFiles, CollectorConfig, collect_files};
pub use config::{ProjectConfig, build_glob_set, find_project_root, read_project_config};
pub use constants::{CONFIG_FILE_NAME, DEFAULT_PRESERVED, ROOT_MARKERS, VCS_DIRS};
pub use extract::{EmptyTreePolicy, exclusion_roots, extract_exclusions};
pub use marker::{MarkStats, MarkerConfig, ReservationMarker};
pub use paths::{make_relative, relative_display, resolve_against, to_slash_string};
pub use tree::{NodeId, PathTree, PathTreeNode, SEPARATOR};
