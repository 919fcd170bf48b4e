use std::path::PathBuf;

/// Outcome of scanning, marking and extracting.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Every `files.exclude` entry, root-relative, in output order.
    pub exclusions: Vec<String>,
    /// How many of `exclusions` were computed from the tree.
    pub excluded_roots: usize,
    pub files_scanned: usize,
    pub discarded: usize,
    /// Source and header paths named by the dependency listing.
    pub dependency_files: usize,
    /// Dependency paths that exist under the base directory.
    pub dependencies_found: usize,
    pub reserved_nodes: usize,
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub scan: ScanResult,
    pub settings_path: PathBuf,
    pub properties_path: PathBuf,
    pub defines: usize,
    pub include_dirs: usize,
}
