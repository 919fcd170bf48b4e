use anyhow::{Context, Result, anyhow};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, trace};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::constants::{CONFIG_FILE_NAME, ROOT_MARKERS};

/// Per-project settings read from `.treeprune.json` in the base directory.
///
/// Every list is optional; command-line values are appended to these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Glob patterns (relative to the base directory) skipped while scanning.
    pub discard: Vec<String>,
    /// Glob patterns (relative to the base directory) always kept visible.
    pub preserve: Vec<String>,
    /// Macro definition prefixes dropped from the compile database output.
    pub discard_defines: Vec<String>,
}

/// Finds the base directory for a run started in `start`.
///
/// The nearest ancestor holding `.treeprune.json` wins, so a project file
/// placed above nested repositories (a west workspace, say) marks the base.
/// Otherwise the nearest repository root is used.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    debug!("Searching for project root from {}", start.display());
    if let Some(dir) = nearest_with(start, &[CONFIG_FILE_NAME]) {
        debug!("Found {} in {}", CONFIG_FILE_NAME, dir.display());
        return Ok(dir);
    }
    match nearest_with(start, ROOT_MARKERS) {
        Some(dir) => {
            debug!("Found repository root at {}", dir.display());
            Ok(dir)
        }
        None => Err(anyhow!(
            "No {} or repository ({}) found above {}",
            CONFIG_FILE_NAME,
            ROOT_MARKERS.join(", "),
            start.display()
        )),
    }
}

fn nearest_with(start: &Path, markers: &[&str]) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            markers.iter().any(|marker| {
                let candidate = dir.join(marker);
                trace!("Checking {}", candidate.display());
                candidate.exists()
            })
        })
        .map(Path::to_path_buf)
}

/// Reads `.treeprune.json` from `root`. A missing file yields the defaults;
/// an unreadable or malformed one is an error.
pub fn read_project_config(root: &Path) -> Result<ProjectConfig> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!("No {} in {}", CONFIG_FILE_NAME, root.display());
        return Ok(ProjectConfig::default());
    }

    debug!("Reading project config from {}", path.display());
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ProjectConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    trace!("Loaded project config: {:?}", config);
    Ok(config)
}

/// Compiles `patterns` into one matcher. `*` also matches `/`, so
/// `zephyr-sdk-*` covers the whole SDK directory name.
pub fn build_glob_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid glob pattern '{}'", pattern))?;
        builder.add(glob);
    }
    builder.build().context("Failed to compile glob patterns")
}
