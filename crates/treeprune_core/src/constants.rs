//! Names shared by the collector and the configuration loader.

/// Version-control metadata directories. The collector never descends into
/// them; they are hidden from editors through fixed recursive globs instead.
pub const VCS_DIRS: &[&str] = &[".git", ".svn", ".hg", "CVS"];

/// Directories marking a repository root. `CVS` is left out since every
/// directory of a CVS checkout carries one.
pub const ROOT_MARKERS: &[&str] = &[".git", ".hg", ".svn"];

/// Project configuration file looked up in the base directory.
pub const CONFIG_FILE_NAME: &str = ".treeprune.json";

/// Paths kept visible even when nothing in the build references them.
pub const DEFAULT_PRESERVED: &[&str] = &[".vscode", CONFIG_FILE_NAME];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_dirs_are_plain_names() {
        for dir in VCS_DIRS {
            assert!(!dir.contains('/'), "'{}' should be a single path segment", dir);
        }
    }
}
