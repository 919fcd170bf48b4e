use anyhow::{Result, anyhow};
use globset::GlobSet;
use ignore::WalkBuilder;
use log::{debug, trace};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{constants::VCS_DIRS, paths::to_slash_string};

pub struct CollectorConfig {
    pub root: PathBuf,
    /// Matched against root-relative paths; matching entries are not descended into.
    pub discard: GlobSet,
    /// Honour `.gitignore`/`.ignore` files. Off by default because generated
    /// build outputs are usually ignored yet take part in the build.
    pub respect_gitignore: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectedFiles {
    /// Absolute file paths, sorted and deduplicated.
    pub files: Vec<String>,
    /// Root-relative paths of the entries pruned by a discard pattern.
    pub discarded: Vec<String>,
}

pub fn collect_files(cfg: &CollectorConfig) -> Result<CollectedFiles> {
    let root = &cfg.root;
    debug!("Walking directory tree from root: {}", root.display());

    let discarded = Arc::new(Mutex::new(Vec::new()));
    let filter_root = root.clone();
    let filter_discard = cfg.discard.clone();
    let filter_discarded = Arc::clone(&discarded);

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .parents(cfg.respect_gitignore)
        .ignore(cfg.respect_gitignore)
        .git_ignore(cfg.respect_gitignore)
        .git_global(cfg.respect_gitignore)
        .git_exclude(cfg.respect_gitignore)
        .filter_entry(move |dent| {
            if dent.depth() == 0 {
                return true;
            }
            if dent.file_type().is_some_and(|t| t.is_dir())
                && dent.file_name().to_str().is_some_and(|name| VCS_DIRS.contains(&name))
            {
                trace!("Skipping version control directory: {}", dent.path().display());
                return false;
            }
            let Some(relative) = relative_to(dent.path(), &filter_root) else {
                return true;
            };
            if filter_discard.is_match(&relative) {
                trace!("Discarding: {}", relative);
                if let Ok(mut list) = filter_discarded.lock() {
                    list.push(relative);
                }
                return false;
            }
            true
        })
        .build();

    let mut files = Vec::new();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }
        trace!("Found file: {}", p.display());
        files.push(to_slash_string(p));
    }
    files.sort();
    files.dedup();

    let mut discarded = discarded
        .lock()
        .map(|mut list| std::mem::take(&mut *list))
        .map_err(|_| anyhow!("Discard list lock poisoned"))?;
    discarded.sort();

    debug!("Collected {} files, discarded {} entries", files.len(), discarded.len());
    Ok(CollectedFiles { files, discarded })
}

fn relative_to(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(to_slash_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_glob_set;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn config(root: &Path, discard: &[&str]) -> CollectorConfig {
        CollectorConfig {
            root: root.to_path_buf(),
            discard: build_glob_set(discard).unwrap(),
            respect_gitignore: false,
        }
    }

    #[test]
    fn test_collect_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let b = create_test_file(root, "src/b.c", "");
        let a = create_test_file(root, "src/a.c", "");
        let h = create_test_file(root, ".vscode/settings.json", "{}");

        let collected = collect_files(&config(root, &[])).unwrap();
        let mut expected = vec![to_slash_string(&a), to_slash_string(&b), to_slash_string(&h)];
        expected.sort();
        assert_eq!(collected.files, expected);
        assert!(collected.discarded.is_empty());
    }

    #[test]
    fn test_collect_files_skips_vcs_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, ".git/HEAD", "ref: refs/heads/main");
        create_test_file(root, "lib/.svn/entries", "");
        create_test_file(root, "lib/util.c", "");

        let collected = collect_files(&config(root, &[])).unwrap();
        assert_eq!(collected.files.len(), 1);
        assert!(collected.files[0].ends_with("lib/util.c"));
    }

    #[test]
    fn test_collect_files_prunes_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "zephyr-sdk-0.17.0/arm/include/stdio.h", "");
        create_test_file(root, "zephyr-sdk-0.17.0/sdk_version", "0.17.0");
        create_test_file(root, "app/src/main.c", "");

        let collected = collect_files(&config(root, &["zephyr-sdk-*"])).unwrap();
        assert_eq!(collected.files.len(), 1);
        assert!(collected.files[0].ends_with("app/src/main.c"));
        assert_eq!(collected.discarded, vec!["zephyr-sdk-0.17.0"]);
    }

    #[test]
    fn test_collect_files_ignores_gitignore_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        create_test_file(root, ".gitignore", "build/\n");
        create_test_file(root, "build/zephyr/include/generated/autoconf.h", "");

        let collected = collect_files(&config(root, &[])).unwrap();
        assert!(collected.files.iter().any(|f| f.ends_with("generated/autoconf.h")));

        let mut cfg = config(root, &[]);
        cfg.respect_gitignore = true;
        let collected = collect_files(&cfg).unwrap();
        assert!(!collected.files.iter().any(|f| f.ends_with("generated/autoconf.h")));
    }

    #[test]
    fn test_collect_files_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");
        assert!(collect_files(&config(&missing, &[])).is_err());
    }
}
