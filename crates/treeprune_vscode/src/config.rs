use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::{env, path::PathBuf};

use treeprune_core::{DEFAULT_PRESERVED, EmptyTreePolicy};

use crate::constants::DEFAULT_BUILD_DIR;

/// Where the list of files used by the build comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DepsFormat {
    /// Run `ninja -t deps` in the build directory
    #[default]
    Ninja,
    /// Read the `*.d` files left in the build directory by `gcc -MD`
    Make,
}

/// What to do when the build references nothing under the base directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OnEmpty {
    /// Hide nothing
    Nothing,
    /// Hide every top-level entry
    Everything,
    /// Fail; usually the build directory is wrong
    #[default]
    Error,
}

impl From<OnEmpty> for EmptyTreePolicy {
    fn from(value: OnEmpty) -> Self {
        match value {
            OnEmpty::Nothing => EmptyTreePolicy::ExcludeNothing,
            OnEmpty::Everything => EmptyTreePolicy::ExcludeEverything,
            OnEmpty::Error => EmptyTreePolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "vscode")]
#[command(about = "Hide files that take no part in the build from VS Code")]
pub struct Config {
    /// Base directory whose tree is pruned (defaults to the nearest directory
    /// holding .treeprune.json, else the repository root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Project directory containing the build directory (defaults to the base directory)
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Build directory (defaults to <project>/build)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// How to obtain the build's dependency listing
    #[arg(long, value_enum, default_value_t = DepsFormat::Ninja)]
    pub deps_format: DepsFormat,

    /// Glob (relative to the base directory) skipped while scanning; repeatable
    #[arg(long, value_name = "GLOB")]
    pub discard: Vec<String>,

    /// Glob (relative to the base directory) always kept visible; repeatable
    #[arg(long, value_name = "GLOB")]
    pub preserve: Vec<String>,

    /// Drop macro definitions starting with this prefix; repeatable
    #[arg(long = "discard-define", value_name = "PREFIX")]
    pub discard_defines: Vec<String>,

    /// Behaviour when nothing under the base directory is used by the build
    #[arg(long, value_enum, default_value_t = OnEmpty::Error)]
    pub on_empty: OnEmpty,

    /// Honour .gitignore files while scanning
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Name of the generated c_cpp_properties configuration
    #[arg(long, default_value = "zephyr")]
    pub config_name: String,

    /// IntelliSense mode written to c_cpp_properties.json
    #[arg(long, default_value = "linux-gcc-arm")]
    pub intellisense_mode: String,
}

impl Config {
    /// Resolve the base, project and build directories and merge the
    /// project's `.treeprune.json` into the pattern lists.
    pub fn initialize(&mut self) -> Result<()> {
        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            r.canonicalize().unwrap_or(r)
        } else {
            debug!("No root provided, searching from the current directory");
            treeprune_core::find_project_root(&env::current_dir()?)?
        };
        info!("Using root directory: {}", root.display());

        let project = match self.project.take() {
            Some(p) => p.canonicalize().unwrap_or(p),
            None => root.clone(),
        };
        let build_dir = match self.build_dir.take() {
            Some(b) => b.canonicalize().unwrap_or(b),
            None => project.join(DEFAULT_BUILD_DIR),
        };
        debug!("Project: {}, build directory: {}", project.display(), build_dir.display());

        let file = treeprune_core::read_project_config(&root)?;
        self.discard = merge(file.discard, &self.discard);
        self.preserve = merge(
            DEFAULT_PRESERVED.iter().map(|s| s.to_string()).chain(file.preserve).collect(),
            &self.preserve,
        );
        self.discard_defines = merge(file.discard_defines, &self.discard_defines);
        debug!(
            "Patterns: discard={:?}, preserve={:?}, discard_defines={:?}",
            self.discard, self.preserve, self.discard_defines
        );

        self.root = Some(root);
        self.project = Some(project);
        self.build_dir = Some(build_dir);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    pub fn build_dir(&self) -> Result<&PathBuf> {
        self.build_dir
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }
}

fn merge(mut base: Vec<String>, extra: &[String]) -> Vec<String> {
    for item in extra {
        if !base.contains(item) {
            base.push(item.clone());
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use treeprune_core::CONFIG_FILE_NAME;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("vscode").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&[]);
        assert_eq!(cfg.deps_format, DepsFormat::Ninja);
        assert_eq!(cfg.on_empty, OnEmpty::Error);
        assert_eq!(cfg.config_name, "zephyr");
        assert_eq!(cfg.intellisense_mode, "linux-gcc-arm");
        assert!(cfg.discard.is_empty());
        assert!(!cfg.respect_gitignore);
    }

    #[test]
    fn test_repeatable_patterns() {
        let cfg = parse(&[
            "--discard",
            "zephyr-sdk-*",
            "--discard",
            "tools",
            "--discard-define",
            "KBUILD_",
            "--deps-format",
            "make",
            "--on-empty",
            "everything",
        ]);
        assert_eq!(cfg.discard, vec!["zephyr-sdk-*", "tools"]);
        assert_eq!(cfg.discard_defines, vec!["KBUILD_"]);
        assert_eq!(cfg.deps_format, DepsFormat::Make);
        assert_eq!(cfg.on_empty, OnEmpty::Everything);
    }

    #[test]
    fn test_uninitialized_root_is_error() {
        let cfg = parse(&[]);
        assert!(cfg.root().is_err());
        assert!(cfg.build_dir().is_err());
    }

    #[test]
    fn test_initialize_merges_project_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(
            root.join(CONFIG_FILE_NAME),
            r#"{ "discard": ["zephyr-sdk-*"], "preserve": ["class-pro"] }"#,
        )
        .unwrap();

        let mut cfg = parse(&[
            "--root",
            root.to_str().unwrap(),
            "--discard",
            "tools",
            "--discard",
            "zephyr-sdk-*",
        ]);
        cfg.initialize().unwrap();

        assert_eq!(cfg.discard, vec!["zephyr-sdk-*", "tools"]);
        assert_eq!(cfg.preserve, vec![".vscode", CONFIG_FILE_NAME, "class-pro"]);
        let canonical = root.canonicalize().unwrap();
        assert_eq!(cfg.root().unwrap(), &canonical);
        assert_eq!(cfg.build_dir().unwrap(), &canonical.join("build"));
    }

    #[test]
    fn test_on_empty_maps_to_policy() {
        assert_eq!(EmptyTreePolicy::from(OnEmpty::Nothing), EmptyTreePolicy::ExcludeNothing);
        assert_eq!(EmptyTreePolicy::from(OnEmpty::Everything), EmptyTreePolicy::ExcludeEverything);
        assert_eq!(EmptyTreePolicy::from(OnEmpty::Error), EmptyTreePolicy::Reject);
    }
}
