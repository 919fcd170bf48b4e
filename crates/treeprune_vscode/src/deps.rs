use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use log::{debug, info, trace};
use std::{collections::BTreeSet, fs, path::Path, process::Command};

use treeprune_core::{resolve_against, to_slash_string};

use crate::constants::{HEADER_EXTENSIONS, MAKE_DEPS_EXTENSION, NINJA_PROGRAM, SOURCE_EXTENSIONS};

/// Runs `ninja -C <build_dir> -t deps` and returns its listing.
///
/// A missing `ninja` or a non-zero exit is fatal; the error carries the
/// tool's output.
pub fn generate_ninja_deps(build_dir: &Path) -> Result<String> {
    generate_deps_with(NINJA_PROGRAM, build_dir)
}

fn generate_deps_with(program: &str, build_dir: &Path) -> Result<String> {
    info!("Generating dependency listing with {} in {}", program, build_dir.display());
    let output = Command::new(program)
        .arg("-C")
        .arg(build_dir)
        .args(["-t", "deps"])
        .output()
        .with_context(|| format!("Failed to run {} in {}", program, build_dir.display()))?;

    if !output.status.success() {
        bail!(
            "{} -t deps failed ({}):\n{}\n{}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let listing = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!("Dependency listing has {} lines", listing.lines().count());
    Ok(listing)
}

/// Renders the `*.d` files under `build_dir` in the same shape as the ninja
/// listing: each target on its own line, its prerequisites indented below.
pub fn collect_makefile_deps(build_dir: &Path) -> Result<String> {
    info!("Collecting Makefile dependency files from {}", build_dir.display());
    let walker = WalkBuilder::new(build_dir)
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build();

    let mut dep_files = Vec::new();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(MAKE_DEPS_EXTENSION) {
            trace!("Found dependency file: {}", p.display());
            dep_files.push(p.to_path_buf());
        }
    }
    dep_files.sort();
    debug!("Found {} dependency files", dep_files.len());

    let mut listing = String::new();
    for dep_file in &dep_files {
        let content = fs::read_to_string(dep_file)
            .with_context(|| format!("Failed to read {}", dep_file.display()))?;
        let joined = content.replace("\\\r\n", " ").replace("\\\n", " ");

        let mut first = true;
        for token in joined.split_whitespace() {
            let token = token.trim_end_matches(':');
            if token.is_empty() {
                continue;
            }
            let path = to_slash_string(&resolve_against(build_dir, token));
            if first {
                listing.push_str(&path);
                first = false;
            } else {
                listing.push_str("    ");
                listing.push_str(&path);
            }
            listing.push('\n');
        }
    }
    Ok(listing)
}

/// Extracts the source and header paths from a dependency listing.
///
/// Lines are trimmed, so target and dependency lines count alike. Relative
/// paths are resolved against `build_dir`. Sources come first, then headers,
/// each group sorted and deduplicated.
pub fn parse_deps(listing: &str, build_dir: &Path) -> Vec<String> {
    let mut sources = BTreeSet::new();
    let mut headers = BTreeSet::new();

    for line in listing.lines() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }
        let bucket = match Path::new(entry).extension().and_then(|e| e.to_str()) {
            Some(ext) if SOURCE_EXTENSIONS.contains(&ext) => &mut sources,
            Some(ext) if HEADER_EXTENSIONS.contains(&ext) => &mut headers,
            _ => {
                trace!("Ignoring listing line: {}", entry);
                continue;
            }
        };
        bucket.insert(to_slash_string(&resolve_against(build_dir, entry)));
    }

    debug!("Parsed {} sources and {} headers", sources.len(), headers.len());
    sources.into_iter().chain(headers).collect()
}
