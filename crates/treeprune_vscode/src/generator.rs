use anyhow::{Result, bail};
use log::{debug, info, warn};

use treeprune_core::{
    BuilderConfig, CollectorConfig, EmptyTreePolicy, MarkerConfig, ReservationMarker, TreeBuilder,
    build_glob_set, collect_files, exclusion_roots, relative_display, to_slash_string,
};

use crate::{
    compile_db::read_compile_commands,
    config::{Config, DepsFormat},
    constants::COMPILE_COMMANDS_FILE,
    deps::{collect_makefile_deps, generate_ninja_deps, parse_deps},
    settings::{CppProperties, exclusion_entries, write_vscode_files},
    types::{GenerationResult, ScanResult},
};

/// Computes what to hide without writing anything.
pub fn run_exclusion_scan(mut cfg: Config) -> Result<ScanResult> {
    info!("Starting exclusion scan");
    cfg.initialize()?;
    scan(&cfg)
}

/// Computes what to hide and writes `.vscode/settings.json` and
/// `.vscode/c_cpp_properties.json` under the base directory.
pub fn run_vscode_generation(mut cfg: Config) -> Result<GenerationResult> {
    info!("Starting VS Code configuration generation");
    cfg.initialize()?;
    let scan = scan(&cfg)?;

    let root = cfg.root()?;
    let compile_db = cfg.build_dir()?.join(COMPILE_COMMANDS_FILE);
    let info = read_compile_commands(&compile_db, &cfg.discard_defines)?;
    if info.compiler.is_none() {
        warn!("No C translation unit in {}; compilerPath left unset", compile_db.display());
    }

    let props = CppProperties {
        name: cfg.config_name.clone(),
        intellisense_mode: cfg.intellisense_mode.clone(),
        compiler_path: info.compiler.as_deref().map(to_slash_string),
        defines: info.defines.clone(),
        include_path: info.include_dirs.iter().map(|p| relative_display(p, root)).collect(),
        forced_include: info.forced_includes.iter().map(|p| relative_display(p, root)).collect(),
    };

    let files = write_vscode_files(root, &scan.exclusions, &props)?;
    Ok(GenerationResult {
        scan,
        settings_path: files.settings,
        properties_path: files.properties,
        defines: info.defines.len(),
        include_dirs: info.include_dirs.len(),
    })
}

fn scan(cfg: &Config) -> Result<ScanResult> {
    let root = cfg.root()?;
    let build_dir = cfg.build_dir()?;
    if !build_dir.is_dir() {
        bail!("Build directory {} does not exist", build_dir.display());
    }
    let discard = build_glob_set(&cfg.discard)?;
    let marker = ReservationMarker::new(MarkerConfig::from_patterns(&cfg.preserve)?);

    let collected = collect_files(&CollectorConfig {
        root: root.clone(),
        discard: discard.clone(),
        respect_gitignore: cfg.respect_gitignore,
    })?;
    info!("Found {} files under {}", collected.files.len(), root.display());

    let root_name = to_slash_string(root);
    let (mut tree, build_stats) =
        TreeBuilder::new(BuilderConfig { discard }).build(&root_name, &collected.files);
    debug!("Tree has {} nodes ({:?})", tree.len(), build_stats);

    let listing = match cfg.deps_format {
        DepsFormat::Ninja => generate_ninja_deps(build_dir)?,
        DepsFormat::Make => collect_makefile_deps(build_dir)?,
    };
    let deps = parse_deps(&listing, build_dir);
    if deps.is_empty() {
        warn!("Dependency listing for {} names no source or header", build_dir.display());
    }
    info!("Dependency listing names {} files", deps.len());

    let dep_stats = marker.mark(&mut tree, &deps);
    // Decided before pinning: a kept `.vscode/` would otherwise reserve the root.
    let policy: EmptyTreePolicy = cfg.on_empty.into();
    let nothing_used = !tree.is_reserved(tree.root());
    if nothing_used {
        warn!("The build uses nothing under {}", root.display());
        if policy == EmptyTreePolicy::Reject {
            bail!(
                "The build in {} references nothing under {}; check the build directory \
                 or pass --on-empty",
                build_dir.display(),
                root.display()
            );
        }
    }

    let pin_stats = marker.mark_preserved(&mut tree);
    debug!("Marking: dependencies {:?}, preserved {:?}", dep_stats, pin_stats);

    let roots: Vec<String> = if nothing_used && policy == EmptyTreePolicy::ExcludeNothing {
        Vec::new()
    } else {
        exclusion_roots(&tree, policy)?.into_iter().map(|id| tree.relative_path(id)).collect()
    };
    info!("Exclusion scan complete. {} paths can be hidden", roots.len());

    Ok(ScanResult {
        exclusions: exclusion_entries(&collected.discarded, &roots),
        excluded_roots: roots.len(),
        files_scanned: collected.files.len(),
        discarded: collected.discarded.len(),
        dependency_files: deps.len(),
        dependencies_found: dep_stats.found,
        reserved_nodes: tree.reserved_count(),
    })
}
