use anyhow::{Context, Result};
use hashlink::LinkedHashSet;
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value, json, ser::PrettyFormatter};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::constants::{EDITOR_EXCLUDE_GLOBS, PROPERTIES_FILE, SETTINGS_FILE, VSCODE_DIR};

/// Contents of the single configuration written to `c_cpp_properties.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CppProperties {
    pub name: String,
    pub intellisense_mode: String,
    pub compiler_path: Option<String>,
    pub defines: Vec<String>,
    pub include_path: Vec<String>,
    pub forced_include: Vec<String>,
}

/// Every `files.exclude` entry in output order: fixed editor globs, then
/// discarded paths, then computed exclusion roots. Duplicates keep their
/// first position.
pub fn exclusion_entries(discarded: &[String], roots: &[String]) -> Vec<String> {
    let mut entries: LinkedHashSet<String> = LinkedHashSet::new();
    let candidates = EDITOR_EXCLUDE_GLOBS
        .iter()
        .map(|g| g.to_string())
        .chain(discarded.iter().cloned())
        .chain(roots.iter().cloned());
    for entry in candidates {
        // `insert` would move an existing entry to the back.
        if !entries.contains(&entry) {
            entries.insert(entry);
        }
    }
    entries.into_iter().collect()
}

pub fn settings_json(exclusions: &[String]) -> Value {
    let mut exclude = Map::new();
    for path in exclusions {
        exclude.insert(path.clone(), Value::Bool(true));
    }
    json!({
        "files.associations": {
            "*.h": "c",
            "*_defconfig": "makefile",
            ".config*": "makefile"
        },
        "files.exclude": exclude
    })
}

pub fn c_cpp_properties_json(props: &CppProperties) -> Value {
    let mut configuration = json!({
        "name": props.name,
        "includePath": props.include_path,
        "defines": props.defines,
        "intelliSenseMode": props.intellisense_mode,
        "browse": {
            "limitSymbolsToIncludedHeaders": true
        },
        "cStandard": "c99",
        "cppStandard": "c++11",
        "forcedInclude": props.forced_include
    });
    if let (Some(compiler), Some(object)) = (&props.compiler_path, configuration.as_object_mut()) {
        object.insert("compilerPath".to_string(), Value::String(compiler.clone()));
    }
    json!({
        "configurations": [configuration],
        "version": 4
    })
}

/// Writes `value` with sorted keys and four-space indentation.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    fs::write(path, buf).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Paths of the files written by [`write_vscode_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VscodeFiles {
    pub settings: PathBuf,
    pub properties: PathBuf,
}

pub fn write_vscode_files(
    root: &Path,
    exclusions: &[String],
    props: &CppProperties,
) -> Result<VscodeFiles> {
    let dir = root.join(VSCODE_DIR);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let files =
        VscodeFiles { settings: dir.join(SETTINGS_FILE), properties: dir.join(PROPERTIES_FILE) };
    write_json(&files.properties, &c_cpp_properties_json(props))?;
    write_json(&files.settings, &settings_json(exclusions))?;
    info!("Wrote {} and {}", files.settings.display(), files.properties.display());
    Ok(files)
}
