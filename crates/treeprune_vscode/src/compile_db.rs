use anyhow::{Context, Result};
use log::{debug, trace};
use serde::Deserialize;
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use treeprune_core::resolve_against;

/// One entry of `compile_commands.json`.
#[derive(Debug, Deserialize)]
struct CompileCommand {
    directory: String,
    file: String,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    arguments: Option<Vec<String>>,
}

impl CompileCommand {
    /// Arguments as whitespace-separated tokens, with flag values glued to
    /// their flag (`-D X` becomes `-DX`).
    fn tokens(&self) -> Vec<String> {
        let line = match (&self.command, &self.arguments) {
            (Some(command), _) => command.clone(),
            (None, Some(arguments)) => arguments.join(" "),
            (None, None) => String::new(),
        };
        line.replace("-D ", "-D")
            .replace("-I ", "-I")
            .replace("-include ", "-include")
            .replace("-imacros ", "-imacros")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// What the editor needs to know about how the project is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerInfo {
    pub compiler: Option<PathBuf>,
    pub defines: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub forced_includes: Vec<PathBuf>,
}

pub fn read_compile_commands(path: &Path, discard_defines: &[String]) -> Result<CompilerInfo> {
    debug!("Reading compile database from {}", path.display());
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_compile_commands(&content, discard_defines)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Collects compiler, definitions, include directories and forced includes
/// across every entry. Lists are deduplicated and sorted.
pub fn parse_compile_commands(json: &str, discard_defines: &[String]) -> Result<CompilerInfo> {
    let commands: Vec<CompileCommand> = serde_json::from_str(json)?;
    debug!("Compile database has {} entries", commands.len());

    let mut compiler = None;
    let mut defines = BTreeSet::new();
    let mut include_dirs = BTreeSet::new();
    let mut forced_includes = BTreeSet::new();

    for entry in &commands {
        trace!("Processing compile command for {}", entry.file);
        let directory = Path::new(&entry.directory);
        let tokens = entry.tokens();

        if compiler.is_none()
            && entry.file.ends_with(".c")
            && let Some(program) = tokens.first()
        {
            let resolved = resolve_against(directory, program);
            debug!("Detected compiler: {}", resolved.display());
            compiler = Some(resolved);
        }

        for token in &tokens {
            if let Some(define) = token.strip_prefix("-D").filter(|d| !d.is_empty()) {
                defines.insert(beautify_define(define));
            } else if let Some(dir) = token.strip_prefix("-I").filter(|d| !d.is_empty()) {
                include_dirs.insert(resolve_against(directory, dir));
            } else if let Some(file) = token
                .strip_prefix("-include")
                .or_else(|| token.strip_prefix("-imacros"))
                .filter(|f| !f.is_empty())
            {
                forced_includes.insert(resolve_against(directory, file));
            }
        }
    }

    let defines: Vec<String> = defines
        .into_iter()
        .filter(|d| !discard_defines.iter().any(|prefix| d.starts_with(prefix.as_str())))
        .collect();

    debug!(
        "Found {} definitions, {} include directories, {} forced includes",
        defines.len(),
        include_dirs.len(),
        forced_includes.len()
    );

    Ok(CompilerInfo {
        compiler,
        defines,
        include_dirs: include_dirs.into_iter().collect(),
        forced_includes: forced_includes.into_iter().collect(),
    })
}

fn beautify_define(define: &str) -> String {
    define.replace(r#"\""#, "\"").replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATABASE: &str = r#"[
  {
    "directory": "/work/app/build",
    "command": "/opt/sdk/bin/arm-zephyr-eabi-gcc -DKERNEL -D __ZEPHYR__=1 -DKBUILD_BASENAME=\"\\\"main\\\"\" -I../include -I /work/zephyr/include -include zephyr/include/generated/autoconf.h -imacros /work/zephyr/include/zephyr/toolchain/zephyr_stdint.h -o main.o -c ../src/main.c",
    "file": "/work/app/src/main.c"
  },
  {
    "directory": "/work/app/build/modules",
    "arguments": ["/opt/sdk/bin/arm-zephyr-eabi-g++", "-DKERNEL", "-I", "../../include", "-c", "drv.cpp"],
    "file": "/work/app/build/modules/drv.cpp"
  }
]"#;

    #[test]
    fn test_parse_compile_commands() {
        let info = parse_compile_commands(DATABASE, &[]).unwrap();

        assert_eq!(info.compiler, Some(PathBuf::from("/opt/sdk/bin/arm-zephyr-eabi-gcc")));
        assert_eq!(info.defines, vec!["KBUILD_BASENAME=\"main\"", "KERNEL", "__ZEPHYR__=1"]);
        assert_eq!(
            info.include_dirs,
            vec![PathBuf::from("/work/app/include"), PathBuf::from("/work/zephyr/include")]
        );
        assert_eq!(
            info.forced_includes,
            vec![
                PathBuf::from("/work/app/build/zephyr/include/generated/autoconf.h"),
                PathBuf::from("/work/zephyr/include/zephyr/toolchain/zephyr_stdint.h"),
            ]
        );
    }

    #[test]
    fn test_parse_compile_commands_discards_define_prefixes() {
        let info = parse_compile_commands(DATABASE, &["KBUILD_".to_string()]).unwrap();
        assert_eq!(info.defines, vec!["KERNEL", "__ZEPHYR__=1"]);
    }

    #[test]
    fn test_compiler_comes_from_first_c_file() {
        let json = r#"[
          { "directory": "/b", "arguments": ["g++", "-c", "a.cpp"], "file": "a.cpp" },
          { "directory": "/b", "arguments": ["bin/gcc", "-c", "b.c"], "file": "b.c" },
          { "directory": "/b", "arguments": ["other-gcc", "-c", "c.c"], "file": "c.c" }
        ]"#;
        let info = parse_compile_commands(json, &[]).unwrap();
        assert_eq!(info.compiler, Some(PathBuf::from("/b/bin/gcc")));
    }

    #[test]
    fn test_parse_compile_commands_empty() {
        let info = parse_compile_commands("[]", &[]).unwrap();
        assert_eq!(info, CompilerInfo::default());
    }

    #[test]
    fn test_parse_compile_commands_malformed() {
        assert!(parse_compile_commands(r#"[{ "file": "a.c" }]"#, &[]).is_err());
        assert!(parse_compile_commands("not json", &[]).is_err());
    }

    #[test]
    fn test_read_compile_commands_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("compile_commands.json");
        let err = read_compile_commands(&missing, &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
