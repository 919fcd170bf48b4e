//! File names and fixed lists used when talking to the build and the editor.

/// Dependency listing lines ending in one of these are translation units.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp"];

/// Dependency listing lines ending in one of these are headers.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp"];

/// Always hidden from the editor, wherever they appear.
pub const EDITOR_EXCLUDE_GLOBS: &[&str] =
    &["**/.git", "**/.svn", "**/.hg", "**/CVS", "**/.DS_Store", "**/Thumbs.db"];

pub const VSCODE_DIR: &str = ".vscode";
pub const SETTINGS_FILE: &str = "settings.json";
pub const PROPERTIES_FILE: &str = "c_cpp_properties.json";
pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const NINJA_PROGRAM: &str = "ninja";

/// Extension of Makefile dependency fragments (`gcc -MD`).
pub const MAKE_DEPS_EXTENSION: &str = "d";
