//! VS Code configuration for C/C++ projects, pruned to what the build uses.
//!
//! This crate drives the core pipeline against a real project: it scans the
//! base directory, asks the build for its dependency listing, marks used
//! files, and writes `.vscode/settings.json` (hidden paths) and
//! `.vscode/c_cpp_properties.json` (compiler, definitions, include paths).
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use std::io::{BufWriter, Write};
//! use treeprune_vscode::{Config, run_vscode_generation};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::parse_from(["vscode", "--root", "/path/to/workspace"]);
//! let result = run_vscode_generation(cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! treeprune_vscode::print_generation_summary(&mut stdout, &result)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod compile_db;
mod config;
mod constants;
mod deps;
mod generator;
mod reporter;
mod settings;
mod types;

// Re-export public API
pub use compile_db::{CompilerInfo, parse_compile_commands, read_compile_commands};
pub use config::{Config, DepsFormat, OnEmpty};
pub use deps::{collect_makefile_deps, generate_ninja_deps, parse_deps};
pub use generator::{run_exclusion_scan, run_vscode_generation};
pub use reporter::{print_exclusions, print_generation_summary, print_scan_summary};
pub use settings::{CppProperties, VscodeFiles, c_cpp_properties_json, settings_json};
pub use types::{GenerationResult, ScanResult};
