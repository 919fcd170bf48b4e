use std::io::{self, Write};

use colored::Colorize;
use log::debug;

use crate::types::{GenerationResult, ScanResult};

/// Prints one exclusion per line, computed roots last as in `files.exclude`.
pub fn print_exclusions<W: Write>(writer: &mut W, result: &ScanResult) -> io::Result<()> {
    debug!("Printing {} exclusions", result.exclusions.len());
    let fixed = result.exclusions.len().saturating_sub(result.excluded_roots);
    for (idx, entry) in result.exclusions.iter().enumerate() {
        if idx < fixed {
            writeln!(writer, "{}", entry.dimmed())?;
        } else {
            writeln!(writer, "{}", entry)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn print_scan_summary<W: Write>(writer: &mut W, result: &ScanResult) -> io::Result<()> {
    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Files scanned: {}", result.files_scanned.to_string().cyan())?;
    if result.discarded > 0 {
        writeln!(writer, "  Discarded entries: {}", result.discarded.to_string().yellow())?;
    }
    writeln!(
        writer,
        "  Build dependencies: {} ({} under the base directory)",
        result.dependency_files.to_string().cyan(),
        result.dependencies_found.to_string().cyan()
    )?;
    writeln!(writer, "  Reserved nodes: {}", result.reserved_nodes.to_string().green())?;
    writeln!(writer, "  Hidden paths: {}", result.excluded_roots.to_string().green().bold())?;
    writer.flush()?;
    Ok(())
}

pub fn print_generation_summary<W: Write>(
    writer: &mut W,
    result: &GenerationResult,
) -> io::Result<()> {
    writeln!(writer, "{} Wrote {}", "✓".green().bold(), result.settings_path.display())?;
    writeln!(writer, "{} Wrote {}", "✓".green().bold(), result.properties_path.display())?;
    print_scan_summary(writer, &result.scan)?;
    writeln!(writer, "  Definitions: {}", result.defines.to_string().cyan())?;
    writeln!(writer, "  Include directories: {}", result.include_dirs.to_string().cyan())?;
    writer.flush()?;
    Ok(())
}
