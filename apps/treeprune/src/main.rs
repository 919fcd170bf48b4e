use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;
use treeprune_vscode::Config;

#[derive(Parser)]
#[command(name = "treeprune")]
#[command(about = "Hide everything a build does not use from your editor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write .vscode/settings.json and .vscode/c_cpp_properties.json
    Vscode(Config),
    /// Print the paths that would be hidden, without writing anything
    Excludes(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Vscode(cfg) => {
            info!("Generating VS Code configuration (deps format: {:?})", cfg.deps_format);
            let result = treeprune_vscode::run_vscode_generation(cfg)?;
            treeprune_vscode::print_generation_summary(&mut stdout, &result)?;
        }
        Commands::Excludes(cfg) => {
            info!("Listing exclusions (deps format: {:?})", cfg.deps_format);
            let result = treeprune_vscode::run_exclusion_scan(cfg)?;
            treeprune_vscode::print_exclusions(&mut stdout, &result)?;
            treeprune_vscode::print_scan_summary(&mut stdout, &result)?;
        }
    }

    writeln!(
        stdout,
        "\n{} Finished in {}ms.",
        "●".bright_blue(),
        start.elapsed().as_millis().to_string().cyan()
    )?;
    stdout.flush()?;
    Ok(())
}
