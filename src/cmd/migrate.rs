//! Migrate command: convert, then import or print manual steps.

use super::convert::print_warnings;
use super::import::import_file;
use super::ConnectionArgs;
use sqlite_to_mssql::convert::{self, ConvertConfig};
use std::path::PathBuf;

pub fn run(
    input: PathBuf,
    output: PathBuf,
    import: bool,
    strict: bool,
    progress: bool,
    connection: ConnectionArgs,
) -> anyhow::Result<()> {
    // Resolve before converting so a bad config file fails fast
    let import_config = if import {
        Some(connection.resolve()?)
    } else {
        None
    };

    println!("🚀 Starting SQLite to SQL Server migration...\n");

    let stats = convert::run(ConvertConfig {
        input,
        output: Some(output.clone()),
        dry_run: false,
        progress,
        strict,
    })?;

    println!("✅ Converted SQL dump saved to {}", output.display());
    print_warnings(&stats);

    match import_config {
        Some(config) => {
            if !import_file(&output, config)? {
                std::process::exit(1);
            }
        }
        None => print_manual_steps(&output),
    }

    Ok(())
}

fn print_manual_steps(output: &std::path::Path) {
    println!("\n⚠️  Manual import required!");
    println!("The SQL file has been converted to: {}", output.display());
    println!("\nTo import manually, you can use one of these methods:");
    println!("1. Azure Data Studio");
    println!("2. SQL Server Management Studio");
    println!("3. Or run the import statements from the converted file");
    println!("\nOr rerun with --import to load it through sqlcmd in the container.");
}
