//! Import command CLI handler.

use super::ConnectionArgs;
use sqlite_to_mssql::config::ImportConfig;
use sqlite_to_mssql::import::ImportRunner;
use sqlite_to_mssql::MigrateError;
use std::path::{Path, PathBuf};

pub fn run(file: PathBuf, connection: ConnectionArgs) -> anyhow::Result<()> {
    if !file.is_file() {
        return Err(MigrateError::InputNotFound { path: file }.into());
    }

    let config = connection.resolve()?;
    if !import_file(&file, config)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the import, reporting the outcome on stdout.
///
/// A failed sqlcmd run is reported and returned as `false`; a failed copy
/// aborts with an error.
pub(super) fn import_file(file: &Path, config: ImportConfig) -> anyhow::Result<bool> {
    println!("\n🔄 Importing data into SQL Server...");

    match ImportRunner::new(config).import(file) {
        Ok(()) => {
            println!("✅ Data imported successfully!");
            Ok(true)
        }
        Err(MigrateError::ExecuteFailed { stderr }) => {
            println!("❌ Import failed: {}", stderr);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
