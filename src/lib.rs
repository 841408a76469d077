//! Convert SQLite dumps into SQL Server scripts and load them with sqlcmd.

pub mod config;
pub mod convert;
pub mod error;
pub mod import;
pub mod progress;

pub use error::{MigrateError, Result};
