mod convert;
mod import;
mod migrate;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sqlite_to_mssql::config::ImportConfig;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sqlite-to-mssql")]
#[command(version)]
#[command(about = "Convert SQLite dumps into SQL Server scripts and import them", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a SQLite dump into a SQL Server script
    Convert {
        /// Input SQLite dump
        /// Supports .gz, .bz2, .xz, .zst compression
        file: PathBuf,

        /// Output SQL Server script (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview without writing output (dry run)
        #[arg(long)]
        dry_run: bool,

        /// Show progress during conversion
        #[arg(short, long)]
        progress: bool,

        /// Fail if any lossy conversion is detected
        #[arg(long)]
        strict: bool,

        /// Print conversion statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy a converted script into the SQL Server container and run it
    Import {
        /// Converted SQL Server script
        file: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Convert the default dump and optionally import it
    Migrate {
        /// Input SQLite dump
        #[arg(short, long, default_value = "sqlitedata.sql")]
        input: PathBuf,

        /// Output SQL Server script
        #[arg(short, long, default_value = "sqlserver_import.sql")]
        output: PathBuf,

        /// Import the converted script right away instead of printing instructions
        #[arg(long)]
        import: bool,

        /// Fail if any lossy conversion is detected
        #[arg(long)]
        strict: bool,

        /// Show progress during conversion
        #[arg(short, long)]
        progress: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Connection flags; each one overrides the config file value
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// YAML config file with connection settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Container running SQL Server
    #[arg(long)]
    pub container: Option<String>,

    /// Server address as seen from inside the container
    #[arg(long)]
    pub host: Option<String>,

    /// Login user
    #[arg(long)]
    pub user: Option<String>,

    /// Login password
    #[arg(long)]
    pub password: Option<String>,

    /// Target database
    #[arg(long)]
    pub database: Option<String>,

    /// Do not pass -C (trust server certificate) to sqlcmd
    #[arg(long)]
    pub no_trust_cert: bool,

    /// sqlcmd path inside the container
    #[arg(long)]
    pub sqlcmd_path: Option<String>,

    /// Container runtime CLI
    #[arg(long)]
    pub runtime: Option<String>,
}

impl ConnectionArgs {
    /// Layer flags over the config file over the defaults
    pub fn resolve(self) -> anyhow::Result<ImportConfig> {
        let mut config = match &self.config {
            Some(path) => ImportConfig::load(path)?,
            None => ImportConfig::default(),
        };

        if let Some(v) = self.container {
            config.container_name = v;
        }
        if let Some(v) = self.host {
            config.db_host = v;
        }
        if let Some(v) = self.user {
            config.db_user = v;
        }
        if let Some(v) = self.password {
            config.db_password = v;
        }
        if let Some(v) = self.database {
            config.db_name = v;
        }
        if self.no_trust_cert {
            config.trust_cert = false;
        }
        if let Some(v) = self.sqlcmd_path {
            config.sqlcmd_path = v;
        }
        if let Some(v) = self.runtime {
            config.runtime = v;
        }

        Ok(config)
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Convert {
            file,
            output,
            dry_run,
            progress,
            strict,
            json,
        } => convert::run(file, output, dry_run, progress, strict, json),
        Commands::Import { file, connection } => import::run(file, connection),
        Commands::Migrate {
            input,
            output,
            import,
            strict,
            progress,
            connection,
        } => migrate::run(input, output, import, strict, progress, connection),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "sqlite-to-mssql",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
