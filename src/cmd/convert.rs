//! Convert command CLI handler.

use sqlite_to_mssql::convert::{self, ConvertConfig, ConvertStats};
use std::path::PathBuf;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    dry_run: bool,
    progress: bool,
    strict: bool,
    json: bool,
) -> anyhow::Result<()> {
    if json && output.is_none() && !dry_run {
        anyhow::bail!("--json needs --output or --dry-run; stdout already carries the script");
    }

    let config = ConvertConfig {
        input: file,
        output: output.clone(),
        dry_run,
        progress,
        strict,
    };

    let stats = convert::run(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if let (Some(path), false) = (&output, dry_run) {
        println!("✅ Converted SQL dump saved to {}", path.display());
    }

    print_stats(&stats, dry_run, progress);
    Ok(())
}

pub(super) fn print_warnings(stats: &ConvertStats) {
    if stats.warnings.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("Warnings ({}):", stats.warnings.len());
    for warning in &stats.warnings {
        eprintln!("  ⚠ {}", warning);
    }
}

fn print_stats(stats: &ConvertStats, dry_run: bool, progress: bool) {
    if progress || dry_run {
        eprintln!();
        eprintln!("Conversion Statistics:");
        eprintln!("  Input bytes: {}", stats.input_bytes);
        eprintln!("  Output bytes: {}", stats.output_bytes);
        eprintln!("  Statement lines: {}", stats.batches.lines_written);
        eprintln!("  Batches (GO): {}", stats.batches.separators);
        eprintln!("  Lines dropped: {}", stats.batches.lines_dropped);
        eprintln!("  Rule matches:");
        for count in stats.rules.iter().filter(|c| c.matches > 0) {
            eprintln!("    {}: {}", count.rule, count.matches);
        }
    }

    print_warnings(stats);

    if dry_run {
        eprintln!();
        eprintln!("(Dry run - no output written)");
    }
}
