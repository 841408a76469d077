//! Convert a SQLite dump into a SQL Server script.
//!
//! The conversion is two passes over the whole document:
//! - the ordered substitution rules in [`rules::RULES`]
//! - a line pass that drops blanks and comments and adds `GO` separators
//!
//! There is no SQL parsing. Rules match text, so they also fire inside
//! string literals, and [`ConvertWarning`] reports the known lossy cases.

mod batch;
mod input;
pub mod rules;
mod warnings;

use crate::error::{MigrateError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use batch::{normalize_newlines, split_batches, BatchStats, BATCH_SEPARATOR};
pub use input::{read_dump, DumpEncoding};
pub use rules::{Rule, RuleId, RULES};
pub use warnings::{ConvertWarning, WarningCollector};

/// Configuration for the convert command
#[derive(Debug)]
pub struct ConvertConfig {
    /// Input SQLite dump (may be .gz, .bz2, .xz or .zst)
    pub input: PathBuf,
    /// Output SQL Server script (None for stdout)
    pub output: Option<PathBuf>,
    /// Dry run mode
    pub dry_run: bool,
    /// Show progress
    pub progress: bool,
    /// Strict mode (fail on any warning)
    pub strict: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sqlitedata.sql"),
            output: Some(PathBuf::from("sqlserver_import.sql")),
            dry_run: false,
            progress: false,
            strict: false,
        }
    }
}

/// Number of matches a rule had in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    pub rule: RuleId,
    pub matches: usize,
}

/// Statistics from convert operation
#[derive(Debug, Default, Serialize)]
pub struct ConvertStats {
    /// Bytes of SQL text read (after decompression)
    pub input_bytes: u64,
    /// Bytes of SQL text produced
    pub output_bytes: u64,
    /// Matches per rule, in rule order
    pub rules: Vec<RuleCount>,
    /// Line pass counters
    pub batches: BatchStats,
    /// Warnings generated
    pub warnings: Vec<ConvertWarning>,
}

impl ConvertStats {
    /// Matches recorded for a rule (0 if it never ran)
    pub fn matches(&self, rule: RuleId) -> usize {
        self.rules
            .iter()
            .find(|c| c.rule == rule)
            .map(|c| c.matches)
            .unwrap_or(0)
    }
}

/// Applies the rule table and the batch pass, keeping counters and warnings
pub struct Converter {
    warnings: WarningCollector,
    strict: bool,
    rule_counts: Vec<RuleCount>,
    batches: BatchStats,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    pub fn new() -> Self {
        Self {
            warnings: WarningCollector::new(),
            strict: false,
            rule_counts: Vec::new(),
            batches: BatchStats::default(),
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Run every substitution rule over the document, in order
    pub fn apply_rules(&mut self, text: &str) -> String {
        let mut current = text.to_string();

        for rule in RULES.iter() {
            if rule.id == RuleId::CreateTable {
                self.check_swallowed_inserts(rule, &current);
            }

            let (next, matches) = rule.apply(&current);
            if matches > 0 {
                debug!(rule = %rule.id, matches, "rule applied");
            }
            self.record(rule.id, matches);
            current = next;
        }

        let guards = self.matches(RuleId::CreateTableIfNotExists);
        if guards > 0 {
            self.warnings
                .add(ConvertWarning::DeadExistenceGuard { count: guards });
        }

        let nulled = self.matches(RuleId::EmptyString);
        if nulled > 0 {
            self.warnings
                .add(ConvertWarning::EmptyStringNulled { count: nulled });
        }

        current
    }

    /// Drop blank and comment lines and add `GO` after terminated lines
    pub fn split_batches(&mut self, text: &str) -> String {
        let (out, stats) = split_batches(text);
        self.batches.lines_written += stats.lines_written;
        self.batches.lines_dropped += stats.lines_dropped;
        self.batches.separators += stats.separators;
        out
    }

    /// Full conversion of one document
    pub fn convert(&mut self, text: &str) -> String {
        let text = normalize_newlines(text);
        let rewritten = self.apply_rules(&text);
        let out = self.split_batches(&rewritten);
        if out.is_empty() {
            self.warnings.add(ConvertWarning::EmptyOutput);
        }
        out
    }

    pub fn warnings(&self) -> &[ConvertWarning] {
        self.warnings.warnings()
    }

    /// Matches counted so far for a rule
    pub fn matches(&self, rule: RuleId) -> usize {
        self.rule_counts
            .iter()
            .find(|c| c.rule == rule)
            .map(|c| c.matches)
            .unwrap_or(0)
    }

    /// Consume the converter into its statistics
    pub fn into_stats(self) -> ConvertStats {
        ConvertStats {
            rules: self.rule_counts,
            batches: self.batches,
            warnings: self.warnings.into_vec(),
            ..Default::default()
        }
    }

    /// Consume the converter, failing in strict mode if anything was lossy.
    pub fn finish(self) -> Result<ConvertStats> {
        if self.strict && self.warnings.count() > 0 {
            for warning in self.warnings.warnings() {
                warn!(%warning, "lossy conversion");
            }
            return Err(MigrateError::Strict {
                count: self.warnings.count(),
            });
        }
        Ok(self.into_stats())
    }

    fn record(&mut self, rule: RuleId, matches: usize) {
        match self.rule_counts.iter_mut().find(|c| c.rule == rule) {
            Some(count) => count.matches += matches,
            None => self.rule_counts.push(RuleCount { rule, matches }),
        }
    }

    /// The create-table rule ends at the first `;` it sees. When that `;`
    /// belongs to a later INSERT, the INSERT is deleted with the schema.
    fn check_swallowed_inserts(&mut self, rule: &Rule, text: &str) {
        for span in rule.find(text) {
            if span.contains("INSERT INTO") {
                self.warnings.add(ConvertWarning::swallowed_insert(span));
            }
        }
    }
}

/// Convert a dump held in memory
pub fn convert_text(text: &str) -> (String, ConvertStats) {
    let mut converter = Converter::new();
    let converted = converter.convert(text);
    let mut stats = converter.into_stats();
    stats.input_bytes = text.len() as u64;
    stats.output_bytes = converted.len() as u64;
    (converted, stats)
}

/// Run the convert command
pub fn run(config: ConvertConfig) -> Result<ConvertStats> {
    let progress_bar = if config.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Reading dump...");
        Some(pb)
    } else {
        None
    };

    let source = read_dump(&config.input, progress_bar.as_ref())?;
    info!(input = %config.input.display(), bytes = source.len(), "loaded dump");

    if let Some(ref pb) = progress_bar {
        pb.set_message("Converting...");
    }

    let mut converter = Converter::new().with_strict(config.strict);
    let converted = converter.convert(&source);

    let mut stats = match converter.finish() {
        Ok(stats) => stats,
        Err(e) => {
            if let Some(pb) = progress_bar {
                pb.finish_and_clear();
            }
            return Err(e);
        }
    };
    stats.input_bytes = source.len() as u64;
    stats.output_bytes = converted.len() as u64;

    if !config.dry_run {
        write_output(&config, &converted)?;
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!(
            "Converted {} statement lines",
            stats.batches.lines_written
        ));
    }

    Ok(stats)
}

fn write_output(config: &ConvertConfig, converted: &str) -> Result<()> {
    match &config.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| MigrateError::output(path, e))?;
            }
            std::fs::write(path, converted).map_err(|e| MigrateError::output(path, e))?;
            debug!(output = %path.display(), bytes = converted.len(), "wrote script");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(converted.as_bytes())
                .and_then(|_| handle.flush())
                .map_err(|e| MigrateError::output("<stdout>", e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_scenario() {
        let input = "PRAGMA foo;\nBEGIN TRANSACTION;\nCREATE TABLE T (a int);\nINSERT INTO T VALUES('0');\nCOMMIT;";
        let (output, stats) = convert_text(input);
        assert_eq!(output, "INSERT INTO [T] VALUES(0);\nGO");
        assert_eq!(stats.input_bytes, input.len() as u64);
        assert_eq!(stats.output_bytes, output.len() as u64);
    }

    #[test]
    fn test_stats_record_every_rule() {
        let mut converter = Converter::new();
        converter.convert("INSERT INTO T VALUES('1','');");
        let stats = converter.into_stats();

        assert_eq!(stats.rules.len(), RULES.len());
        assert_eq!(stats.matches(RuleId::InsertInto), 1);
        assert_eq!(stats.matches(RuleId::BooleanTrue), 1);
        assert_eq!(stats.matches(RuleId::EmptyString), 1);
        assert_eq!(stats.matches(RuleId::Pragma), 0);
        assert_eq!(stats.batches.separators, 1);
    }

    #[test]
    fn test_warns_on_nulled_empty_strings() {
        let mut converter = Converter::new();
        let out = converter.convert("INSERT INTO T VALUES('');");
        assert_eq!(out, "INSERT INTO [T] VALUES(NULL);\nGO");
        assert_eq!(
            converter.warnings(),
            &[ConvertWarning::EmptyStringNulled { count: 1 }]
        );
    }

    #[test]
    fn test_warns_on_empty_output() {
        let mut converter = Converter::new();
        let out = converter.convert("-- only schema\nCREATE TABLE T (a int);\n");
        assert_eq!(out, "");
        assert!(converter.warnings().contains(&ConvertWarning::EmptyOutput));
    }

    #[test]
    fn test_strict_finish_fails_on_warnings() {
        let mut converter = Converter::new().with_strict(true);
        let out = converter.convert("INSERT INTO T VALUES('');");
        assert_eq!(out, "INSERT INTO [T] VALUES(NULL);\nGO");

        match converter.finish() {
            Err(MigrateError::Strict { count }) => assert_eq!(count, 1),
            other => panic!("expected strict failure, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_finish_keeps_warnings() {
        let mut converter = Converter::new();
        converter.convert("INSERT INTO T VALUES('');");
        let stats = converter.finish().unwrap();
        assert_eq!(stats.warnings, vec![ConvertWarning::EmptyStringNulled { count: 1 }]);
    }

    #[test]
    fn test_strict_finish_passes_clean_dump() {
        let mut converter = Converter::new().with_strict(true);
        converter.convert("INSERT INTO T VALUES(1,'a');");
        assert!(converter.finish().is_ok());
    }

    #[test]
    fn test_lone_carriage_returns_split_statements() {
        let (out, stats) = convert_text("INSERT INTO A VALUES(1);\rINSERT INTO B VALUES(2);");
        assert_eq!(out, "INSERT INTO [A] VALUES(1);\nGO\nINSERT INTO [B] VALUES(2);\nGO");
        assert_eq!(stats.batches.separators, 2);
    }

    #[test]
    fn test_crlf_dump_converts_like_lf() {
        let lf = "PRAGMA foo;\nCREATE TABLE T (\n a int\n);\nINSERT INTO T VALUES('1');\n";
        let crlf = lf.replace('\n', "\r\n");
        assert_eq!(convert_text(&crlf).0, convert_text(lf).0);
    }
}
