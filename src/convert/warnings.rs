//! Warning system for the converter.
//!
//! The rules are lossy by construction. Warnings make the known lossy cases
//! visible without changing the output.

use serde::Serialize;

/// Statement preview length used in warnings
const PREVIEW_CHARS: usize = 60;

/// Findings raised while converting a dump
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvertWarning {
    /// `''` pairs were rewritten to NULL, including any inside string values
    EmptyStringNulled { count: usize },
    /// A create-table deletion ran over an INSERT before reaching its terminator
    CreateTableSwallowedInsert { statement_preview: String },
    /// `IF NOT EXISTS` guards were left behind with their CREATE TABLE removed
    DeadExistenceGuard { count: usize },
    /// Nothing but schema, comments or session commands was in the input
    EmptyOutput,
}

impl ConvertWarning {
    pub fn swallowed_insert(span: &str) -> Self {
        ConvertWarning::CreateTableSwallowedInsert {
            statement_preview: span.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

impl std::fmt::Display for ConvertWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertWarning::EmptyStringNulled { count } => {
                write!(
                    f,
                    "{} empty string literal(s) rewritten to NULL (escaped quotes inside values are affected too)",
                    count
                )
            }
            ConvertWarning::CreateTableSwallowedInsert { statement_preview } => {
                write!(
                    f,
                    "CREATE TABLE removal also deleted INSERT data ({})",
                    statement_preview
                )
            }
            ConvertWarning::DeadExistenceGuard { count } => {
                write!(
                    f,
                    "{} IF NOT EXISTS guard(s) left without a CREATE TABLE",
                    count
                )
            }
            ConvertWarning::EmptyOutput => write!(f, "Converted output is empty"),
        }
    }
}

/// Collects warnings during conversion
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<ConvertWarning>,
    max_warnings: usize,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: 100,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: limit,
        }
    }

    /// Add a warning, dropping duplicates and anything past the limit
    pub fn add(&mut self, warning: ConvertWarning) {
        if self.warnings.len() < self.max_warnings
            && !self.warnings.iter().any(|w| Self::is_similar(w, &warning))
        {
            self.warnings.push(warning);
        }
    }

    fn is_similar(a: &ConvertWarning, b: &ConvertWarning) -> bool {
        match (a, b) {
            (
                ConvertWarning::CreateTableSwallowedInsert {
                    statement_preview: p1,
                },
                ConvertWarning::CreateTableSwallowedInsert {
                    statement_preview: p2,
                },
            ) => p1 == p2,
            _ => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    pub fn warnings(&self) -> &[ConvertWarning] {
        &self.warnings
    }

    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    pub fn into_vec(self) -> Vec<ConvertWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicates_counted_warnings() {
        let mut collector = WarningCollector::new();
        collector.add(ConvertWarning::EmptyStringNulled { count: 3 });
        collector.add(ConvertWarning::EmptyStringNulled { count: 5 });
        collector.add(ConvertWarning::EmptyOutput);
        assert_eq!(collector.count(), 2);
    }

    #[test]
    fn test_keeps_distinct_swallowed_inserts() {
        let mut collector = WarningCollector::new();
        collector.add(ConvertWarning::swallowed_insert("CREATE TABLE a (x text DEFAULT 'a"));
        collector.add(ConvertWarning::swallowed_insert("CREATE TABLE b (y int"));
        collector.add(ConvertWarning::swallowed_insert("CREATE TABLE b (y int"));
        assert_eq!(collector.count(), 2);
    }

    #[test]
    fn test_respects_limit() {
        let mut collector = WarningCollector::with_limit(1);
        collector.add(ConvertWarning::EmptyOutput);
        collector.add(ConvertWarning::DeadExistenceGuard { count: 1 });
        assert_eq!(collector.warnings(), &[ConvertWarning::EmptyOutput]);
    }

    #[test]
    fn test_preview_is_truncated() {
        let long = format!("CREATE TABLE t ({})", "x int, ".repeat(40));
        match ConvertWarning::swallowed_insert(&long) {
            ConvertWarning::CreateTableSwallowedInsert { statement_preview } => {
                assert_eq!(statement_preview.chars().count(), PREVIEW_CHARS)
            }
            other => panic!("unexpected warning: {other:?}"),
        }
    }
}
