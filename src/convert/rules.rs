//! Ordered substitution rules that rewrite SQLite dump syntax for SQL Server.
//!
//! Every rule runs over the whole document, in table order. Rules are plain
//! text rewrites, so they also fire inside string literals.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Guard inserted in front of `CREATE TABLE` by [`RuleId::CreateTableIfNotExists`].
///
/// `{table}` is emitted as-is; it is never filled in.
pub const EXISTENCE_GUARD: &str = "IF NOT EXISTS (SELECT * FROM sys.objects WHERE object_id = OBJECT_ID(N'[dbo].[{table}]') AND type in (N'U'))\nCREATE TABLE";

/// Identifies a rule in stats and warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Pragma,
    BeginTransaction,
    Commit,
    CreateTableIfNotExists,
    CreateTable,
    CreateIndex,
    CreateUniqueIndex,
    InsertInto,
    BooleanFalse,
    BooleanTrue,
    EmptyString,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::Pragma => "pragma",
            RuleId::BeginTransaction => "begin_transaction",
            RuleId::Commit => "commit",
            RuleId::CreateTableIfNotExists => "create_table_if_not_exists",
            RuleId::CreateTable => "create_table",
            RuleId::CreateIndex => "create_index",
            RuleId::CreateUniqueIndex => "create_unique_index",
            RuleId::InsertInto => "insert_into",
            RuleId::BooleanFalse => "boolean_false",
            RuleId::BooleanTrue => "boolean_true",
            RuleId::EmptyString => "empty_string",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule finds the text it rewrites
#[derive(Debug)]
pub enum Matcher {
    Regex(Regex),
    Literal(&'static str),
}

/// A single match-and-replace step
#[derive(Debug)]
pub struct Rule {
    pub id: RuleId,
    pub matcher: Matcher,
    /// Replacement text; `$1` expands to the first capture for regex rules
    pub replacement: &'static str,
}

impl Rule {
    fn regex(id: RuleId, pattern: &str, replacement: &'static str) -> Self {
        Self {
            id,
            matcher: Matcher::Regex(Regex::new(pattern).unwrap()),
            replacement,
        }
    }

    fn literal(id: RuleId, needle: &'static str, replacement: &'static str) -> Self {
        Self {
            id,
            matcher: Matcher::Literal(needle),
            replacement,
        }
    }

    /// Text spans this rule would rewrite, in document order
    pub fn find<'t>(&self, text: &'t str) -> Vec<&'t str> {
        match &self.matcher {
            Matcher::Regex(re) => re.find_iter(text).map(|m| m.as_str()).collect(),
            Matcher::Literal(needle) => text.matches(needle).collect(),
        }
    }

    /// Apply the rule, returning the rewritten text and the number of matches
    pub fn apply(&self, text: &str) -> (String, usize) {
        match &self.matcher {
            Matcher::Regex(re) => {
                let count = re.find_iter(text).count();
                if count == 0 {
                    return (text.to_string(), 0);
                }
                (re.replace_all(text, self.replacement).into_owned(), count)
            }
            Matcher::Literal(needle) => {
                let count = text.matches(needle).count();
                if count == 0 {
                    return (text.to_string(), 0);
                }
                (text.replace(needle, self.replacement), count)
            }
        }
    }
}

/// The rule table, in application order.
///
/// `CreateTable` is lazy and dot-matches-newline, so it stops at the first
/// `;` after `CREATE TABLE` no matter where that `;` sits. The index rules
/// and `Pragma` stay within a single line.
pub static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::regex(RuleId::Pragma, r"PRAGMA.*?;", ""),
        Rule::literal(RuleId::BeginTransaction, "BEGIN TRANSACTION;", ""),
        Rule::literal(RuleId::Commit, "COMMIT;", ""),
        Rule::literal(
            RuleId::CreateTableIfNotExists,
            "CREATE TABLE IF NOT EXISTS",
            EXISTENCE_GUARD,
        ),
        Rule::regex(RuleId::CreateTable, r"(?s)CREATE TABLE.*?;", ""),
        Rule::regex(RuleId::CreateIndex, r"CREATE INDEX.*?;", ""),
        Rule::regex(RuleId::CreateUniqueIndex, r"CREATE UNIQUE INDEX.*?;", ""),
        Rule::regex(RuleId::InsertInto, r"INSERT INTO (\w+)", "INSERT INTO [$1]"),
        Rule::literal(RuleId::BooleanFalse, "'0'", "0"),
        Rule::literal(RuleId::BooleanTrue, "'1'", "1"),
        Rule::literal(RuleId::EmptyString, "''", "NULL"),
    ]
});

/// Look up a rule by id
pub fn rule(id: RuleId) -> &'static Rule {
    RULES
        .iter()
        .find(|r| r.id == id)
        .unwrap_or_else(|| unreachable!("every RuleId has an entry in RULES"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(id: RuleId, text: &str) -> String {
        rule(id).apply(text).0
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let ids: Vec<RuleId> = RULES.iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                RuleId::Pragma,
                RuleId::BeginTransaction,
                RuleId::Commit,
                RuleId::CreateTableIfNotExists,
                RuleId::CreateTable,
                RuleId::CreateIndex,
                RuleId::CreateUniqueIndex,
                RuleId::InsertInto,
                RuleId::BooleanFalse,
                RuleId::BooleanTrue,
                RuleId::EmptyString,
            ]
        );
    }

    #[test]
    fn test_pragma_stops_at_first_terminator() {
        assert_eq!(
            apply(RuleId::Pragma, "PRAGMA foreign_keys=OFF; INSERT INTO t VALUES(1);"),
            " INSERT INTO t VALUES(1);"
        );
    }

    #[test]
    fn test_pragma_does_not_cross_lines() {
        let text = "PRAGMA foo\nINSERT INTO t VALUES(1);";
        assert_eq!(apply(RuleId::Pragma, text), text);
    }

    #[test]
    fn test_create_table_spans_lines() {
        let text = "CREATE TABLE t (\n  a int,\n  b text\n);\nINSERT INTO t VALUES(1);";
        assert_eq!(apply(RuleId::CreateTable, text), "\nINSERT INTO t VALUES(1);");
    }

    #[test]
    fn test_create_index_is_single_line() {
        let text = "CREATE INDEX ix ON t(a)\n;";
        assert_eq!(apply(RuleId::CreateIndex, text), text);
        assert_eq!(apply(RuleId::CreateIndex, "CREATE INDEX ix ON t(a);"), "");
    }

    #[test]
    fn test_insert_into_brackets_identifier() {
        assert_eq!(
            apply(RuleId::InsertInto, "INSERT INTO Foo VALUES(1);"),
            "INSERT INTO [Foo] VALUES(1);"
        );
        // Quoted identifiers are not word characters and pass through
        assert_eq!(
            apply(RuleId::InsertInto, "INSERT INTO \"Foo\" VALUES(1);"),
            "INSERT INTO \"Foo\" VALUES(1);"
        );
    }

    #[test]
    fn test_existence_guard_keeps_placeholder() {
        let out = apply(RuleId::CreateTableIfNotExists, "CREATE TABLE IF NOT EXISTS t (a int);");
        assert!(out.starts_with("IF NOT EXISTS (SELECT * FROM sys.objects"));
        assert!(out.contains("OBJECT_ID(N'[dbo].[{table}]')"));
        assert!(out.contains("\nCREATE TABLE t (a int);"));
    }

    #[test]
    fn test_apply_counts_matches() {
        let (out, count) = rule(RuleId::BooleanTrue).apply("VALUES('1','1','10')");
        assert_eq!(out, "VALUES(1,1,'10')");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_find_returns_matched_spans() {
        let spans = rule(RuleId::CreateIndex).find("CREATE INDEX a ON t(x);\nCREATE INDEX b ON t(y);");
        assert_eq!(spans, vec!["CREATE INDEX a ON t(x);", "CREATE INDEX b ON t(y);"]);
    }
}
