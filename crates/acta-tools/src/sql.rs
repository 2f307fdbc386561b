//! Read-only SQL extraction against a SQLite database.
//!
//! The model writes the query, so the query is untrusted. Three guards run
//! before SQLite ever sees the text:
//!
//! 1. Only a single `SELECT` statement is accepted.
//! 2. SQL comments are rejected outright (a classic smuggling channel).
//! 3. Every table named after `FROM` or `JOIN` must be on the allow-list
//!    fixed at construction time.
//!
//! A query that fails any guard is rejected before execution; the registry
//! reports it to the model as a failure observation and the run continues.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{types::ValueRef, Connection, OpenFlags};
use serde_json::{json, Value};
use tracing::{debug, warn};

use acta_contracts::{
    error::{ActaError, ActaResult, ToolError},
    observation::Record,
};
use acta_core::traits::Tool;

/// Observations are rendered back into the prompt, so result sets are capped
/// rather than unbounded.
const MAX_ROWS: usize = 256;

/// Words that may legally follow a table reference. Anything else in that
/// position is treated as a table alias.
const AFTER_TABLE_KEYWORDS: &[&str] = &[
    "where", "on", "inner", "left", "right", "full", "outer", "cross", "natural", "join", "group",
    "order", "limit", "having", "union", "intersect", "except", "using", "when", "then",
];

// ── Query validation ─────────────────────────────────────────────────────────

enum SqlToken {
    Word(String),
    Punct(char),
}

fn invalid(reason: impl Into<String>) -> ToolError {
    ToolError::InvalidInput {
        reason: reason.into(),
    }
}

/// Lex the statement into lowercased words and punctuation. Single-quoted
/// string literals are skipped entirely (their content is data, not SQL);
/// double-quote, backtick, and bracket quoting produce an identifier word.
fn tokenize(sql: &str) -> Result<Vec<SqlToken>, ToolError> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => {
                chars.next();
                loop {
                    match chars.next() {
                        // '' escapes a quote inside the literal
                        Some('\'') => {
                            if chars.peek() == Some(&'\'') {
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        Some(_) => {}
                        None => return Err(invalid("unterminated string literal")),
                    }
                }
            }
            '"' | '`' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some(ch) => word.push(ch),
                        None => return Err(invalid("unterminated quoted identifier")),
                    }
                }
                tokens.push(SqlToken::Word(word.to_lowercase()));
            }
            '[' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(ch) => word.push(ch),
                        None => return Err(invalid("unterminated quoted identifier")),
                    }
                }
                tokens.push(SqlToken::Word(word.to_lowercase()));
            }
            '-' => {
                chars.next();
                if chars.peek() == Some(&'-') {
                    return Err(invalid("SQL comments are not allowed"));
                }
                tokens.push(SqlToken::Punct('-'));
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    return Err(invalid("SQL comments are not allowed"));
                }
                tokens.push(SqlToken::Punct('/'));
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '.' {
                        word.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(SqlToken::Word(word.to_lowercase()));
            }
            other => {
                chars.next();
                tokens.push(SqlToken::Punct(other));
            }
        }
    }
    Ok(tokens)
}

/// Walk the token stream and check every table reference against the
/// allow-list. Tracks just enough state to handle aliases, comma-separated
/// table lists, and parenthesized subqueries (whose own `FROM` clauses come
/// through the same stream).
fn check_tables(tokens: &[SqlToken], allowed: &BTreeSet<String>) -> Result<(), ToolError> {
    enum Scan {
        Free,
        ExpectTable,
        AfterTable,
    }

    let mut state = Scan::Free;
    for token in tokens {
        state = match (state, token) {
            (Scan::Free, SqlToken::Word(w)) if w == "from" || w == "join" => Scan::ExpectTable,
            (Scan::Free, _) => Scan::Free,

            // A parenthesis here opens a subquery, not a table name.
            (Scan::ExpectTable, SqlToken::Punct('(')) => Scan::Free,
            (Scan::ExpectTable, SqlToken::Word(w)) => {
                let table = w.rsplit('.').next().unwrap_or(w.as_str());
                if !allowed.contains(table) {
                    return Err(invalid(format!(
                        "table '{}' is not on the allow-list",
                        table
                    )));
                }
                Scan::AfterTable
            }
            (Scan::ExpectTable, _) => Scan::Free,

            (Scan::AfterTable, SqlToken::Punct(',')) => Scan::ExpectTable,
            (Scan::AfterTable, SqlToken::Word(w)) if w == "join" => Scan::ExpectTable,
            (Scan::AfterTable, SqlToken::Word(w)) if w == "as" => Scan::AfterTable,
            (Scan::AfterTable, SqlToken::Word(w)) => {
                if AFTER_TABLE_KEYWORDS.contains(&w.as_str()) {
                    Scan::Free
                } else {
                    // Bare alias; another comma-separated table may follow.
                    Scan::AfterTable
                }
            }
            (Scan::AfterTable, _) => Scan::Free,
        };
    }
    Ok(())
}

/// Validate the untrusted statement and return the text to execute.
fn validate_query<'a>(query: &'a str, allowed: &BTreeSet<String>) -> Result<&'a str, ToolError> {
    let sql = query.trim().trim_end_matches(';').trim_end();
    if sql.is_empty() {
        return Err(invalid("query is empty"));
    }

    let tokens = tokenize(sql)?;

    match tokens.first() {
        Some(SqlToken::Word(w)) if w == "select" => {}
        _ => return Err(invalid("only SELECT statements are allowed")),
    }
    if tokens
        .iter()
        .any(|t| matches!(t, SqlToken::Punct(';')))
    {
        return Err(invalid("multiple statements are not allowed"));
    }

    check_tables(&tokens, allowed)?;
    Ok(sql)
}

// ── The tool ─────────────────────────────────────────────────────────────────

/// Runs allow-listed `SELECT` queries against a SQLite database and returns
/// the rows as JSON records.
///
/// The connection is opened read-only where possible, but the allow-list is
/// the real boundary: the validator rejects anything but a single `SELECT`
/// over permitted tables before the statement is prepared.
pub struct SqlExtractor {
    conn: Mutex<Connection>,
    allowed_tables: BTreeSet<String>,
    description: String,
}

impl SqlExtractor {
    /// Open `path` read-only and expose the listed tables.
    pub fn open_read_only(path: &Path, tables: &[&str]) -> ActaResult<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |e| ActaError::Config {
                reason: format!("cannot open database '{}': {}", path.display(), e),
            },
        )?;
        Ok(Self::from_connection(conn, tables))
    }

    /// Wrap an existing connection (e.g. an in-memory database seeded by the
    /// caller). The caller is responsible for the connection's write mode.
    pub fn from_connection(conn: Connection, tables: &[&str]) -> Self {
        let allowed_tables: BTreeSet<String> =
            tables.iter().map(|t| t.to_lowercase()).collect();
        let table_list = allowed_tables
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let description = format!(
            "Runs a read-only SQL SELECT query. Input: {{\"query\": \"...\"}}. \
             Available tables: {}.",
            table_list
        );
        Self {
            conn: Mutex::new(conn),
            allowed_tables,
            description,
        }
    }

    fn value_from_column(column: ValueRef<'_>) -> Value {
        match column {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::from(v),
            ValueRef::Real(v) => Value::from(v),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::String(hex::encode(b)),
        }
    }
}

impl Tool for SqlExtractor {
    fn name(&self) -> &str {
        "sql_extractor"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" }
            },
            "required": ["query"],
            "additionalProperties": false
        }))
    }

    fn invoke(&self, input: &Value) -> Result<Vec<Record>, ToolError> {
        let query = input
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("input must be an object with a string 'query' field"))?;

        let sql = validate_query(query, &self.allowed_tables)?;
        debug!(query = sql, "executing extraction query");

        let conn = self.conn.lock().map_err(|e| ToolError::Execution {
            reason: format!("connection lock poisoned: {}", e),
        })?;
        let mut stmt = conn.prepare(sql).map_err(|e| ToolError::Execution {
            reason: format!("prepare failed: {}", e),
        })?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = stmt.query([]).map_err(|e| ToolError::Execution {
            reason: format!("query failed: {}", e),
        })?;

        let mut records = Vec::new();
        loop {
            let row = match rows.next() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => {
                    return Err(ToolError::Execution {
                        reason: format!("row fetch failed: {}", e),
                    })
                }
            };
            if records.len() >= MAX_ROWS {
                warn!(max_rows = MAX_ROWS, "result set truncated");
                break;
            }

            let mut record = Record::new();
            for (index, name) in column_names.iter().enumerate() {
                let column = row.get_ref(index).map_err(|e| ToolError::Execution {
                    reason: format!("column '{}' read failed: {}", name, e),
                })?;
                record.insert(name.clone(), Self::value_from_column(column));
            }
            records.push(record);
        }

        Ok(records)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::{json, Value};

    use acta_contracts::error::ToolError;
    use acta_core::traits::Tool;

    use super::SqlExtractor;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn seeded_extractor() -> SqlExtractor {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE transactions (
                 id INTEGER PRIMARY KEY,
                 vendor TEXT NOT NULL,
                 amount REAL NOT NULL,
                 note TEXT
             );
             CREATE TABLE vendors (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL
             );
             INSERT INTO transactions (id, vendor, amount, note) VALUES
                 (1, 'Initech Supplies', 120.50, NULL),
                 (2, 'Vandelay Industries', 8200.00, 'annual license'),
                 (3, 'Initech Supplies', 45.00, 'cables');
             INSERT INTO vendors (id, name) VALUES (1, 'Initech Supplies');",
        )
        .unwrap();
        SqlExtractor::from_connection(conn, &["transactions"])
    }

    fn run(extractor: &SqlExtractor, query: &str) -> Result<Vec<acta_contracts::observation::Record>, ToolError> {
        extractor.invoke(&json!({ "query": query }))
    }

    fn expect_invalid(result: Result<Vec<acta_contracts::observation::Record>, ToolError>) -> String {
        match result {
            Err(ToolError::InvalidInput { reason }) => reason,
            other => panic!("expected invalid-input rejection, got {:?}", other),
        }
    }

    // ── Test cases ────────────────────────────────────────────────────────────

    #[test]
    fn test_select_returns_typed_records() {
        let extractor = seeded_extractor();
        let records = run(&extractor, "SELECT * FROM transactions ORDER BY id").unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["id"], json!(1));
        assert_eq!(records[0]["vendor"], json!("Initech Supplies"));
        assert_eq!(records[0]["amount"], json!(120.5));
        assert_eq!(records[0]["note"], Value::Null);
        assert_eq!(records[1]["amount"], json!(8200.0));
    }

    #[test]
    fn test_empty_result_is_success() {
        let extractor = seeded_extractor();
        let records = run(&extractor, "SELECT * FROM transactions WHERE amount > 99999").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_trailing_semicolon_is_tolerated() {
        let extractor = seeded_extractor();
        let records = run(&extractor, "SELECT id FROM transactions;").unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_table_outside_allow_list_rejected_before_execution() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(&extractor, "SELECT * FROM vendors"));
        assert!(reason.contains("vendors"));
        assert!(reason.contains("allow-list"));
    }

    #[test]
    fn test_joined_table_is_checked() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(
            &extractor,
            "SELECT t.id FROM transactions t JOIN vendors v ON v.name = t.vendor",
        ));
        assert!(reason.contains("vendors"));
    }

    #[test]
    fn test_comma_separated_table_list_is_checked() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(
            &extractor,
            "SELECT * FROM transactions t, vendors v",
        ));
        assert!(reason.contains("vendors"));
    }

    #[test]
    fn test_subquery_tables_are_checked() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(
            &extractor,
            "SELECT * FROM (SELECT name FROM vendors)",
        ));
        assert!(reason.contains("vendors"));
    }

    #[test]
    fn test_quoted_identifier_cannot_evade_allow_list() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(&extractor, "SELECT * FROM \"vendors\""));
        assert!(reason.contains("vendors"));
    }

    #[test]
    fn test_non_select_rejected() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(&extractor, "DELETE FROM transactions"));
        assert!(reason.contains("SELECT"));
    }

    #[test]
    fn test_multiple_statements_rejected() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(
            &extractor,
            "SELECT 1; DROP TABLE transactions",
        ));
        assert!(reason.contains("multiple statements"));
    }

    #[test]
    fn test_comments_rejected() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(run(&extractor, "SELECT * FROM transactions -- sneak"));
        assert!(reason.contains("comments"));

        let reason = expect_invalid(run(&extractor, "SELECT /* hide */ * FROM transactions"));
        assert!(reason.contains("comments"));
    }

    #[test]
    fn test_dashes_inside_string_literals_are_data() {
        let extractor = seeded_extractor();
        let records = run(
            &extractor,
            "SELECT * FROM transactions WHERE vendor = 'ACME--Corp'",
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_alias_with_where_clause_parses() {
        let extractor = seeded_extractor();
        let records = run(
            &extractor,
            "SELECT t.vendor FROM transactions t WHERE t.amount > 1000",
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["vendor"], json!("Vandelay Industries"));
    }

    #[test]
    fn test_missing_query_field_rejected() {
        let extractor = seeded_extractor();
        let reason = expect_invalid(extractor.invoke(&json!({ "sql": "SELECT 1" })));
        assert!(reason.contains("query"));
    }
}
