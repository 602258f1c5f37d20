//! SQL execution seam.
//!
//! The core issues parameterized statements (with `?` placeholders) through
//! a session object and consumes the result as a forward-only cursor of
//! rows indexable by column name. Drivers are supplied by the embedding
//! application; the crate itself only ships [`NullConnector`] for handles
//! that have no SQL capability, and scripted sessions in the testkit.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use crate::server::User;

use super::errors::{SqlError, SqlResult};

/// Address of a server's SQL endpoint. `socket` is used when `host` is
/// localhost, `host:port` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlEndpoint {
    /// Hostname of the server.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Local socket path, used for localhost connections.
    pub socket: PathBuf,
}

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// A string value.
    Text(String),
    /// An unsigned integer value.
    UInt(u64),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Text(value) => write!(f, "{value}"),
            SqlParam::UInt(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<u64> for SqlParam {
    fn from(value: u64) -> Self {
        SqlParam::UInt(value)
    }
}

impl From<u16> for SqlParam {
    fn from(value: u16) -> Self {
        SqlParam::UInt(u64::from(value))
    }
}

/// One result row. Values are text-protocol strings; `None` is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlRow {
    entries: Vec<(String, Option<String>)>,
}

impl SqlRow {
    /// Create a row from `(column, value)` entries.
    pub fn new(entries: Vec<(String, Option<String>)>) -> Self {
        Self { entries }
    }

    /// Look up a column, distinguishing NULL from an unknown column.
    pub fn value(&self, column: &str) -> SqlResult<Option<&str>> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_deref())
            .ok_or_else(|| SqlError::UnknownColumn {
                column: column.to_string(),
            })
    }

    /// Look up a column that must hold a value.
    pub fn text(&self, column: &str) -> SqlResult<&str> {
        self.value(column)?.ok_or_else(|| SqlError::NullValue {
            column: column.to_string(),
        })
    }

    /// Look up a column by position.
    pub fn value_at(&self, index: usize) -> SqlResult<Option<&str>> {
        self.entries
            .get(index)
            .map(|(_, value)| value.as_deref())
            .ok_or_else(|| SqlError::UnknownColumn {
                column: format!("index {index}"),
            })
    }
}

/// A forward-only cursor over result rows.
#[derive(Debug, Clone, Default)]
pub struct SqlRows {
    rows: VecDeque<SqlRow>,
}

impl SqlRows {
    /// Create a cursor over the given rows.
    pub fn new(rows: Vec<SqlRow>) -> Self {
        Self { rows: rows.into() }
    }

    /// An empty cursor.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A cursor over a single row.
    pub fn one(row: SqlRow) -> Self {
        Self::new(vec![row])
    }

    /// Fetch the next row, if any.
    pub fn next_row(&mut self) -> Option<SqlRow> {
        self.rows.pop_front()
    }

    /// True if no rows remain.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consume the cursor as exactly-one-row; an empty cursor is the
    /// "empty result" condition.
    pub fn single(mut self) -> SqlResult<SqlRow> {
        self.next_row().ok_or(SqlError::EmptyResult)
    }
}

impl Iterator for SqlRows {
    type Item = SqlRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row()
    }
}

/// An established SQL session against one server.
pub trait SqlSession {
    /// Execute a statement with positional parameters bound to `?`
    /// placeholders, returning the result cursor. Blocks until the server
    /// answers; blocking calls such as `MASTER_POS_WAIT` suspend the caller.
    fn execute(&mut self, statement: &str, params: &[SqlParam]) -> SqlResult<SqlRows>;
}

/// Factory for SQL sessions; a handle connects lazily through this.
pub trait SqlConnector {
    /// Establish a session for `user` at `endpoint`.
    fn connect(&self, endpoint: &SqlEndpoint, user: &User) -> SqlResult<Box<dyn SqlSession>>;
}

/// Connector for handles without SQL capability. Every connection attempt
/// reports [`SqlError::NotConnected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConnector;

impl NullConnector {
    /// Create a new null connector.
    pub fn new() -> Self {
        Self
    }
}

impl SqlConnector for NullConnector {
    fn connect(&self, _endpoint: &SqlEndpoint, _user: &User) -> SqlResult<Box<dyn SqlSession>> {
        Err(SqlError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(&str, Option<&str>)]) -> SqlRow {
        SqlRow::new(
            entries
                .iter()
                .map(|(name, value)| (name.to_string(), value.map(str::to_owned)))
                .collect(),
        )
    }

    #[test]
    fn test_row_lookup_distinguishes_null_from_unknown() {
        let row = row(&[("File", Some("bin.000001")), ("Position", None)]);
        assert_eq!(row.value("File").unwrap(), Some("bin.000001"));
        assert_eq!(row.value("Position").unwrap(), None);
        assert!(matches!(
            row.value("Missing"),
            Err(SqlError::UnknownColumn { .. })
        ));
        assert!(matches!(
            row.text("Position"),
            Err(SqlError::NullValue { .. })
        ));
    }

    #[test]
    fn test_single_on_empty_cursor_is_empty_result() {
        assert!(matches!(
            SqlRows::empty().single(),
            Err(SqlError::EmptyResult)
        ));
    }

    #[test]
    fn test_cursor_yields_rows_in_order() {
        let mut rows = SqlRows::new(vec![
            row(&[("Database", Some("app"))]),
            row(&[("Database", Some("blog"))]),
        ]);
        assert_eq!(
            rows.next_row().unwrap().text("Database").unwrap(),
            "app"
        );
        assert_eq!(
            rows.next_row().unwrap().text("Database").unwrap(),
            "blog"
        );
        assert!(rows.next_row().is_none());
    }
}
