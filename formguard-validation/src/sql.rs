// SQL-backed record store

use crate::error::StoreError;
use crate::store::{RecordQuery, RecordStore};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap());

/// Bind-parameter style of the target database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `$1`, `$2` (PostgreSQL)
    #[default]
    Numbered,
    /// `?` (MySQL, SQLite)
    QuestionMark,
}

impl Placeholder {
    fn render(&self, index: usize) -> String {
        match self {
            Placeholder::Numbered => format!("${}", index),
            Placeholder::QuestionMark => "?".to_string(),
        }
    }
}

/// A parameterised `SELECT COUNT(*)` statement
#[derive(Debug, Clone, PartialEq)]
pub struct CountQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CountQuery {
    /// Build the count statement for a record query.
    ///
    /// Table and column names are interpolated, so they must be plain
    /// identifiers (optionally `schema.name`); values are always bound.
    pub fn build(query: &RecordQuery<'_>, placeholder: Placeholder) -> Result<Self, StoreError> {
        let table = identifier(query.table)?;
        let column = identifier(query.column)?;

        let mut sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = {}",
            table,
            column,
            placeholder.render(1)
        );
        let mut params = vec![query.value.clone()];

        if let Some((id_column, id_value)) = query.exclusion() {
            let id_column = identifier(id_column)?;
            sql.push_str(&format!(" AND {} != {}", id_column, placeholder.render(2)));
            params.push(Value::String(id_value.to_string()));
        }

        Ok(Self { sql, params })
    }
}

fn identifier(name: &str) -> Result<&str, StoreError> {
    if IDENTIFIER_REGEX.is_match(name) {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Runs a count statement against a database connection
pub trait SqlExecutor {
    fn query_count(&self, sql: &str, params: &[Value]) -> Result<u64, StoreError>;
}

impl<T: SqlExecutor + ?Sized> SqlExecutor for &T {
    fn query_count(&self, sql: &str, params: &[Value]) -> Result<u64, StoreError> {
        (**self).query_count(sql, params)
    }
}

/// Record store that answers through SQL
pub struct SqlRecordStore<E> {
    executor: E,
    placeholder: Placeholder,
}

impl<E: SqlExecutor> SqlRecordStore<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            placeholder: Placeholder::default(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: SqlExecutor> RecordStore for SqlRecordStore<E> {
    fn exists_record(&self, query: &RecordQuery<'_>) -> Result<u64, StoreError> {
        let statement = CountQuery::build(query, self.placeholder)?;
        trace!(sql = %statement.sql, "Running uniqueness query");
        self.executor.query_count(&statement.sql, &statement.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingExecutor {
        count: u64,
        seen: RefCell<Vec<(String, Vec<Value>)>>,
    }

    impl SqlExecutor for RecordingExecutor {
        fn query_count(&self, sql: &str, params: &[Value]) -> Result<u64, StoreError> {
            self.seen
                .borrow_mut()
                .push((sql.to_string(), params.to_vec()));
            Ok(self.count)
        }
    }

    #[test]
    fn test_build_simple_query() {
        let value = json!("a@x.com");
        let query = CountQuery::build(
            &RecordQuery::new("users", "email", &value),
            Placeholder::Numbered,
        )
        .unwrap();

        assert_eq!(query.sql, "SELECT COUNT(*) FROM users WHERE email = $1");
        assert_eq!(query.params, vec![json!("a@x.com")]);
    }

    #[test]
    fn test_build_query_with_exclusion() {
        let value = json!("a@x.com");
        let query = CountQuery::build(
            &RecordQuery::new("app.users", "email", &value).except("record_id", "7"),
            Placeholder::QuestionMark,
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "SELECT COUNT(*) FROM app.users WHERE email = ? AND record_id != ?"
        );
        assert_eq!(query.params, vec![json!("a@x.com"), json!("7")]);
    }

    #[test]
    fn test_rejects_injected_identifiers() {
        let value = json!("x");
        for (table, column) in [
            ("users; DROP TABLE users", "email"),
            ("users", "email = email OR 1"),
            ("", "email"),
            ("1users", "email"),
        ] {
            assert!(matches!(
                CountQuery::build(
                    &RecordQuery::new(table, column, &value),
                    Placeholder::Numbered
                ),
                Err(StoreError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn test_sql_store_delegates_to_executor() {
        let executor = RecordingExecutor {
            count: 2,
            ..Default::default()
        };
        let store = SqlRecordStore::new(&executor);
        let value = json!("taken");

        let count = store
            .exists_record(&RecordQuery::new("users", "name", &value))
            .unwrap();

        assert_eq!(count, 2);
        let seen = executor.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "SELECT COUNT(*) FROM users WHERE name = $1");
    }
}
