// Record existence checks used by the `unique` rule

use crate::error::StoreError;
use crate::value::text_of;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// "How many records in `table` have `column = value`", optionally ignoring
/// the record whose `except_id_column` equals `except_id_value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordQuery<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub value: &'a Value,
    pub except_id_column: Option<&'a str>,
    pub except_id_value: Option<&'a str>,
}

impl<'a> RecordQuery<'a> {
    pub fn new(table: &'a str, column: &'a str, value: &'a Value) -> Self {
        Self {
            table,
            column,
            value,
            except_id_column: None,
            except_id_value: None,
        }
    }

    /// Exclude the record identified by `column = value`
    pub fn except(mut self, column: &'a str, value: &'a str) -> Self {
        self.except_id_column = Some(column);
        self.except_id_value = Some(value);
        self
    }

    /// The exclusion clause, only when both halves are present
    pub fn exclusion(&self) -> Option<(&'a str, &'a str)> {
        match (self.except_id_column, self.except_id_value) {
            (Some(column), Some(value)) => Some((column, value)),
            _ => None,
        }
    }
}

/// Answers existence queries for the `unique` rule.
///
/// Implementations decide how the count is obtained (SQL, key-value lookup,
/// remote call). Failures must be reported as errors, never as a count.
pub trait RecordStore {
    fn exists_record(&self, query: &RecordQuery<'_>) -> Result<u64, StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn exists_record(&self, query: &RecordQuery<'_>) -> Result<u64, StoreError> {
        (**self).exists_record(query)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn exists_record(&self, query: &RecordQuery<'_>) -> Result<u64, StoreError> {
        (**self).exists_record(query)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn exists_record(&self, query: &RecordQuery<'_>) -> Result<u64, StoreError> {
        (**self).exists_record(query)
    }
}

/// Adapts a closure into a [`RecordStore`]
pub struct FnRecordStore<F>(pub F);

impl<F> RecordStore for FnRecordStore<F>
where
    F: Fn(&RecordQuery<'_>) -> Result<u64, StoreError>,
{
    fn exists_record(&self, query: &RecordQuery<'_>) -> Result<u64, StoreError> {
        (self.0)(query)
    }
}

type Connector<'a> = Box<dyn FnOnce() -> Result<Box<dyn RecordStore + 'a>, StoreError> + 'a>;

/// Opens its record store on first use.
///
/// A validation run only pays for a connection when a `unique` rule is
/// actually evaluated; later evaluations reuse it.
pub struct LazyRecordStore<'a> {
    connector: Option<Connector<'a>>,
    store: Option<Box<dyn RecordStore + 'a>>,
}

impl<'a> LazyRecordStore<'a> {
    /// Defer opening the store until it is first needed
    pub fn new<S, F>(connector: F) -> Self
    where
        S: RecordStore + 'a,
        F: FnOnce() -> Result<S, StoreError> + 'a,
    {
        Self {
            connector: Some(Box::new(move || {
                connector().map(|store| Box::new(store) as Box<dyn RecordStore + 'a>)
            })),
            store: None,
        }
    }

    /// Wrap an already open store
    pub fn ready(store: impl RecordStore + 'a) -> Self {
        Self {
            connector: None,
            store: Some(Box::new(store)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    /// Get the store, connecting if this is the first call
    pub fn get(&mut self) -> Result<&(dyn RecordStore + 'a), StoreError> {
        if self.store.is_none() {
            let connect = self.connector.take().ok_or_else(|| {
                StoreError::Connection("connector was already consumed".to_string())
            })?;
            debug!("Opening record store connection");
            self.store = Some(connect()?);
        }

        self.store
            .as_deref()
            .ok_or_else(|| StoreError::Connection("record store unavailable".to_string()))
    }
}

/// In-memory tables of JSON records.
///
/// Values are compared by their text form, so `"5"` matches `5`. Querying a
/// table that was never created is an error.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    tables: HashMap<String, Vec<Map<String, Value>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tables from `{"table": [{...}, ...], ...}`
    pub fn from_json(value: Value) -> Result<Self, StoreError> {
        let Value::Object(tables) = value else {
            return Err(StoreError::UnsupportedValue(
                "record fixtures must be an object of tables".to_string(),
            ));
        };

        let mut store = Self::new();
        for (table, records) in tables {
            let Value::Array(records) = records else {
                return Err(StoreError::UnsupportedValue(format!(
                    "table `{}` must be an array of records",
                    table
                )));
            };
            store.create_table(&table);
            for record in records {
                store.insert(&table, record)?;
            }
        }
        Ok(store)
    }

    /// Create an empty table if it does not exist
    pub fn create_table(&mut self, table: &str) {
        self.tables.entry(table.to_string()).or_default();
    }

    /// Insert a record (a JSON object), creating the table if needed
    pub fn insert(&mut self, table: &str, record: Value) -> Result<(), StoreError> {
        let Value::Object(record) = record else {
            return Err(StoreError::UnsupportedValue(format!(
                "records in `{}` must be objects",
                table
            )));
        };
        self.tables.entry(table.to_string()).or_default().push(record);
        Ok(())
    }

    /// Number of records in a table
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(Vec::is_empty)
    }
}

fn same_value(left: &Value, right: &Value) -> bool {
    match (text_of(left), text_of(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}

impl RecordStore for MemoryRecordStore {
    fn exists_record(&self, query: &RecordQuery<'_>) -> Result<u64, StoreError> {
        let records = self
            .tables
            .get(query.table)
            .ok_or_else(|| StoreError::UnknownTable(query.table.to_string()))?;

        let exclusion = query.exclusion();
        let count = records
            .iter()
            .filter(|record| {
                record
                    .get(query.column)
                    .is_some_and(|stored| same_value(stored, query.value))
            })
            .filter(|record| match exclusion {
                Some((column, id)) => record
                    .get(column)
                    .and_then(text_of)
                    .is_none_or(|stored| stored != id),
                None => true,
            })
            .count();

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn users() -> MemoryRecordStore {
        MemoryRecordStore::from_json(json!({
            "users": [
                { "record_id": 1, "email": "a@x.com", "age": 30 },
                { "record_id": 2, "email": "b@x.com", "age": "41" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_memory_store_counts_matches() {
        let store = users();
        let value = json!("a@x.com");
        assert_eq!(
            store
                .exists_record(&RecordQuery::new("users", "email", &value))
                .unwrap(),
            1
        );

        let missing = json!("c@x.com");
        assert_eq!(
            store
                .exists_record(&RecordQuery::new("users", "email", &missing))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_memory_store_compares_text_forms() {
        let store = users();
        let value = json!("30");
        assert_eq!(
            store
                .exists_record(&RecordQuery::new("users", "age", &value))
                .unwrap(),
            1
        );
        let value = json!(41);
        assert_eq!(
            store
                .exists_record(&RecordQuery::new("users", "age", &value))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_memory_store_exclusion() {
        let store = users();
        let value = json!("a@x.com");
        let query = RecordQuery::new("users", "email", &value).except("record_id", "1");
        assert_eq!(store.exists_record(&query).unwrap(), 0);

        let query = RecordQuery::new("users", "email", &value).except("record_id", "2");
        assert_eq!(store.exists_record(&query).unwrap(), 1);
    }

    #[test]
    fn test_memory_store_unknown_table() {
        let store = users();
        let value = json!("x");
        assert_eq!(
            store.exists_record(&RecordQuery::new("posts", "slug", &value)),
            Err(StoreError::UnknownTable("posts".to_string()))
        );
    }

    #[test]
    fn test_memory_store_rejects_bad_fixtures() {
        assert!(MemoryRecordStore::from_json(json!([1, 2])).is_err());
        assert!(MemoryRecordStore::from_json(json!({ "users": {} })).is_err());
        assert!(MemoryRecordStore::from_json(json!({ "users": [1] })).is_err());
    }

    #[test]
    fn test_fn_record_store() {
        let store = FnRecordStore(|query: &RecordQuery<'_>| -> Result<u64, StoreError> {
            Ok(if query.column == "email" { 3 } else { 0 })
        });
        let value = json!("x");
        assert_eq!(
            store
                .exists_record(&RecordQuery::new("users", "email", &value))
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_lazy_store_connects_once() {
        let connects = Cell::new(0);
        let mut lazy = LazyRecordStore::new(|| {
            connects.set(connects.get() + 1);
            Ok(users())
        });
        assert!(!lazy.is_connected());

        let value = json!("b@x.com");
        for _ in 0..3 {
            let store = lazy.get().unwrap();
            assert_eq!(
                store
                    .exists_record(&RecordQuery::new("users", "email", &value))
                    .unwrap(),
                1
            );
        }
        assert!(lazy.is_connected());
        assert_eq!(connects.get(), 1);
    }

    #[test]
    fn test_lazy_store_connection_failure() {
        let mut lazy = LazyRecordStore::new(|| {
            Err::<MemoryRecordStore, _>(StoreError::Connection("refused".to_string()))
        });
        assert_eq!(
            lazy.get().err(),
            Some(StoreError::Connection("refused".to_string()))
        );
        assert!(!lazy.is_connected());
    }
}
