use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Typed parameter value. Keeps PostgreSQL bind types exact and gives the
/// memory adapter something comparable.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Float(f64),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Bool(bool),
}

impl FilterValue {
    pub fn compare(&self, other: &FilterValue) -> Option<Ordering> {
        match (self, other) {
            (FilterValue::Text(a), FilterValue::Text(b)) => Some(a.cmp(b)),
            (FilterValue::Float(a), FilterValue::Float(b)) => a.partial_cmp(b),
            (FilterValue::Uuid(a), FilterValue::Uuid(b)) => Some(a.cmp(b)),
            (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => Some(a.cmp(b)),
            (FilterValue::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self { FilterValue::Text(v.to_string()) }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self { FilterValue::Text(v) }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self { FilterValue::Float(v) }
}

impl From<Uuid> for FilterValue {
    fn from(v: Uuid) -> Self { FilterValue::Uuid(v) }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self { FilterValue::Timestamp(v) }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self { FilterValue::Bool(v) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, FilterValue),
    Gte(String, FilterValue),
    /// Case-insensitive substring match
    Contains(String, String),
    Or(Vec<Condition>),
    /// Keyset: rows strictly after the cursor in `(column DESC, id DESC)` order
    Before {
        column: String,
        at: DateTime<Utc>,
        id: Uuid,
    },
}

impl Condition {
    pub fn eq(column: &str, value: impl Into<FilterValue>) -> Self {
        Condition::Eq(column.to_string(), value.into())
    }

    pub fn gte(column: &str, value: impl Into<FilterValue>) -> Self {
        Condition::Gte(column.to_string(), value.into())
    }

    pub fn contains(column: &str, needle: &str) -> Self {
        Condition::Contains(column.to_string(), needle.to_string())
    }

    /// Substring match across several columns, any of which may hit
    pub fn contains_any(columns: &[&str], needle: &str) -> Self {
        Condition::Or(columns.iter().map(|c| Condition::contains(c, needle)).collect())
    }

    pub(crate) fn columns(&self) -> Vec<&str> {
        match self {
            Condition::Eq(c, _) | Condition::Gte(c, _) | Condition::Contains(c, _) => vec![c.as_str()],
            Condition::Or(inner) => inner.iter().flat_map(|c| c.columns()).collect(),
            Condition::Before { column, .. } => vec![column.as_str(), "id"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterValue>,
}

/// Rows the memory adapter can evaluate a filter against
pub trait Filterable {
    fn field(&self, column: &str) -> Option<FilterValue>;
}
