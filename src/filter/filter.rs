use super::cursor::Cursor;
use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, FilterOrderInfo, Filterable, SortDirection, SqlResult};

/// A listing query over one table: conditions, ordering and a row limit.
///
/// The PostgreSQL adapter compiles it with [`Filter::to_sql`]; the memory
/// adapter runs it with [`Filter::apply`].
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    conditions: Vec<Condition>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_identifier(&table_name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", table_name)));
        }
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: vec![],
            limit: None,
        })
    }

    pub fn table(&self) -> &str {
        &self.table_name
    }

    pub fn where_condition(&mut self, condition: Condition) -> Result<&mut Self, FilterError> {
        for column in condition.columns() {
            Self::validate_column(column)?;
        }
        self.conditions.push(condition);
        Ok(self)
    }

    pub fn order(&mut self, column: &str, sort: SortDirection) -> Result<&mut Self, FilterError> {
        Self::validate_column(column)?;
        self.order_data.push(FilterOrderInfo { column: column.to_string(), sort });
        Ok(self)
    }

    /// Newest first on `column` with id as tiebreak, resuming after `cursor`
    pub fn keyset(&mut self, column: &str, cursor: Option<Cursor>) -> Result<&mut Self, FilterError> {
        if let Some(cursor) = cursor {
            self.where_condition(Condition::Before { column: column.to_string(), at: cursor.at, id: cursor.id })?;
        }
        self.order(column, SortDirection::Desc)?;
        self.order("id", SortDirection::Desc)
    }

    pub fn limit(&mut self, limit: i64) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause);
        SqlResult { query, params }
    }

    pub fn matches<T: Filterable>(&self, row: &T) -> bool {
        FilterWhere::matches(&self.conditions, row)
    }

    /// Filter, sort and limit rows in memory
    pub fn apply<'a, T, I>(&self, rows: I) -> Vec<T>
    where
        T: Filterable + Clone + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut out: Vec<T> = rows.into_iter().filter(|r| self.matches(*r)).cloned().collect();
        out.sort_by(|a, b| FilterOrder::compare(&self.order_data, a, b));
        if let Some(limit) = self.limit {
            out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        out
    }

    pub fn count<'a, T, I>(&self, rows: I) -> i64
    where
        T: Filterable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        rows.into_iter().filter(|r| self.matches(*r)).count() as i64
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        if !is_identifier(column) {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
