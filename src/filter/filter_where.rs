use std::cmp::Ordering;

use super::types::{Condition, FilterValue, Filterable};

/// Compiles conditions into a parameterised WHERE clause, or evaluates them
/// against an in-memory row.
pub struct FilterWhere {
    param_values: Vec<FilterValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> (String, Vec<FilterValue>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql_conditions: Vec<String> = conditions.iter().map(|c| filter_where.build_sql_condition(c)).collect();
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        (where_clause, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Eq(column, value) => format!("\"{}\" = {}", column, self.param(value.clone())),
            Condition::Gte(column, value) => format!("\"{}\" >= {}", column, self.param(value.clone())),
            Condition::Contains(column, needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                format!("\"{}\" ILIKE {}", column, self.param(FilterValue::Text(pattern)))
            }
            Condition::Or(inner) => {
                if inner.is_empty() { return "1=0".to_string(); }
                let parts: Vec<String> = inner.iter().map(|c| format!("({})", self.build_sql_condition(c))).collect();
                format!("({})", parts.join(" OR "))
            }
            Condition::Before { column, at, id } => {
                let at = self.param(FilterValue::Timestamp(*at));
                let id = self.param(FilterValue::Uuid(*id));
                format!("(\"{}\", \"id\") < ({}, {})", column, at, id)
            }
        }
    }

    fn param(&mut self, value: FilterValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// True when the row satisfies every condition
    pub fn matches<T: Filterable>(conditions: &[Condition], row: &T) -> bool {
        conditions.iter().all(|c| Self::matches_one(c, row))
    }

    fn matches_one<T: Filterable>(condition: &Condition, row: &T) -> bool {
        match condition {
            Condition::Eq(column, value) => row.field(column).is_some_and(|v| v.compare(value) == Some(Ordering::Equal)),
            Condition::Gte(column, value) => row
                .field(column)
                .is_some_and(|v| matches!(v.compare(value), Some(Ordering::Greater | Ordering::Equal))),
            Condition::Contains(column, needle) => match row.field(column) {
                Some(FilterValue::Text(text)) => text.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Condition::Or(inner) => inner.iter().any(|c| Self::matches_one(c, row)),
            Condition::Before { column, at, id } => {
                let (Some(FilterValue::Timestamp(row_at)), Some(FilterValue::Uuid(row_id))) = (row.field(column), row.field("id")) else {
                    return false;
                };
                (row_at, row_id) < (*at, *id)
            }
        }
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') { out.push('\\'); }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_numbered_params_through_or_groups() {
        let conditions = vec![
            Condition::eq("status", "Approved"),
            Condition::Or(vec![Condition::gte("min_pay", 20.0), Condition::gte("max_pay", 20.0)]),
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 0);
        assert_eq!(sql, "\"status\" = $1 AND ((\"min_pay\" >= $2) OR (\"max_pay\" >= $3))");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn contains_escapes_like_wildcards() {
        let (sql, params) = FilterWhere::generate(&[Condition::contains("job_title", "100%_sure")], 0);
        assert_eq!(sql, "\"job_title\" ILIKE $1");
        assert_eq!(params, vec![FilterValue::Text("%100\\%\\_sure%".to_string())]);
    }

    #[test]
    fn empty_conditions_match_everything() {
        let (sql, params) = FilterWhere::generate(&[], 0);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }
}
