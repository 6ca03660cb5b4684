use std::cmp::Ordering;

use super::types::{FilterOrderInfo, Filterable, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// In-memory equivalent of the ORDER BY clause. Missing values sort first.
    pub fn compare<T: Filterable>(infos: &[FilterOrderInfo], a: &T, b: &T) -> Ordering {
        for info in infos {
            let ordering = match (a.field(&info.column), b.field(&info.column)) {
                (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match info.sort {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_order_clause() {
        let infos = vec![
            FilterOrderInfo { column: "date_created".into(), sort: SortDirection::Desc },
            FilterOrderInfo { column: "id".into(), sort: SortDirection::Desc },
        ];
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"date_created\" DESC, \"id\" DESC");
        assert_eq!(FilterOrder::generate(&[]), "");
    }
}
