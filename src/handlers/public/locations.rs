// handlers/public/locations.rs - GET /api/locations/suggest

use axum::extract::Query;
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult};

const SAMPLE_LOCATIONS: [&str; 12] = [
    "New York, NY",
    "San Francisco, CA",
    "Chicago, IL",
    "Austin, TX",
    "Seattle, WA",
    "Boston, MA",
    "Los Angeles, CA",
    "Denver, CO",
    "Atlanta, GA",
    "Dallas, TX",
    "Miami, FL",
    "Washington, DC",
];

#[derive(Debug, Default, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/locations/suggest?q= - location hints for the job form
pub async fn suggest_get(Query(query): Query<SuggestQuery>) -> ApiResult<Vec<&'static str>> {
    Ok(ApiResponse::success(suggest(&query.q)))
}

pub fn suggest(input: &str) -> Vec<&'static str> {
    let needle = input.trim().to_lowercase();
    if needle.chars().count() < 2 {
        return vec![];
    }
    SAMPLE_LOCATIONS
        .iter()
        .copied()
        .filter(|l| l.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_two_characters() {
        assert!(suggest("s").is_empty());
        assert_eq!(suggest("sa"), vec!["San Francisco, CA"]);
        assert_eq!(suggest(", ca"), vec!["San Francisco, CA", "Los Angeles, CA"]);
    }
}
