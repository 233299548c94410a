use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

// `?page=abc` falls back to the first page instead of rejecting the request
pub fn parse_page(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

// the frontend takes category ids from object keys, so ids show up both as
// numbers and as strings
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LooseId(#[serde(deserialize_with = "deserialize_number_from_string")] pub i64);
