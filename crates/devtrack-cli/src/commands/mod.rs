pub mod activity;
pub mod config;
pub mod profile;
pub mod project;
pub mod stats;
pub mod timer;

/// Parse a snake_case CLI argument into any serde enum (categories,
/// session types, break kinds, conflict policies).
pub(crate) fn parse_enum<T: serde::de::DeserializeOwned>(
    raw: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unrecognized value: {raw}").into())
}
