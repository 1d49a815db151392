use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use shipthis_core::ClientConfig;
use std::collections::BTreeMap;

use crate::{Result, ShipthisError};

/// Merge request headers: library defaults, then client custom headers, then
/// per-call overrides. Later layers replace earlier ones by case-insensitive name.
pub(crate) fn merge_headers(
    config: &ClientConfig,
    overrides: &BTreeMap<String, String>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    insert(&mut headers, "organisation", &config.organisation)?;
    insert(&mut headers, "usertype", &config.user_type)?;
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        let mut value = header_value("x-api-key", key)?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static("x-api-key"), value);
    }
    if let Some(region) = config.region_id.as_deref().filter(|r| !r.is_empty()) {
        insert(&mut headers, "region", region)?;
    }
    if let Some(location) = config.location_id.as_deref().filter(|l| !l.is_empty()) {
        insert(&mut headers, "location", location)?;
    }

    for (name, value) in config.custom_headers.iter().chain(overrides.iter()) {
        insert(&mut headers, name, value)?;
    }

    Ok(headers)
}

fn insert(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
        ShipthisError::InvalidHeader {
            name: name.to_string(),
        }
    })?;
    headers.insert(header_name, header_value(name, value)?);
    Ok(())
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ShipthisError::InvalidHeader {
        name: name.to_string(),
    })
}
