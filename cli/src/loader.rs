//! Document loading: a local path or an `http(s)://` URL, YAML or JSON.

use std::fs;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse `"Name: Value"` strings into ordered `(name, value)` pairs.
///
/// Both halves are trimmed. Entries without a colon are dropped; a repeated
/// name keeps its first position and takes the last value.
pub fn parse_headers(entries: &[String]) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for entry in entries {
        let Some((name, value)) = entry.split_once(':') else {
            tracing::warn!(header = %entry, "ignoring header without ':'");
            continue;
        };
        let (name, value) = (name.trim().to_string(), value.trim().to_string());
        match headers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => headers.push((name, value)),
        }
    }
    headers
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read and parse the document at `location`.
pub fn load_document(location: &str, headers: &[(String, String)]) -> Result<Value> {
    let text = if is_url(location) {
        fetch(location, headers)?
    } else {
        fs::read_to_string(location)
            .with_context(|| format!("Failed to read input file: {location}"))?
    };
    parse_document(&text).with_context(|| format!("Failed to parse document from: {location}"))
}

fn fetch(url: &str, headers: &[(String, String)]) -> Result<String> {
    tracing::info!(url, headers = headers.len(), "Downloading document");

    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;
    let mut request = client.get(url);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request
        .send()
        .with_context(|| format!("Failed to fetch: {url}"))?
        .error_for_status()
        .with_context(|| format!("Server rejected request for: {url}"))?;
    response
        .text()
        .with_context(|| format!("Failed to read response body from: {url}"))
}

/// Parse JSON when the text opens with `{`, YAML otherwise.
pub fn parse_document(text: &str) -> Result<Value> {
    if text.trim_start().starts_with('{') {
        return serde_json::from_str(text).context("Invalid JSON");
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).context("Invalid YAML")?;
    yaml_to_json(yaml)
}

/// Convert a YAML tree, stringifying non-string mapping keys (`200:`).
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                match n.as_f64().and_then(serde_json::Number::from_f64) {
                    Some(f) => Value::Number(f),
                    None => bail!("{n} has no JSON representation"),
                }
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn mapping_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => mapping_key(tagged.value),
        other => bail!("unsupported mapping key: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&strings(&[
            "Authorization: Bearer abc:def",
            "  X-Trace :  1 ",
            "malformed",
        ]));
        assert_eq!(
            headers,
            vec![
                ("Authorization".to_string(), "Bearer abc:def".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_headers_repeated_name_last_wins() {
        let headers = parse_headers(&strings(&["A: 1", "B: 2", "A: 3"]));
        assert_eq!(
            headers,
            vec![
                ("A".to_string(), "3".to_string()),
                ("B".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/openapi.yaml"));
        assert!(is_url("http://localhost:8080/swagger.json"));
        assert!(!is_url("specs/openapi.yaml"));
        assert!(!is_url("file:///tmp/openapi.yaml"));
    }

    #[test]
    fn test_parse_json() {
        let doc = parse_document(r#"  {"openapi": "3.0.0", "paths": {}}"#).unwrap();
        assert_eq!(doc, json!({ "openapi": "3.0.0", "paths": {} }));
    }

    #[test]
    fn test_parse_yaml_stringifies_keys() {
        let doc = parse_document(
            "openapi: 3.0.0\npaths:\n  /pets:\n    get:\n      responses:\n        200:\n          description: ok\n        true: yes\n        ~: nothing\n",
        )
        .unwrap();
        let responses = &doc["paths"]["/pets"]["get"]["responses"];
        assert_eq!(responses["200"], json!({ "description": "ok" }));
        assert_eq!(responses["true"], json!("yes"));
        assert_eq!(responses["null"], json!("nothing"));
    }

    #[test]
    fn test_parse_yaml_preserves_key_order() {
        let doc = parse_document("b: 1\na: 2.5\nc: [x, y]\n").unwrap();
        let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert_eq!(doc["a"], json!(2.5));
    }

    #[test]
    fn test_parse_yaml_unquoted_version_is_number() {
        let doc = parse_document("swagger: 2.0\nopenapi: 3.1\n").unwrap();
        assert_eq!(doc["swagger"], json!(2.0));
        assert_eq!(doc["openapi"], json!(3.1));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_document("{ not json").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document("/definitely/not/here.yaml", &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }
}
