use crate::endpoints::ResponseFormat;
use crate::error::{DirectoryError, Result};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

/// Builds `{root}/client_interface/{format}/?switcher={operation}&...`.
///
/// `params` must serialize to an object. Null values are skipped, arrays become repeated
/// `key[]` pairs.
pub fn build_url<P: Serialize + ?Sized>(
    root_server_url: &str,
    format: ResponseFormat,
    operation: &str,
    params: &P,
) -> Result<Url> {
    let base = root_server_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/client_interface/{format}/"))
        .map_err(|err| DirectoryError::InvalidUrl(format!("{root_server_url}: {err}")))?;

    let pairs = query_pairs(params)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("switcher", operation);
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

fn query_pairs<P: Serialize + ?Sized>(params: &P) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(params)?;
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(DirectoryError::InvalidParam {
                param: "params",
                message: format!("expected an object, got {other}"),
            })
        }
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                let array_key = format!("{key}[]");
                pairs.extend(
                    items
                        .iter()
                        .filter_map(scalar_text)
                        .map(|item| (array_key.clone(), item)),
                );
            }
            other => {
                if let Some(text) = scalar_text(&other) {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(
            n.as_i64()
                .map(|i| i.to_string())
                .or_else(|| n.as_u64().map(|u| u.to_string()))
                .or_else(|| n.as_f64().map(|f| f.to_string()))
                .unwrap_or_else(|| n.to_string()),
        ),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
