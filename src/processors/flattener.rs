use crate::models::Row;
use crate::utils::constants::FLATTEN_SEPARATOR;
use serde_json::Value;

/// Flatten a nested JSON document into one row.
///
/// Object keys are joined with `.` and array elements are addressed by
/// index, so `{"temperature": {"max": 31.2}, "list": [{"id": 1}]}` becomes
/// `temperature.max = 31.2` and `list.0.id = 1`. Strings keep their raw text,
/// numbers and booleans their JSON text. `null` and empty containers become
/// an empty value under their own key.
pub fn flatten_json(value: &Value) -> Row {
    let mut row = Row::new();
    flatten_into(&mut row, None, value);
    row
}

fn flatten_into(row: &mut Row, prefix: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let key = join(prefix, key);
                flatten_into(row, Some(&key), child);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (idx, child) in items.iter().enumerate() {
                let key = join(prefix, &idx.to_string());
                flatten_into(row, Some(&key), child);
            }
        }
        scalar => {
            // An empty top-level document has nothing to name.
            if let Some(key) = prefix {
                row.insert(key, render_scalar(scalar));
            }
        }
    }
}

fn join(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}{FLATTEN_SEPARATOR}{key}"),
        None => key.to_string(),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Whether a response body carries no data at all.
pub fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flatten_day_summary() {
        let doc = json!({
            "lat": 22.5431,
            "lon": 114.0579,
            "tz": "+08:00",
            "date": "2024-07-01",
            "units": "metric",
            "cloud_cover": {"afternoon": 75.0},
            "humidity": {"afternoon": 71},
            "temperature": {"min": 27.1, "max": 31.2},
            "wind": {"max": {"speed": 5.1, "direction": 190}}
        });

        let row = flatten_json(&doc);

        assert_eq!(row.get("date"), Some("2024-07-01"));
        assert_eq!(row.get("tz"), Some("+08:00"));
        assert_eq!(row.get("temperature.max"), Some("31.2"));
        assert_eq!(row.get("humidity.afternoon"), Some("71"));
        assert_eq!(row.get("wind.max.speed"), Some("5.1"));
        assert!(!row.contains("temperature"));
    }

    #[test]
    fn test_flatten_arrays_by_index() {
        let doc = json!({"alerts": [{"event": "Heat"}, {"event": "Rain"}], "tags": []});
        let row = flatten_json(&doc);

        assert_eq!(row.get("alerts.0.event"), Some("Heat"));
        assert_eq!(row.get("alerts.1.event"), Some("Rain"));
        assert_eq!(row.get("tags"), Some(""));
    }

    #[test]
    fn test_flatten_null_and_bool() {
        let row = flatten_json(&json!({"snow": null, "estimated": true}));

        assert_eq!(row.get("snow"), Some(""));
        assert_eq!(row.get("estimated"), Some("true"));
    }

    #[test]
    fn test_empty_documents() {
        assert!(is_empty_document(&json!(null)));
        assert!(is_empty_document(&json!({})));
        assert!(is_empty_document(&json!([])));
        assert!(!is_empty_document(&json!({"date": "2024-07-01"})));
        assert!(flatten_json(&json!({})).is_empty());
    }
}
