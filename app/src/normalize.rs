//! Shape normalization, applied once while records are decoded, so that the
//! rest of the crate can assume well-formed lists and records.
//!
//! Any JSON object decodes as a record: a field of the wrong type falls back
//! to its default instead of failing the record. A stored record is therefore
//! never lost when its collection is written back.

use log::*;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Arrays keep their string members; any other value (null, a scalar, an
/// object) reads as an empty list.
pub(crate) fn string_list<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(de)?;
    let list = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(list)
}

/// Decodes each member of an array on its own. Members that are not records
/// at all (strings, numbers, null) are dropped. A non-array reads as an empty
/// list.
pub(crate) fn record_list<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(de)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("Expected a list of {}, found {}", short_name::<T>(), other);
            return Ok(Vec::new());
        }
    };
    let records = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Dropping list member that is not a {}: {}", short_name::<T>(), e);
                None
            }
        })
        .collect();
    Ok(records)
}

/// An optional record where a value of the wrong shape counts as absent.
pub(crate) fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!("Ignoring malformed {}: {}", short_name::<T>(), e);
            Ok(None)
        }
    }
}

/// A field of the wrong type reads as `T::default()`.
pub(crate) fn or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    or_else(de, T::default)
}

pub(crate) fn or_else<'de, D, T, F>(de: D, fallback: F) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let value = Value::deserialize(de)?;
    if value.is_null() {
        return Ok(fallback());
    }
    match serde_json::from_value(value) {
        Ok(v) => Ok(v),
        Err(e) => {
            warn!("Ignoring malformed {} field: {}", short_name::<T>(), e);
            Ok(fallback())
        }
    }
}

/// Strings as-is; numbers and booleans in their JSON spelling; anything
/// else reads as empty.
pub(crate) fn text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let text = match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => {
            warn!("Expected text, found {}", other);
            String::new()
        }
    };
    Ok(text)
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A number, or a string holding one. Anything else is absent.
pub(crate) fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(de)?;
    let number = to_number(&value).filter(|n| n.is_finite());
    if number.is_none() && !value.is_null() {
        warn!("Expected a number, found {}", value);
    }
    Ok(number)
}

/// A non-negative whole quantity. Negative values clamp to zero and
/// fractions are truncated; anything that is not a number reads as zero.
pub(crate) fn quantity<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let n = number(de)?.unwrap_or(0.0);
    Ok(n.max(0.0).min(f64::from(u32::MAX)) as u32)
}

fn short_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Jar {
        #[serde(default, deserialize_with = "string_list")]
        labels: Vec<String>,
        #[serde(default, deserialize_with = "lenient")]
        lid: Option<Lid>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Lid {
        colour: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shelf {
        #[serde(default, deserialize_with = "record_list")]
        jars: Vec<Jar>,
    }

    #[test]
    fn missing_or_odd_lists_read_as_empty() {
        for value in vec![json!({}), json!({"labels": null}), json!({"labels": "rice"})] {
            let jar: Jar = serde_json::from_value(value).expect("decode");
            assert!(jar.labels.is_empty());
        }
    }

    #[test]
    fn non_string_list_members_are_skipped() {
        let jar: Jar = serde_json::from_value(json!({"labels": ["rice", 3, null, "beans"]}))
            .expect("decode");
        assert_eq!(jar.labels, vec!["rice".to_string(), "beans".to_string()]);
    }

    #[test]
    fn malformed_optional_records_read_as_absent() {
        let jar: Jar = serde_json::from_value(json!({"lid": "blue"})).expect("decode");
        assert_eq!(jar.lid, None);

        let jar: Jar = serde_json::from_value(json!({"lid": {"colour": "blue"}})).expect("decode");
        assert_eq!(
            jar.lid,
            Some(Lid {
                colour: "blue".to_string()
            })
        );
    }

    #[derive(Debug, Deserialize, PartialEq, Default)]
    struct Label {
        #[serde(default, deserialize_with = "text")]
        name: String,
        #[serde(default, deserialize_with = "quantity")]
        count: u32,
        #[serde(default, deserialize_with = "number")]
        weight: Option<f64>,
        #[serde(default, deserialize_with = "or_default")]
        sealed: bool,
    }

    #[test]
    fn non_records_are_dropped_from_lists() {
        let shelf: Shelf =
            serde_json::from_value(json!({"jars": [{"labels": ["a"]}, "not a jar", {}]}))
                .expect("decode");
        assert_eq!(shelf.jars.len(), 2);

        let shelf: Shelf = serde_json::from_value(json!({"jars": 7})).expect("decode");
        assert!(shelf.jars.is_empty());
    }

    #[test]
    fn records_with_mistyped_fields_still_decode() {
        let shelf: Shelf = serde_json::from_value(json!({
            "jars": [{"labels": ["a"], "lid": 3}, {"labels": 5, "lid": null}]
        }))
        .expect("decode");
        assert_eq!(shelf.jars.len(), 2);

        let label: Label = serde_json::from_value(json!({
            "name": null, "count": "lots", "weight": [], "sealed": "yes"
        }))
        .expect("decode");
        assert_eq!(label, Label::default());
    }

    #[test]
    fn scalars_are_coerced_where_they_can_be() {
        let label: Label = serde_json::from_value(json!({
            "name": 42, "count": -3, "weight": " 1.5 ", "sealed": true
        }))
        .expect("decode");
        assert_eq!(label.name, "42");
        assert_eq!(label.count, 0);
        assert_eq!(label.weight, Some(1.5));
        assert!(label.sealed);

        let label: Label = serde_json::from_value(json!({"count": 2.9, "weight": "1"})).expect("decode");
        assert_eq!(label.count, 2);
        assert_eq!(label.weight, Some(1.0));
    }
}
