//! Lenient field deserializers for the embedded variation blob.
//!
//! The storefront renders these values from PHP, so the same field can show
//! up as a bool, a `"yes"`/`"no"` string, a number or an empty string.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Boolean flag; `null` reads as `false`.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Int(n)) => Ok(n != 0),
        Some(Flag::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Ok(true),
            "no" | "false" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!(
                "expected a boolean flag, found {other:?}"
            ))),
        },
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Int(i64),
    Float(f64),
    Text(String),
}

fn bound(n: i64) -> Option<u32> {
    if n < 0 { None } else { u32::try_from(n).ok() }
}

/// Quantity bound; `null`, `""` and negative numbers mean "no bound".
pub(crate) fn quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Int(n)) => Ok(bound(n)),
        Some(Number::Float(f)) if f.fract() == 0.0 => Ok(bound(f as i64)),
        Some(Number::Float(f)) => Err(D::Error::custom(format!(
            "expected a whole quantity, found {f}"
        ))),
        Some(Number::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            t.parse::<i64>()
                .map(bound)
                .map_err(|e| D::Error::custom(format!("invalid quantity {t:?}: {e}")))
        }
    }
}

/// Identifier; accepts a number or a numeric string.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Int(n)) => u64::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("negative identifier {n}"))),
        Some(Number::Float(f)) => Err(D::Error::custom(format!(
            "expected an integer identifier, found {f}"
        ))),
        Some(Number::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid identifier {s:?}: {e}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
    Str(String),
    Bool(bool),
}

/// Optional text; `false`, `null` and blank strings read as `None`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Text>::deserialize(deserializer)? {
        Some(Text::Str(s)) if !s.trim().is_empty() => Ok(Some(s)),
        Some(Text::Bool(true)) => Err(D::Error::custom("expected text, found `true`")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "flag")]
        flag: bool,
        #[serde(default, deserialize_with = "quantity")]
        qty: Option<u32>,
        #[serde(default, deserialize_with = "id")]
        id: Option<u64>,
        #[serde(default, deserialize_with = "text")]
        text: Option<String>,
    }

    fn probe(value: serde_json::Value) -> Result<Probe, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn flags_accept_storefront_spellings() {
        assert!(probe(json!({"flag": "yes"})).unwrap().flag);
        assert!(probe(json!({"flag": 1})).unwrap().flag);
        assert!(!probe(json!({"flag": "no"})).unwrap().flag);
        assert!(!probe(json!({"flag": null})).unwrap().flag);
        assert!(probe(json!({"flag": "maybe"})).is_err());
    }

    #[test]
    fn quantities_treat_blank_and_negative_as_unbounded() {
        assert_eq!(probe(json!({"qty": ""})).unwrap().qty, None);
        assert_eq!(probe(json!({"qty": -1})).unwrap().qty, None);
        assert_eq!(probe(json!({"qty": "12"})).unwrap().qty, Some(12));
        assert_eq!(probe(json!({"qty": 3.0})).unwrap().qty, Some(3));
        assert!(probe(json!({"qty": 2.5})).is_err());
    }

    #[test]
    fn ids_accept_numeric_strings() {
        assert_eq!(probe(json!({"id": "17"})).unwrap().id, Some(17));
        assert!(probe(json!({"id": -4})).is_err());
    }

    #[test]
    fn text_drops_false_and_blank() {
        assert_eq!(probe(json!({"text": false})).unwrap().text, None);
        assert_eq!(probe(json!({"text": "  "})).unwrap().text, None);
        assert_eq!(
            probe(json!({"text": "a.jpg 1x"})).unwrap().text.as_deref(),
            Some("a.jpg 1x")
        );
    }
}
