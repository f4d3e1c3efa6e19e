use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Distinguishes an absent field from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "explicit_null")]` on an
/// `Option<Option<T>>`: absent -> `None`, `null` -> `Some(None)`,
/// value -> `Some(Some(v))`.
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Required JSON field that may hold any value except `null`.
pub fn non_null<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Err(D::Error::custom("expected a value, found null")),
        value => Ok(value),
    }
}

/// Trims a string and maps the empty result to `None`.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Note {
        #[serde(default, deserialize_with = "explicit_null")]
        note: Option<Option<String>>,
    }

    #[test]
    fn explicit_null_keeps_three_states() {
        let absent: Note = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.note, None);

        let null: Note = serde_json::from_str(r#"{"note":null}"#).unwrap();
        assert_eq!(null.note, Some(None));

        let value: Note = serde_json::from_str(r#"{"note":"x"}"#).unwrap();
        assert_eq!(value.note, Some(Some("x".to_string())));
    }

    #[derive(Deserialize)]
    struct Score {
        #[serde(deserialize_with = "non_null")]
        score: Value,
    }

    #[test]
    fn non_null_rejects_null_and_absent_fields() {
        let score: Score = serde_json::from_str(r#"{"score":{"value":80}}"#).unwrap();
        assert_eq!(score.score["value"], 80);
        assert!(serde_json::from_str::<Score>(r#"{"score":null}"#).is_err());
        assert!(serde_json::from_str::<Score>("{}").is_err());
    }

    #[test]
    fn non_empty_drops_blank_strings() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(" 180cm ")), Some("180cm".to_string()));
    }
}
