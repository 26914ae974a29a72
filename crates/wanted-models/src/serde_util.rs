use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Identifier as the server sends it: a JSON number, a string, or (for
/// rejected input echoed back) anything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
    Other(Value),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
            RawId::Other(Value::Null) => String::new(),
            RawId::Other(v) => v.to_string(),
        }
    }
}

/// Deserialize a value that may be encoded as either a number or a string.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

/// Optional variant of [`string_or_number`]; `null` and empty strings map to `None`.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(RawId::into_string).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        ext: Option<String>,
    }

    #[test]
    fn test_number_and_string_ids() {
        let a: Probe = serde_json::from_str(r#"{"id": 42, "ext": "603"}"#).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(a.ext.as_deref(), Some("603"));

        let b: Probe = serde_json::from_str(r#"{"id": "42", "ext": 603}"#).unwrap();
        assert_eq!(b.id, "42");
        assert_eq!(b.ext.as_deref(), Some("603"));
    }

    #[test]
    fn test_missing_and_null_optional() {
        let a: Probe = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(a.ext, None);
        let b: Probe = serde_json::from_str(r#"{"id": 1, "ext": null}"#).unwrap();
        assert_eq!(b.ext, None);
        let c: Probe = serde_json::from_str(r#"{"id": 1, "ext": ""}"#).unwrap();
        assert_eq!(c.ext, None);
    }
}
