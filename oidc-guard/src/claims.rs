use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `aud` claim, which providers send either as a string or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    /// Decode an `aud` value.
    ///
    /// `None` for anything that is neither a string nor an array. Non-string
    /// array members are skipped: they can never equal an expected audience.
    pub fn from_claim(value: &Value) -> Option<Self> {
        match value {
            Value::String(aud) => Some(Audience::Single(aud.clone())),
            Value::Array(items) => Some(Audience::Many(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(String::from))
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Whether `expected` is this audience or one of its members.
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == expected,
            Audience::Many(auds) => auds.iter().any(|aud| aud == expected),
        }
    }
}

/// Claim set of a validated token, exposed verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Raw value of a claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String value of a claim, `None` if absent or not a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_str("iss")
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    pub fn audience(&self) -> Option<Audience> {
        self.0.get("aud").and_then(Audience::from_claim)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Claims> for Value {
    fn from(claims: Claims) -> Self {
        Value::Object(claims.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_audience() {
        let aud = Audience::from_claim(&json!("svc-a")).unwrap();
        assert_eq!(aud, Audience::Single("svc-a".into()));
        assert!(aud.contains("svc-a"));
        assert!(!aud.contains("svc-b"));
    }

    #[test]
    fn list_audience() {
        let aud = Audience::from_claim(&json!(["svc-a", 42, "svc-b"])).unwrap();
        assert_eq!(aud, Audience::Many(vec!["svc-a".into(), "svc-b".into()]));
        assert!(aud.contains("svc-b"));
        assert!(!aud.contains("42"));
    }

    #[test]
    fn empty_list_contains_nothing() {
        let aud = Audience::from_claim(&json!([])).unwrap();
        assert!(!aud.contains(""));
    }

    #[test]
    fn non_string_audience_is_not_decoded() {
        assert!(Audience::from_claim(&json!(7)).is_none());
        assert!(Audience::from_claim(&json!({"aud": "svc-a"})).is_none());
        assert!(Audience::from_claim(&Value::Null).is_none());
    }

    #[test]
    fn claims_accessors() {
        let claims: Claims = serde_json::from_value(json!({
            "iss": "https://idp.example/",
            "sub": "user-1",
            "aud": ["svc-a"],
            "tenant": "acme"
        }))
        .unwrap();
        assert_eq!(claims.issuer(), Some("https://idp.example/"));
        assert_eq!(claims.subject(), Some("user-1"));
        assert_eq!(claims.audience(), Some(Audience::Many(vec!["svc-a".into()])));
        assert_eq!(claims.get_str("tenant"), Some("acme"));
        assert_eq!(claims.as_map().len(), 4);
    }
}
