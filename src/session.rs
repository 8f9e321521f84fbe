//! The logical session payload

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/**
The logical session payload read and written by the calling application.

Session data is an arbitrary string-keyed mapping, plus a required
[`cookie`](SessionData::cookie) field that carries the session cookie's
expiry. The store treats the payload as opaque beyond serialization: it is
stored as a JSON string in the backing store and round-tripped on every write.

# Example
```rust
use mongo_session_store::SessionData;

let mut session = SessionData::new();
session.insert("user_id", "123");
session.cookie.max_age = Some(2000);

assert_eq!(session.get("user_id"), Some(&"123".into()));
```
*/
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// The session cookie's attributes, including its expiry. The store
    /// restamps [`SessionCookie::expires`] on every write.
    pub cookie: SessionCookie,
    /// All other session fields
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl SessionData {
    /// Create empty session data with a default cookie
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a session value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a session value, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a session value, returning it if it was present
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}

/// Attributes of the session cookie stored inside the session payload.
/// Field names follow the conventional cookie JSON shape (`maxAge`,
/// `expires` as an RFC 3339 timestamp).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Absolute expiry of the session cookie. Set by the store to
    /// `now + ttl` on every write.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires: Option<OffsetDateTime>,
    /// The cookie's `Max-Age` attribute, in milliseconds
    #[serde(default, rename = "maxAge", skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    /// Any other cookie attributes, passed through untouched
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_json() {
        let mut session = SessionData::new();
        session.insert("handle", "@complexcarb");
        session.cookie.max_age = Some(2000);
        session.cookie.expires = Some(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap());

        let json = serde_json::to_string(&session).unwrap();
        let parsed: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn cookie_uses_conventional_field_names() {
        let mut session = SessionData::new();
        session.cookie.max_age = Some(2000);

        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("maxAge"));
        assert!(!json.contains("max_age"));
    }

    #[test]
    fn unknown_cookie_attributes_are_preserved() {
        let json = r#"{"cookie":{"maxAge":2000,"httpOnly":true},"handle":"@complexcarb"}"#;
        let parsed: SessionData = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.cookie.rest.get("httpOnly"), Some(&true.into()));
        assert_eq!(parsed.get("handle"), Some(&"@complexcarb".into()));

        let round_tripped = serde_json::to_string(&parsed).unwrap();
        assert!(round_tripped.contains("httpOnly"));
    }
}
