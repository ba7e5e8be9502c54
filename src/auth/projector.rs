//! Safe projection of identities for callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::models::{Identity, PASSWORD_HASH_FIELD, REVISION_FIELD};

/// Fields that never leave the service.
pub const RESTRICTED_FIELDS: [&str; 2] = [PASSWORD_HASH_FIELD, REVISION_FIELD];

/// An identity with every restricted field removed. Serializes as a flat
/// JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityView(Map<String, Value>);

impl IdentityView {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Strips restricted fields. Unknown keys pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserProjector;

impl UserProjector {
    pub fn project(&self, identity: &Identity) -> IdentityView {
        self.project_map(identity.to_document())
    }

    pub fn project_map(&self, mut document: Map<String, Value>) -> IdentityView {
        for field in RESTRICTED_FIELDS {
            document.remove(field);
        }
        IdentityView(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Identity {
        Identity::new("a@x.com".to_string(), "$argon2id$v=19$stub".to_string())
            .with_id("u1")
            .with_attribute("name", "Ada")
            .with_attribute("type", "recruiter")
            .with_attribute("skills", json!(["rust", "sql"]))
    }

    #[test]
    fn test_restricted_fields_removed() {
        let view = UserProjector.project(&sample());
        for field in RESTRICTED_FIELDS {
            assert!(!view.contains_key(field), "{} leaked", field);
        }
        assert_eq!(view.id(), Some("u1"));
        assert_eq!(view.get("email"), Some(&json!("a@x.com")));
    }

    #[test]
    fn test_unknown_attributes_preserved() {
        let view = UserProjector.project(&sample());
        assert_eq!(view.get("name"), Some(&json!("Ada")));
        assert_eq!(view.get("type"), Some(&json!("recruiter")));
        assert_eq!(view.get("skills"), Some(&json!(["rust", "sql"])));
    }

    #[test]
    fn test_restricted_attribute_keys_removed() {
        let mut identity = sample();
        identity.attributes.insert("revision".to_string(), json!(7));
        let view = UserProjector.project(&identity);
        assert!(!view.contains_key("revision"));
    }

    #[test]
    fn test_projection_idempotent() {
        let once = UserProjector.project(&sample());
        let twice = UserProjector.project_map(once.clone().into_map());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_view_serializes_flat() {
        let view = UserProjector.project(&Identity::new("a@x.com".into(), "h".into()).with_id("u1"));
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value, json!({ "id": "u1", "email": "a@x.com" }));
    }
}
