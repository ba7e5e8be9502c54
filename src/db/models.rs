use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::HashPool;
use crate::error::AppError;

pub const ID_FIELD: &str = "id";
pub const EMAIL_FIELD: &str = "email";
pub const PASSWORD_HASH_FIELD: &str = "password_hash";
pub const REVISION_FIELD: &str = "revision";

/// A stored principal. Profile attributes have no fixed schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub revision: i64,
    pub attributes: Map<String, Value>,
}

impl Identity {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            revision: 0,
            attributes: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Flattens the record into a single string-keyed map. Core fields win
    /// over attributes with the same key.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = self.attributes.clone();
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        doc.insert(EMAIL_FIELD.to_string(), Value::String(self.email.clone()));
        doc.insert(PASSWORD_HASH_FIELD.to_string(), Value::String(self.password_hash.clone()));
        doc.insert(REVISION_FIELD.to_string(), Value::from(self.revision));
        doc
    }

    /// Compares `candidate` against the stored hash on the hash pool.
    /// `Ok(false)` is a mismatch; `Err` means the comparison itself failed.
    pub async fn check_password(&self, hasher: &HashPool, candidate: &str) -> Result<bool, AppError> {
        hasher.verify(&self.password_hash, candidate).await
    }
}
