use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RevisionError, StoreError, StoreResult};
use crate::revision::{verify_revision, Revision};

/// The unit of storage: a typed payload plus its revision envelope.
///
/// Serialized as a single JSON object with fixed field names:
///
/// ```text
/// {
///   "uuid": "config",
///   "_rev": "2-<hex sha256 of data>",
///   "_history": ["1-<hash>", "2-<hash>"],
///   "data": { ... },
///   "_env": "self",
///   "_type": "config"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object<T> {
    /// Caller-chosen key. Never derived from content.
    #[serde(rename = "uuid")]
    pub identifier: String,
    /// Current revision, `"<sequence>-<hash>"`.
    #[serde(rename = "_rev")]
    pub revision: String,
    /// Every revision this object has had, oldest first. Append-only.
    #[serde(rename = "_history", default)]
    pub history: Vec<String>,
    /// The stored value.
    #[serde(rename = "data")]
    pub payload: T,
    /// Namespace tag, e.g. `"self"` or a tenant name.
    #[serde(rename = "_env")]
    pub environment: String,
    /// Classification tag within the environment, e.g. `"config"`.
    #[serde(rename = "_type")]
    pub kind: String,
}

impl<T> Object<T> {
    /// Create an unwritten object with a fresh UUID v7 identifier.
    ///
    /// The revision starts at `"0-0"` with an empty history; environment and
    /// type are empty until set by the caller.
    pub fn new(payload: T) -> Self {
        Self {
            identifier: Uuid::now_v7().to_string(),
            revision: Revision::INITIAL.to_string(),
            history: Vec::new(),
            payload,
            environment: String::new(),
            kind: String::new(),
        }
    }

    /// Replace the generated identifier with a well-known one.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Set the environment tag.
    pub fn in_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the type tag.
    pub fn of_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Parsed form of the current revision.
    pub fn parsed_revision(&self) -> Result<Revision, RevisionError> {
        Revision::parse(&self.revision)
    }

    /// Returns `true` if the object has never been written.
    pub fn is_unwritten(&self) -> bool {
        self.history.is_empty()
    }
}

impl<T: Serialize> Object<T> {
    /// Encode the full envelope as JSON bytes.
    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Check the revision against the history and the current payload.
    pub fn verify(&self) -> Result<(), RevisionError> {
        verify_revision(self)
    }
}

impl<T: DeserializeOwned> Object<T> {
    /// Decode an envelope from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn new_object_is_unwritten() {
        let object = Object::new(json!({"name": "node1"}));
        assert_eq!(object.revision, "0-0");
        assert!(object.history.is_empty());
        assert!(object.is_unwritten());
        assert!(object.environment.is_empty());
        assert!(object.kind.is_empty());
        assert!(Uuid::parse_str(&object.identifier).is_ok());
    }

    #[test]
    fn identifiers_are_unique() {
        let a = Object::new(1);
        let b = Object::new(1);
        assert_ne!(a.identifier, b.identifier);
    }

    #[test]
    fn builder_sets_tags() {
        let object = Object::new(json!({}))
            .with_identifier("config")
            .in_environment("self")
            .of_type("config");
        assert_eq!(object.identifier, "config");
        assert_eq!(object.environment, "self");
        assert_eq!(object.kind, "config");
    }

    #[test]
    fn envelope_uses_fixed_field_names() {
        let object = Object::new(json!({"name": "node1"}))
            .with_identifier("config")
            .in_environment("self")
            .of_type("config");
        let value: Value = serde_json::from_slice(&object.to_bytes().unwrap()).unwrap();

        assert_eq!(value["uuid"], "config");
        assert_eq!(value["_rev"], "0-0");
        assert_eq!(value["_history"], json!([]));
        assert_eq!(value["data"], json!({"name": "node1"}));
        assert_eq!(value["_env"], "self");
        assert_eq!(value["_type"], "config");
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    #[test]
    fn decodes_external_envelope() {
        let raw = br#"{
            "uuid": "abc",
            "_rev": "1-ff",
            "_history": ["1-ff"],
            "data": [1, 2, 3],
            "_env": "tenant-a",
            "_type": "list"
        }"#;
        let object: Object<Vec<u32>> = Object::from_bytes(raw).unwrap();
        assert_eq!(object.identifier, "abc");
        assert_eq!(object.payload, vec![1, 2, 3]);
        assert_eq!(object.history, vec!["1-ff".to_string()]);
        assert_eq!(object.parsed_revision().unwrap().sequence(), 1);
    }

    #[test]
    fn missing_history_defaults_to_empty() {
        let raw = br#"{"uuid":"a","_rev":"0-0","data":null,"_env":"","_type":""}"#;
        let object: Object<Value> = Object::from_bytes(raw).unwrap();
        assert!(object.history.is_empty());
    }

    #[test]
    fn malformed_bytes_are_a_serialization_error() {
        let err = Object::<Value>::from_bytes(b"not json").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn payload_type_mismatch_is_a_serialization_error() {
        let raw = br#"{"uuid":"a","_rev":"0-0","_history":[],"data":"text","_env":"","_type":""}"#;
        let err = Object::<u64>::from_bytes(raw).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
