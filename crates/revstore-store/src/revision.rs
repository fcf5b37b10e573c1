use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::RevisionError;
use crate::object::Object;

/// Content-addressed version tag: `"<sequence>-<hex sha256 of payload>"`.
///
/// For example
/// `2-50d858e0985ecc7f60418aaf0cc5ab587f42c2570a884095a9e8ccacd0f6545c`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Revision {
    sequence: u64,
    hash: String,
}

impl Revision {
    /// Revision string carried by an object that has never been written.
    pub const INITIAL: &'static str = "0-0";

    /// Create a revision from its parts.
    pub fn new(sequence: u64, hash: impl Into<String>) -> Self {
        Self {
            sequence,
            hash: hash.into(),
        }
    }

    /// The revision of an object that has never been written (`"0-0"`).
    pub fn initial() -> Self {
        Self::new(0, "0")
    }

    /// Parse a revision string.
    ///
    /// The string is split on the first `-`; the left segment must be a
    /// non-negative integer. Everything after the delimiter is the hash. A
    /// string without a delimiter is read as a bare sequence number.
    pub fn parse(revision: &str) -> Result<Self, RevisionError> {
        let (sequence, hash) = revision.split_once('-').unwrap_or((revision, ""));
        let sequence = sequence
            .parse::<u64>()
            .map_err(|e| RevisionError::Malformed {
                revision: revision.to_string(),
                reason: format!("sequence {sequence:?} is not a non-negative integer: {e}"),
            })?;
        Ok(Self::new(sequence, hash))
    }

    /// Position of this revision in the object's history (1-based; 0 = unwritten).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Hex SHA-256 digest of the payload at this revision.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sequence, self.hash)
    }
}

impl FromStr for Revision {
    type Err = RevisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Hex-encoded SHA-256 digest of the canonical JSON form of `payload`.
///
/// The payload goes through `serde_json::Value` first, so object keys are
/// hashed in sorted order whatever field order `T` serializes with. A record
/// written through a typed store verifies when read back as `Value`.
pub fn payload_digest<T: Serialize + ?Sized>(payload: &T) -> Result<String, RevisionError> {
    let canonical =
        serde_json::to_value(payload).map_err(|e| RevisionError::Payload(e.to_string()))?;
    let bytes =
        serde_json::to_vec(&canonical).map_err(|e| RevisionError::Payload(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Derive the revision that a write of `payload` on top of `prior` produces.
///
/// An empty `prior` starts the sequence at 1. Otherwise the sequence is one
/// past the prior revision's sequence. Only the payload is hashed; the
/// identifier, tags, and history never influence the digest.
pub fn next_revision<T: Serialize + ?Sized>(
    prior: &str,
    payload: &T,
) -> Result<Revision, RevisionError> {
    let hash = payload_digest(payload)?;

    let sequence = if prior.is_empty() {
        1
    } else {
        Revision::parse(prior)?
            .sequence()
            .checked_add(1)
            .ok_or_else(|| RevisionError::Malformed {
                revision: prior.to_string(),
                reason: "sequence overflow".into(),
            })?
    };

    Ok(Revision::new(sequence, hash))
}

/// Check that an object's revision is consistent with its history and payload.
///
/// A never-written object (`"0-0"` or `""`, empty history) is consistent. A written
/// object must have a sequence equal to its history length, a last history
/// entry equal to its revision, and a hash equal to the digest of its
/// current payload.
pub fn verify_revision<T: Serialize>(object: &Object<T>) -> Result<(), RevisionError> {
    if object.revision.is_empty() && object.history.is_empty() {
        return Ok(());
    }

    let revision = Revision::parse(&object.revision)?;
    if revision == Revision::initial() && object.history.is_empty() {
        return Ok(());
    }

    if revision.sequence() != object.history.len() as u64 {
        return Err(RevisionError::SequenceMismatch {
            sequence: revision.sequence(),
            history_len: object.history.len(),
        });
    }

    if object.history.last() != Some(&object.revision) {
        return Err(RevisionError::HistoryMismatch {
            revision: object.revision.clone(),
            latest: object.history.last().cloned(),
        });
    }

    let computed = payload_digest(&object.payload)?;
    if computed != revision.hash() {
        return Err(RevisionError::HashMismatch {
            recorded: revision.hash().to_string(),
            computed,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sha256_hex(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    #[test]
    fn parse_splits_on_first_delimiter() {
        let rev = Revision::parse("12-abc-def").unwrap();
        assert_eq!(rev.sequence(), 12);
        assert_eq!(rev.hash(), "abc-def");
    }

    #[test]
    fn parse_bare_sequence() {
        let rev = Revision::parse("7").unwrap();
        assert_eq!(rev.sequence(), 7);
        assert_eq!(rev.hash(), "");
    }

    #[test]
    fn parse_rejects_non_integer_sequence() {
        for bad in ["x-abc", "-abc", "1.5-abc", " 1-abc"] {
            let err = Revision::parse(bad).unwrap_err();
            assert!(matches!(err, RevisionError::Malformed { .. }), "{bad}");
        }
    }

    #[test]
    fn initial_revision_display() {
        assert_eq!(Revision::initial().to_string(), Revision::INITIAL);
        assert_eq!(Revision::parse(Revision::INITIAL).unwrap(), Revision::initial());
    }

    #[test]
    fn from_str_matches_parse() {
        let rev: Revision = "3-ff".parse().unwrap();
        assert_eq!(rev, Revision::new(3, "ff"));
    }

    #[test]
    fn next_from_empty_prior_starts_at_one() {
        let rev = next_revision("", &json!({"name": "node1"})).unwrap();
        assert_eq!(rev.sequence(), 1);
    }

    #[test]
    fn next_from_initial_revision_is_one() {
        let rev = next_revision(Revision::INITIAL, &json!({"name": "node1"})).unwrap();
        assert_eq!(rev.sequence(), 1);
    }

    #[test]
    fn next_rejects_malformed_prior() {
        let err = next_revision("abc-123", &json!(1)).unwrap_err();
        assert!(matches!(err, RevisionError::Malformed { .. }));
    }

    #[test]
    fn next_rejects_sequence_overflow() {
        let prior = format!("{}-abc", u64::MAX);
        let err = next_revision(&prior, &json!(1)).unwrap_err();
        assert!(matches!(err, RevisionError::Malformed { .. }));
    }

    #[test]
    fn hash_depends_only_on_payload() {
        let a = next_revision("4-aaaa", &json!({"name": "node1"})).unwrap();
        let b = next_revision("4-bbbb", &json!({"name": "node1"})).unwrap();
        assert_eq!(a, b);

        let c = next_revision("4-aaaa", &json!({"name": "node2"})).unwrap();
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn known_digest() {
        // sha256("\"hello\"")
        let digest = payload_digest(&"hello").unwrap();
        assert_eq!(digest, sha256_hex(br#""hello""#));
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn verify_accepts_unwritten_object() {
        let object = Object::new(json!({"a": 1}));
        assert!(verify_revision(&object).is_ok());
    }

    #[test]
    fn verify_accepts_empty_revision_on_unwritten_object() {
        let mut object = Object::new(json!({"a": 1}));
        object.revision = String::new();
        assert!(verify_revision(&object).is_ok());

        object.history.push("1-ff".into());
        assert!(verify_revision(&object).is_err());
    }

    #[test]
    fn digest_ignores_field_order() {
        #[derive(Serialize)]
        struct Forward {
            zeta: u8,
            alpha: u8,
        }

        let typed = payload_digest(&Forward { zeta: 1, alpha: 2 }).unwrap();
        let sorted = payload_digest(&json!({"alpha": 2, "zeta": 1})).unwrap();
        assert_eq!(typed, sorted);
        assert_eq!(typed, sha256_hex(br#"{"alpha":2,"zeta":1}"#));
    }

    #[test]
    fn verify_accepts_consistent_object() {
        let mut object = Object::new(json!({"a": 1}));
        let rev = next_revision(&object.revision, &object.payload).unwrap().to_string();
        object.history.push(rev.clone());
        object.revision = rev;
        assert!(verify_revision(&object).is_ok());
    }

    #[test]
    fn verify_detects_tampered_payload() {
        let mut object = Object::new(json!({"a": 1}));
        let rev = next_revision(&object.revision, &object.payload).unwrap().to_string();
        object.history.push(rev.clone());
        object.revision = rev;
        object.payload = json!({"a": 2});

        let err = verify_revision(&object).unwrap_err();
        assert!(matches!(err, RevisionError::HashMismatch { .. }));
    }

    #[test]
    fn verify_detects_sequence_gap() {
        let mut object = Object::new(json!(1));
        let hash = payload_digest(&object.payload).unwrap();
        object.revision = format!("2-{hash}");
        object.history = vec![object.revision.clone()];

        let err = verify_revision(&object).unwrap_err();
        assert_eq!(
            err,
            RevisionError::SequenceMismatch {
                sequence: 2,
                history_len: 1
            }
        );
    }

    #[test]
    fn verify_detects_history_mismatch() {
        let mut object = Object::new(json!(1));
        let hash = payload_digest(&object.payload).unwrap();
        object.revision = format!("1-{hash}");
        object.history = vec!["1-other".into()];

        let err = verify_revision(&object).unwrap_err();
        assert!(matches!(err, RevisionError::HistoryMismatch { .. }));
    }

    proptest! {
        #[test]
        fn first_revision_hashes_serialized_payload(
            name in ".*",
            values in prop::collection::vec(any::<i64>(), 0..16),
        ) {
            let payload = json!({"name": name, "values": values});
            let rev = next_revision("", &payload).unwrap();
            prop_assert_eq!(rev.sequence(), 1);
            prop_assert_eq!(rev.hash(), sha256_hex(&serde_json::to_vec(&payload).unwrap()));
        }

        #[test]
        fn next_revision_increments_sequence(
            seq in 0u64..u64::MAX,
            hash in "[0-9a-f]{64}",
            payload in ".*",
        ) {
            let rev = next_revision(&format!("{seq}-{hash}"), &payload).unwrap();
            prop_assert_eq!(rev.sequence(), seq + 1);
        }

        #[test]
        fn display_parse_roundtrip(seq in any::<u64>(), hash in "[0-9a-f]{0,64}") {
            let rev = Revision::new(seq, hash);
            prop_assert_eq!(Revision::parse(&rev.to_string()).unwrap(), rev);
        }
    }
}
