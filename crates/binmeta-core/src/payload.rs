//! # Payload Serialization
//!
//! The writer never looks inside a payload. It hands a filtered list of
//! declarations and a fresh `StringTable` to a `PayloadSerializer` and
//! gets opaque bytes back, together with the number of members those
//! bytes describe.
//!
//! `PostcardSerializer` is the reference implementation used by the CLI
//! and the tests. Its output is a postcard-encoded `PayloadEnvelope`:
//!
//! ```text
//! PayloadEnvelope
//!   strings: [String]        interned names and signatures
//!   members: [MemberEntry]   (name index, signature index, kind)
//! ```
//!
//! ## Security
//!
//! `decode_payload` checks the size bound before handing bytes to postcard
//! and verifies every string index afterwards.

use crate::primitives::MAX_PAYLOAD_SIZE;
use crate::{ArtifactKind, BinmetaError, Declaration, DeclarationKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// STRING TABLE
// =============================================================================

/// Interned strings shared by all members of one payload.
///
/// Indices are assigned in first-seen order and never change.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    index: BTreeMap<String, u32>,
}

impl StringTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its stable index.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    #[must_use]
    pub fn get(&self, idx: u32) -> Option<&str> {
        self.strings.get(idx as usize).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Consume the table, yielding strings in index order.
    #[must_use]
    pub fn into_strings(self) -> Vec<String> {
        self.strings
    }
}

// =============================================================================
// SERIALIZER CAPABILITY
// =============================================================================

/// Bytes produced by a serializer plus the member count they describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedPayload {
    pub member_count: usize,
    pub bytes: Vec<u8>,
}

/// Injected capability turning declarations into a binary payload.
///
/// Implementations must be deterministic: the same declarations produce the
/// same bytes.
pub trait PayloadSerializer {
    fn serialize(
        &self,
        kind: ArtifactKind,
        declarations: &[&Declaration],
        strings: &mut StringTable,
    ) -> Result<SerializedPayload, BinmetaError>;
}

impl<F> PayloadSerializer for F
where
    F: Fn(ArtifactKind, &[&Declaration], &mut StringTable) -> Result<SerializedPayload, BinmetaError>,
{
    fn serialize(
        &self,
        kind: ArtifactKind,
        declarations: &[&Declaration],
        strings: &mut StringTable,
    ) -> Result<SerializedPayload, BinmetaError> {
        self(kind, declarations, strings)
    }
}

// =============================================================================
// REFERENCE ENVELOPE
// =============================================================================

/// One member of a payload, referencing the envelope's string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberEntry {
    pub name: u32,
    pub signature: u32,
    pub kind: DeclarationKind,
}

/// A member with its strings resolved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Member {
    pub name: String,
    pub kind: DeclarationKind,
    pub signature: String,
}

/// Decoded form of a `PostcardSerializer` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadEnvelope {
    pub kind: ArtifactKind,
    pub strings: Vec<String>,
    pub members: Vec<MemberEntry>,
}

impl PayloadEnvelope {
    /// Resolve every member through the string table.
    pub fn resolve_members(&self) -> Result<Vec<Member>, BinmetaError> {
        self.members
            .iter()
            .map(|m| {
                Ok(Member {
                    name: self.string(m.name)?.to_string(),
                    kind: m.kind,
                    signature: self.string(m.signature)?.to_string(),
                })
            })
            .collect()
    }

    /// Member names in payload order.
    pub fn member_names(&self) -> Result<Vec<&str>, BinmetaError> {
        self.members.iter().map(|m| self.string(m.name)).collect()
    }

    fn string(&self, idx: u32) -> Result<&str, BinmetaError> {
        self.strings
            .get(idx as usize)
            .map(String::as_str)
            .ok_or_else(|| {
                BinmetaError::DeserializationError(format!(
                    "string index {} out of range ({} strings)",
                    idx,
                    self.strings.len()
                ))
            })
    }
}

/// Reference serializer: postcard-encoded `PayloadEnvelope`.
///
/// Members are emitted in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostcardSerializer;

impl PayloadSerializer for PostcardSerializer {
    fn serialize(
        &self,
        kind: ArtifactKind,
        declarations: &[&Declaration],
        strings: &mut StringTable,
    ) -> Result<SerializedPayload, BinmetaError> {
        let members: Vec<MemberEntry> = declarations
            .iter()
            .map(|d| MemberEntry {
                name: strings.intern(&d.name),
                signature: strings.intern(&d.signature),
                kind: d.kind,
            })
            .collect();

        let envelope = PayloadEnvelope {
            kind,
            strings: std::mem::take(strings).into_strings(),
            members,
        };

        let bytes = postcard::to_stdvec(&envelope)
            .map_err(|e| BinmetaError::SerializationError(e.to_string()))?;

        Ok(SerializedPayload {
            member_count: envelope.members.len(),
            bytes,
        })
    }
}

/// Decode a `PostcardSerializer` payload.
///
/// Validates size before parsing and string indices after.
pub fn decode_payload(bytes: &[u8]) -> Result<PayloadEnvelope, BinmetaError> {
    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(BinmetaError::DeserializationError(format!(
            "Payload size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let envelope: PayloadEnvelope = postcard::from_bytes(bytes).map_err(|e| {
        BinmetaError::DeserializationError(format!("Failed to decode payload: {}", e))
    })?;

    // Fail on dangling indices now rather than on first use.
    envelope.resolve_members()?;

    Ok(envelope)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut table = StringTable::new();
        let a = table.intern("foo");
        let b = table.intern("bar");
        let a2 = table.intern("foo");

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(b), Some("bar"));
        assert_eq!(table.get(9), None);
    }

    #[test]
    fn postcard_payload_round_trip() {
        let f = Declaration::function("greet", "(String) -> Unit");
        let p = Declaration::property("answer", "Int");
        let decls = vec![&f, &p];

        let mut table = StringTable::new();
        let payload = PostcardSerializer
            .serialize(ArtifactKind::FileClass, &decls, &mut table)
            .expect("serialize");
        assert_eq!(payload.member_count, 2);

        let envelope = decode_payload(&payload.bytes).expect("decode");
        assert_eq!(envelope.kind, ArtifactKind::FileClass);
        assert_eq!(
            envelope.member_names().expect("names"),
            vec!["greet", "answer"]
        );

        let members = envelope.resolve_members().expect("resolve");
        assert_eq!(members[0].signature, "(String) -> Unit");
        assert_eq!(members[1].kind, DeclarationKind::Property);
    }

    #[test]
    fn shared_strings_are_interned_once() {
        let a = Declaration::function("run", "() -> Unit");
        let b = Declaration::function("stop", "() -> Unit");
        let mut table = StringTable::new();
        let payload = PostcardSerializer
            .serialize(ArtifactKind::PackageFacade, &[&a, &b], &mut table)
            .expect("serialize");

        let envelope = decode_payload(&payload.bytes).expect("decode");
        assert_eq!(envelope.strings.len(), 3);
    }

    #[test]
    fn dangling_index_rejected() {
        let envelope = PayloadEnvelope {
            kind: ArtifactKind::FileClass,
            strings: vec!["only".to_string()],
            members: vec![MemberEntry {
                name: 0,
                signature: 5,
                kind: DeclarationKind::Function,
            }],
        };
        let bytes = postcard::to_stdvec(&envelope).expect("serialize");

        assert!(matches!(
            decode_payload(&bytes),
            Err(BinmetaError::DeserializationError(_))
        ));
    }

    #[test]
    fn garbage_rejected() {
        assert!(decode_payload(&[0xFF, 0xFF, 0xFF]).is_err());
    }

    #[test]
    fn closures_are_serializers() {
        let empty = |_: ArtifactKind,
                     _: &[&Declaration],
                     _: &mut StringTable|
         -> Result<SerializedPayload, BinmetaError> {
            Ok(SerializedPayload {
                member_count: 0,
                bytes: Vec::new(),
            })
        };
        let mut table = StringTable::new();
        let out = empty
            .serialize(ArtifactKind::Class, &[], &mut table)
            .expect("serialize");
        assert_eq!(out.member_count, 0);
    }
}
