//! # binmeta-core
//!
//! Versioned, chunked metadata records for compiled artifacts - THE LOGIC.
//!
//! A compiled module's exported declarations are serialized into an opaque
//! payload, cut into bounded-length strings and attached to the output
//! artifact as a single record. A reader later scans whatever records the
//! artifact carries and reconstructs a typed `Header`, tolerating foreign
//! markers, superseded formats and records from other toolchain revisions.
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: no async, no file I/O, no network
//! - Deterministic: same declarations, same record
//! - The payload schema is opaque to the header layer; serializers are injected
//! - Foreign input is tolerated; only writer/reader contract breaches are errors

// =============================================================================
// MODULES
// =============================================================================

pub mod chunk;
pub mod consumer;
pub mod payload;
pub mod primitives;
pub mod reader;
pub mod record;
pub mod registry;
pub mod types;
pub mod writer;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AbiVersion, ArtifactKind, BinmetaError, ClassKind, Declaration, DeclarationKind, Header,
    SyntheticKind,
};

// =============================================================================
// RE-EXPORTS: Protocol
// =============================================================================

pub use consumer::{ArtifactView, NoParts, PartLookup, describe};
pub use payload::{
    Member, MemberEntry, PayloadEnvelope, PayloadSerializer, PostcardSerializer,
    SerializedPayload, StringTable, decode_payload,
};
pub use reader::{HeaderBuilder, HeaderReader, read_header};
pub use record::{
    Artifact, Field, FieldValue, Interest, MetadataSource, Record, RecordVisitor, Scalar, Value,
};
pub use registry::MarkerEntry;
pub use writer::{HeaderWriter, MetadataRecord, WriteTarget};
