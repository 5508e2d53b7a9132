//! # Core Type Definitions
//!
//! This module contains the shared types of the binmeta protocol:
//! - Version tags (`AbiVersion`)
//! - Artifact classification (`ArtifactKind`, `ClassKind`, `SyntheticKind`)
//! - The reconstructed header (`Header`)
//! - Producer input (`Declaration`, `DeclarationKind`)
//! - Error types (`BinmetaError`)
//!
//! ## Immutability
//!
//! A `Header` is only ever produced by `HeaderBuilder::build()` and exposes
//! read accessors only. Nothing in this crate mutates a header after it
//! has been built.

use crate::primitives::{
    CURRENT_ABI_VERSION, INVALID_ABI_VERSION, MAX_DECLARATION_NAME_LENGTH, MAX_SIGNATURE_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ABI VERSION
// =============================================================================

/// Compatibility tag set by a writer and checked by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbiVersion(pub i32);

impl AbiVersion {
    /// The version stamped by this toolchain revision.
    pub const CURRENT: Self = Self(CURRENT_ABI_VERSION);

    /// No version was recorded.
    pub const INVALID: Self = Self(INVALID_ABI_VERSION);

    /// Create a version tag from its raw value.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw version value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Whether a reader of this toolchain revision can decode the record.
    ///
    /// Only an exact match with [`AbiVersion::CURRENT`] is compatible.
    #[must_use]
    pub const fn is_compatible(self) -> bool {
        self.0 == CURRENT_ABI_VERSION
    }
}

impl Default for AbiVersion {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ARTIFACT KIND
// =============================================================================

/// The six artifact-level metadata categories.
///
/// "No kind" is expressed as `Option<ArtifactKind>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Class,
    PackageFacade,
    FileClass,
    MultifileClass,
    MultifileClassPart,
    SyntheticClass,
}

impl ArtifactKind {
    /// All kinds, in registry order.
    pub const ALL: [Self; 6] = [
        Self::Class,
        Self::PackageFacade,
        Self::FileClass,
        Self::MultifileClass,
        Self::MultifileClassPart,
        Self::SyntheticClass,
    ];

    /// Whether a compatible record of this kind must carry `data`.
    #[must_use]
    pub const fn requires_payload(self) -> bool {
        !matches!(self, Self::SyntheticClass)
    }

    /// Whether the payload describes top-level callables rather than a class body.
    #[must_use]
    pub const fn is_facade(self) -> bool {
        matches!(
            self,
            Self::PackageFacade | Self::FileClass | Self::MultifileClass | Self::MultifileClassPart
        )
    }

    /// Command-line spelling of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::PackageFacade => "package-facade",
            Self::FileClass => "file-class",
            Self::MultifileClass => "multifile-class",
            Self::MultifileClassPart => "multifile-class-part",
            Self::SyntheticClass => "synthetic-class",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArtifactKind {
    type Err = BinmetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| BinmetaError::InvalidArgument(format!("unknown artifact kind: {s}")))
    }
}

// =============================================================================
// ENUM FIELDS
// =============================================================================

/// Flavor of a class record (`classKind` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    LocalClass,
    AnonymousObject,
}

impl ClassKind {
    const ENTRIES: [(Self, &'static str); 3] = [
        (Self::Class, "CLASS"),
        (Self::LocalClass, "LOCAL_CLASS"),
        (Self::AnonymousObject, "ANONYMOUS_OBJECT"),
    ];

    /// Resolve a wire enum entry. Unknown entries resolve to `None`.
    #[must_use]
    pub fn from_entry(entry: &str) -> Option<Self> {
        Self::ENTRIES
            .iter()
            .find(|(_, name)| *name == entry)
            .map(|(kind, _)| *kind)
    }

    /// Wire enum entry for this variant.
    #[must_use]
    pub fn entry(self) -> &'static str {
        // ENTRIES is laid out in declaration order.
        Self::ENTRIES[self as usize].1
    }
}

impl FromStr for ClassKind {
    type Err = BinmetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_entry(&s.to_ascii_uppercase().replace('-', "_"))
            .ok_or_else(|| BinmetaError::InvalidArgument(format!("unknown class kind: {s}")))
    }
}

/// Flavor of a compiler-generated class (`syntheticKind` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SyntheticKind {
    PackagePart,
    InterfaceImpl,
    LocalInterfaceImpl,
    SamWrapper,
    SamLambda,
    CallableReferenceWrapper,
    LocalFunction,
    AnonymousFunction,
    EnumSwitchMappings,
}

impl SyntheticKind {
    const ENTRIES: [(Self, &'static str); 9] = [
        (Self::PackagePart, "PACKAGE_PART"),
        (Self::InterfaceImpl, "INTERFACE_IMPL"),
        (Self::LocalInterfaceImpl, "LOCAL_INTERFACE_IMPL"),
        (Self::SamWrapper, "SAM_WRAPPER"),
        (Self::SamLambda, "SAM_LAMBDA"),
        (Self::CallableReferenceWrapper, "CALLABLE_REFERENCE_WRAPPER"),
        (Self::LocalFunction, "LOCAL_FUNCTION"),
        (Self::AnonymousFunction, "ANONYMOUS_FUNCTION"),
        (Self::EnumSwitchMappings, "ENUM_SWITCH_MAPPINGS"),
    ];

    /// Resolve a wire enum entry. Unknown entries resolve to `None`.
    #[must_use]
    pub fn from_entry(entry: &str) -> Option<Self> {
        Self::ENTRIES
            .iter()
            .find(|(_, name)| *name == entry)
            .map(|(kind, _)| *kind)
    }

    /// Wire enum entry for this variant.
    #[must_use]
    pub fn entry(self) -> &'static str {
        // ENTRIES is laid out in declaration order.
        Self::ENTRIES[self as usize].1
    }
}

impl FromStr for SyntheticKind {
    type Err = BinmetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_entry(&s.to_ascii_uppercase().replace('-', "_"))
            .ok_or_else(|| BinmetaError::InvalidArgument(format!("unknown synthetic kind: {s}")))
    }
}

// =============================================================================
// HEADER
// =============================================================================

/// The typed description of an artifact's embedded metadata.
///
/// Produced only by `HeaderBuilder::build()`. An incompatible header keeps
/// its kind and version but carries no payload and no optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    kind: ArtifactKind,
    abi_version: AbiVersion,
    payload: Option<Vec<u8>>,
    class_kind: Option<ClassKind>,
    synthetic_kind: Option<SyntheticKind>,
    multifile_class_name: Option<String>,
    part_class_names: Option<Vec<String>>,
}

impl Header {
    /// Header for a recognized but unreadable artifact.
    pub(crate) fn incompatible(kind: ArtifactKind, abi_version: AbiVersion) -> Self {
        Self {
            kind,
            abi_version,
            payload: None,
            class_kind: None,
            synthetic_kind: None,
            multifile_class_name: None,
            part_class_names: None,
        }
    }

    /// Fully reconstructed header.
    pub(crate) fn complete(
        kind: ArtifactKind,
        abi_version: AbiVersion,
        payload: Option<Vec<u8>>,
        class_kind: Option<ClassKind>,
        synthetic_kind: Option<SyntheticKind>,
        multifile_class_name: Option<String>,
        part_class_names: Option<Vec<String>>,
    ) -> Self {
        Self {
            kind,
            abi_version,
            payload,
            class_kind,
            synthetic_kind,
            multifile_class_name,
            part_class_names,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    #[must_use]
    pub fn abi_version(&self) -> AbiVersion {
        self.abi_version
    }

    /// Decoded payload bytes, opaque to this crate.
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    #[must_use]
    pub fn class_kind(&self) -> Option<ClassKind> {
        self.class_kind
    }

    #[must_use]
    pub fn synthetic_kind(&self) -> Option<SyntheticKind> {
        self.synthetic_kind
    }

    #[must_use]
    pub fn multifile_class_name(&self) -> Option<&str> {
        self.multifile_class_name.as_deref()
    }

    #[must_use]
    pub fn part_class_names(&self) -> Option<&[String]> {
        self.part_class_names.as_deref()
    }

    /// Whether the recorded ABI version is readable by this toolchain.
    ///
    /// `false` means "recompile with a matching toolchain".
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.abi_version.is_compatible()
    }

    fn is_compatible_kind(&self, kind: ArtifactKind) -> bool {
        self.is_compatible() && self.kind == kind
    }

    #[must_use]
    pub fn is_compatible_class_kind(&self) -> bool {
        self.is_compatible_kind(ArtifactKind::Class)
    }

    #[must_use]
    pub fn is_compatible_package_facade_kind(&self) -> bool {
        self.is_compatible_kind(ArtifactKind::PackageFacade)
    }

    #[must_use]
    pub fn is_compatible_file_class_kind(&self) -> bool {
        self.is_compatible_kind(ArtifactKind::FileClass)
    }

    #[must_use]
    pub fn is_compatible_multifile_class_kind(&self) -> bool {
        self.is_compatible_kind(ArtifactKind::MultifileClass)
    }

    #[must_use]
    pub fn is_compatible_multifile_class_part_kind(&self) -> bool {
        self.is_compatible_kind(ArtifactKind::MultifileClassPart)
    }

    #[must_use]
    pub fn is_compatible_synthetic_class_kind(&self) -> bool {
        self.is_compatible_kind(ArtifactKind::SyntheticClass)
    }
}

// =============================================================================
// DECLARATIONS (Producer input)
// =============================================================================

/// Syntactic category of a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Function,
    Property,
    Class,
    TypeAlias,
}

impl DeclarationKind {
    /// Functions and properties live in facades; everything else does not.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Property)
    }
}

/// One exported (or not) declaration of a compiled module.
///
/// The signature is an opaque rendering chosen by the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    #[serde(default = "default_exported")]
    pub exported: bool,
    #[serde(default)]
    pub signature: String,
}

fn default_exported() -> bool {
    true
}

impl Declaration {
    /// Create an exported declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DeclarationKind, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            exported: true,
            signature: signature.into(),
        }
    }

    /// Shorthand for an exported function.
    #[must_use]
    pub fn function(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::new(name, DeclarationKind::Function, signature)
    }

    /// Shorthand for an exported property.
    #[must_use]
    pub fn property(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::new(name, DeclarationKind::Property, signature)
    }

    /// Mark the declaration as not exported.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Check name and signature bounds.
    pub fn validate(&self) -> Result<(), BinmetaError> {
        if self.name.is_empty() {
            return Err(BinmetaError::InvalidDeclaration(
                "declaration name is empty".to_string(),
            ));
        }
        if self.name.len() > MAX_DECLARATION_NAME_LENGTH {
            return Err(BinmetaError::InvalidDeclaration(format!(
                "declaration name exceeds {} bytes",
                MAX_DECLARATION_NAME_LENGTH
            )));
        }
        if self.signature.len() > MAX_SIGNATURE_LENGTH {
            return Err(BinmetaError::InvalidDeclaration(format!(
                "signature of '{}' exceeds {} bytes",
                self.name, MAX_SIGNATURE_LENGTH
            )));
        }
        Ok(())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the binmeta protocol.
///
/// "Absent" and "incompatible" are ordinary return values, not errors.
/// `Codec` and `Inconsistent` abort the enclosing scan and indicate a
/// toolchain defect rather than foreign input.
#[derive(Debug, Error)]
pub enum BinmetaError {
    /// Chunk content could not be decoded into bytes.
    #[error("Codec error: {0}")]
    Codec(String),

    /// A compatible record violates the writer/reader contract.
    #[error("Inconsistent metadata for marker {marker}: {detail}")]
    Inconsistent { marker: String, detail: String },

    /// A payload could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A payload could not be deserialized.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// The artifact already carries a metadata record.
    #[error("Artifact already carries a metadata record: {0}")]
    AlreadyAttached(String),

    /// A declaration failed validation.
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// A caller-supplied argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
