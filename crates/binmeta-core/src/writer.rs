//! # Header Writer
//!
//! Produces zero or one metadata record for a compiled module.
//!
//! The writer:
//! - Validates and filters the module's declarations
//! - Hands the filtered set to an injected `PayloadSerializer`
//! - Chunk-encodes the opaque payload
//! - Emits nothing when the serializer reports zero members
//!
//! Attaching the produced record to an artifact is a separate step
//! (`MetadataRecord::attach_to`), which refuses artifacts that already
//! carry metadata.

use crate::payload::{PayloadSerializer, StringTable};
use crate::primitives::{
    ABI_VERSION_FIELD, CLASS_KIND_ENUM, CLASS_KIND_FIELD, DATA_FIELD, MAX_CHUNK_LENGTH,
    MAX_DECLARATIONS, MULTIFILE_CLASS_NAME_FIELD, PART_CLASS_NAMES_FIELD, SYNTHETIC_KIND_ENUM,
    SYNTHETIC_KIND_FIELD,
};
use crate::record::{Artifact, Field, Record};
use crate::{AbiVersion, ArtifactKind, BinmetaError, ClassKind, Declaration, SyntheticKind, chunk, registry};

// =============================================================================
// WRITE TARGET
// =============================================================================

/// What kind of artifact is being written, with the fields that kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    Class { class_kind: ClassKind },
    PackageFacade,
    FileClass,
    MultifileClass { part_class_names: Vec<String> },
    MultifileClassPart { multifile_class_name: String },
    SyntheticClass { synthetic_kind: Option<SyntheticKind> },
}

impl WriteTarget {
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Class { .. } => ArtifactKind::Class,
            Self::PackageFacade => ArtifactKind::PackageFacade,
            Self::FileClass => ArtifactKind::FileClass,
            Self::MultifileClass { .. } => ArtifactKind::MultifileClass,
            Self::MultifileClassPart { .. } => ArtifactKind::MultifileClassPart,
            Self::SyntheticClass { .. } => ArtifactKind::SyntheticClass,
        }
    }

    /// Whether a declaration belongs in this target's payload.
    fn admits(&self, declaration: &Declaration) -> bool {
        declaration.exported && (!self.kind().is_facade() || declaration.kind.is_callable())
    }
}

// =============================================================================
// METADATA RECORD
// =============================================================================

/// A record produced by the writer, ready to be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub target: WriteTarget,
    pub abi_version: AbiVersion,
    pub data: Vec<String>,
}

impl MetadataRecord {
    /// Current-format marker for the record's kind.
    #[must_use]
    pub fn marker(&self) -> &'static str {
        registry::current_marker(self.target.kind())
    }

    /// Render as a generic record: `abiVersion`, `data`, then kind fields.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(self.marker())
            .with(Field::int(ABI_VERSION_FIELD, self.abi_version.value()))
            .with(Field::strings(DATA_FIELD, self.data.iter().cloned()));

        match &self.target {
            WriteTarget::Class { class_kind } => {
                record = record.with(Field::enumeration(
                    CLASS_KIND_FIELD,
                    CLASS_KIND_ENUM,
                    class_kind.entry(),
                ));
            }
            WriteTarget::MultifileClass { part_class_names } => {
                record = record.with(Field::strings(
                    PART_CLASS_NAMES_FIELD,
                    part_class_names.iter().cloned(),
                ));
            }
            WriteTarget::MultifileClassPart {
                multifile_class_name,
            } => {
                record = record.with(Field::string(
                    MULTIFILE_CLASS_NAME_FIELD,
                    multifile_class_name.clone(),
                ));
            }
            WriteTarget::SyntheticClass {
                synthetic_kind: Some(kind),
            } => {
                record = record.with(Field::enumeration(
                    SYNTHETIC_KIND_FIELD,
                    SYNTHETIC_KIND_ENUM,
                    kind.entry(),
                ));
            }
            WriteTarget::PackageFacade
            | WriteTarget::FileClass
            | WriteTarget::SyntheticClass {
                synthetic_kind: None,
            } => {}
        }

        record
    }

    /// Attach to an artifact. Fails if the artifact already carries metadata.
    pub fn attach_to(&self, artifact: &mut Artifact) -> Result<(), BinmetaError> {
        artifact.attach(self.to_record())
    }
}

impl From<MetadataRecord> for Record {
    fn from(record: MetadataRecord) -> Self {
        record.to_record()
    }
}

// =============================================================================
// WRITER
// =============================================================================

/// Turns a module's declarations into at most one metadata record.
#[derive(Debug, Clone)]
pub struct HeaderWriter {
    target: WriteTarget,
    chunk_limit: usize,
}

impl HeaderWriter {
    #[must_use]
    pub fn new(target: WriteTarget) -> Self {
        Self {
            target,
            chunk_limit: MAX_CHUNK_LENGTH,
        }
    }

    /// Use a smaller per-chunk cap than `MAX_CHUNK_LENGTH`.
    ///
    /// The limit is checked when writing; zero is rejected there.
    #[must_use]
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit.min(MAX_CHUNK_LENGTH);
        self
    }

    #[must_use]
    pub fn target(&self) -> &WriteTarget {
        &self.target
    }

    /// Serialize the admitted declarations into a record.
    ///
    /// Returns `Ok(None)` when the serializer reports zero members.
    ///
    /// # Errors
    /// - `InvalidDeclaration` if there are too many declarations or one is malformed
    /// - whatever the serializer returns
    /// - `Codec` if the chunk limit is zero
    pub fn write<S>(
        &self,
        declarations: &[Declaration],
        abi_version: AbiVersion,
        serializer: &S,
    ) -> Result<Option<MetadataRecord>, BinmetaError>
    where
        S: PayloadSerializer + ?Sized,
    {
        if declarations.len() > MAX_DECLARATIONS {
            return Err(BinmetaError::InvalidDeclaration(format!(
                "{} declarations exceed the maximum of {}",
                declarations.len(),
                MAX_DECLARATIONS
            )));
        }
        for declaration in declarations {
            declaration.validate()?;
        }

        let admitted: Vec<&Declaration> = declarations
            .iter()
            .filter(|d| self.target.admits(d))
            .collect();

        let kind = self.target.kind();
        let mut strings = StringTable::new();
        let payload = serializer.serialize(kind, &admitted, &mut strings)?;

        if payload.member_count == 0 {
            tracing::debug!(%kind, "no members to serialize, nothing emitted");
            return Ok(None);
        }

        let data = chunk::encode_with_limit(&payload.bytes, self.chunk_limit)?;
        tracing::debug!(
            %kind,
            members = payload.member_count,
            bytes = payload.bytes.len(),
            chunks = data.len(),
            "metadata record written"
        );

        Ok(Some(MetadataRecord {
            target: self.target.clone(),
            abi_version,
            data,
        }))
    }
}

// =============================================================================
// TESTS
// =============================================================================
