//! # Header Reader
//!
//! Scan-driven reconstruction of a `Header` from an artifact's records.
//!
//! ## State machine
//!
//! ```text
//! Scanning ──current marker──▶ Collecting(kind) ──marker end──▶ Done
//!     │                                                          ▲
//!     └──────────────legacy marker (no fields)───────────────────┘
//! ```
//!
//! - Unregistered markers are ignored while scanning.
//! - Once a kind is resolved every further marker is ignored, so the
//!   first recognized marker wins.
//! - While collecting, fields arrive in whatever order the medium stores
//!   them and are routed to a kind-specific `Collector`.
//!
//! ## Leniency
//!
//! A field the active collector does not accept, an enum entry that does
//! not resolve, or a malformed value is an internal-consistency failure
//! when the `abiVersion` seen so far is compatible. Otherwise it is
//! dropped: records from other toolchain revisions may legitimately carry
//! fields this revision has never heard of.
//!
//! ## Reconciliation
//!
//! `HeaderBuilder::build()` turns whatever was collected into either
//! nothing, an incompatible header, or a complete header.

use crate::primitives::{
    ABI_VERSION_FIELD, CLASS_KIND_ENUM, CLASS_KIND_FIELD, DATA_FIELD, MULTIFILE_CLASS_NAME_FIELD,
    PART_CLASS_NAMES_FIELD, SYNTHETIC_KIND_ENUM, SYNTHETIC_KIND_FIELD,
};
use crate::record::{Interest, MetadataSource, RecordVisitor, Scalar};
use crate::{AbiVersion, ArtifactKind, BinmetaError, ClassKind, Header, SyntheticKind, chunk, registry};
use tracing::{debug, trace, warn};

// =============================================================================
// FIELD COLLECTORS
// =============================================================================

/// Record fields this revision knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KnownField {
    AbiVersion,
    Data,
    ClassKind,
    SyntheticKind,
    MultifileClassName,
    PartClassNames,
}

impl KnownField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            ABI_VERSION_FIELD => Some(Self::AbiVersion),
            DATA_FIELD => Some(Self::Data),
            CLASS_KIND_FIELD => Some(Self::ClassKind),
            SYNTHETIC_KIND_FIELD => Some(Self::SyntheticKind),
            MULTIFILE_CLASS_NAME_FIELD => Some(Self::MultifileClassName),
            PART_CLASS_NAMES_FIELD => Some(Self::PartClassNames),
            _ => None,
        }
    }
}

/// Per-kind field acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collector {
    Class,
    PackageFacade,
    FileClass,
    MultifileClass,
    MultifileClassPart,
    SyntheticClass,
}

impl Collector {
    fn for_kind(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Class => Self::Class,
            ArtifactKind::PackageFacade => Self::PackageFacade,
            ArtifactKind::FileClass => Self::FileClass,
            ArtifactKind::MultifileClass => Self::MultifileClass,
            ArtifactKind::MultifileClassPart => Self::MultifileClassPart,
            ArtifactKind::SyntheticClass => Self::SyntheticClass,
        }
    }

    fn kind(self) -> ArtifactKind {
        match self {
            Self::Class => ArtifactKind::Class,
            Self::PackageFacade => ArtifactKind::PackageFacade,
            Self::FileClass => ArtifactKind::FileClass,
            Self::MultifileClass => ArtifactKind::MultifileClass,
            Self::MultifileClassPart => ArtifactKind::MultifileClassPart,
            Self::SyntheticClass => ArtifactKind::SyntheticClass,
        }
    }

    fn accepts(self, field: KnownField) -> bool {
        // Every collector takes the version tag and an optional payload.
        if matches!(field, KnownField::AbiVersion | KnownField::Data) {
            return true;
        }
        match self {
            Self::Class => field == KnownField::ClassKind,
            Self::PackageFacade | Self::FileClass => false,
            Self::MultifileClass => field == KnownField::PartClassNames,
            Self::MultifileClassPart => field == KnownField::MultifileClassName,
            Self::SyntheticClass => field == KnownField::SyntheticKind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    Collecting(Collector),
    Done,
}

/// String array currently being streamed.
#[derive(Debug)]
enum PendingArray {
    Data(Vec<String>),
    PartClassNames(Vec<String>),
}

// =============================================================================
// HEADER BUILDER
// =============================================================================

/// Accumulates header fields during a scan.
///
/// Only set and clear operations are exposed; `build()` is the single path to
/// a `Header`.
#[derive(Debug, Clone, Default)]
pub struct HeaderBuilder {
    kind: Option<ArtifactKind>,
    abi_version: AbiVersion,
    data: Option<Vec<String>>,
    class_kind: Option<ClassKind>,
    synthetic_kind: Option<SyntheticKind>,
    multifile_class_name: Option<String>,
    part_class_names: Option<Vec<String>>,
}

impl HeaderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the artifact kind. The first kind wins; returns `false` if a
    /// kind was already set.
    pub fn set_kind(&mut self, kind: ArtifactKind) -> bool {
        if self.kind.is_some() {
            return false;
        }
        self.kind = Some(kind);
        true
    }

    pub fn set_abi_version(&mut self, version: AbiVersion) {
        self.abi_version = version;
    }

    /// Store payload chunks. A later `data` array replaces an earlier one.
    pub fn set_data(&mut self, chunks: Vec<String>) {
        self.data = Some(chunks);
    }

    pub fn set_class_kind(&mut self, kind: ClassKind) {
        self.class_kind = Some(kind);
    }

    pub fn set_synthetic_kind(&mut self, kind: SyntheticKind) {
        self.synthetic_kind = Some(kind);
    }

    pub fn set_multifile_class_name(&mut self, name: impl Into<String>) {
        self.multifile_class_name = Some(name.into());
    }

    pub fn clear_multifile_class_name(&mut self) {
        self.multifile_class_name = None;
    }

    pub fn set_part_class_names(&mut self, names: Vec<String>) {
        self.part_class_names = Some(names);
    }

    /// Reconcile the collected fields.
    ///
    /// - no kind: `Ok(None)`
    /// - incompatible version: header with kind and version only
    /// - missing payload or missing required field: `Ok(None)`
    /// - otherwise: the complete header, payload decoded
    ///
    /// # Errors
    /// `BinmetaError::Codec` if the payload chunks do not decode.
    pub fn build(self) -> Result<Option<Header>, BinmetaError> {
        let Some(kind) = self.kind else {
            trace!("no metadata marker recognized");
            return Ok(None);
        };

        let abi_version = self.abi_version;
        if !abi_version.is_compatible() {
            debug!(%kind, %abi_version, "incompatible metadata version");
            return Ok(Some(Header::incompatible(kind, abi_version)));
        }

        if kind.requires_payload() && self.data.is_none() {
            warn!(%kind, "metadata record carries no payload, treating as absent");
            return Ok(None);
        }

        let part_class_names = match kind {
            ArtifactKind::MultifileClass => match self.part_class_names {
                Some(names) => Some(names),
                None => {
                    warn!(%kind, "multifile facade lists no parts, treating as absent");
                    return Ok(None);
                }
            },
            _ => None,
        };

        let multifile_class_name = match kind {
            ArtifactKind::MultifileClassPart => match self.multifile_class_name {
                Some(name) => Some(name),
                None => {
                    warn!(%kind, "multifile part names no facade, treating as absent");
                    return Ok(None);
                }
            },
            _ => None,
        };

        let class_kind = match kind {
            ArtifactKind::Class => Some(self.class_kind.unwrap_or(ClassKind::Class)),
            _ => None,
        };

        let synthetic_kind = match kind {
            ArtifactKind::SyntheticClass => self.synthetic_kind,
            _ => None,
        };

        let payload = self.data.map(|chunks| chunk::decode(&chunks)).transpose()?;

        debug!(%kind, %abi_version, payload_bytes = payload.as_ref().map_or(0, Vec::len), "header reconstructed");

        Ok(Some(Header::complete(
            kind,
            abi_version,
            payload,
            class_kind,
            synthetic_kind,
            multifile_class_name,
            part_class_names,
        )))
    }
}

// =============================================================================
// HEADER READER
// =============================================================================

/// `RecordVisitor` driving a `HeaderBuilder` through one artifact scan.
#[derive(Debug)]
pub struct HeaderReader {
    state: ScanState,
    builder: HeaderBuilder,
    // Mirrors what was handed to the builder, for the leniency rule.
    abi_version: AbiVersion,
    pending: Option<PendingArray>,
}

impl Default for HeaderReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            builder: HeaderBuilder::new(),
            abi_version: AbiVersion::INVALID,
            pending: None,
        }
    }

    /// End the scan and reconcile.
    pub fn finish(self) -> Result<Option<Header>, BinmetaError> {
        self.builder.build()
    }

    fn collector(&self) -> Option<Collector> {
        match self.state {
            ScanState::Collecting(collector) => Some(collector),
            ScanState::Scanning | ScanState::Done => None,
        }
    }

    /// Apply the leniency rule to something the collector cannot use.
    fn unexpected(&self, collector: Collector, detail: String) -> Result<(), BinmetaError> {
        let marker = registry::current_marker(collector.kind());
        if self.abi_version.is_compatible() {
            return Err(BinmetaError::Inconsistent {
                marker: marker.to_string(),
                detail,
            });
        }
        trace!(marker, abi_version = %self.abi_version, %detail, "ignored under incompatible version");
        Ok(())
    }

    /// Resolve a field name against the active collector.
    ///
    /// `Ok(None)` means the field was dropped leniently.
    fn route(&self, collector: Collector, name: &str) -> Result<Option<KnownField>, BinmetaError> {
        match KnownField::parse(name) {
            Some(field) if collector.accepts(field) => Ok(Some(field)),
            _ => {
                self.unexpected(collector, format!("unexpected field '{name}'"))?;
                Ok(None)
            }
        }
    }
}

impl RecordVisitor for HeaderReader {
    fn visit_marker(&mut self, marker: &str) -> Interest {
        if self.state != ScanState::Scanning {
            trace!(marker, "kind already resolved, marker ignored");
            return Interest::Skip;
        }

        let Some((kind, is_legacy)) = registry::lookup(marker) else {
            trace!(marker, "foreign marker ignored");
            return Interest::Skip;
        };

        self.builder.set_kind(kind);
        if is_legacy {
            debug!(marker, %kind, "legacy metadata marker");
            self.state = ScanState::Done;
            Interest::Skip
        } else {
            self.state = ScanState::Collecting(Collector::for_kind(kind));
            Interest::Fields
        }
    }

    fn visit_scalar(&mut self, name: &str, value: Scalar<'_>) -> Result<(), BinmetaError> {
        let Some(collector) = self.collector() else {
            return Ok(());
        };
        let Some(field) = self.route(collector, name)? else {
            return Ok(());
        };

        match (field, value) {
            (KnownField::AbiVersion, Scalar::Int(raw)) => {
                self.abi_version = AbiVersion::new(raw);
                self.builder.set_abi_version(self.abi_version);
                Ok(())
            }
            // An explicit null reads as the sentinel version.
            (KnownField::AbiVersion, Scalar::Null) => {
                self.abi_version = AbiVersion::INVALID;
                self.builder.set_abi_version(self.abi_version);
                Ok(())
            }
            (KnownField::MultifileClassName, Scalar::Str(s)) => {
                self.builder.set_multifile_class_name(s);
                Ok(())
            }
            (KnownField::MultifileClassName, Scalar::Null) => {
                self.builder.clear_multifile_class_name();
                Ok(())
            }
            _ => self.unexpected(collector, format!("field '{name}' has unexpected value {value:?}")),
        }
    }

    fn visit_enum(&mut self, name: &str, enum_type: &str, entry: &str) -> Result<(), BinmetaError> {
        let Some(collector) = self.collector() else {
            return Ok(());
        };
        let Some(field) = self.route(collector, name)? else {
            return Ok(());
        };

        match field {
            KnownField::ClassKind if enum_type == CLASS_KIND_ENUM => {
                match ClassKind::from_entry(entry) {
                    Some(kind) => {
                        self.builder.set_class_kind(kind);
                        Ok(())
                    }
                    None => self.unexpected(collector, format!("unknown {enum_type} entry '{entry}'")),
                }
            }
            KnownField::SyntheticKind if enum_type == SYNTHETIC_KIND_ENUM => {
                match SyntheticKind::from_entry(entry) {
                    Some(kind) => {
                        self.builder.set_synthetic_kind(kind);
                        Ok(())
                    }
                    None => self.unexpected(collector, format!("unknown {enum_type} entry '{entry}'")),
                }
            }
            _ => self.unexpected(
                collector,
                format!("field '{name}' has unexpected enum {enum_type}.{entry}"),
            ),
        }
    }

    fn visit_array(&mut self, name: &str) -> Result<Interest, BinmetaError> {
        let Some(collector) = self.collector() else {
            return Ok(Interest::Skip);
        };
        let Some(field) = self.route(collector, name)? else {
            return Ok(Interest::Skip);
        };

        match field {
            KnownField::Data => self.pending = Some(PendingArray::Data(Vec::new())),
            KnownField::PartClassNames => {
                self.pending = Some(PendingArray::PartClassNames(Vec::new()));
            }
            _ => {
                self.unexpected(collector, format!("field '{name}' is not an array"))?;
                return Ok(Interest::Skip);
            }
        }
        Ok(Interest::Fields)
    }

    fn visit_array_element(&mut self, value: Scalar<'_>) -> Result<(), BinmetaError> {
        let Some(collector) = self.collector() else {
            return Ok(());
        };

        let items = match self.pending.as_mut() {
            Some(PendingArray::Data(items) | PendingArray::PartClassNames(items)) => items,
            // Already discarded.
            None => return Ok(()),
        };
        if let Scalar::Str(s) = value {
            items.push(s.to_string());
            return Ok(());
        }

        self.unexpected(collector, format!("non-string array element {value:?}"))?;
        // A partially collected array is worse than none.
        self.pending = None;
        Ok(())
    }

    fn visit_array_end(&mut self) -> Result<(), BinmetaError> {
        match self.pending.take() {
            Some(PendingArray::Data(chunks)) => self.builder.set_data(chunks),
            Some(PendingArray::PartClassNames(names)) => self.builder.set_part_class_names(names),
            None => {}
        }
        Ok(())
    }

    fn visit_nested(&mut self, name: &str) -> Interest {
        trace!(field = name, "nested structure declined");
        Interest::Skip
    }

    fn visit_marker_end(&mut self) {
        if matches!(self.state, ScanState::Collecting(_)) {
            self.state = ScanState::Done;
        }
    }
}

/// Scan an artifact's records and reconstruct its header.
///
/// - `Ok(None)`: no usable metadata
/// - `Ok(Some(h))` with `!h.is_compatible()`: metadata from another toolchain revision
/// - `Err(Inconsistent | Codec)`: the scan was aborted
pub fn read_header<M>(source: &M) -> Result<Option<Header>, BinmetaError>
where
    M: MetadataSource + ?Sized,
{
    let mut reader = HeaderReader::new();
    source.accept(&mut reader)?;
    reader.finish()
}

// =============================================================================
// TESTS
// =============================================================================
