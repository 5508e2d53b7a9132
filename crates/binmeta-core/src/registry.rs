//! # Kind Registry
//!
//! Static table mapping marker identifiers to artifact kinds.
//!
//! The table is declarative data: one `MarkerEntry` per identifier. The
//! six current markers are bijective with `ArtifactKind`; legacy markers
//! are superseded formats from older toolchains and map many-to-one onto
//! a kind. Legacy records carry no structured fields.
//!
//! The lookup index is built on first use and is read-only afterwards, so
//! concurrent scans can share it freely.

use crate::ArtifactKind;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// One row of the marker registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerEntry {
    pub identifier: &'static str,
    pub kind: ArtifactKind,
    pub is_legacy: bool,
}

impl MarkerEntry {
    const fn current(identifier: &'static str, kind: ArtifactKind) -> Self {
        Self {
            identifier,
            kind,
            is_legacy: false,
        }
    }

    const fn legacy(identifier: &'static str, kind: ArtifactKind) -> Self {
        Self {
            identifier,
            kind,
            is_legacy: true,
        }
    }
}

/// Every known marker, current formats first.
pub static MARKERS: &[MarkerEntry] = &[
    MarkerEntry::current("binmeta.Class", ArtifactKind::Class),
    MarkerEntry::current("binmeta.PackageFacade", ArtifactKind::PackageFacade),
    MarkerEntry::current("binmeta.FileClass", ArtifactKind::FileClass),
    MarkerEntry::current("binmeta.MultifileClass", ArtifactKind::MultifileClass),
    MarkerEntry::current("binmeta.MultifileClassPart", ArtifactKind::MultifileClassPart),
    MarkerEntry::current("binmeta.SyntheticClass", ArtifactKind::SyntheticClass),
    // Superseded formats
    MarkerEntry::legacy("jet.JetClass", ArtifactKind::Class),
    MarkerEntry::legacy("jet.JetPackageClass", ArtifactKind::PackageFacade),
    MarkerEntry::legacy("binmeta.v0.Class", ArtifactKind::Class),
    MarkerEntry::legacy("binmeta.v0.Package", ArtifactKind::PackageFacade),
    MarkerEntry::legacy("binmeta.v0.PackageFragment", ArtifactKind::SyntheticClass),
    MarkerEntry::legacy("binmeta.v0.TraitImpl", ArtifactKind::SyntheticClass),
];

static INDEX: LazyLock<BTreeMap<&'static str, &'static MarkerEntry>> =
    LazyLock::new(|| MARKERS.iter().map(|e| (e.identifier, e)).collect());

/// Resolve a marker identifier to its kind and legacy flag.
#[must_use]
pub fn lookup(identifier: &str) -> Option<(ArtifactKind, bool)> {
    INDEX.get(identifier).map(|e| (e.kind, e.is_legacy))
}

static CURRENT: LazyLock<BTreeMap<ArtifactKind, &'static str>> = LazyLock::new(|| {
    MARKERS
        .iter()
        .filter(|e| !e.is_legacy)
        .map(|e| (e.kind, e.identifier))
        .collect()
});

/// The current-format identifier for a kind.
///
/// Every kind has exactly one current row in `MARKERS`.
#[must_use]
pub fn current_marker(kind: ArtifactKind) -> &'static str {
    CURRENT.get(&kind).copied().unwrap_or_default()
}

/// Iterate the registry in declaration order.
pub fn entries() -> impl Iterator<Item = &'static MarkerEntry> {
    MARKERS.iter()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn current_markers_are_bijective_with_kinds() {
        let current: Vec<_> = entries().filter(|e| !e.is_legacy).collect();
        assert_eq!(current.len(), ArtifactKind::ALL.len());

        let kinds: BTreeSet<_> = current.iter().map(|e| e.kind).collect();
        assert_eq!(kinds.len(), ArtifactKind::ALL.len());

        for entry in current {
            assert_eq!(current_marker(entry.kind), entry.identifier);
        }
    }

    #[test]
    fn identifiers_are_unique() {
        let ids: BTreeSet<_> = entries().map(|e| e.identifier).collect();
        assert_eq!(ids.len(), MARKERS.len());
    }

    #[test]
    fn lookup_distinguishes_legacy() {
        assert_eq!(
            lookup("binmeta.FileClass"),
            Some((ArtifactKind::FileClass, false))
        );
        assert_eq!(
            lookup("binmeta.v0.TraitImpl"),
            Some((ArtifactKind::SyntheticClass, true))
        );
        assert_eq!(lookup("jet.JetClass"), Some((ArtifactKind::Class, true)));
        assert_eq!(lookup("java.lang.Deprecated"), None);
    }

    #[test]
    fn every_current_marker_round_trips() {
        for kind in ArtifactKind::ALL {
            assert_eq!(lookup(current_marker(kind)), Some((kind, false)));
        }
    }

    #[test]
    fn current_marker_comes_from_the_table() {
        for kind in ArtifactKind::ALL {
            let row = MARKERS
                .iter()
                .find(|e| e.kind == kind && !e.is_legacy)
                .expect("current row");
            assert_eq!(current_marker(kind), row.identifier);
            assert!(!current_marker(kind).is_empty());
        }
    }
}
