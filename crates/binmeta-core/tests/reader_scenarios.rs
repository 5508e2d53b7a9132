//! # Reader Scenario Tests (R0-R3)
//!
//! Every reconciliation rule, the leniency rule and the legacy formats,
//! exercised through hand-built artifacts.
//!
//! ## Tiers
//! - R0: Marker Recognition
//! - R1: Reconciliation
//! - R2: Leniency
//! - R3: Failures

use binmeta_core::primitives::{
    ABI_VERSION_FIELD, CLASS_KIND_ENUM, CLASS_KIND_FIELD, CURRENT_ABI_VERSION, DATA_FIELD,
    INVALID_ABI_VERSION, MULTIFILE_CLASS_NAME_FIELD, PART_CLASS_NAMES_FIELD, SYNTHETIC_KIND_ENUM,
    SYNTHETIC_KIND_FIELD,
};
use binmeta_core::{
    Artifact, ArtifactKind, BinmetaError, ClassKind, Field, FieldValue, Record, SyntheticKind,
    Value, chunk, read_header,
};

const FUTURE_ABI_VERSION: i32 = CURRENT_ABI_VERSION + 1;

fn artifact(records: Vec<Record>) -> Artifact {
    Artifact {
        name: "Scenario".to_string(),
        records,
    }
}

fn record(marker: &str, version: i32) -> Record {
    Record::new(marker)
        .with(Field::int(ABI_VERSION_FIELD, version))
        .with(Field::strings(DATA_FIELD, chunk::encode(b"payload")))
}

// =============================================================================
// TIER R0: MARKER RECOGNITION
// =============================================================================

mod r0_marker_recognition {
    use super::*;

    /// R0.1: Foreign markers alone are absent.
    #[test]
    fn foreign_markers_are_absent() {
        let a = artifact(vec![
            Record::new("java.lang.Deprecated"),
            Record::new("org.example.Generated").with(Field::int(ABI_VERSION_FIELD, 1)),
        ]);
        assert!(read_header(&a).expect("read").is_none());
    }

    /// R0.2: A legacy marker resolves its kind with the invalid version and no payload.
    #[test]
    fn legacy_marker_only() {
        for (marker, kind) in [
            ("jet.JetClass", ArtifactKind::Class),
            ("jet.JetPackageClass", ArtifactKind::PackageFacade),
            ("binmeta.v0.PackageFragment", ArtifactKind::SyntheticClass),
        ] {
            let header = read_header(&artifact(vec![Record::new(marker)]))
                .expect("read")
                .expect("header");

            assert_eq!(header.kind(), kind);
            assert_eq!(header.abi_version().value(), INVALID_ABI_VERSION);
            assert!(header.payload().is_none());
            assert!(!header.is_compatible());
        }
    }

    /// R0.3: Legacy records are not inspected, even if they carry fields.
    #[test]
    fn legacy_fields_are_not_read() {
        let header = read_header(&artifact(vec![record("binmeta.v0.Class", CURRENT_ABI_VERSION)]))
            .expect("read")
            .expect("header");
        assert_eq!(header.abi_version().value(), INVALID_ABI_VERSION);
    }

    /// R0.4: Class then FileClass markers: Class wins.
    #[test]
    fn first_recognized_marker_wins() {
        let a = artifact(vec![
            Record::new("java.lang.Deprecated"),
            record("binmeta.Class", CURRENT_ABI_VERSION),
            record("binmeta.FileClass", CURRENT_ABI_VERSION),
        ]);
        let header = read_header(&a).expect("read").expect("header");
        assert_eq!(header.kind(), ArtifactKind::Class);
    }

    /// R0.5: A legacy marker before a current one still wins.
    #[test]
    fn legacy_marker_first_wins() {
        let a = artifact(vec![
            Record::new("jet.JetClass"),
            record("binmeta.FileClass", CURRENT_ABI_VERSION),
        ]);
        let header = read_header(&a).expect("read").expect("header");
        assert_eq!(header.kind(), ArtifactKind::Class);
        assert!(!header.is_compatible());
    }
}

// =============================================================================
// TIER R1: RECONCILIATION
// =============================================================================

mod r1_reconciliation {
    use super::*;

    /// R1.1: Compatible record with payload is fully reconstructed.
    #[test]
    fn complete_file_class() {
        let header = read_header(&artifact(vec![record("binmeta.FileClass", CURRENT_ABI_VERSION)]))
            .expect("read")
            .expect("header");

        assert!(header.is_compatible_file_class_kind());
        assert!(!header.is_compatible_class_kind());
        assert_eq!(header.payload(), Some(&b"payload"[..]));
    }

    /// R1.2: Class without classKind defaults to CLASS.
    #[test]
    fn class_kind_defaults() {
        let header = read_header(&artifact(vec![record("binmeta.Class", CURRENT_ABI_VERSION)]))
            .expect("read")
            .expect("header");
        assert_eq!(header.class_kind(), Some(ClassKind::Class));
    }

    /// R1.3: Explicit classKind is kept.
    #[test]
    fn explicit_class_kind() {
        let r = record("binmeta.Class", CURRENT_ABI_VERSION).with(Field::enumeration(
            CLASS_KIND_FIELD,
            CLASS_KIND_ENUM,
            "ANONYMOUS_OBJECT",
        ));
        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");
        assert_eq!(header.class_kind(), Some(ClassKind::AnonymousObject));
    }

    /// R1.4: Incompatible version yields kind and version only.
    #[test]
    fn incompatible_drops_everything_optional() {
        let r = record("binmeta.Class", FUTURE_ABI_VERSION).with(Field::enumeration(
            CLASS_KIND_FIELD,
            CLASS_KIND_ENUM,
            "LOCAL_CLASS",
        ));
        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");

        assert_eq!(header.kind(), ArtifactKind::Class);
        assert_eq!(header.abi_version().value(), FUTURE_ABI_VERSION);
        assert!(header.payload().is_none());
        assert!(header.class_kind().is_none());
    }

    /// R1.5: Missing abiVersion means the invalid sentinel.
    #[test]
    fn missing_version_is_invalid() {
        let r = Record::new("binmeta.PackageFacade")
            .with(Field::strings(DATA_FIELD, chunk::encode(b"x")));
        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");
        assert_eq!(header.abi_version().value(), INVALID_ABI_VERSION);
    }

    /// R1.6: Compatible record without payload is absent.
    #[test]
    fn missing_payload_is_absent() {
        let r = Record::new("binmeta.FileClass").with(Field::int(ABI_VERSION_FIELD, CURRENT_ABI_VERSION));
        assert!(read_header(&artifact(vec![r])).expect("read").is_none());
    }

    /// R1.7: MultifileClass without partClassNames is absent.
    #[test]
    fn multifile_class_without_parts_is_absent() {
        let a = artifact(vec![record("binmeta.MultifileClass", CURRENT_ABI_VERSION)]);
        assert!(read_header(&a).expect("read").is_none());
    }

    /// R1.8: MultifileClass with parts keeps them in order.
    #[test]
    fn multifile_class_with_parts() {
        let r = record("binmeta.MultifileClass", CURRENT_ABI_VERSION)
            .with(Field::strings(PART_CLASS_NAMES_FIELD, ["B", "A"]));
        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");
        assert_eq!(
            header.part_class_names(),
            Some(&["B".to_string(), "A".to_string()][..])
        );
    }

    /// R1.9: MultifileClassPart without multifileClassName is absent.
    #[test]
    fn multifile_part_without_facade_is_absent() {
        let a = artifact(vec![record("binmeta.MultifileClassPart", CURRENT_ABI_VERSION)]);
        assert!(read_header(&a).expect("read").is_none());

        let named = record("binmeta.MultifileClassPart", CURRENT_ABI_VERSION)
            .with(Field::string(MULTIFILE_CLASS_NAME_FIELD, "UtilsKt"));
        let header = read_header(&artifact(vec![named]))
            .expect("read")
            .expect("header");
        assert_eq!(header.multifile_class_name(), Some("UtilsKt"));
    }

    /// R1.10: SyntheticClass needs no payload.
    #[test]
    fn synthetic_without_payload() {
        let r = Record::new("binmeta.SyntheticClass")
            .with(Field::int(ABI_VERSION_FIELD, CURRENT_ABI_VERSION))
            .with(Field::enumeration(
                SYNTHETIC_KIND_FIELD,
                SYNTHETIC_KIND_ENUM,
                "PACKAGE_PART",
            ));
        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");

        assert!(header.is_compatible_synthetic_class_kind());
        assert!(header.payload().is_none());
        assert_eq!(header.synthetic_kind(), Some(SyntheticKind::PackagePart));
    }
}

// =============================================================================
// TIER R2: LENIENCY
// =============================================================================

mod r2_leniency {
    use super::*;

    /// R2.1: FUTURE version plus unknown fields: incompatible header, no error.
    #[test]
    fn future_version_with_unknown_fields() {
        let r = Record::new("binmeta.FileClass")
            .with(Field::int(ABI_VERSION_FIELD, FUTURE_ABI_VERSION))
            .with(Field::string("moduleName", "core"))
            .with(Field::strings("strings", ["a", "b"]))
            .with(Field::enumeration(CLASS_KIND_FIELD, CLASS_KIND_ENUM, "CLASS"));

        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");
        assert!(!header.is_compatible());
        assert_eq!(header.kind(), ArtifactKind::FileClass);
    }

    /// R2.2: Unknown enum entry under a future version is ignored.
    #[test]
    fn future_enum_entry_ignored() {
        let r = Record::new("binmeta.SyntheticClass")
            .with(Field::int(ABI_VERSION_FIELD, FUTURE_ABI_VERSION))
            .with(Field::enumeration(
                SYNTHETIC_KIND_FIELD,
                SYNTHETIC_KIND_ENUM,
                "COROUTINE_STATE_MACHINE",
            ));
        assert!(read_header(&artifact(vec![r])).is_ok());
    }

    /// R2.3: Nested structures are declined silently.
    #[test]
    fn nested_structures_ignored() {
        let r = record("binmeta.FileClass", CURRENT_ABI_VERSION).with(Field {
            name: "extra".to_string(),
            value: FieldValue::Nested(vec![Field::int("depth", 1)]),
        });
        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");
        assert!(header.is_compatible());
    }

    /// R2.4: Once a kind is resolved, later records are never inspected.
    #[test]
    fn later_records_never_inspected() {
        let garbage = Record::new("binmeta.Class")
            .with(Field::int(ABI_VERSION_FIELD, CURRENT_ABI_VERSION))
            .with(Field::string("bogus", "x"));
        let a = artifact(vec![record("binmeta.PackageFacade", CURRENT_ABI_VERSION), garbage]);
        let header = read_header(&a).expect("read").expect("header");
        assert!(header.is_compatible_package_facade_kind());
    }

    /// R2.5: A null version after a compatible one reads as the invalid sentinel.
    #[test]
    fn null_version_is_incompatible() {
        let r = Record::new("binmeta.FileClass")
            .with(Field::int(ABI_VERSION_FIELD, CURRENT_ABI_VERSION))
            .with(Field {
                name: ABI_VERSION_FIELD.to_string(),
                value: FieldValue::Null,
            })
            .with(Field::strings(DATA_FIELD, chunk::encode(b"payload")));

        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");
        assert!(!header.is_compatible());
        assert_eq!(header.abi_version().value(), INVALID_ABI_VERSION);
    }

    /// R2.6: A null facade name leaves the part without one, so it is absent.
    #[test]
    fn null_facade_name_is_absent() {
        let r = record("binmeta.MultifileClassPart", CURRENT_ABI_VERSION)
            .with(Field::string(MULTIFILE_CLASS_NAME_FIELD, "UtilsKt"))
            .with(Field {
                name: MULTIFILE_CLASS_NAME_FIELD.to_string(),
                value: FieldValue::Null,
            });
        assert!(read_header(&artifact(vec![r])).expect("read").is_none());
    }
}

// =============================================================================
// TIER R3: FAILURES
// =============================================================================

mod r3_failures {
    use super::*;

    /// R3.1: Unexpected field after a compatible version aborts the scan.
    #[test]
    fn unexpected_field_is_inconsistent() {
        let r = record("binmeta.PackageFacade", CURRENT_ABI_VERSION)
            .with(Field::strings(PART_CLASS_NAMES_FIELD, ["A"]));
        let result = read_header(&artifact(vec![r]));
        assert!(matches!(result, Err(BinmetaError::Inconsistent { .. })));
    }

    /// R3.2: Unknown enum entry under the current version aborts the scan.
    #[test]
    fn unknown_enum_entry_is_inconsistent() {
        let r = record("binmeta.Class", CURRENT_ABI_VERSION).with(Field::enumeration(
            CLASS_KIND_FIELD,
            CLASS_KIND_ENUM,
            "TRAIT",
        ));
        let result = read_header(&artifact(vec![r]));
        assert!(matches!(result, Err(BinmetaError::Inconsistent { .. })));
    }

    /// R3.3: Wrong enum type under the current version aborts the scan.
    #[test]
    fn wrong_enum_type_is_inconsistent() {
        let r = record("binmeta.Class", CURRENT_ABI_VERSION).with(Field::enumeration(
            CLASS_KIND_FIELD,
            SYNTHETIC_KIND_ENUM,
            "CLASS",
        ));
        assert!(read_header(&artifact(vec![r])).is_err());
    }

    /// R3.4: Non-string data element under the current version aborts the scan.
    #[test]
    fn non_string_chunk_is_inconsistent() {
        let r = Record::new("binmeta.FileClass")
            .with(Field::int(ABI_VERSION_FIELD, CURRENT_ABI_VERSION))
            .with(Field {
                name: DATA_FIELD.to_string(),
                value: FieldValue::Array(vec![Value::Int(1)]),
            });
        let result = read_header(&artifact(vec![r]));
        assert!(matches!(result, Err(BinmetaError::Inconsistent { .. })));
    }

    /// R3.5: Malformed chunk content is a codec failure.
    #[test]
    fn malformed_chunks_are_codec_errors() {
        let r = Record::new("binmeta.FileClass")
            .with(Field::int(ABI_VERSION_FIELD, CURRENT_ABI_VERSION))
            .with(Field::strings(DATA_FIELD, ["%%% not base64 %%%"]));
        let result = read_header(&artifact(vec![r]));
        assert!(matches!(result, Err(BinmetaError::Codec(_))));
    }

    /// R3.6: Malformed chunks under a future version are never decoded.
    #[test]
    fn malformed_chunks_ignored_when_incompatible() {
        let r = Record::new("binmeta.FileClass")
            .with(Field::int(ABI_VERSION_FIELD, FUTURE_ABI_VERSION))
            .with(Field::strings(DATA_FIELD, ["%%%"]));
        let header = read_header(&artifact(vec![r]))
            .expect("read")
            .expect("header");
        assert!(!header.is_compatible());
    }
}
