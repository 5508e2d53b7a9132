//! # Artifact Views
//!
//! Consumer-side classification of a reconstructed `Header`.
//!
//! `describe` decides what a downstream tool should do with an artifact:
//! expand its members, follow a multifile facade to its parts, or leave it
//! alone. Payloads are decoded with the reference `PostcardSerializer`
//! envelope.

use crate::payload::{Member, decode_payload};
use crate::{AbiVersion, ArtifactKind, BinmetaError, ClassKind, Header, SyntheticKind};
use serde::Serialize;
use tracing::warn;

/// Resolves a multifile part class name to its header.
pub trait PartLookup {
    fn find_part(&self, name: &str) -> Result<Option<Header>, BinmetaError>;
}

impl<F> PartLookup for F
where
    F: Fn(&str) -> Result<Option<Header>, BinmetaError>,
{
    fn find_part(&self, name: &str) -> Result<Option<Header>, BinmetaError> {
        self(name)
    }
}

/// Lookup for contexts where no part can be resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParts;

impl PartLookup for NoParts {
    fn find_part(&self, _name: &str) -> Result<Option<Header>, BinmetaError> {
        Ok(None)
    }
}

/// What an artifact's metadata amounts to for a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ArtifactView {
    /// Written by a different toolchain revision.
    IncompatibleVersion {
        kind: ArtifactKind,
        abi_version: AbiVersion,
    },
    Class {
        class_kind: ClassKind,
        members: Vec<Member>,
    },
    PackageFacade {
        members: Vec<Member>,
    },
    FileClass {
        members: Vec<Member>,
    },
    /// Members gathered from every resolvable part.
    MultifileClass {
        parts: Vec<String>,
        members: Vec<Member>,
    },
    MultifileClassPart {
        facade: String,
        members: Vec<Member>,
    },
    Synthetic {
        synthetic_kind: Option<SyntheticKind>,
    },
    /// Recognized, deliberately not expanded.
    Skipped {
        reason: String,
    },
}

/// Classify a header, decoding members where the kind calls for it.
///
/// # Errors
/// - `DeserializationError` if a payload is not a valid envelope
/// - whatever `parts` returns
pub fn describe<L>(header: &Header, parts: &L) -> Result<ArtifactView, BinmetaError>
where
    L: PartLookup + ?Sized,
{
    if !header.is_compatible() {
        return Ok(ArtifactView::IncompatibleVersion {
            kind: header.kind(),
            abi_version: header.abi_version(),
        });
    }

    let view = match header.kind() {
        ArtifactKind::Class => match header.class_kind() {
            Some(ClassKind::Class) | None => ArtifactView::Class {
                class_kind: ClassKind::Class,
                members: members(header)?,
            },
            Some(other) => ArtifactView::Skipped {
                reason: format!("{} is not expanded", other.entry()),
            },
        },
        ArtifactKind::PackageFacade => ArtifactView::PackageFacade {
            members: members(header)?,
        },
        ArtifactKind::FileClass => ArtifactView::FileClass {
            members: members(header)?,
        },
        ArtifactKind::MultifileClass => {
            let names = header.part_class_names().unwrap_or_default().to_vec();
            let mut gathered = Vec::new();
            for name in &names {
                match parts.find_part(name)? {
                    Some(part)
                        if part.is_compatible_multifile_class_part_kind()
                            && part.payload().is_some() =>
                    {
                        gathered.extend(members(&part)?);
                    }
                    Some(_) => warn!(part = %name, "part is not a readable multifile part, skipped"),
                    None => warn!(part = %name, "part not found, skipped"),
                }
            }
            ArtifactView::MultifileClass {
                parts: names,
                members: gathered,
            }
        }
        ArtifactKind::MultifileClassPart => ArtifactView::MultifileClassPart {
            facade: header.multifile_class_name().unwrap_or_default().to_string(),
            members: members(header)?,
        },
        ArtifactKind::SyntheticClass => ArtifactView::Synthetic {
            synthetic_kind: header.synthetic_kind(),
        },
    };

    Ok(view)
}

fn members(header: &Header) -> Result<Vec<Member>, BinmetaError> {
    match header.payload() {
        Some(bytes) => decode_payload(bytes)?.resolve_members(),
        None => Ok(Vec::new()),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PostcardSerializer;
    use crate::reader::read_header;
    use crate::record::Artifact;
    use crate::writer::{HeaderWriter, WriteTarget};
    use crate::Declaration;
    use std::collections::BTreeMap;

    fn written(target: WriteTarget, decls: &[Declaration]) -> Header {
        let record = HeaderWriter::new(target)
            .write(decls, AbiVersion::CURRENT, &PostcardSerializer)
            .expect("write")
            .expect("record");
        let mut artifact = Artifact::new("A");
        record.attach_to(&mut artifact).expect("attach");
        read_header(&artifact).expect("read").expect("header")
    }

    fn names(view: &ArtifactView) -> Vec<&str> {
        let members = match view {
            ArtifactView::Class { members, .. }
            | ArtifactView::PackageFacade { members }
            | ArtifactView::FileClass { members }
            | ArtifactView::MultifileClass { members, .. }
            | ArtifactView::MultifileClassPart { members, .. } => members,
            _ => return Vec::new(),
        };
        members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn local_classes_are_skipped() {
        let header = written(
            WriteTarget::Class {
                class_kind: ClassKind::LocalClass,
            },
            &[Declaration::function("run", "")],
        );
        let view = describe(&header, &NoParts).expect("describe");
        assert!(matches!(view, ArtifactView::Skipped { .. }));
    }

    #[test]
    fn file_class_members_are_decoded() {
        let header = written(
            WriteTarget::FileClass,
            &[Declaration::function("a", ""), Declaration::property("b", "")],
        );
        let view = describe(&header, &NoParts).expect("describe");
        assert_eq!(names(&view), vec!["a", "b"]);
    }

    #[test]
    fn multifile_facade_gathers_resolvable_parts() {
        let facade = written(
            WriteTarget::MultifileClass {
                part_class_names: vec!["Part1".into(), "Missing".into(), "Part2".into()],
            },
            &[Declaration::function("a", ""), Declaration::function("b", "")],
        );

        let mut parts = BTreeMap::new();
        parts.insert(
            "Part1",
            written(
                WriteTarget::MultifileClassPart {
                    multifile_class_name: "Facade".into(),
                },
                &[Declaration::function("a", "")],
            ),
        );
        parts.insert(
            "Part2",
            written(
                WriteTarget::MultifileClassPart {
                    multifile_class_name: "Facade".into(),
                },
                &[Declaration::function("b", "")],
            ),
        );

        let lookup = |name: &str| -> Result<Option<Header>, BinmetaError> { Ok(parts.get(name).cloned()) };
        let view = describe(&facade, &lookup).expect("describe");

        assert_eq!(names(&view), vec!["a", "b"]);
        match view {
            ArtifactView::MultifileClass { parts, .. } => assert_eq!(parts.len(), 3),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn multifile_facade_without_parts_is_empty() {
        let facade = written(
            WriteTarget::MultifileClass {
                part_class_names: vec!["Gone".into()],
            },
            &[Declaration::function("a", "")],
        );
        let view = describe(&facade, &NoParts).expect("describe");
        assert!(names(&view).is_empty());
    }

    #[test]
    fn synthetic_reports_its_kind() {
        let header = written(
            WriteTarget::SyntheticClass {
                synthetic_kind: Some(SyntheticKind::SamWrapper),
            },
            &[Declaration::function("invoke", "")],
        );
        assert_eq!(
            describe(&header, &NoParts).expect("describe"),
            ArtifactView::Synthetic {
                synthetic_kind: Some(SyntheticKind::SamWrapper)
            }
        );
    }
}
