//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Artifacts on disk are JSON renditions of `binmeta_core::Artifact`.

use binmeta_core::{
    AbiVersion, Artifact, ArtifactKind, ArtifactView, BinmetaError, ClassKind, Declaration,
    Header, HeaderWriter, Member, PartLookup, PostcardSerializer, SyntheticKind, WriteTarget,
    describe, read_header, registry,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a declaration list (50 MB).
const MAX_DECLARATION_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Maximum size of an artifact file (200 MB).
///
/// Payload chunks are base64, so artifacts run larger than their payloads.
pub const MAX_ARTIFACT_FILE_SIZE: u64 = 200 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), BinmetaError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| BinmetaError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(BinmetaError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input path: canonicalize it and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, BinmetaError> {
    let canonical = path.canonicalize().map_err(|e| {
        BinmetaError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(BinmetaError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, BinmetaError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        BinmetaError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(BinmetaError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| BinmetaError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read an artifact file after path and size validation.
pub fn load_artifact(path: &Path) -> Result<Artifact, BinmetaError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_ARTIFACT_FILE_SIZE)?;

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| BinmetaError::IoError(format!("Failed to read artifact: {}", e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| BinmetaError::DeserializationError(format!("Invalid artifact JSON: {}", e)))
}

fn print_json(value: &impl serde::Serialize) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// EMIT COMMAND
// =============================================================================

/// Everything `emit` needs besides the file paths.
#[derive(Debug, Clone)]
pub struct EmitRequest {
    pub kind: ArtifactKind,
    pub name: String,
    pub abi_version: i32,
    pub chunk_limit: usize,
    pub class_kind: ClassKind,
    pub synthetic_kind: Option<SyntheticKind>,
    pub facade: Option<String>,
    pub parts: Option<Vec<String>>,
}

impl EmitRequest {
    /// Combine the kind with its kind-specific options.
    pub fn target(&self) -> Result<WriteTarget, BinmetaError> {
        let target = match self.kind {
            ArtifactKind::Class => WriteTarget::Class {
                class_kind: self.class_kind,
            },
            ArtifactKind::PackageFacade => WriteTarget::PackageFacade,
            ArtifactKind::FileClass => WriteTarget::FileClass,
            ArtifactKind::MultifileClass => WriteTarget::MultifileClass {
                part_class_names: self.parts.clone().ok_or_else(|| {
                    BinmetaError::InvalidArgument(
                        "multifile-class requires --parts".to_string(),
                    )
                })?,
            },
            ArtifactKind::MultifileClassPart => WriteTarget::MultifileClassPart {
                multifile_class_name: self.facade.clone().ok_or_else(|| {
                    BinmetaError::InvalidArgument(
                        "multifile-class-part requires --facade".to_string(),
                    )
                })?,
            },
            ArtifactKind::SyntheticClass => WriteTarget::SyntheticClass {
                synthetic_kind: self.synthetic_kind,
            },
        };
        Ok(target)
    }
}

/// Write a metadata record for a declaration list and save the artifact.
///
/// An artifact with nothing to export is still written, with no records.
pub fn cmd_emit(
    declarations_path: &Path,
    output: &Path,
    request: &EmitRequest,
    json_mode: bool,
) -> Result<(), BinmetaError> {
    let target = request.target()?;

    let input = validate_file_path(declarations_path)?;
    validate_file_size(&input, MAX_DECLARATION_FILE_SIZE)?;
    let contents = std::fs::read_to_string(&input)
        .map_err(|e| BinmetaError::IoError(format!("Failed to read declarations: {}", e)))?;
    let declarations: Vec<Declaration> = serde_json::from_str(&contents).map_err(|e| {
        BinmetaError::DeserializationError(format!("Invalid declaration list: {}", e))
    })?;

    let record = HeaderWriter::new(target)
        .with_chunk_limit(request.chunk_limit)
        .write(
            &declarations,
            AbiVersion::new(request.abi_version),
            &PostcardSerializer,
        )?;

    let mut artifact = Artifact::new(request.name.clone());
    let chunks = record.as_ref().map_or(0, |r| r.data.len());
    if let Some(record) = &record {
        record.attach_to(&mut artifact)?;
    }

    let output = validate_output_path(output)?;
    let rendered = serde_json::to_string_pretty(&artifact)
        .map_err(|e| BinmetaError::SerializationError(e.to_string()))?;
    std::fs::write(&output, rendered)
        .map_err(|e| BinmetaError::IoError(format!("Failed to write artifact: {}", e)))?;

    tracing::info!(
        artifact = %request.name,
        kind = %request.kind,
        declarations = declarations.len(),
        chunks,
        "artifact written"
    );

    if json_mode {
        print_json(&serde_json::json!({
            "artifact": request.name,
            "kind": request.kind,
            "output": output.to_string_lossy(),
            "declarations": declarations.len(),
            "record": record.is_some(),
            "chunks": chunks,
        }));
        return Ok(());
    }

    match record {
        Some(record) => println!(
            "Wrote {} ({}, {} chunk(s)) to {}",
            request.name,
            record.marker(),
            chunks,
            output.display()
        ),
        None => println!(
            "Nothing exported; wrote {} without metadata to {}",
            request.name,
            output.display()
        ),
    }
    Ok(())
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// JSON description of a read result.
pub fn header_json(header: Option<&Header>) -> serde_json::Value {
    match header {
        None => serde_json::json!({ "status": "absent" }),
        Some(h) if !h.is_compatible() => serde_json::json!({
            "status": "incompatible",
            "kind": h.kind(),
            "abi_version": h.abi_version().value(),
        }),
        Some(h) => serde_json::json!({
            "status": "complete",
            "kind": h.kind(),
            "abi_version": h.abi_version().value(),
            "payload_bytes": h.payload().map(<[u8]>::len),
            "class_kind": h.class_kind().map(ClassKind::entry),
            "synthetic_kind": h.synthetic_kind().map(SyntheticKind::entry),
            "multifile_class_name": h.multifile_class_name(),
            "part_class_names": h.part_class_names(),
        }),
    }
}

/// Show the header reconstructed from an artifact.
pub fn cmd_inspect(path: &Path, json_mode: bool) -> Result<(), BinmetaError> {
    let artifact = load_artifact(path)?;
    let header = read_header(&artifact)?;

    if json_mode {
        let mut output = header_json(header.as_ref());
        output["artifact"] = serde_json::Value::String(artifact.name.clone());
        print_json(&output);
        return Ok(());
    }

    println!("Artifact: {}", artifact.name);
    println!("Records:  {}", artifact.records.len());
    println!();

    let Some(header) = header else {
        println!("Metadata: absent");
        return Ok(());
    };

    println!("Kind:     {}", header.kind());
    println!("ABI:      {}", header.abi_version());
    if !header.is_compatible() {
        println!(
            "Metadata: incompatible (this tool reads ABI {})",
            AbiVersion::CURRENT
        );
        return Ok(());
    }

    println!("Metadata: complete");
    if let Some(payload) = header.payload() {
        println!("Payload:  {} bytes", payload.len());
    }
    if let Some(kind) = header.class_kind() {
        println!("Class:    {}", kind.entry());
    }
    if let Some(kind) = header.synthetic_kind() {
        println!("Synthetic: {}", kind.entry());
    }
    if let Some(facade) = header.multifile_class_name() {
        println!("Facade:   {}", facade);
    }
    if let Some(parts) = header.part_class_names() {
        println!("Parts:    {}", parts.join(", "));
    }
    Ok(())
}

// =============================================================================
// MEMBERS COMMAND
// =============================================================================

/// Resolves multifile parts from `<name>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct SiblingParts {
    dir: PathBuf,
}

impl SiblingParts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PartLookup for SiblingParts {
    fn find_part(&self, name: &str) -> Result<Option<Header>, BinmetaError> {
        // Part names are class names, never paths.
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            tracing::warn!(part = name, "part name is not a plain file name, skipped");
            return Ok(None);
        }

        let path = self.dir.join(format!("{name}.json"));
        if !path.is_file() {
            return Ok(None);
        }
        // An unusable part is skipped like a missing one.
        match load_artifact(&path).and_then(|artifact| read_header(&artifact)) {
            Ok(header) => Ok(header),
            Err(e) => {
                tracing::warn!(part = name, error = %e, "part file is unreadable, skipped");
                Ok(None)
            }
        }
    }
}

/// Show the decoded members of an artifact.
pub fn cmd_members(path: &Path, json_mode: bool) -> Result<(), BinmetaError> {
    let artifact = load_artifact(path)?;
    let Some(header) = read_header(&artifact)? else {
        if json_mode {
            print_json(&header_json(None));
        } else {
            println!("{}: no metadata", artifact.name);
        }
        return Ok(());
    };

    let dir = validate_file_path(path)?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let view = describe(&header, &SiblingParts::new(dir))?;

    if json_mode {
        print_json(&view);
        return Ok(());
    }

    println!("Artifact: {}", artifact.name);
    match &view {
        ArtifactView::IncompatibleVersion { kind, abi_version } => {
            println!("{} written with ABI {}, cannot decode", kind, abi_version);
        }
        ArtifactView::Class {
            class_kind,
            members,
        } => {
            println!("Class ({})", class_kind.entry());
            print_members(members);
        }
        ArtifactView::PackageFacade { members } => {
            println!("Package facade");
            print_members(members);
        }
        ArtifactView::FileClass { members } => {
            println!("File class");
            print_members(members);
        }
        ArtifactView::MultifileClass { parts, members } => {
            println!("Multifile facade over {}", parts.join(", "));
            print_members(members);
        }
        ArtifactView::MultifileClassPart { facade, members } => {
            println!("Part of {}", facade);
            print_members(members);
        }
        ArtifactView::Synthetic { synthetic_kind } => match synthetic_kind {
            Some(kind) => println!("Synthetic class ({})", kind.entry()),
            None => println!("Synthetic class"),
        },
        ArtifactView::Skipped { reason } => println!("Skipped: {}", reason),
    }
    Ok(())
}

fn print_members(members: &[Member]) {
    if members.is_empty() {
        println!("  (no members)");
    }
    for member in members {
        println!("  {:?} {} {}", member.kind, member.name, member.signature);
    }
}

// =============================================================================
// MARKERS COMMAND
// =============================================================================

/// List the marker registry.
pub fn cmd_markers(json_mode: bool) -> Result<(), BinmetaError> {
    if json_mode {
        let entries: Vec<_> = registry::entries()
            .map(|e| {
                serde_json::json!({
                    "identifier": e.identifier,
                    "kind": e.kind,
                    "legacy": e.is_legacy,
                })
            })
            .collect();
        print_json(&entries);
        return Ok(());
    }

    println!("{:<32} {:<22} FORMAT", "MARKER", "KIND");
    for entry in registry::entries() {
        println!(
            "{:<32} {:<22} {}",
            entry.identifier,
            entry.kind.name(),
            if entry.is_legacy { "legacy" } else { "current" }
        );
    }
    Ok(())
}
