//! # Protocol Primitives
//!
//! Hardcoded protocol constants for binmeta records.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! Changing any of them is a wire-format change.
//!
//! ## Primitives
//!
//! 1. **Chunk Limit**: Upper bound on a single `data` string.
//! 2. **ABI Versions**: Current version stamped by writers, invalid sentinel.
//! 3. **Field Names**: The record fields understood by the reader.

/// Maximum length of one payload chunk, in characters.
///
/// - The embedding medium caps each string field at 65535 bytes.
/// - Chunks are ASCII, so characters and bytes coincide.
pub const MAX_CHUNK_LENGTH: usize = 65_535;

/// ABI version written by this toolchain revision.
///
/// Increment this when making breaking changes to the record layout or
/// to the payload envelope.
pub const CURRENT_ABI_VERSION: i32 = 32;

/// Sentinel for "no version was recorded".
///
/// Never compatible with any reader.
pub const INVALID_ABI_VERSION: i32 = -1;

// =============================================================================
// RECORD FIELD NAMES
// =============================================================================

/// Scalar `int32` field carrying the writer's ABI version.
pub const ABI_VERSION_FIELD: &str = "abiVersion";

/// Array field carrying the chunked payload.
pub const DATA_FIELD: &str = "data";

/// Enum field (`ClassKind`) on class records.
pub const CLASS_KIND_FIELD: &str = "classKind";

/// Enum field (`SyntheticKind`) on synthetic class records.
pub const SYNTHETIC_KIND_FIELD: &str = "syntheticKind";

/// Scalar string field naming the facade of a multifile part.
pub const MULTIFILE_CLASS_NAME_FIELD: &str = "multifileClassName";

/// Array field listing the parts of a multifile facade.
pub const PART_CLASS_NAMES_FIELD: &str = "partClassNames";

/// Enum type name expected for `classKind` values.
pub const CLASS_KIND_ENUM: &str = "ClassKind";

/// Enum type name expected for `syntheticKind` values.
pub const SYNTHETIC_KIND_ENUM: &str = "SyntheticKind";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for declaration names.
///
/// Longer names are rejected before they reach a serializer.
pub const MAX_DECLARATION_NAME_LENGTH: usize = 1024;

/// Maximum length for declaration signatures.
pub const MAX_SIGNATURE_LENGTH: usize = 16 * 1024;

/// Maximum number of declarations accepted by one `write` call.
pub const MAX_DECLARATIONS: usize = 100_000;

/// Maximum size of a decoded payload accepted by `decode_payload` (64 MiB).
///
/// Guards postcard against hostile length prefixes.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_differs_from_current() {
        assert_ne!(INVALID_ABI_VERSION, CURRENT_ABI_VERSION);
    }

    #[test]
    fn chunk_limit_fits_field_cap() {
        assert_eq!(MAX_CHUNK_LENGTH, u16::MAX as usize);
    }
}
