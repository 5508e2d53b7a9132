//! # Record Model
//!
//! The surface through which metadata is attached to and enumerated from
//! an artifact.
//!
//! - `MetadataSource` is the enumeration capability: given an artifact, it
//!   walks every attached marker and, for markers the visitor wants, every
//!   field in whatever order the medium stores them.
//! - `RecordVisitor` is the consumer side of that walk. It answers
//!   `Interest::Skip` for markers, arrays and nested structures it does not
//!   want to inspect.
//! - `Artifact` / `Record` / `Field` are an in-memory rendition of that
//!   medium, serializable with serde so tools can keep artifacts on disk.

use crate::{BinmetaError, registry};
use serde::{Deserialize, Serialize};

// =============================================================================
// VALUES
// =============================================================================

/// A single scalar or enum value, as stored inside a field or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Int(i32),
    Str(String),
    Null,
    Enum {
        #[serde(rename = "type")]
        enum_type: String,
        entry: String,
    },
}

impl Value {
    /// Borrowed view handed to visitors.
    #[must_use]
    pub fn as_scalar(&self) -> Scalar<'_> {
        match self {
            Self::Int(v) => Scalar::Int(*v),
            Self::Str(s) => Scalar::Str(s),
            Self::Null => Scalar::Null,
            Self::Enum { enum_type, entry } => Scalar::Enum { enum_type, entry },
        }
    }
}

/// Borrowed value passed to a `RecordVisitor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar<'a> {
    Int(i32),
    Str(&'a str),
    Null,
    Enum { enum_type: &'a str, entry: &'a str },
}

/// The value of a named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Int(i32),
    Str(String),
    Null,
    Enum {
        #[serde(rename = "type")]
        enum_type: String,
        entry: String,
    },
    Array(Vec<Value>),
    Nested(Vec<Field>),
}

/// A named field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn int(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Int(value),
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Str(value.into()),
        }
    }

    pub fn enumeration(
        name: impl Into<String>,
        enum_type: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Enum {
                enum_type: enum_type.into(),
                entry: entry.into(),
            },
        }
    }

    pub fn strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            value: FieldValue::Array(values.into_iter().map(|s| Value::Str(s.into())).collect()),
        }
    }
}

/// One attached metadata record: a marker plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub marker: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Record {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, builder style.
    #[must_use]
    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// An artifact and the records attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Artifact {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Whether a record with a registered marker is already attached.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        self.records
            .iter()
            .any(|r| registry::lookup(&r.marker).is_some())
    }

    /// Attach a metadata record.
    ///
    /// An artifact carries at most one metadata record; existing records are
    /// never rewritten. Foreign records (unregistered markers) are kept and
    /// do not count.
    pub fn attach(&mut self, record: Record) -> Result<(), BinmetaError> {
        if self.has_metadata() {
            return Err(BinmetaError::AlreadyAttached(self.name.clone()));
        }
        self.records.push(record);
        Ok(())
    }

    /// Attach a record unconditionally, for foreign annotations.
    pub fn push_foreign(&mut self, record: Record) {
        self.records.push(record);
    }
}

// =============================================================================
// ENUMERATION CAPABILITY
// =============================================================================

/// Whether a visitor wants the contents of a marker, array or nested structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Fields,
    Skip,
}

/// Consumer side of an artifact walk.
///
/// Field callbacks only arrive between a `visit_marker` that returned
/// `Interest::Fields` and the matching `visit_marker_end`. Returning an
/// error aborts the walk.
pub trait RecordVisitor {
    /// A marker was found on the artifact.
    fn visit_marker(&mut self, marker: &str) -> Interest;

    /// A scalar field (`Int`, `Str` or `Null`).
    fn visit_scalar(&mut self, name: &str, value: Scalar<'_>) -> Result<(), BinmetaError>;

    /// An enum-valued field.
    fn visit_enum(&mut self, name: &str, enum_type: &str, entry: &str)
    -> Result<(), BinmetaError>;

    /// An array field. Elements follow only when `Interest::Fields` is returned.
    fn visit_array(&mut self, name: &str) -> Result<Interest, BinmetaError>;

    fn visit_array_element(&mut self, value: Scalar<'_>) -> Result<(), BinmetaError>;

    fn visit_array_end(&mut self) -> Result<(), BinmetaError>;

    /// A nested structure. Not inspected unless overridden.
    fn visit_nested(&mut self, _name: &str) -> Interest {
        Interest::Skip
    }

    fn visit_nested_end(&mut self) {}

    /// All fields of the current marker have been visited.
    fn visit_marker_end(&mut self);
}

/// Enumeration facility over one artifact's attached records.
pub trait MetadataSource {
    fn accept(&self, visitor: &mut dyn RecordVisitor) -> Result<(), BinmetaError>;
}

impl MetadataSource for Artifact {
    fn accept(&self, visitor: &mut dyn RecordVisitor) -> Result<(), BinmetaError> {
        self.records.as_slice().accept(visitor)
    }
}

impl MetadataSource for [Record] {
    fn accept(&self, visitor: &mut dyn RecordVisitor) -> Result<(), BinmetaError> {
        for record in self {
            if visitor.visit_marker(&record.marker) == Interest::Skip {
                continue;
            }
            visit_fields(&record.fields, visitor)?;
            visitor.visit_marker_end();
        }
        Ok(())
    }
}

fn visit_fields(fields: &[Field], visitor: &mut dyn RecordVisitor) -> Result<(), BinmetaError> {
    for field in fields {
        let name = field.name.as_str();
        match &field.value {
            FieldValue::Int(v) => visitor.visit_scalar(name, Scalar::Int(*v))?,
            FieldValue::Str(s) => visitor.visit_scalar(name, Scalar::Str(s))?,
            FieldValue::Null => visitor.visit_scalar(name, Scalar::Null)?,
            FieldValue::Enum { enum_type, entry } => visitor.visit_enum(name, enum_type, entry)?,
            FieldValue::Array(values) => {
                if visitor.visit_array(name)? == Interest::Fields {
                    for value in values {
                        visitor.visit_array_element(value.as_scalar())?;
                    }
                    visitor.visit_array_end()?;
                }
            }
            FieldValue::Nested(inner) => {
                if visitor.visit_nested(name) == Interest::Fields {
                    visit_fields(inner, visitor)?;
                    visitor.visit_nested_end();
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
