use std::fmt;

/// The feature or record an error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOwner {
    /// Feature at this index in the collection.
    Feature(usize),
    /// Record (row) at this index in the attribute table.
    Record(usize),
}

impl fmt::Display for FieldOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature(i) => write!(f, "feature {i}"),
            Self::Record(i) => write!(f, "record {i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichError {
    /// A feature lacks the join key, or a record lacks the key or value field.
    MissingField { owner: FieldOwner, field: String },
    /// Input is not a feature collection of feature objects.
    MalformedDocument(String),
    /// A matched record's value cannot be represented as a number.
    ValueCoercion { owner: FieldOwner, field: String, value: String },
    /// Two records share a join key and the duplicate policy forbids it.
    DuplicateKey { key: String, first_record: usize, duplicate_record: usize },
}

impl fmt::Display for EnrichError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { owner, field } => {
                write!(f, "{owner}: missing field '{field}'")
            }
            Self::MalformedDocument(msg) => write!(f, "malformed boundary document: {msg}"),
            Self::ValueCoercion { owner, field, value } => {
                write!(f, "{owner}: cannot use '{value}' in field '{field}' as a number")
            }
            Self::DuplicateKey { key, first_record, duplicate_record } => {
                write!(
                    f,
                    "duplicate key '{key}' in records {first_record} and {duplicate_record}"
                )
            }
        }
    }
}

impl std::error::Error for EnrichError {}
