use thiserror::Error;

/// Error type shared by batching, padding and vocabulary operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("some samples have no field '{name}'")]
    MissingField { name: String },

    #[error("some samples have no common field names with the others")]
    NoCommonFields,

    #[error("inconsistent nesting depth in field '{field}'")]
    InconsistentDepth { field: String },

    #[error("field '{field}' mixes numeric and string values")]
    MixedScalarTypes { field: String },

    #[error("field '{field}' holds string values but no vocabulary maps them to indices")]
    NonNumericField { field: String },

    #[error("field values must not be an empty sequence (field '{field}')")]
    EmptySequenceField { field: String },

    #[error("no vocabulary found for field name '{field}'")]
    NoVocabulary { field: String },

    #[error("'{token}' not found in vocabulary")]
    TokenNotFound { token: String },

    #[error("index {index} out of range for vocabulary of size {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("negative index {index} cannot be decoded")]
    NegativeIndex { index: i64 },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

impl DataError {
    pub fn missing_field(name: impl Into<String>) -> Self {
        DataError::MissingField { name: name.into() }
    }

    pub fn inconsistent_depth(field: impl Into<String>) -> Self {
        DataError::InconsistentDepth {
            field: field.into(),
        }
    }

    pub fn mixed_scalar_types(field: impl Into<String>) -> Self {
        DataError::MixedScalarTypes {
            field: field.into(),
        }
    }

    pub fn empty_sequence(field: impl Into<String>) -> Self {
        DataError::EmptySequenceField {
            field: field.into(),
        }
    }

    pub fn no_vocabulary(field: impl Into<String>) -> Self {
        DataError::NoVocabulary {
            field: field.into(),
        }
    }
}

pub type DataResult<T> = Result<T, DataError>;
