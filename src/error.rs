use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised at the decoder boundary. Acquisition swallows all of them.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed tag data: {0}")]
    Malformed(String),

    #[error("decoder task failed: {0}")]
    Task(String),
}

/// Silent degradations. These never surface as `Err` from extraction;
/// they are reported to observers and the affected field is left absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degradation {
    DecodeTimeout,
    DecodeFailure,
    EmptyTagBag,
    FieldParseFailure,
    InvalidCoordinate,
}

impl Degradation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Degradation::DecodeTimeout => "decode_timeout",
            Degradation::DecodeFailure => "decode_failure",
            Degradation::EmptyTagBag => "empty_tag_bag",
            Degradation::FieldParseFailure => "field_parse_failure",
            Degradation::InvalidCoordinate => "invalid_coordinate",
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, MetaError>;
