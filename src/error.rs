// src/error.rs
// Error types for the CFS reader

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Unexpected end of file: needed {needed} bytes at offset {offset}")]
    Truncated { offset: u64, needed: usize },

    #[error("Invalid UTF-8 in text field: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Field needs {needed} bytes but only {available} are available")]
    ShortField { needed: usize, available: usize },

    #[error("Length-prefixed string claims {claimed} bytes but the field holds {available}")]
    StringLength { claimed: usize, available: usize },

    #[error("Unsupported CFS version marker: {0:?}")]
    UnsupportedVersion(String),

    #[error("Unknown data type code: {0}")]
    UnknownDataType(i64),

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: i64 },

    #[error("Missing or mistyped field: {0}")]
    MissingField(&'static str),

    #[error("Invalid variable filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Channel '{0}' not found in frame")]
    UnknownChannel(String),

    #[error("Variable '{0}' not found in frame")]
    UnknownVariable(String),

    #[error("No channels requested")]
    EmptyChannelSet,

    #[error("Inconsistent sample rates across channels: {0}")]
    InconsistentSampleInterval(String),

    #[error("Inconsistent sample counts across channels: {0}")]
    InconsistentSampleCount(String),

    #[error("Invalid creation timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CfsError>;
