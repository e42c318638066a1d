//! Error types for pitch-deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a customised deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure outside a specific pipeline stage.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The client data failed validation before generation started.
    #[error("Invalid client data: {0}")]
    InvalidClientData(String),

    /// None of the requested channels is in the allow-list.
    #[error("No valid primary channel (expected one of TV, RADIO, DIGITAL)")]
    NoValidChannels,

    /// Template missing, unreadable, or not a valid ZIP archive.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// The target part could not be read, decoded, or produced malformed markup.
    #[error("Substitution error: {0}")]
    SubstitutionError(String),

    /// The relationship manifest could not be read or rewritten.
    #[error("Relationship update error: {0}")]
    RelationshipUpdateError(String),

    /// Writing or finalizing the output archive failed.
    #[error("Repack error: {0}")]
    RepackError(String),
}

/// Coarse failure classification, for boundary layers that collapse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Extraction,
    Substitution,
    RelationshipUpdate,
    Repack,
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::IoError(_) => FailureKind::Io,
            Error::InvalidClientData(_) | Error::NoValidChannels => FailureKind::Validation,
            Error::ExtractionError(_) => FailureKind::Extraction,
            Error::SubstitutionError(_) => FailureKind::Substitution,
            Error::RelationshipUpdateError(_) => FailureKind::RelationshipUpdate,
            Error::RepackError(_) => FailureKind::Repack,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::Validation => "validation",
            FailureKind::Extraction => "extraction",
            FailureKind::Substitution => "substitution",
            FailureKind::RelationshipUpdate => "relationship-update",
            FailureKind::Repack => "repack",
            FailureKind::Io => "io",
        };
        f.write_str(name)
    }
}
