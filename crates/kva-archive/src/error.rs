use kva_backend::BackendError;
use thiserror::Error;

/// Errors from archive management: loading, saving, configuration.
///
/// Lookups never fail with an `ArchiveError`; they report an
/// [`ArchivingResult`](crate::ArchivingResult) next to a default value.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
