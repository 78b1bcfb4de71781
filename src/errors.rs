use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of an [`Error`], used to pick a response status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum ErrorKind {
    /// The addressed resource does not exist.
    NotFound,
    /// The request was malformed or missing required input.
    BadRequest,
    /// A filesystem operation failed after its preconditions held.
    Internal,
}

/// Represents all possible errors in the maiden crate.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum Error {
    /// Error indicating the addressed script or directory does not exist.
    #[error("Not found {what}: {how}")]
    NotFound {
        /// The item that was looked up.
        what: String,
        /// The reason the lookup failed.
        how: String,
    },

    /// Error indicating a failure to read data.
    #[error("Failed to read {what}: {how}")]
    Read {
        /// The item that failed to be read.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating an invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error indicating a failure to create a file or directory.
    #[error("Failed to create {what}: {how}")]
    Create {
        /// The item that failed to be created.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to write data to a file.
    #[error("Failed to write {what}: {how}")]
    Write {
        /// The item that failed to be written.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to rename a file or directory.
    #[error("Failed to rename {what}: {how}")]
    Rename {
        /// The item that failed to be renamed.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to delete a file.
    #[error("Failed to delete {what}: {how}")]
    Delete {
        /// The item that failed to be deleted.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating an invalid path.
    #[error("Invalid path: {what}")]
    InvalidPath {
        /// The invalid path description.
        what: String,
    },
}

impl Error {
    /// Returns the class of failure this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Read { .. } | Error::InvalidArgument(_) | Error::InvalidPath { .. } => {
                ErrorKind::BadRequest
            }
            Error::Create { .. }
            | Error::Write { .. }
            | Error::Rename { .. }
            | Error::Delete { .. } => ErrorKind::Internal,
        }
    }
}
