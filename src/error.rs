//! Error types for refinspect

use thiserror::Error;

/// Result type alias for refinspect operations
pub type Result<T> = std::result::Result<T, InspectError>;

/// Error types that can occur in refinspect
#[derive(Debug, Error)]
pub enum InspectError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid FASTA format
    #[error("Invalid FASTA format at line {line}: {msg}")]
    InvalidFastaFormat {
        /// Line number where error occurred
        line: usize,
        /// Error message
        msg: String,
    },

    /// Index file is missing required structure or fails validation
    #[error("Invalid index: {msg}")]
    InvalidIndex {
        /// Error message
        msg: String,
    },

    /// FASTA line width must be at least 1
    #[error("Invalid line width {0}: must be at least 1")]
    InvalidLineWidth(usize),

    /// Invalid input supplied by the caller
    #[error("Invalid input: {msg}")]
    InvalidInput {
        /// Error message
        msg: String,
    },
}

impl InspectError {
    /// Shorthand for an [`InspectError::InvalidIndex`] with a formatted message
    pub(crate) fn invalid_index(msg: impl Into<String>) -> Self {
        InspectError::InvalidIndex { msg: msg.into() }
    }

    /// Whether this error is a closed pipe on the output side
    ///
    /// A downstream reader that stops early (`refinspect idx | head`) closes
    /// the pipe; that is not a failure of the inspection itself.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, InspectError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}
