//! Stage-level error type shared by every pipeline stage and the HTTP layer.

use std::fmt;

/// Stable, machine-readable classification of a [`StageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Generation,
    Synthesis,
    Animation,
    Timeout,
    Cancelled,
    Encoding,
    Auth,
    Upload,
    InvalidPath,
    NotFound,
    FileSystem,
}

impl ErrorKind {
    /// Upper-case code used in HTTP error bodies.
    pub fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Generation => "GENERATION_ERROR",
            Self::Synthesis => "SYNTHESIS_ERROR",
            Self::Animation => "ANIMATION_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::Encoding => "ENCODING_ERROR",
            Self::Auth => "AUTH_ERROR",
            Self::Upload => "UPLOAD_ERROR",
            Self::InvalidPath => "INVALID_PATH",
            Self::NotFound => "NOT_FOUND",
            Self::FileSystem => "FILESYSTEM_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure of a single stage.
///
/// Every stage catches its own remote and subprocess failures and converts
/// them into one of these variants with a human-readable message. Nothing
/// here is retried.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Missing, empty or oversized input, raised before any remote call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The text-generation service failed or returned nothing usable.
    #[error("Script generation failed: {0}")]
    Generation(String),

    /// The speech-synthesis service failed.
    #[error("Voice synthesis failed: {0}")]
    Synthesis(String),

    /// The animation service failed or reported a failed job.
    #[error("Animation failed: {0}")]
    Animation(String),

    /// An asynchronous remote job did not finish inside its wait budget.
    #[error("Timed out after {waited_secs}s waiting for {what}")]
    Timeout { what: String, waited_secs: u64 },

    /// The caller cancelled the stage while it was waiting.
    #[error("Cancelled while waiting for {0}")]
    Cancelled(String),

    /// The local media-encoding tool exited unsuccessfully.
    #[error("Encoding failed (exit code {exit_code:?}): {diagnostics}")]
    Encoding {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    /// Missing or rejected credentials for the hosting platform.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The hosting platform rejected or failed the transfer.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// A path that resolves outside the artifact directory, or is otherwise
    /// not a plain file name.
    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    NotFound(String),

    /// Unreadable or unwritable artifact.
    #[error("File system error: {0}")]
    FileSystem(String),
}

impl StageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Generation(_) => ErrorKind::Generation,
            Self::Synthesis(_) => ErrorKind::Synthesis,
            Self::Animation(_) => ErrorKind::Animation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Upload(_) => ErrorKind::Upload,
            Self::InvalidPath(_) => ErrorKind::InvalidPath,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::FileSystem(_) => ErrorKind::FileSystem,
        }
    }

    /// Wrap an I/O failure on `path` as a [`StageError::FileSystem`].
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path.display().to_string());
        }
        Self::FileSystem(format!("{}: {err}", path.display()))
    }
}

/// Convenience alias for stage return values.
pub type StageResult<T> = Result<T, StageError>;
