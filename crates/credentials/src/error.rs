use std::path::PathBuf;

/// Failures of the credential store and the provider chain.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("Malformed credential data: {0}")]
    Format(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("No credentials available (tried: {0})")]
    NotFound(String),
}

impl CredentialError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type CredentialResult<T> = Result<T, CredentialError>;
