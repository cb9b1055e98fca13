//! Error taxonomy for dataset access, remote collaborators and address parsing.

use std::path::PathBuf;

/// Errors produced when an address cannot be parsed for checksumming.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("address must have 40 hex digits after 0x, got {len}: {address}")]
    InvalidLength { address: String, len: usize },

    #[error("address contains non-hex characters: {0}")]
    NonHex(String),
}

/// Errors produced by the on-disk dataset helpers.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The dataset root itself cannot be read. Nothing else can succeed.
    #[error("dataset root unreadable at {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rename target already exists: {0}")]
    TargetExists(PathBuf),
}

impl RepoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepoError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        RepoError::Json {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort a whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RepoError::RootUnreadable { .. })
    }
}

/// Errors produced by remote list providers.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// No connection could be made at all.
    #[error("remote endpoint unreachable {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("HTTP error from {url}: {message}")]
    Http { url: String, message: String },

    #[error("unexpected payload from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl RemoteError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        let message = err.to_string();
        if err.is_connect() {
            RemoteError::Unreachable { url, message }
        } else if err.is_decode() {
            RemoteError::Decode { url, message }
        } else {
            RemoteError::Http { url, message }
        }
    }

    /// Whether this error must abort a whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RemoteError::Unreachable { .. } | RemoteError::Client(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unreadable_is_fatal() {
        let err = RepoError::RootUnreadable {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("dataset root unreadable"));

        let err = RepoError::io("/nope/file", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_remote_error_fatality() {
        let err = RemoteError::Unreachable {
            url: "https://example.invalid".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.is_fatal());

        let err = RemoteError::Http {
            url: "https://example.invalid".to_string(),
            message: "429 Too Many Requests".to_string(),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("429"));
    }
}
