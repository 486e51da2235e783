use thiserror::Error;

/// Errors that can occur when accessing a storage backend
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UnifsError {
    // ============================================================================
    // Normalized Backend Errors
    // ============================================================================
    /// The path is absent. ENOENT, HTTP 404 and FTP 550 all end up here.
    #[error("not found: {path}{}", fmt_cause(.cause))]
    NotFound {
        path: String,
        cause: Option<String>,
    },

    /// Opaque backend failure carrying the backend's own diagnostic text.
    #[error("{message}{}", fmt_cause(.cause))]
    Backend {
        message: String,
        cause: Option<String>,
    },

    // ============================================================================
    // Guard Errors
    // ============================================================================
    #[error("cannot read a directory: {path}")]
    IsDirectory { path: String },

    #[error("destination already exists: {path}")]
    AlreadyExists { path: String },

    #[error("directory not empty: {path}")]
    DirectoryNotEmpty { path: String },

    // ============================================================================
    // I/O and Protocol Errors
    // ============================================================================
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("HTTP client error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("FTP error: {source}")]
    Ftp {
        #[from]
        source: suppaftp::FtpError,
    },

    #[error("WebDAV request failed with HTTP {status}: {message}")]
    Webdav { status: u16, message: String },

    #[error("Malformed WebDAV response: {message}")]
    Xml { message: String },
}

fn fmt_cause(cause: &Option<String>) -> String {
    match cause {
        Some(cause) => format!("\ncaused by: {}", cause),
        None => String::new(),
    }
}

impl UnifsError {
    /// Create a not-found error for a path
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            cause: None,
        }
    }

    /// Create a not-found error that keeps the backend's native diagnostic
    pub fn not_found_with_cause(path: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            cause: Some(cause.into()),
        }
    }

    /// Create an opaque backend error with a message
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
            cause: None,
        }
    }

    /// Create an opaque backend error with a chained cause
    pub fn backend_with_cause(msg: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn is_directory(path: impl Into<String>) -> Self {
        Self::IsDirectory { path: path.into() }
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    pub fn directory_not_empty(path: impl Into<String>) -> Self {
        Self::DirectoryNotEmpty { path: path.into() }
    }

    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml {
            message: msg.into(),
        }
    }

    /// Whether this is the normalized "path is absent" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, UnifsError>;
