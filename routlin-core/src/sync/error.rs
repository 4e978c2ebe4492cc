//! Sync client error types.

/// Errors that can occur while talking to the sync server.
#[derive(Debug)]
pub enum SyncError {
    /// No account is logged in locally
    NotLoggedIn,
    /// Failed to connect to server
    ConnectionError(String),
    /// Request failed before a response was read
    HttpError(String),
    /// Server answered with an error body
    Server { status: u16, message: String },
    /// Response body did not match the protocol
    InvalidResponse(String),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::NotLoggedIn => {
                write!(f, "Not logged in. Run 'routlin account login' first.")
            }
            SyncError::ConnectionError(e) => write!(f, "Connection error: {}", e),
            SyncError::HttpError(e) => write!(f, "HTTP error: {}", e),
            SyncError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            SyncError::InvalidResponse(e) => write!(f, "Invalid server response: {}", e),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            SyncError::ConnectionError(err.to_string())
        } else if err.is_decode() {
            SyncError::InvalidResponse(err.to_string())
        } else {
            SyncError::HttpError(err.to_string())
        }
    }
}
