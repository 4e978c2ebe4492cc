//! Client side of the sync API.
//!
//! The server keeps one copy of each user's record. Login pulls it down,
//! sync pushes the whole local record up and the server reconciles by ID.

mod client;
mod error;
mod protocol;

pub use client::{check_server, ApiClient};
pub use error::SyncError;
pub use protocol::{
    normalize_username, AuthResponse, ChangePasswordRequest, Credentials, DeleteAccountRequest,
    ErrorResponse, HealthResponse, MessageResponse, SyncRequest, MIN_PASSWORD_LEN,
    MIN_USERNAME_LEN,
};
