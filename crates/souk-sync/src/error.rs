//! # Sync Error Types
//!
//! Error types for remote backend operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Remote Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Service             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  MissingConfig  │  │  Http           │  │  Unauthorized (401/403) │ │
//! │  │  InvalidConfig  │  │                 │  │  NotFound (404/406)     │ │
//! │  │                 │  │                 │  │  Rejected (other 4xx/5xx)│ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Payload      │  │    Session      │                              │
//! │  │                 │  │                 │                              │
//! │  │  InvalidResponse│  │  NotSignedIn    │                              │
//! │  │  Serialization  │  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried. The caller sees the cause as the service
//! reported it.

use thiserror::Error;

/// Result type alias for remote operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A required environment variable is unset or empty.
    #[error("Missing configuration: {0} is not set")]
    MissingConfig(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never got a response (DNS, connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // =========================================================================
    // Service Errors
    // =========================================================================
    /// 401 or 403 from the service.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 404, or 406 for a single-row request that matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status, with the service's own message.
    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// A success response whose body has an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// The operation needs a signed-in session.
    #[error("Not signed in")]
    NotSignedIn,
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidConfig(format!("invalid URL: {}", err))
    }
}

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, SyncError::MissingConfig(_) | SyncError::InvalidConfig(_))
    }

    /// HTTP status reported by the service, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Unauthorized(_) => Some(401),
            SyncError::NotFound(_) => Some(404),
            SyncError::Rejected { status, .. } => Some(*status),
            SyncError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
