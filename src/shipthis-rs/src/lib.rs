//! Shipthis Client Library
//!
//! Async HTTP client for the Shipthis public REST API.
//!
//! ```rust,no_run
//! use shipthis_rs::{Client, ClientConfig, ListQuery};
//!
//! #[tokio::main]
//! async fn main() -> shipthis_rs::Result<()> {
//!     let client = Client::new(
//!         ClientConfig::new("demo")
//!             .with_api_key("your_api_key")
//!             .with_region_location("usa", "new_york"),
//!     )?;
//!
//!     let invoices = client.get_list("invoice", &ListQuery::new().count(2)).await?;
//!     println!("{} invoices", invoices.len());
//!     Ok(())
//! }
//! ```

mod client;
mod collection;
mod headers;
mod response;
pub mod telemetry;
mod upload;

pub use client::Client;
pub use collection::Collection;
pub use response::ApiResponse;
pub use shipthis_core::{
    BulkEdit, ClientConfig, ConnectInfo, ConversationQuery, CreateOptions, ListQuery,
    PrimaryWorkflowAction, ReportQuery, RequestSpec, Route, SecondaryWorkflowAction, SortOrder,
    ValidationError, Verb,
};

/// The three failure families a caller needs to tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials missing or rejected (401/403)
    Auth,
    /// Well-formed request rejected by the server
    Request,
    /// Transport failure, malformed response, or a local problem
    Api,
}

#[derive(Debug, thiserror::Error)]
pub enum ShipthisError {
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Request failed ({status}): {message}")]
    Request {
        status: u16,
        message: String,
        details: serde_json::Value,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from server ({status}): {message}")]
    InvalidResponse { status: u16, message: String },

    #[error("Invalid header {name:?}")]
    InvalidHeader { name: String },

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShipthisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShipthisError::Auth { .. } => ErrorKind::Auth,
            ShipthisError::Request { .. } => ErrorKind::Request,
            _ => ErrorKind::Api,
        }
    }

    /// HTTP status reported by the server, if the call got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            ShipthisError::Auth { status, .. }
            | ShipthisError::Request { status, .. }
            | ShipthisError::InvalidResponse { status, .. } => Some(*status),
            ShipthisError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ShipthisError::Request { status: 404, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ShipthisError::Transport(e) if e.is_timeout())
    }

    /// Response body attached to a request failure
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            ShipthisError::Request { details, .. } => Some(details),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShipthisError>;
