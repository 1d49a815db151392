//! Shipthis Core Library
//!
//! Transport-free building blocks shared by Shipthis API clients:
//! - Client configuration
//! - Route templates and request descriptions
//! - Request payload models
//! - Validation errors

pub mod config;
pub mod error;
pub mod models;
pub mod request;
pub mod route;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::ValidationError;
pub use models::*;
pub use request::RequestSpec;
pub use route::{Route, Verb};
