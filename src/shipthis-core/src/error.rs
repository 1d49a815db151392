/// Rejections raised before a request ever reaches the network
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("organisation is required")]
    MissingOrganisation,

    #[error("{field} must not be empty")]
    EmptySegment { field: &'static str },

    #[error("{field} contains a reserved character: {value:?}")]
    InvalidSegment { field: &'static str, value: String },

    #[error("base URL must start with http:// or https://: {0}")]
    InvalidBaseUrl(String),
}
