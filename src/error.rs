//! error types
//!
//! structured errors for transport, introspection payloads, schema building,
//! and operation documents. every variant aborts the current run.

use crate::graphql::GraphQlError;
use std::fmt;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the generator pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("graphql error: {message}")]
    GraphQl {
        /// http status if available
        status: Option<u16>,
        /// graphql error list
        errors: Vec<GraphQlError>,
        /// raw response body
        body: String,
        /// top-level message
        message: String,
    },

    #[error("introspection response has no __schema node")]
    IncompleteIntrospection,

    #[error("malformed type: {definition} references unknown type {reference}")]
    MalformedType {
        /// definition (or root role) holding the reference
        definition: String,
        /// the type name that could not be resolved
        reference: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unresolved fragment: {0}")]
    UnresolvedFragment(String),

    #[error("cyclic fragment: {0}")]
    CyclicFragment(String),
}

impl Error {
    /// true if the error came from the remote endpoint or the wire
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Http(_) | Error::GraphQl { .. })
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
