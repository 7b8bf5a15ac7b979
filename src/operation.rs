//! generated operation contract
//!
//! every operation emitted by [`crate::codegen`] gets a unit struct that
//! implements this trait, so callers can post `QUERY` with their own client.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// graphql operation contract for generated types
pub trait Operation {
    /// printed, fragment-free operation text
    const QUERY: &'static str;
    /// operation name as written in the document
    const NAME: &'static str;
    /// `variables` payload
    type Variables: Serialize;
    /// `data` payload
    type Response: DeserializeOwned;

    /// request body for a graphql-over-http post
    fn request_body(variables: &Self::Variables) -> serde_json::Result<serde_json::Value> {
        Ok(serde_json::json!({
            "query": Self::QUERY,
            "operationName": Self::NAME,
            "variables": serde_json::to_value(variables)?,
        }))
    }
}
