//! graphql response envelope
//!
//! `{ data, errors }` wrapper returned by the introspection endpoint.

use serde::{Deserialize, Serialize};

/// graphql response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    /// response data or null if errors
    pub data: Option<T>,
    /// graphql errors array
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// all error messages on one line, with their `extensions.code` when present
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|err| match err.code() {
                Some(code) => format!("{code}: {}", err.message),
                None => err.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// graphql error entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default)]
    pub locations: Vec<GraphQlLocation>,
    /// response path
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// optional extensions payload
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    /// `extensions.code`, if the server sent one
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

/// graphql error location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: i64,
    /// column number (1-based)
    pub column: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_errors() {
        let ok: GraphQlResponse<serde_json::Value> = GraphQlResponse {
            data: Some(serde_json::json!({"ok": true})),
            errors: vec![],
        };
        assert!(!ok.has_errors());

        let err: GraphQlResponse<serde_json::Value> =
            serde_json::from_str(r#"{"errors": [{"message": "boom"}]}"#).unwrap();
        assert!(err.has_errors());
        assert!(err.data.is_none());
    }

    #[test]
    fn test_error_summary() {
        let response: GraphQlResponse<serde_json::Value> = serde_json::from_str(
            r#"{
                "data": null,
                "errors": [
                    {"message": "field not found", "extensions": {"code": "validation-failed", "path": "$.selectionSet"}},
                    {"message": "second"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            response.error_summary(),
            "validation-failed: field not found; second"
        );
    }
}
