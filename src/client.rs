//! introspection client
//!
//! posts the fixed introspection query to an endpoint and hands back the
//! decoded `__schema` payload.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::graphql::GraphQlResponse;
use crate::introspection::{IntrospectionData, IntrospectionSchema, INTROSPECTION_QUERY};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// graphql client used to pull a remote schema
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl Client {
    /// create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = match &config.http_client {
            Some(http) => http.clone(),
            None => reqwest::Client::builder()
                .default_headers(config.extra_headers.clone())
                .user_agent(config.user_agent.clone())
                .timeout(config.timeout)
                .danger_accept_invalid_certs(!config.verify_ssl)
                .build()?,
        };

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// run the introspection query and return the `__schema` node
    pub async fn introspect(&self) -> Result<IntrospectionSchema> {
        self.introspect_with(|url, body| async move {
            let response = self.http.post(url).json(&body).send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok((status, text))
        })
        .await
    }

    pub(crate) async fn introspect_with<F, Fut>(&self, send: F) -> Result<IntrospectionSchema>
    where
        F: FnOnce(Url, serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let url = self.config.endpoint_url()?;
        info!(endpoint = %url, "pulling remote schema");
        let body = serde_json::json!({
            "query": INTROSPECTION_QUERY,
            "variables": {},
        });

        let (status, text) = send(url, body).await?;
        debug!(status = status.as_u16(), bytes = text.len(), "introspection response");
        let response: GraphQlResponse<IntrospectionData> = parse_graphql_response(status, text)?;
        response
            .data
            .and_then(|data| data.schema)
            .ok_or(Error::IncompleteIntrospection)
    }
}

fn parse_graphql_response<T: DeserializeOwned>(
    status: StatusCode,
    text: String,
) -> Result<GraphQlResponse<T>> {
    let parsed: GraphQlResponse<T> = match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(err) if !status.is_success() => {
            return Err(Error::GraphQl {
                status: Some(status.as_u16()),
                errors: Vec::new(),
                body: text,
                message: format!("graphql http error: {status} ({err})"),
            });
        }
        Err(err) => return Err(err.into()),
    };

    if parsed.has_errors() {
        let message = parsed.error_summary();
        return Err(Error::GraphQl {
            status: Some(status.as_u16()),
            errors: parsed.errors,
            body: text,
            message,
        });
    }

    if !status.is_success() {
        return Err(Error::GraphQl {
            status: Some(status.as_u16()),
            errors: Vec::new(),
            body: text,
            message: format!("graphql http error: {}", status),
        });
    }

    Ok(parsed)
}
