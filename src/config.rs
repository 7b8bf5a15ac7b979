//! configuration
//!
//! [`ClientConfig`] describes the introspection endpoint; pass it to
//! [`crate::Client::new`]. [`GeneratorConfig`] carries the options consumed by
//! the builder, printer, and emitter.

use crate::error::{Error, Result};
use crate::introspection::ScalarNullability;
use crate::mapper::TypeNameMapper;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use url::Url;

/// configuration for the introspection client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// parsed endpoint, if the input was a valid url
    pub(crate) endpoint: Option<Url>,

    /// request timeout duration
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// whether to verify ssl certificates
    pub(crate) verify_ssl: bool,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,

    /// prebuilt http client, used as-is when set
    pub(crate) http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// create a new client configuration
    ///
    /// # arguments
    ///
    /// * `endpoint` - full url of the graphql endpoint
    ///
    /// # example
    ///
    /// ```
    /// use gqlcodegen::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com/graphql");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let raw = endpoint.as_ref();
        Self {
            raw_endpoint: raw.to_string(),
            endpoint: Url::parse(raw.trim()).ok(),
            timeout: Duration::from_secs(30),
            user_agent: format!("gqlcodegen/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            extra_headers: HeaderMap::new(),
            http_client: None,
        }
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// disable ssl certificate verification (not recommended for production)
    ///
    /// default: enabled
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// add a header given as `Name: value`, as accepted on the command line
    pub fn with_raw_header(self, raw: &str) -> Result<Self> {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("header must be `Name: value`: {raw}")))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|err| Error::Config(format!("invalid header name {name:?}: {err}")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|err| Error::Config(format!("invalid header value for {name}: {err}")))?;
        Ok(self.with_header(name, value))
    }

    /// access extra headers configured on this client
    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    /// inject a prebuilt http client.
    ///
    /// when set, the client is used as-is: headers, tls, timeouts, and user
    /// agent all come from it and the corresponding fields here are ignored.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.as_ref().ok_or_else(|| {
            Error::Config(format!("invalid endpoint url: {}", self.raw_endpoint))
        })?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                endpoint.scheme()
            )));
        }

        Ok(())
    }

    /// the validated endpoint url
    pub(crate) fn endpoint_url(&self) -> Result<Url> {
        self.validate()?;
        self.endpoint
            .clone()
            .ok_or_else(|| Error::Config(format!("invalid endpoint url: {}", self.raw_endpoint)))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.extra_headers.keys().map(|k| k.as_str()).collect();
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.raw_endpoint)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("extra_headers", &header_names)
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}

/// options for building, printing, and emitting
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// print builtin types, directives, and `__` fields
    pub emit_builtins: bool,
    /// keep `__`-prefixed introspection types when building from introspection
    pub include_builtins: bool,
    /// render every definition instead of only operation-referenced ones
    pub include_full_schema: bool,
    /// nullability of unwrapped scalar leaves in introspection payloads
    pub scalar_nullability: ScalarNullability,
    /// target names for scalars
    pub type_map: TypeNameMapper,
    /// one indentation level in printed graphql
    pub indent: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            emit_builtins: false,
            include_builtins: false,
            include_full_schema: false,
            scalar_nullability: ScalarNullability::default(),
            type_map: TypeNameMapper::default(),
            indent: "  ".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_emit_builtins(mut self, emit: bool) -> Self {
        self.emit_builtins = emit;
        self
    }

    pub fn with_include_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    pub fn with_full_schema(mut self, full: bool) -> Self {
        self.include_full_schema = full;
        self
    }

    pub fn with_scalar_nullability(mut self, policy: ScalarNullability) -> Self {
        self.scalar_nullability = policy;
        self
    }

    pub fn with_type_map(mut self, type_map: TypeNameMapper) -> Self {
        self.type_map = type_map;
        self
    }

    /// set the indentation unit; must be spaces or tabs
    pub fn with_indent(mut self, indent: impl Into<String>) -> Result<Self> {
        let indent = indent.into();
        if indent.is_empty() || !indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(Error::Config(format!(
                "indent must be non-empty spaces or tabs, got {indent:?}"
            )));
        }
        self.indent = indent;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = ClientConfig::new("https://api.example.com/graphql");
        assert_eq!(
            config.endpoint_url().unwrap().as_str(),
            "https://api.example.com/graphql"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.verify_ssl);
    }

    #[test]
    fn test_validation_invalid_url() {
        let config = ClientConfig::new("not a url");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_invalid_scheme() {
        let config = ClientConfig::new("ftp://example.com/graphql");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_raw_header() {
        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_raw_header("X-Hasura-Admin-Secret: s3cret")
            .unwrap()
            .with_raw_header("Authorization:Bearer a:b")
            .unwrap();
        assert_eq!(
            config.extra_headers().get("x-hasura-admin-secret").unwrap(),
            "s3cret"
        );
        assert_eq!(config.extra_headers().get("authorization").unwrap(), "Bearer a:b");

        let err = ClientConfig::new("https://api.example.com/graphql")
            .with_raw_header("no-separator")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-test"),
            HeaderValue::from_static("value"),
        );

        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("gqlcodegen-test")
            .with_ssl_verification(false)
            .with_headers(headers)
            .with_header(
                HeaderName::from_static("x-other"),
                HeaderValue::from_static("other"),
            );

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "gqlcodegen-test");
        assert!(!config.verify_ssl);
        assert_eq!(config.extra_headers.get("x-test").unwrap(), "value");
        assert_eq!(config.extra_headers.get("x-other").unwrap(), "other");
    }

    #[test]
    fn test_debug_hides_header_values() {
        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_raw_header("X-Secret: hunter2")
            .unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("x-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("http_client: false"));
    }

    #[test]
    fn test_generator_defaults() {
        let config = GeneratorConfig::default();
        assert!(!config.emit_builtins);
        assert!(!config.include_full_schema);
        assert_eq!(config.scalar_nullability, ScalarNullability::Nullable);
        assert_eq!(config.indent, "  ");
    }

    #[test]
    fn test_generator_indent_validation() {
        assert!(GeneratorConfig::default().with_indent("\t").is_ok());
        assert!(GeneratorConfig::default().with_indent("").is_err());
        assert!(GeneratorConfig::default().with_indent("--").is_err());
    }
}
