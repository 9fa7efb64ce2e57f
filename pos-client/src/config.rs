//! Client configuration

/// Client configuration for connecting to the POS server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8069")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds (None = wait for the server indefinitely)
    pub timeout: Option<u64>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: None,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<super::HttpClient> {
        super::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8069")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8069");
        assert!(config.timeout.is_none());
        assert!(config.token.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://pos.local")
            .with_token("secret")
            .with_timeout(5);
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Some(5));
    }
}
