/// Scan station configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | POS_SERVER_URL | http://localhost:8069 | POS server base URL |
/// | POS_CONFIG_ID | 1 | POS configuration id sent with barcode lookups |
/// | POS_API_TOKEN | (unset) | Bearer token for the JSON-RPC calls |
/// | RPC_TIMEOUT_SECS | (unset) | Client-side timeout; unset waits indefinitely |
/// | LOG_LEVEL | info | Log level / filter directive |
/// | LOG_DIR | (unset) | Daily rolling log files go here, created if missing |
/// | LOG_JSON | false | JSON formatted logs |
/// | LOCAL_FALLBACK | true | Search the local cache when the server finds nothing |
/// | MATCH_SHARED_BARCODE | true | Local search also matches template shared barcodes |
///
/// # Example
///
/// ```ignore
/// POS_SERVER_URL=http://pos.local:8069 POS_CONFIG_ID=3 cargo run -p variant-scan
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub pos_config_id: i64,
    pub api_token: Option<String>,
    pub rpc_timeout_secs: Option<u64>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// Fall back to the local cache when the remote lookup yields nothing
    pub local_fallback: bool,
    /// Let the local fallback match template-level shared barcodes
    pub match_shared_barcode: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables use their defaults.
    pub fn from_env() -> Self {
        Self {
            server_url: std::env::var("POS_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:8069".into()),
            pos_config_id: std::env::var("POS_CONFIG_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            api_token: std::env::var("POS_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            rpc_timeout_secs: std::env::var("RPC_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            local_fallback: std::env::var("LOCAL_FALLBACK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            match_shared_barcode: std::env::var("MATCH_SHARED_BARCODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Override the connection settings
    ///
    /// Mostly used in tests
    pub fn with_overrides(server_url: impl Into<String>, pos_config_id: i64) -> Self {
        let mut config = Self::from_env();
        config.server_url = server_url.into();
        config.pos_config_id = pos_config_id;
        config
    }

    /// Client configuration for the JSON-RPC transport
    pub fn client_config(&self) -> pos_client::ClientConfig {
        let mut client = pos_client::ClientConfig::new(self.server_url.clone());
        if let Some(token) = &self.api_token {
            client = client.with_token(token.clone());
        }
        if let Some(seconds) = self.rpc_timeout_secs {
            client = client.with_timeout(seconds);
        }
        client
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
