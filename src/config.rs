use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub kyc_api_base_url: String,
    pub kyc_api_token: Option<String>,
    pub http_timeout_secs: Option<u64>, // No timeout unless configured
    pub session_ttl_secs: u64,
    pub max_sessions: u64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            kyc_api_base_url: std::env::var("KYC_API_BASE_URL")
                .map_err(|_| anyhow::anyhow!("KYC_API_BASE_URL environment variable required"))
                .and_then(|url| validate_base_url(&url).map(|_| url))?,
            kyc_api_token: std::env::var("KYC_API_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            http_timeout_secs: std::env::var("KYC_HTTP_TIMEOUT_SECS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.parse::<u64>().map_err(|_| {
                        anyhow::anyhow!("KYC_HTTP_TIMEOUT_SECS must be a whole number of seconds")
                    })
                })
                .transpose()?,
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SESSION_TTL_SECS must be a whole number of seconds"))
                .and_then(|ttl: u64| {
                    if ttl == 0 {
                        anyhow::bail!("SESSION_TTL_SECS must be greater than zero");
                    }
                    Ok(ttl)
                })?,
            max_sessions: std::env::var("MAX_SESSIONS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_SESSIONS must be a positive number"))?,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a positive number"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("KYC API Base URL: {}", config.kyc_api_base_url);
        if config.kyc_api_token.is_some() {
            tracing::debug!("KYC API token configured");
        }
        if let Some(timeout) = config.http_timeout_secs {
            tracing::debug!("KYC API timeout: {}s", timeout);
        }
        tracing::debug!(
            "Sessions: max {}, idle TTL {}s",
            config.max_sessions,
            config.session_ttl_secs
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Configuration pointing at `base_url` with every other value at its default.
    pub fn for_backend(base_url: impl Into<String>) -> Self {
        Self {
            port: 8080,
            kyc_api_base_url: base_url.into(),
            kyc_api_token: None,
            http_timeout_secs: None,
            session_ttl_secs: 1800,
            max_sessions: 1000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

fn validate_base_url(url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("KYC_API_BASE_URL cannot be empty");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("KYC_API_BASE_URL must start with http:// or https://");
    }
    url::Url::parse(url).map_err(|e| anyhow::anyhow!("KYC_API_BASE_URL is not a valid URL: {}", e))?;
    Ok(())
}
