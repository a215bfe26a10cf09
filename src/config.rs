//! Environment configuration, following the OpenLineage client variables.

use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "api/v1/lineage";
pub const DEFAULT_NAMESPACE: &str = "frame";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Integration label carried in the job type facet.
pub const INTEGRATION: &str = "FRAME";

#[derive(Debug, Clone, PartialEq)]
pub enum TransportConfig {
    Http(HttpConfig),
    /// Events are written to the log.
    Console,
    /// Emission disabled.
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub url: Url,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Parses a collector base URL. Only `http`/`https` with a host are accepted.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
        let has_host = url.host_str().map_or(false, |h| !h.is_empty());
        if !matches!(url.scheme(), "http" | "https") || !has_host {
            return Err(ConfigError::InvalidUrl(raw.to_string()));
        }
        Ok(Self::new(url))
    }

    /// Full collector URL: the endpoint appended to the base path with exactly
    /// one slash between.
    pub fn target(&self) -> String {
        let mut target = self.url.clone();
        let path = format!(
            "{}/{}",
            self.url.path().trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        );
        target.set_path(&path);
        target.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineageConfig {
    pub transport: TransportConfig,
    /// Explicit job name. Always wins over the caller-location fallback.
    pub job_name: Option<String>,
    pub job_namespace: String,
    pub integration: String,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::Console,
            job_name: None,
            job_namespace: DEFAULT_NAMESPACE.to_string(),
            integration: INTEGRATION.to_string(),
        }
    }
}

impl LineageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let disabled = get("OPENLINEAGE_DISABLED")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let transport = if disabled {
            TransportConfig::Noop
        } else if let Some(url) = get("OPENLINEAGE_URL") {
            let mut http = HttpConfig::parse(&url)?;
            if let Some(endpoint) = get("OPENLINEAGE_ENDPOINT") {
                http.endpoint = endpoint;
            }
            http.api_key = get("OPENLINEAGE_API_KEY");
            if let Some(raw) = get("OPENLINEAGE_TIMEOUT") {
                http.timeout = parse_timeout(&raw)?;
            }
            TransportConfig::Http(http)
        } else {
            TransportConfig::Console
        };

        Ok(Self {
            transport,
            job_name: get("OPENLINEAGE_JOB_NAME"),
            job_namespace: get("OPENLINEAGE_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            integration: INTEGRATION.to_string(),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidTimeout(raw.to_string()));
    }
    Ok(Duration::from_secs_f64(secs))
}
