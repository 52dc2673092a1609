use super::issue_error::ConfigError;
use reqwest::Url;
use std::fmt;
use std::time::Duration;

const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
const DEFAULT_TEMPLATE_PATH: &str = "description-template.txt";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Process-wide settings, read once at startup and handed to whoever needs them.
#[derive(Clone)]
pub struct BridgeConfig {
    pub api_token: String,
    pub project_id: String,
    pub gitlab_url: Url,
    pub template_path: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingEnv(key));

        let api_token = require("GITLAB_API_TOKEN")?;
        let project_id = require("GITLAB_PROJECT_ID")?;

        let raw_url = get("GITLAB_URL").unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string());
        let gitlab_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidValue("GITLAB_URL", format!("{}: {}", raw_url, e)))?;

        let port: u16 = match get("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", v))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs: u64 = match get("GITLAB_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GITLAB_TIMEOUT_SECS", v))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_token,
            project_id,
            gitlab_url,
            template_path: get("DESCRIPTION_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_TEMPLATE_PATH.to_string()),
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("api_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("gitlab_url", &self.gitlab_url.as_str())
            .field("template_path", &self.template_path)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
