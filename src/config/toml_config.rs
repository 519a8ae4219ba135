use crate::config::{
    DEFAULT_AGGREGATE_LIMIT, DEFAULT_AUTH_TOKEN, DEFAULT_TIMEOUT_SECONDS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::{validate_required_field, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub required: Option<bool>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub limit: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProxyError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProxyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProxyError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_required_field("server.port", &self.server.port)?;
        validate_url("upstream.base_url", &self.upstream.base_url)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn port(&self) -> u16 {
        self.server.port.unwrap_or_default()
    }

    fn upstream_base_url(&self) -> &str {
        &self.upstream.base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.upstream
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn require_auth(&self) -> bool {
        self.auth.required.unwrap_or(true)
    }

    fn auth_token(&self) -> &str {
        self.auth.token.as_deref().unwrap_or(DEFAULT_AUTH_TOKEN)
    }

    fn aggregate_limit(&self) -> usize {
        self.aggregation.limit.unwrap_or(DEFAULT_AGGREGATE_LIMIT)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_toml_config() {
        let toml_content = r#"
[server]
port = 4100

[upstream]
base_url = "https://api.example.com"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.port(), 4100);
        assert_eq!(config.request_timeout_seconds(), 10);
        assert!(config.require_auth());
        assert_eq!(config.auth_token(), "demo-token");
        assert_eq!(config.aggregate_limit(), 10);
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
port = 8080

[upstream]
base_url = "http://localhost:3000"
timeout_seconds = 20

[auth]
required = false
token = "other"

[aggregation]
limit = 5
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let resolved = ServiceConfig::from_provider(&config);

        assert_eq!(resolved.port, 8080);
        assert_eq!(resolved.request_timeout_seconds, 20);
        assert!(!resolved.require_auth);
        assert_eq!(resolved.auth_token, "other");
        assert_eq!(resolved.aggregate_limit, 5);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("POSTS_PROXY_TEST_TOKEN", "secret-from-env");

        let toml_content = r#"
[server]
port = 4000

[upstream]
base_url = "https://api.example.com"

[auth]
token = "${POSTS_PROXY_TEST_TOKEN}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.auth_token(), "secret-from-env");

        std::env::remove_var("POSTS_PROXY_TEST_TOKEN");
    }

    #[test]
    fn test_unknown_env_var_is_left_as_written() {
        let toml_content = r#"
[server]
port = 4000

[upstream]
base_url = "${POSTS_PROXY_SURELY_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.upstream.base_url, "${POSTS_PROXY_SURELY_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_port_fails_validation() {
        let toml_content = r#"
[server]

[upstream]
base_url = "https://api.example.com"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ProxyError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(ProxyError::ConfigError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[server]
port = 4242

[upstream]
base_url = "https://api.example.com"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.port(), 4242);
    }
}
