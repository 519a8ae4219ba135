pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_url, Validate,
};
use std::time::Duration;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_AUTH_TOKEN: &str = "demo-token";
pub const DEFAULT_AGGREGATE_LIMIT: usize = 10;

/// Settings resolved once at startup and passed explicitly to the client and router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub upstream_base_url: String,
    pub request_timeout_seconds: u64,
    pub require_auth: bool,
    pub auth_token: String,
    pub aggregate_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            require_auth: true,
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            aggregate_limit: DEFAULT_AGGREGATE_LIMIT,
        }
    }
}

impl ServiceConfig {
    pub fn from_provider<C: ConfigProvider + ?Sized>(provider: &C) -> Self {
        Self {
            port: provider.port(),
            upstream_base_url: provider
                .upstream_base_url()
                .trim_end_matches('/')
                .to_string(),
            request_timeout_seconds: provider.request_timeout_seconds(),
            require_auth: provider.require_auth(),
            auth_token: provider.auth_token().to_string(),
            aggregate_limit: provider.aggregate_limit(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl ConfigProvider for ServiceConfig {
    fn port(&self) -> u16 {
        self.port
    }

    fn upstream_base_url(&self) -> &str {
        &self.upstream_base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds
    }

    fn require_auth(&self) -> bool {
        self.require_auth
    }

    fn auth_token(&self) -> &str {
        &self.auth_token
    }

    fn aggregate_limit(&self) -> usize {
        self.aggregate_limit
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_range("server.port", self.port, 1, u16::MAX)?;
        validate_url("upstream.base_url", &self.upstream_base_url)?;
        validate_range("upstream.timeout_seconds", self.request_timeout_seconds, 1, 300)?;
        validate_range("aggregation.limit", self.aggregate_limit, 1, 100)?;
        if self.require_auth {
            validate_non_empty_string("auth.token", &self.auth_token)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "posts-proxy")]
#[command(about = "HTTP backend proxying a JSONPlaceholder-style posts API")]
pub struct CliConfig {
    #[arg(long, env = "PORT", help = "Listen port [default: 4000]")]
    pub port: Option<u16>,

    #[arg(long, env = "UPSTREAM_BASE_URL", help = "Upstream base URL [default: jsonplaceholder]")]
    pub upstream_base_url: Option<String>,

    #[arg(long, help = "Upstream request timeout [default: 10]")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Disable the bearer token check on mutating routes")]
    pub no_auth: bool,

    #[arg(long, env = "API_TOKEN", help = "Bearer token for mutating routes [default: demo-token]")]
    pub auth_token: Option<String>,

    #[arg(long, help = "Posts aggregated by the comment endpoints [default: 10]")]
    pub aggregate_limit: Option<usize>,

    #[arg(long, help = "Load base settings from a TOML file; flags still override it")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Builds the validated service settings.
    ///
    /// Starts from the TOML file when `--config` is given (defaults otherwise)
    /// and layers every explicit flag or environment value on top.
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let base = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                let file_config = toml_config::TomlConfig::from_file(path)?;
                file_config.validate()?;
                ServiceConfig::from_provider(&file_config)
            }
            None => ServiceConfig::default(),
        };

        let resolved = self.layer_over(base);
        resolved.validate()?;
        Ok(resolved)
    }

    fn layer_over(&self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = &self.upstream_base_url {
            config.upstream_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.request_timeout_seconds = timeout;
        }
        if self.no_auth {
            config.require_auth = false;
        }
        if let Some(token) = &self.auth_token {
            config.auth_token = token.clone();
        }
        if let Some(limit) = self.aggregate_limit {
            config.aggregate_limit = limit;
        }

        if self.config.is_some() && self.has_overrides() {
            tracing::info!("Command line and environment values override the config file");
        }
        config
    }

    fn has_overrides(&self) -> bool {
        self.port.is_some()
            || self.upstream_base_url.is_some()
            || self.timeout_seconds.is_some()
            || self.no_auth
            || self.auth_token.is_some()
            || self.aggregate_limit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.auth_token, "demo-token");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_url = ServiceConfig {
            upstream_base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let zero_limit = ServiceConfig {
            aggregate_limit: 0,
            ..Default::default()
        };
        assert!(zero_limit.validate().is_err());

        let blank_token = ServiceConfig {
            auth_token: " ".to_string(),
            ..Default::default()
        };
        assert!(blank_token.validate().is_err());

        let blank_token_without_auth = ServiceConfig {
            auth_token: String::new(),
            require_auth: false,
            ..Default::default()
        };
        assert!(blank_token_without_auth.validate().is_ok());
    }

    #[test]
    fn test_from_provider_trims_trailing_slash() {
        let source = ServiceConfig {
            upstream_base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let resolved = ServiceConfig::from_provider(&source);
        assert_eq!(resolved.upstream_base_url, "http://localhost:9000");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_flags_resolve() {
        let cli = CliConfig::parse_from([
            "posts-proxy",
            "--port",
            "8081",
            "--upstream-base-url",
            "http://127.0.0.1:3000",
            "--no-auth",
            "--aggregate-limit",
            "5",
        ]);
        let resolved = cli.resolve().unwrap();
        assert_eq!(resolved.port, 8081);
        assert_eq!(resolved.upstream_base_url, "http://127.0.0.1:3000");
        assert!(!resolved.require_auth);
        assert_eq!(resolved.aggregate_limit, 5);
        assert_eq!(resolved.request_timeout_seconds, 10);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_rejects_invalid_timeout() {
        let cli = CliConfig::parse_from(["posts-proxy", "--timeout-seconds", "0"]);
        assert!(cli.resolve().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_flags_layer_over_config_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[server]
port = 5000

[upstream]
base_url = "https://api.example.com/"
timeout_seconds = 20

[auth]
required = true
token = "from-file"
"#,
            )
            .unwrap();
        let path = temp_file.path().to_string_lossy().to_string();

        let file_only = CliConfig::parse_from(["posts-proxy", "--config", path.as_str()]);
        let resolved = file_only.resolve().unwrap();
        assert_eq!(resolved.port, 5000);
        assert_eq!(resolved.upstream_base_url, "https://api.example.com");
        assert!(resolved.require_auth);
        assert_eq!(resolved.auth_token, "from-file");

        let layered = CliConfig::parse_from([
            "posts-proxy",
            "--config",
            path.as_str(),
            "--port",
            "6000",
            "--no-auth",
            "--auth-token",
            "from-flag",
        ]);
        let resolved = layered.resolve().unwrap();
        assert_eq!(resolved.port, 6000);
        assert!(!resolved.require_auth);
        assert_eq!(resolved.auth_token, "from-flag");
        assert_eq!(resolved.upstream_base_url, "https://api.example.com");
        assert_eq!(resolved.request_timeout_seconds, 20);
    }
}
