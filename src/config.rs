use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node: NodeConfig,
    pub perms: PermsConfig,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone, Default)]
pub struct PermsConfig {
    /// Base URL of the permission resolver. Unset denies every
    /// cross-identity operation.
    pub resolver_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Deadline offset for OTP tokens
    pub otp_ttl_seconds: u64,
    /// Background sweep period
    pub sweep_interval_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            otp_ttl_seconds: 3600,
            sweep_interval_seconds: 86_400, // 24 hours
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let resolver_url = std::env::var("PERMS_URL").ok().filter(|s| !s.is_empty());

        let otp_ttl_seconds = std::env::var("OTP_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let sweep_interval_seconds = std::env::var("SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        let config = Config {
            node: NodeConfig {
                bind_address,
                data_dir,
            },
            perms: PermsConfig { resolver_url },
            tokens: TokenConfig {
                otp_ttl_seconds,
                sweep_interval_seconds,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.otp_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "OTP_TTL_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.tokens.sweep_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SWEEP_INTERVAL_SECONDS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
