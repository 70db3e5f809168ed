use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Path every route is nested under; empty serves from the root.
    #[serde(default)]
    pub api_prefix: String,
    /// Browser origin allowed to send credentialed requests.
    pub cors_origin: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_token: TokenConfig,
    pub refresh_token: TokenConfig,
}

#[derive(Deserialize, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub expiration_seconds: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("expiration_seconds", &self.expiration_seconds)
            .finish()
    }
}

impl From<&TokenConfig> for auth::TokenSettings {
    fn from(token: &TokenConfig) -> Self {
        auth::TokenSettings {
            secret: token.secret.clone(),
            expiration_seconds: token.expiration_seconds,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_TOKEN__SECRET, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// Token secrets are never committed to the config files, so they must
    /// come from the environment.
    ///
    /// # Errors
    /// Fails when a source cannot be parsed or a token section is unusable.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::from_sources(&run_mode, Environment::default().separator("__"))
    }

    fn from_sources(run_mode: &str, environment: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__REFRESH_TOKEN__SECRET=... overrides jwt.refresh_token.secret
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject token sections the server cannot sign with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_token("jwt.access_token", &self.jwt.access_token)?;
        validate_token("jwt.refresh_token", &self.jwt.refresh_token)
    }
}

fn validate_token(section: &str, token: &TokenConfig) -> Result<(), ConfigError> {
    if token.secret.trim().is_empty() {
        return Err(ConfigError::Message(format!("{section}.secret must be set")));
    }
    if token.expiration_seconds <= 0 {
        return Err(ConfigError::Message(format!(
            "{section}.expiration_seconds must be positive, got {}",
            token.expiration_seconds
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(access_secret: &str, refresh_expiration: i64) -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgres://localhost/identity".to_string(),
            },
            server: ServerConfig {
                http_port: 3000,
                api_prefix: String::new(),
                cors_origin: None,
            },
            jwt: JwtConfig {
                access_token: TokenConfig {
                    secret: access_secret.to_string(),
                    expiration_seconds: 900,
                },
                refresh_token: TokenConfig {
                    secret: "refresh-secret".to_string(),
                    expiration_seconds: refresh_expiration,
                },
            },
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(config("access-secret", 604800).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let err = config("  ", 604800).validate().unwrap_err();
        assert!(err.to_string().contains("jwt.access_token.secret"));
    }

    #[test]
    fn test_validate_rejects_non_positive_expiration() {
        let err = config("access-secret", 0).validate().unwrap_err();
        assert!(err.to_string().contains("jwt.refresh_token.expiration_seconds"));
    }

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::default().separator("__").source(Some(source))
    }

    #[test]
    fn test_secrets_are_read_from_environment() {
        let config = Config::from_sources(
            "production",
            environment(&[
                ("DATABASE__URL", "postgres://db.internal/identity"),
                ("SERVER__HTTP_PORT", "8080"),
                ("JWT__ACCESS_TOKEN__SECRET", "env-access-secret"),
                ("JWT__ACCESS_TOKEN__EXPIRATION_SECONDS", "900"),
                ("JWT__REFRESH_TOKEN__SECRET", "env-refresh-secret"),
                ("JWT__REFRESH_TOKEN__EXPIRATION_SECONDS", "604800"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database.url, "postgres://db.internal/identity");
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.jwt.access_token.secret, "env-access-secret");
        assert_eq!(config.jwt.access_token.expiration_seconds, 900);
        assert_eq!(config.jwt.refresh_token.secret, "env-refresh-secret");
        assert_eq!(config.jwt.refresh_token.expiration_seconds, 604800);
    }

    #[test]
    fn test_missing_environment_secret_is_rejected() {
        let err = Config::from_sources(
            "production",
            environment(&[
                ("DATABASE__URL", "postgres://db.internal/identity"),
                ("SERVER__HTTP_PORT", "8080"),
                ("JWT__ACCESS_TOKEN__EXPIRATION_SECONDS", "900"),
                ("JWT__REFRESH_TOKEN__SECRET", "env-refresh-secret"),
                ("JWT__REFRESH_TOKEN__EXPIRATION_SECONDS", "604800"),
            ]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("jwt.access_token.secret"));
    }

    #[test]
    fn test_development_files_carry_no_secrets() {
        let err = Config::from_sources("development", environment(&[])).unwrap_err();

        assert!(err.to_string().contains("secret must be set"));
    }

    #[test]
    fn test_token_secret_is_redacted() {
        let output = format!("{:?}", config("access-secret", 604800));
        assert!(!output.contains("access-secret"));
        assert!(!output.contains("refresh-secret"));
    }
}
