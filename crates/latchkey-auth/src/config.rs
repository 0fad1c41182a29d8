//! Authorization server configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth.oauth]
//! authorization_code_lifetime = "10m"
//! access_token_lifetime = "1h"
//! refresh_token_lifetime = "30d"
//!
//! [auth.signing]
//! secret = "at-least-32-bytes-of-secret-material"
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::oauth::AuthorizationConfig;
use crate::token::jwt::MIN_SECRET_LEN;
use crate::token::service::TokenConfig;

/// Root authorization server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth 2.0 lifetimes.
    pub oauth: OAuthConfig,

    /// Access token signing configuration.
    pub signing: SigningConfig,
}

/// OAuth 2.0 configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600), // 30 days
        }
    }
}

impl OAuthConfig {
    /// Builds the authorization endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a lifetime is out of range.
    pub fn authorization_config(&self) -> Result<AuthorizationConfig, ConfigError> {
        Ok(AuthorizationConfig::default().with_code_lifetime(to_time(
            "oauth.authorization_code_lifetime",
            self.authorization_code_lifetime,
        )?))
    }

    /// Builds the token endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a lifetime is out of range.
    pub fn token_config(&self) -> Result<TokenConfig, ConfigError> {
        Ok(TokenConfig::default()
            .with_access_token_lifetime(to_time(
                "oauth.access_token_lifetime",
                self.access_token_lifetime,
            )?)
            .with_refresh_token_lifetime(to_time(
                "oauth.refresh_token_lifetime",
                self.refresh_token_lifetime,
            )?))
    }
}

fn to_time(name: &str, value: Duration) -> Result<time::Duration, ConfigError> {
    time::Duration::try_from(value)
        .map_err(|_| ConfigError::InvalidValue(format!("{name} is out of range")))
}

/// Token signing configuration.
///
/// The secret is process-wide: every instance validating tokens must be
/// started with the same value.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// HMAC-SHA256 secret, at least 32 bytes.
    #[serde(skip_serializing)]
    pub secret: String,
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Missing` if the signing secret is empty
    /// - `ConfigError::InvalidValue` if the secret is too short or a
    ///   lifetime is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing.secret.is_empty() {
            return Err(ConfigError::Missing("signing.secret".to_string()));
        }
        if self.signing.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "signing.secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        for (name, value) in [
            (
                "oauth.authorization_code_lifetime",
                self.oauth.authorization_code_lifetime,
            ),
            ("oauth.access_token_lifetime", self.oauth.access_token_lifetime),
            ("oauth.refresh_token_lifetime", self.oauth.refresh_token_lifetime),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue(format!("{name} must be > 0")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig {
            signing: SigningConfig {
                secret: "x".repeat(32),
            },
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = OAuthConfig::default();
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(600));
        assert_eq!(config.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(30 * 24 * 3600)
        );
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let missing = AuthConfig::default();
        assert!(matches!(missing.validate(), Err(ConfigError::Missing(_))));

        let mut short = valid();
        short.signing.secret = "short".to_string();
        assert!(matches!(short.validate(), Err(ConfigError::InvalidValue(_))));

        let mut zero = valid();
        zero.oauth.access_token_lifetime = Duration::ZERO;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_humantime_parsing() {
        let config: OAuthConfig = serde_json::from_str(
            r#"{"authorization_code_lifetime":"5m","access_token_lifetime":"2h"}"#,
        )
        .unwrap();
        assert_eq!(config.authorization_code_lifetime, Duration::from_secs(300));
        assert_eq!(config.access_token_lifetime, Duration::from_secs(7200));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(30 * 24 * 3600)
        );
    }

    #[test]
    fn test_service_configs() {
        let config = OAuthConfig::default();
        assert_eq!(
            config.authorization_config().unwrap().code_lifetime,
            time::Duration::minutes(10)
        );
        let token = config.token_config().unwrap();
        assert_eq!(token.access_token_lifetime, time::Duration::hours(1));
        assert_eq!(token.refresh_token_lifetime, time::Duration::days(30));
    }

    #[test]
    fn test_secret_not_in_debug_or_serialized() {
        let config = valid();
        assert!(!format!("{config:?}").contains(&config.signing.secret));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(&config.signing.secret));
    }
}
