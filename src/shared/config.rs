//! Application configuration. Bot credentials, admins, delivery targets.

use crate::domain::DomainError;
use config::ConfigError;
use serde::{Deserialize, Deserializer, de};
use std::collections::HashSet;

/// Default long-poll timeout for chat updates, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u32 = 10;

/// Default social API base URL.
pub const DEFAULT_SOCIAL_API_URL: &str = "https://api.twitter.com";

#[derive(Deserialize, Default)]
pub struct AppConfig {
    /// Telegram bot token. Read from BRIDGE_BOT_TOKEN.
    pub bot_token: Option<String>,

    /// Numeric user ids allowed to post and to run admin commands.
    /// Read from BRIDGE_ADMINS as a comma-separated list.
    #[serde(default, deserialize_with = "admin_ids")]
    pub admins: Vec<i64>,

    /// Chat id every post is re-broadcast to. Read from BRIDGE_BROADCAST_CHANNEL.
    pub broadcast_channel: Option<i64>,

    /// OAuth 2.0 user access token for the social API. Read from BRIDGE_SOCIAL_ACCESS_TOKEN.
    /// When unset the social handler is not started.
    #[serde(default)]
    pub social_access_token: Option<String>,

    /// Social API base URL. Read from BRIDGE_SOCIAL_API_URL.
    #[serde(default)]
    pub social_api_url: Option<String>,

    /// Long-poll timeout in seconds. Read from BRIDGE_POLL_TIMEOUT_SECS.
    #[serde(default)]
    pub poll_timeout_secs: Option<u32>,

    /// Deployment environment name; "PROD" marks production. Read from BRIDGE_ENVIRONMENT.
    #[serde(default)]
    pub environment: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("admins", &self.admins)
            .field("broadcast_channel", &self.broadcast_channel)
            .field(
                "social_access_token",
                &self.social_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("social_api_url", &self.social_api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("environment", &self.environment)
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(Self::environment(), std::env::var("BRIDGE_CONFIG").ok())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("BRIDGE").try_parsing(true)
    }

    fn load_from(env: config::Environment, file: Option<String>) -> Result<Self, ConfigError> {
        let mut c = config::Config::builder().add_source(env);
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Fails with the first required key that has no value.
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing =
            |key: &str| DomainError::Config(format!("required key {} missing value", key));
        if self.bot_token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(missing("BRIDGE_BOT_TOKEN"));
        }
        if self.admins.is_empty() {
            return Err(missing("BRIDGE_ADMINS"));
        }
        if self.broadcast_channel.is_none() {
            return Err(missing("BRIDGE_BROADCAST_CHANNEL"));
        }
        Ok(())
    }

    pub fn bot_token(&self) -> String {
        self.bot_token.clone().unwrap_or_default()
    }

    pub fn admin_set(&self) -> HashSet<i64> {
        self.admins.iter().copied().collect()
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn broadcast_channel(&self) -> i64 {
        self.broadcast_channel.unwrap_or_default()
    }

    /// Returns the social access token when the social target is configured.
    pub fn social_access_token(&self) -> Option<String> {
        self.social_access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn social_api_url_or_default(&self) -> String {
        self.social_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SOCIAL_API_URL.to_string())
    }

    pub fn poll_timeout_secs_or_default(&self) -> u32 {
        self.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS)
    }

    pub fn is_prod(&self) -> bool {
        self.environment.as_deref() == Some("PROD")
    }
}

/// A lone numeric env value arrives as an integer, a list as a string, a file list as a sequence.
fn admin_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(i64),
        Many(Vec<i64>),
        Listed(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::One(id) => Ok(vec![id]),
        Raw::Many(ids) => Ok(ids),
        Raw::Listed(list) => list
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<i64>()
                    .map_err(|e| de::Error::custom(format!("invalid admin id {:?}: {}", id, e)))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_from(AppConfig::environment().source(Some(source)), None)
    }

    fn complete() -> AppConfig {
        AppConfig {
            bot_token: Some("asdfg".into()),
            admins: vec![12345],
            broadcast_channel: Some(9876543),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_complete_config_validates() {
        let cfg = complete();
        assert!(cfg.validate().is_ok());
        assert!(cfg.is_admin(12345));
        assert!(!cfg.is_admin(1));
        assert_eq!(cfg.poll_timeout_secs_or_default(), DEFAULT_POLL_TIMEOUT_SECS);
        assert_eq!(cfg.social_api_url_or_default(), DEFAULT_SOCIAL_API_URL);
        assert!(cfg.social_access_token().is_none());
    }

    #[test]
    fn test_missing_keys_are_named() {
        let mut cfg = complete();
        cfg.broadcast_channel = None;
        assert_eq!(
            cfg.validate().unwrap_err().to_string(),
            "configuration error: required key BRIDGE_BROADCAST_CHANNEL missing value"
        );

        let mut cfg = complete();
        cfg.admins.clear();
        assert!(cfg.validate().unwrap_err().to_string().contains("BRIDGE_ADMINS"));

        let mut cfg = complete();
        cfg.bot_token = Some(" ".into());
        assert!(cfg.validate().unwrap_err().to_string().contains("BRIDGE_BOT_TOKEN"));
    }

    #[test]
    fn test_is_prod() {
        let mut cfg = complete();
        assert!(!cfg.is_prod());
        cfg.environment = Some("PROD".into());
        assert!(cfg.is_prod());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut cfg = complete();
        cfg.social_access_token = Some("secret-token".into());
        let debug = format!("{:?}", cfg);
        assert!(!debug.contains("asdfg"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_load_single_admin() {
        let cfg = from_vars(&[
            ("BRIDGE_BOT_TOKEN", "123:abc"),
            ("BRIDGE_ADMINS", "12345"),
            ("BRIDGE_BROADCAST_CHANNEL", "-100987"),
        ])
        .unwrap();
        assert_eq!(cfg.admins, vec![12345]);
        assert_eq!(cfg.broadcast_channel(), -100987);
        assert_eq!(cfg.bot_token(), "123:abc");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_admin_list() {
        let cfg = from_vars(&[
            ("BRIDGE_BOT_TOKEN", "123:abc"),
            ("BRIDGE_ADMINS", "1,2,3"),
            ("BRIDGE_BROADCAST_CHANNEL", "-100987"),
            ("BRIDGE_POLL_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(cfg.admins, vec![1, 2, 3]);
        assert_eq!(cfg.poll_timeout_secs_or_default(), 30);
        assert!(cfg.validate().is_ok());

        let cfg = from_vars(&[("BRIDGE_ADMINS", " 4, 5 ,")]).unwrap();
        assert_eq!(cfg.admins, vec![4, 5]);
    }

    #[test]
    fn test_load_rejects_non_numeric_admin() {
        assert!(from_vars(&[("BRIDGE_ADMINS", "1,bob")]).is_err());
    }

    #[test]
    fn test_load_without_admins_fails_validation() {
        let cfg = from_vars(&[
            ("BRIDGE_BOT_TOKEN", "123:abc"),
            ("BRIDGE_BROADCAST_CHANNEL", "-100987"),
        ])
        .unwrap();
        assert!(cfg.admins.is_empty());
        assert!(cfg.validate().unwrap_err().to_string().contains("BRIDGE_ADMINS"));
    }
}
