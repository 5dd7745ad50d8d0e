use std::env;

use serde::Deserialize;
use tracing::info;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_env")]
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_exp: u16,
    pub jwt_refresh_exp: u16,
    pub redis_url: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// seconds a user's notification list is kept after its last change
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl: u64,
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_ai_history_limit")]
    pub ai_history_limit: u32,
}

fn default_env() -> String {
    "file".to_string()
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_notification_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_ai_history_limit() -> u32 {
    10
}

impl Config {
    /// Api key with blank values treated as unset.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

pub fn get_config() -> anyhow::Result<Config> {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
    Ok(envy::from_env::<Config>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            env: "server".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            prefix: None,
            database_url: "postgres://localhost/soulmate".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_exp: 60,
            jwt_refresh_exp: 120,
            redis_url: "redis://127.0.0.1/".to_string(),
            log_dir: default_log_dir(),
            notification_ttl: default_notification_ttl(),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            ai_history_limit: default_ai_history_limit(),
        }
    }

    #[test]
    fn test_blank_gemini_api_key_is_unset() {
        let mut config = sample_config();
        assert_eq!(config.gemini_api_key(), None);
        config.gemini_api_key = Some("   ".to_string());
        assert_eq!(config.gemini_api_key(), None);
        config.gemini_api_key = Some("abc".to_string());
        assert_eq!(config.gemini_api_key(), Some("abc"));
    }
}
