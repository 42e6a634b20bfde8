use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
    pub verify_code_ttl: chrono::Duration,
    pub gemini: Option<GeminiConfig>,
    pub mail: Option<MailConfig>,
}

pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

pub struct MailConfig {
    pub endpoint: String,
    pub api_key: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = get("MURMUR_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("MURMUR_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = or("MURMUR_PORT", "3000")
            .parse()
            .context("MURMUR_PORT must be a port number")?;
        let session_days: i64 = or("MURMUR_SESSION_DAYS", "30")
            .parse()
            .context("MURMUR_SESSION_DAYS must be an integer")?;
        let code_minutes: i64 = or("MURMUR_VERIFY_CODE_MINUTES", "60")
            .parse()
            .context("MURMUR_VERIFY_CODE_MINUTES must be an integer")?;

        let gemini = get("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: or("GEMINI_MODEL", murmur_api::gemini::DEFAULT_MODEL),
        });
        if gemini.is_none() {
            info!("GEMINI_API_KEY not set; AI endpoints will return errors");
        }

        let mail = match (get("MAIL_API_URL"), get("MAIL_API_KEY"), get("MAIL_FROM")) {
            (Some(endpoint), Some(api_key), Some(from)) => Some(MailConfig {
                endpoint,
                api_key,
                from,
            }),
            (None, None, None) => None,
            _ => bail!("MAIL_API_URL, MAIL_API_KEY and MAIL_FROM must be set together"),
        };

        Ok(Self {
            host: or("MURMUR_HOST", "0.0.0.0"),
            port,
            db_path: or("MURMUR_DB_PATH", "murmur.db").into(),
            jwt_secret,
            session_ttl: chrono::Duration::days(session_days),
            verify_code_ttl: chrono::Duration::minutes(code_minutes),
            gemini,
            mail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("MURMUR_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("murmur.db"));
        assert_eq!(config.verify_code_ttl, chrono::Duration::hours(1));
        assert_eq!(config.session_ttl, chrono::Duration::days(30));
        assert!(config.gemini.is_none());
        assert!(config.mail.is_none());
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(load(&[]).is_err());
        assert!(load(&[("MURMUR_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn partial_mail_config_is_refused() {
        let result = load(&[
            ("MURMUR_JWT_SECRET", "a-real-secret"),
            ("MAIL_API_URL", "https://mail.example.com/send"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn gemini_model_override() {
        let config = load(&[
            ("MURMUR_JWT_SECRET", "a-real-secret"),
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
        ])
        .unwrap();
        assert_eq!(config.gemini.unwrap().model, "gemini-2.0-flash");
    }
}
