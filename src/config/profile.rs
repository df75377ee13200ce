use crate::clients::{instagram, tiktok};
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{validate_secret, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const HIKERAPI_TOKEN_VAR: &str = "HIKERAPI_TOKEN";
pub const LAMATOK_KEY_VAR: &str = "LAMATOK_KEY";

const DEFAULT_INSTAGRAM_TIMEOUT_SECS: u64 = 30;

/// API credentials and endpoints, loaded from a TOML file or the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub instagram: InstagramProfile,
    #[serde(default)]
    pub tiktok: TikTokProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramProfile {
    #[serde(default = "default_instagram_base_url")]
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikTokProfile {
    #[serde(default = "default_tiktok_base_url")]
    pub base_url: String,
    pub access_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

fn default_instagram_base_url() -> String {
    instagram::DEFAULT_BASE_URL.to_string()
}

fn default_tiktok_base_url() -> String {
    tiktok::DEFAULT_BASE_URL.to_string()
}

impl Default for InstagramProfile {
    fn default() -> Self {
        Self {
            base_url: default_instagram_base_url(),
            token: None,
            timeout_seconds: None,
        }
    }
}

impl Default for TikTokProfile {
    fn default() -> Self {
        Self {
            base_url: default_tiktok_base_url(),
            access_key: None,
            timeout_seconds: None,
        }
    }
}

impl InstagramProfile {
    pub fn token(&self) -> Result<&str> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ScoutError::MissingConfigError {
                field: HIKERAPI_TOKEN_VAR.to_string(),
            })?;
        validate_secret(HIKERAPI_TOKEN_VAR, token)?;
        Ok(token)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_INSTAGRAM_TIMEOUT_SECS))
    }
}

impl TikTokProfile {
    pub fn access_key(&self) -> Result<&str> {
        let key = self
            .access_key
            .as_deref()
            .ok_or_else(|| ScoutError::MissingConfigError {
                field: LAMATOK_KEY_VAR.to_string(),
            })?;
        validate_secret(LAMATOK_KEY_VAR, key)?;
        Ok(key)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(tiktok::DEFAULT_TIMEOUT)
    }
}

impl Profile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        let mut profile: Profile =
            toml::from_str(&processed).map_err(|e| ScoutError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        profile.fill_from_env();
        Ok(profile)
    }

    /// Defaults plus whatever credentials the environment provides.
    pub fn from_env() -> Self {
        let mut profile = Profile::default();
        profile.fill_from_env();
        profile
    }

    fn fill_from_env(&mut self) {
        if self.instagram.token.is_none() {
            self.instagram.token = std::env::var(HIKERAPI_TOKEN_VAR).ok();
        }
        if self.tiktok.access_key.is_none() {
            self.tiktok.access_key = std::env::var(LAMATOK_KEY_VAR).ok();
        }
    }
}

impl Validate for Profile {
    fn validate(&self) -> Result<()> {
        validate_url("instagram.base_url", &self.instagram.base_url)?;
        validate_url("tiktok.base_url", &self.tiktok.base_url)?;
        Ok(())
    }
}

/// Replaces `${VAR}` with the variable's value. Unset variables stay as written.
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex");
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}
