//! Configuration resolution.
//!
//! Priority order:
//! 1. Command-line flags (applied by the caller after loading)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::celestrak::DEFAULT_SATCAT_URL;
use crate::discos::DEFAULT_DISCOS_URL;
use crate::provider_policy::{DiscosPolicy, SpaceTrackPolicy};
use crate::qsmag::DEFAULT_QSMAG_URL;
use crate::spacetrack::{SpaceTrackCredentials, DEFAULT_SPACETRACK_URL};
use crate::ValidationError;

pub const ENV_DATA_DIR: &str = "SATQUERY_DATA_DIR";
pub const ENV_SATCAT_PATH: &str = "SATQUERY_SATCAT_PATH";
pub const ENV_QSMAG_PATH: &str = "SATQUERY_QSMAG_PATH";
pub const ENV_QSMAG_URL: &str = "SATQUERY_QSMAG_URL";
pub const ENV_DISCOS_URL: &str = "SATQUERY_DISCOS_URL";
pub const ENV_DISCOS_TOKEN: &str = "SATQUERY_DISCOS_TOKEN";
pub const ENV_SPACETRACK_USER: &str = "SATQUERY_SPACETRACK_USER";
pub const ENV_SPACETRACK_PASSWORD: &str = "SATQUERY_SPACETRACK_PASSWORD";

const DISCOS_TOKEN_FILE: &str = "discos-token";
const SPACETRACK_LOGIN_FILE: &str = "spacetrack-login";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SatqueryConfig {
    pub data_dir: Option<PathBuf>,
    pub satcat_path: Option<PathBuf>,
    pub qsmag_path: Option<PathBuf>,
    pub satcat_url: String,
    pub satcat_max_age_days: u64,
    pub qsmag_url: String,
    pub qsmag_max_age_days: u64,
    pub discos: DiscosConfig,
    pub spacetrack: SpaceTrackConfig,
}

impl Default for SatqueryConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            satcat_path: None,
            qsmag_path: None,
            satcat_url: String::from(DEFAULT_SATCAT_URL),
            satcat_max_age_days: 7,
            qsmag_url: String::from(DEFAULT_QSMAG_URL),
            qsmag_max_age_days: 180,
            discos: DiscosConfig::default(),
            spacetrack: SpaceTrackConfig::default(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscosConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub page_size: u32,
    pub pages_per_cooldown: u32,
    pub cooldown_secs: u64,
    /// Largest SATCAT id list forwarded to DISCOS by merged queries.
    pub id_bound: usize,
    pub timeout_ms: u64,
}

impl Default for DiscosConfig {
    fn default() -> Self {
        let policy = DiscosPolicy::default();
        Self {
            base_url: String::from(DEFAULT_DISCOS_URL),
            token: None,
            page_size: policy.page_size,
            pages_per_cooldown: policy.pages_per_cooldown,
            cooldown_secs: policy.cooldown.as_secs(),
            id_bound: 1000,
            timeout_ms: 30_000,
        }
    }
}

impl std::fmt::Debug for DiscosConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscosConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("page_size", &self.page_size)
            .field("pages_per_cooldown", &self.pages_per_cooldown)
            .field("cooldown_secs", &self.cooldown_secs)
            .field("id_bound", &self.id_bound)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpaceTrackConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub batch_size: usize,
    pub quota_per_minute: u32,
}

impl Default for SpaceTrackConfig {
    fn default() -> Self {
        let policy = SpaceTrackPolicy::default();
        Self {
            base_url: String::from(DEFAULT_SPACETRACK_URL),
            username: None,
            password: None,
            batch_size: policy.batch_size,
            quota_per_minute: policy.quota_limit,
        }
    }
}

impl std::fmt::Debug for SpaceTrackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceTrackConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("batch_size", &self.batch_size)
            .field("quota_per_minute", &self.quota_per_minute)
            .finish()
    }
}

impl SatqueryConfig {
    /// Loads the TOML file (explicit path, or the per-user default when it
    /// exists) and applies environment overrides.
    pub async fn load(path: Option<&Path>) -> Result<Self, ValidationError> {
        let config = match path {
            Some(path) => Self::from_file(path).await?,
            None => match default_config_path() {
                Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => {
                    Self::from_file(&path).await?
                }
                _ => Self::default(),
            },
        };
        Ok(config.apply_env_from(|name| std::env::var(name).ok()))
    }

    pub async fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|error| {
            ValidationError::Config(format!("cannot read {}: {error}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ValidationError> {
        toml::from_str(contents).map_err(|error| ValidationError::Config(error.to_string()))
    }

    /// Overrides fields from environment-style lookups.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = lookup(ENV_SATCAT_PATH) {
            self.satcat_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(ENV_QSMAG_PATH) {
            self.qsmag_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup(ENV_QSMAG_URL) {
            self.qsmag_url = url;
        }
        if let Some(url) = lookup(ENV_DISCOS_URL) {
            self.discos.base_url = url;
        }
        if let Some(token) = lookup(ENV_DISCOS_TOKEN) {
            self.discos.token = Some(token);
        }
        if let Some(username) = lookup(ENV_SPACETRACK_USER) {
            self.spacetrack.username = Some(username);
        }
        if let Some(password) = lookup(ENV_SPACETRACK_PASSWORD) {
            self.spacetrack.password = Some(password);
        }
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn satcat_path(&self) -> PathBuf {
        self.satcat_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join("satcat.csv"))
    }

    pub fn qsmag_path(&self) -> PathBuf {
        self.qsmag_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join("qs.mag"))
    }

    pub fn satcat_max_age(&self) -> Duration {
        days(self.satcat_max_age_days)
    }

    pub fn qsmag_max_age(&self) -> Duration {
        days(self.qsmag_max_age_days)
    }

    /// Configured DISCOS token, falling back to `<data_dir>/discos-token`.
    pub async fn discos_token(&self) -> Result<String, ValidationError> {
        let configured = self.discos.token.as_deref().map(str::trim);
        if let Some(token) = configured.filter(|token| !token.is_empty()) {
            return Ok(token.to_owned());
        }

        let path = self.data_dir().join(DISCOS_TOKEN_FILE);
        tokio::fs::read_to_string(&path)
            .await
            .ok()
            .and_then(|contents| contents.lines().next().map(|line| line.trim().to_owned()))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ValidationError::MissingCredential {
                name: "DISCOS token",
                env: ENV_DISCOS_TOKEN,
                path: path.display().to_string(),
            })
    }

    /// Configured Space-Track login, falling back to `<data_dir>/spacetrack-login`.
    pub async fn spacetrack_credentials(&self) -> Result<SpaceTrackCredentials, ValidationError> {
        if let (Some(username), Some(password)) =
            (&self.spacetrack.username, &self.spacetrack.password)
        {
            return Ok(SpaceTrackCredentials::new(username.as_str(), password.as_str()));
        }

        let path = self.data_dir().join(SPACETRACK_LOGIN_FILE);
        tokio::fs::read_to_string(&path)
            .await
            .ok()
            .and_then(|contents| SpaceTrackCredentials::from_login_file(&contents))
            .ok_or_else(|| ValidationError::MissingCredential {
                name: "Space-Track login",
                env: ENV_SPACETRACK_USER,
                path: path.display().to_string(),
            })
    }

    pub fn discos_policy(&self) -> DiscosPolicy {
        DiscosPolicy {
            page_size: self.discos.page_size.max(1),
            pages_per_cooldown: self.discos.pages_per_cooldown,
            cooldown: Duration::from_secs(self.discos.cooldown_secs),
        }
    }

    pub fn spacetrack_policy(&self) -> SpaceTrackPolicy {
        SpaceTrackPolicy {
            batch_size: self.spacetrack.batch_size.max(1),
            quota_limit: self.spacetrack.quota_per_minute,
            ..SpaceTrackPolicy::default()
        }
    }
}

fn days(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(24 * 60 * 60))
}

/// `<config_dir>/satquery/config.toml` for the current user.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("satquery").join("config.toml"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("satquery"))
        .unwrap_or_else(|| PathBuf::from("./satquery_data"))
}
