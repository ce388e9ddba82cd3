use crate::asana::DEFAULT_BASE_URL;
use crate::binding::{is_list_key, BindingSpec};
use crate::error::{CoreError, Result};
use crate::taxonomy::Taxonomy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "wipflow.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_env() -> String {
    "ASANA_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            workspace_id: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token(&self) -> Result<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "access token not set: export {} with a personal access token",
                    self.token_env
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Taxonomy snapshot, relative to the config file's directory.
    #[serde(default = "default_taxonomy")]
    pub taxonomy: PathBuf,
    /// Label appended to every automated comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub bindings: BindingSpec,
}

fn default_taxonomy() -> PathBuf {
    PathBuf::from("config.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            taxonomy: default_taxonomy(),
            device: None,
            api: ApiConfig::default(),
            bindings: BindingSpec::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Where the taxonomy snapshot lives for a config loaded from
    /// `config_path`.
    pub fn taxonomy_path(&self, config_path: &Path) -> PathBuf {
        if self.taxonomy.is_absolute() {
            return self.taxonomy.clone();
        }
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.taxonomy)
    }

    pub fn load_taxonomy(&self, config_path: &Path) -> Result<Taxonomy> {
        let path = self.taxonomy_path(config_path);
        if !path.exists() {
            return Err(CoreError::Config(format!(
                "taxonomy snapshot not found: {}",
                path.display()
            )));
        }
        Taxonomy::load(&path)
    }

    /// Configured workspace, falling back to the one recorded in the
    /// snapshot.
    pub fn workspace_id(&self, taxonomy: &Taxonomy) -> Option<String> {
        self.api
            .workspace_id
            .clone()
            .or_else(|| taxonomy.workspace_id.clone())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.api.base_url.trim().is_empty() {
            warnings.push(ConfigWarning::error("api.base_url is empty"));
        }
        if self.api.timeout_secs == 0 {
            warnings.push(ConfigWarning::error(
                "api.timeout_secs is 0; every request would time out",
            ));
        }
        if self.api.token_env.trim().is_empty() {
            warnings.push(ConfigWarning::error("api.token_env is empty"));
        }
        if self.taxonomy.as_os_str().is_empty() {
            warnings.push(ConfigWarning::error("taxonomy path is empty"));
        }
        if !self.device.as_deref().is_some_and(|d| !d.trim().is_empty()) {
            warnings.push(ConfigWarning::warning(
                "no default device; pass --device or set WIPFLOW_DEVICE",
            ));
        }

        for key in self.bindings.missing_keys() {
            warnings.push(ConfigWarning::error(format!(
                "binding key '{key}' is missing; rename its name, not its key"
            )));
        }

        let mut seen = HashSet::new();
        for key in self.bindings.all_keys() {
            if !seen.insert(key) {
                warnings.push(ConfigWarning::error(format!(
                    "binding key '{key}' is defined more than once"
                )));
            }
        }

        // Users are assigned one at a time, so a list key there is a typo.
        for entry in &self.bindings.users {
            if is_list_key(&entry.key) {
                warnings.push(ConfigWarning::warning(format!(
                    "user key '{}' ends in 'S' and will bind every user named '{}'",
                    entry.key, entry.name
                )));
            }
        }

        for entry in self
            .bindings
            .sections
            .iter()
            .chain(&self.bindings.tags)
            .chain(&self.bindings.users)
        {
            if entry.name.trim().is_empty() {
                warnings.push(ConfigWarning::error(format!(
                    "binding key '{}' has an empty name",
                    entry.key
                )));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
