//! Loads the station config and opens a session against the live service.

use anyhow::Context;
use std::path::{Path, PathBuf};
use wipflow_core::asana::AsanaClient;
use wipflow_core::config::Config;
use wipflow_core::session::Session;
use wipflow_core::taxonomy::Taxonomy;

pub struct Station {
    pub config_path: PathBuf,
    pub config: Config,
}

impl Station {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let config = Config::load(config_path).context("failed to load config")?;
        Ok(Self {
            config_path: config_path.to_path_buf(),
            config,
        })
    }

    pub fn taxonomy(&self) -> anyhow::Result<Taxonomy> {
        self.config
            .load_taxonomy(&self.config_path)
            .context("failed to load taxonomy snapshot")
    }

    /// `--device` wins over the config file; one of them must be set.
    pub fn device(&self, flag: Option<&str>) -> anyhow::Result<String> {
        flag.or(self.config.device.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .context("no device label: pass --device, set WIPFLOW_DEVICE, or add `device:` to the config")
    }

    /// Everything is checked locally before the client is built, so a bad
    /// setup fails without touching the network.
    pub fn open(&self, device: Option<&str>) -> anyhow::Result<Session<AsanaClient>> {
        let device = self.device(device)?;
        let taxonomy = self.taxonomy()?;
        let api = &self.config.api;
        let token = api.token()?;
        let workspace = self
            .config
            .workspace_id(&taxonomy)
            .context("no workspace id: set api.workspace_id or workspace_id in the snapshot")?;

        let client = AsanaClient::new(&api.base_url, token, workspace, api.timeout())
            .context("failed to build HTTP client")?;
        Session::open(client, taxonomy, &self.config.bindings, device)
            .context("failed to bind taxonomy")
    }
}
