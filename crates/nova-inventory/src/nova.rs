use async_trait::async_trait;
use nova_api::{ApiVersion, NovaClient, RawBackupSchedule, RawFlavor, RawImage, RawServer};
use tracing::info;

use crate::Result;
use crate::config::CollectorConfig;
use crate::source::ComputeSource;

/// Compute source backed by the nova HTTP API.
///
/// Delegates to `nova_api::NovaClient` for all HTTP calls.
pub struct NovaSource {
    client: NovaClient,
    /// Reporting label only. The endpoint always comes from the configured URL.
    region: Option<String>,
}

impl NovaSource {
    pub fn new(config: &CollectorConfig) -> Self {
        let mut client = NovaClient::new(&config.compute_url, &config.auth_token);
        if let Some(project) = &config.project_id {
            client = client.with_project_id(project);
        }

        info!(
            endpoint = client.base_url(),
            api_version = client.version().as_str(),
            region = config.region_name.as_deref().unwrap_or("<default>"),
            "nova: compute source configured"
        );

        Self {
            client,
            region: config.region_name.clone(),
        }
    }

    /// Build from the environment, see [`CollectorConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(&CollectorConfig::from_env()?))
    }

    pub fn api_version(&self) -> ApiVersion {
        self.client.version()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

#[async_trait]
impl ComputeSource for NovaSource {
    async fn list_flavors(&self) -> Result<Vec<RawFlavor>> {
        Ok(self.client.list_flavors().await?)
    }

    async fn list_images(&self) -> Result<Vec<RawImage>> {
        Ok(self.client.list_images().await?)
    }

    async fn list_servers(&self) -> Result<Vec<RawServer>> {
        Ok(self.client.list_servers().await?)
    }

    async fn backup_schedule(&self, server_id: &str) -> Result<Option<RawBackupSchedule>> {
        Ok(self.client.backup_schedule(server_id).await?)
    }
}
