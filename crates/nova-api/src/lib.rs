//! Typed Rust client for the OpenStack compute ("nova") API.
//!
//! Covers the read-only subset needed for inventory collection:
//! flavors, images, servers (detail listings) and legacy backup schedules.
//!
//! Token issuance is out of scope: the client is handed a token that was
//! obtained elsewhere, together with the compute endpoint URL.

mod types;

pub use reqwest::StatusCode;
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nova api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("nova api {endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compute API generation, selected from the endpoint URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1_0,
    V1_1,
}

impl ApiVersion {
    /// `v1.1` anywhere in the URL selects the 1.1 generation. v2 endpoints
    /// serve the same shapes as 1.1. Everything else is treated as 1.0.
    pub fn from_url(url: &str) -> Self {
        if url.contains("v1.1") || url.contains("/v2") {
            Self::V1_1
        } else {
            Self::V1_0
        }
    }

    /// Only 1.0 exposes `/servers/{id}/backup_schedule`.
    pub fn has_backup_schedules(&self) -> bool {
        matches!(self, Self::V1_0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        }
    }
}

/// Client for the compute REST API.
#[derive(Clone)]
pub struct NovaClient {
    base_url: String,
    token: String,
    project_id: Option<String>,
    version: ApiVersion,
    http: reqwest::Client,
}

impl NovaClient {
    pub fn new(compute_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = compute_url.into().trim_end_matches('/').to_string();
        let version = ApiVersion::from_url(&base_url);
        Self {
            base_url,
            token: token.into(),
            project_id: None,
            version,
            http: reqwest::Client::new(),
        }
    }

    /// Scope requests to a tenant via `X-Auth-Project-Id`.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .get(self.url(path))
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json");

        match &self.project_id {
            Some(project) => builder.header("X-Auth-Project-Id", project),
            None => builder,
        }
    }

    async fn check(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { endpoint, status, body });
        }
        Ok(resp)
    }

    // ── Flavors ──────────────────────────────────────────────────────

    pub async fn list_flavors(&self) -> Result<Vec<RawFlavor>> {
        let resp = self.get("/flavors/detail").send().await?;

        let list: ListFlavorsResponse = Self::check(resp, "list flavors").await?.json().await?;
        Ok(list.flavors)
    }

    // ── Images ───────────────────────────────────────────────────────

    pub async fn list_images(&self) -> Result<Vec<RawImage>> {
        let resp = self.get("/images/detail").send().await?;

        let list: ListImagesResponse = Self::check(resp, "list images").await?.json().await?;
        Ok(list.images)
    }

    // ── Servers ──────────────────────────────────────────────────────

    pub async fn list_servers(&self) -> Result<Vec<RawServer>> {
        let resp = self.get("/servers/detail").send().await?;

        let list: ListServersResponse = Self::check(resp, "list servers").await?.json().await?;
        Ok(list.servers)
    }

    /// Fetch the backup schedule of a server.
    ///
    /// Returns `Ok(None)` when the deployment has no backup support: on the
    /// 1.1 generation, and when the endpoint answers 404 or 501.
    pub async fn backup_schedule(&self, server_id: &str) -> Result<Option<RawBackupSchedule>> {
        if !self.version.has_backup_schedules() {
            return Ok(None);
        }

        let resp = self
            .get(&format!("/servers/{server_id}/backup_schedule"))
            .send()
            .await?;

        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::NOT_IMPLEMENTED) {
            return Ok(None);
        }

        let schedule: BackupScheduleResponse =
            Self::check(resp, "get backup schedule").await?.json().await?;
        Ok(Some(schedule.backup_schedule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://servers.api.rackspacecloud.com/v1.0/123456", ApiVersion::V1_0 ; "legacy endpoint")]
    #[test_case("https://nova.example.com:8774/v1.1/tenant", ApiVersion::V1_1 ; "v1.1 endpoint")]
    #[test_case("https://nova.example.com:8774/v2/tenant", ApiVersion::V1_1 ; "v2 endpoint")]
    #[test_case("https://nova.example.com:8774/", ApiVersion::V1_0 ; "unversioned endpoint")]
    fn test_version_from_url(url: &str, expected: ApiVersion) {
        assert_eq!(ApiVersion::from_url(url), expected);
    }

    #[test]
    fn test_backup_schedules_only_on_v1_0() {
        assert!(ApiVersion::V1_0.has_backup_schedules());
        assert!(!ApiVersion::V1_1.has_backup_schedules());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = NovaClient::new("https://nova.example.com/v1.1/tenant/", "token");

        assert_eq!(client.base_url(), "https://nova.example.com/v1.1/tenant");
        assert_eq!(client.url("/servers/detail"), "https://nova.example.com/v1.1/tenant/servers/detail");
        assert_eq!(client.version(), ApiVersion::V1_1);
    }

    #[tokio::test]
    async fn test_v1_1_backup_schedule_skips_request() {
        // Unroutable host: any request would fail, so Ok(None) proves none was sent.
        let client = NovaClient::new("http://127.0.0.1:9/v1.1/tenant", "token");

        let schedule = client.backup_schedule("847424").await.unwrap();
        assert!(schedule.is_none());
    }
}
