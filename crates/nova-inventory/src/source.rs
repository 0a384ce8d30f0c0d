use async_trait::async_trait;
use nova_api::{RawBackupSchedule, RawFlavor, RawImage, RawServer};
use tracing::{debug, info};

use crate::Result;

/// A server as listed, plus its backup schedule when the deployment has one.
#[derive(Debug, Clone, Default)]
pub struct ServerListing {
    pub server: RawServer,
    pub backup_schedule: Option<RawBackupSchedule>,
}

impl From<RawServer> for ServerListing {
    fn from(server: RawServer) -> Self {
        Self {
            server,
            backup_schedule: None,
        }
    }
}

/// Everything fetched in one collection cycle, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawInventory {
    pub flavors: Vec<RawFlavor>,
    pub images: Vec<RawImage>,
    pub servers: Vec<ServerListing>,
}

/// Read-only view of a compute deployment.
///
/// Implemented for the HTTP client in [`crate::nova`]; tests use in-memory
/// sources.
#[async_trait]
pub trait ComputeSource: Send + Sync {
    async fn list_flavors(&self) -> Result<Vec<RawFlavor>>;

    async fn list_images(&self) -> Result<Vec<RawImage>>;

    async fn list_servers(&self) -> Result<Vec<RawServer>>;

    /// `Ok(None)` means the deployment has no backup support for the server.
    async fn backup_schedule(&self, server_id: &str) -> Result<Option<RawBackupSchedule>>;
}

/// Fetch one cycle's worth of raw inventory.
///
/// The three list calls must all succeed. A failing backup schedule lookup
/// only loses that server's schedule.
pub async fn collect(source: &dyn ComputeSource) -> Result<RawInventory> {
    info!("requesting flavors, images and servers");

    let (flavors, images, servers) = tokio::try_join!(
        source.list_flavors(),
        source.list_images(),
        source.list_servers(),
    )?;

    info!(
        flavors = flavors.len(),
        images = images.len(),
        servers = servers.len(),
        "inventory fetched"
    );

    let mut listings = Vec::with_capacity(servers.len());
    for server in servers {
        let backup_schedule = match server.id_string() {
            Some(id) => match source.backup_schedule(&id).await {
                Ok(schedule) => schedule,
                Err(e) => {
                    debug!(server_id = %id, error = %e, "backup schedule unavailable");
                    None
                }
            },
            None => None,
        };
        listings.push(ServerListing {
            server,
            backup_schedule,
        });
    }

    Ok(RawInventory {
        flavors,
        images,
        servers: listings,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Error;
    use nova_api::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// In-memory compute deployment.
    #[derive(Default)]
    pub(crate) struct StaticSource {
        pub flavors: Vec<RawFlavor>,
        pub images: Vec<RawImage>,
        pub servers: Vec<RawServer>,
        pub schedules: Vec<(String, RawBackupSchedule)>,
        pub fail_servers: bool,
        pub fail_schedules: bool,
    }

    fn api_error(endpoint: &'static str) -> Error {
        Error::Compute(nova_api::Error::Api {
            endpoint,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        })
    }

    #[async_trait]
    impl ComputeSource for StaticSource {
        async fn list_flavors(&self) -> Result<Vec<RawFlavor>> {
            Ok(self.flavors.clone())
        }

        async fn list_images(&self) -> Result<Vec<RawImage>> {
            Ok(self.images.clone())
        }

        async fn list_servers(&self) -> Result<Vec<RawServer>> {
            if self.fail_servers {
                return Err(api_error("list servers"));
            }
            Ok(self.servers.clone())
        }

        async fn backup_schedule(&self, server_id: &str) -> Result<Option<RawBackupSchedule>> {
            if self.fail_schedules {
                return Err(api_error("get backup schedule"));
            }
            Ok(self
                .schedules
                .iter()
                .find(|(id, _)| id == server_id)
                .map(|(_, schedule)| schedule.clone()))
        }
    }

    pub(crate) fn sample_source() -> StaticSource {
        StaticSource {
            flavors: vec![
                serde_json::from_value(json!({"id": "1", "name": "256 server", "ram": 256, "disk": 10})).unwrap(),
            ],
            images: vec![
                serde_json::from_value(json!({
                    "id": "55",
                    "name": "RHEL 5.5",
                    "status": "ACTIVE",
                    "updated": "2010-09-17T07:19:20-05:00"
                }))
                .unwrap(),
            ],
            servers: vec![
                serde_json::from_value(json!({
                    "id": 847424,
                    "name": "cloudserver01",
                    "status": "ACTIVE",
                    "hostId": "a84303c0021aa53c7e749cbbbfac265f",
                    "flavorId": 1,
                    "imageId": 55,
                    "addresses": {"public": ["50.57.74.222"], "private": ["10.182.13.13"]}
                }))
                .unwrap(),
                serde_json::from_value(json!({"id": 847425, "name": "orphan", "imageId": 55})).unwrap(),
            ],
            schedules: vec![(
                "847424".into(),
                RawBackupSchedule {
                    enabled: Some(true),
                    daily: Some("H_0400_0600".into()),
                    weekly: Some("THURSDAY".into()),
                },
            )],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_collect_attaches_backup_schedules() {
        let raw = collect(&sample_source()).await.unwrap();

        assert_eq!(raw.flavors.len(), 1);
        assert_eq!(raw.images.len(), 1);
        assert_eq!(raw.servers.len(), 2);
        assert_eq!(
            raw.servers[0].backup_schedule.as_ref().and_then(|s| s.weekly.as_deref()),
            Some("THURSDAY")
        );
        assert!(raw.servers[1].backup_schedule.is_none());
    }

    #[tokio::test]
    async fn test_collect_tolerates_backup_lookup_failure() {
        let source = StaticSource {
            fail_schedules: true,
            ..sample_source()
        };

        let raw = collect(&source).await.unwrap();

        assert_eq!(raw.servers.len(), 2);
        assert!(raw.servers.iter().all(|s| s.backup_schedule.is_none()));
    }

    #[tokio::test]
    async fn test_collect_fails_when_a_listing_fails() {
        let source = StaticSource {
            fail_servers: true,
            ..sample_source()
        };

        let err = collect(&source).await.unwrap_err();

        assert!(matches!(err, Error::Compute(nova_api::Error::Api { endpoint: "list servers", .. })));
    }
}
