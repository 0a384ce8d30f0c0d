//! Inventory collection for OpenStack compute deployments.
//!
//! Fetches flavors, images and servers through a [`ComputeSource`] and turns
//! them into relationship maps for a monitoring platform. The API has drifted
//! a lot between generations (ids as integers or strings, flavor/image refs
//! flat or nested, three ways of reporting addresses), and all of that is
//! reconciled in [`normalize`].

pub mod address;
pub mod config;
pub mod model;
pub mod normalize;
pub mod nova;
pub mod server;
pub mod source;

pub use address::{IpSets, NetworkClass, classify_network, resolve_addresses};
pub use config::CollectorConfig;
pub use model::{
    Flavor, Image, InventoryUpdate, RecordError, RelationshipMap, ResourceKind, Server,
};
pub use normalize::{NormalizeError, normalize, normalize_flavor, normalize_image};
pub use nova::NovaSource;
pub use server::{BackupSchedule, normalize_server, resolve_backup_schedule, resolve_resource_id};
pub use source::{ComputeSource, RawInventory, ServerListing, collect};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("compute api error: {0}")]
    Compute(#[from] nova_api::Error),

    #[error("missing env var: {0}")]
    MissingEnv(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Run one collection cycle: fetch, then normalize.
///
/// Fails only if one of the three listings fails. Records that cannot be
/// normalized end up in [`InventoryUpdate::errors`].
pub async fn run_cycle(source: &dyn ComputeSource) -> Result<InventoryUpdate> {
    let raw = collect(source).await?;
    let update = normalize(&raw);

    if update.errors.is_empty() {
        tracing::info!(records = update.record_count(), "inventory normalized");
    } else {
        tracing::warn!(
            records = update.record_count(),
            errors = update.errors.len(),
            "inventory normalized with record errors"
        );
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::{StaticSource, sample_source};
    use nova_api::ListServersResponse;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_cycle_partial_success() {
        let update = run_cycle(&sample_source()).await.unwrap();

        assert_eq!(update.flavors.objmaps[0].ram_bytes, 268_435_456);
        assert_eq!(update.images.objmaps[0].created_at, "");

        assert_eq!(update.servers.len(), 1);
        let server = &update.servers.objmaps[0];
        assert_eq!(server.id, "server847424");
        assert!(server.backup_enabled);
        assert_eq!(server.backup_daily, "H_0400_0600");

        assert_eq!(update.errors.len(), 1);
        assert_eq!(update.errors[0].kind, ResourceKind::Server);
        assert_eq!(update.errors[0].record_id.as_deref(), Some("847425"));
    }

    #[tokio::test]
    async fn test_cycle_survives_mistyped_server_fields() {
        let listing: ListServersResponse = serde_json::from_value(json!({
            "servers": [
                {"id": 1, "name": "web-1", "flavorId": 1, "imageId": 55},
                {"id": 2, "name": 42, "flavorId": 1, "imageId": 55, "addresses": []}
            ]
        }))
        .unwrap();
        let source = StaticSource {
            servers: listing.servers,
            ..Default::default()
        };

        let update = run_cycle(&source).await.unwrap();

        assert!(update.errors.is_empty());
        assert_eq!(update.servers.len(), 2);
        let odd = &update.servers.objmaps[1];
        assert_eq!(odd.id, "server2");
        assert_eq!(odd.title, "");
        assert!(odd.public_ips.is_empty());
    }
}
