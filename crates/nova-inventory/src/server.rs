use nova_api::{RawBackupSchedule, ResourceRef, Scalar};

use crate::address::resolve_addresses;
use crate::model::{ResourceKind, Server};
use crate::normalize::{NormalizeError, NormalizeResult, parse_integer, require};
use crate::source::ServerListing;

/// Backup state reported when a deployment has no backup support.
pub const BACKUP_DISABLED: &str = "DISABLED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSchedule {
    pub enabled: bool,
    pub daily: String,
    pub weekly: String,
}

impl Default for BackupSchedule {
    fn default() -> Self {
        Self {
            enabled: false,
            daily: BACKUP_DISABLED.into(),
            weekly: BACKUP_DISABLED.into(),
        }
    }
}

/// A schedule is used only when all three fields are present; an absent or
/// partial one means no backup support.
pub fn resolve_backup_schedule(raw: Option<&RawBackupSchedule>) -> BackupSchedule {
    match raw {
        Some(RawBackupSchedule {
            enabled: Some(enabled),
            daily: Some(daily),
            weekly: Some(weekly),
        }) => BackupSchedule {
            enabled: *enabled,
            daily: daily.clone(),
            weekly: weekly.clone(),
        },
        _ => BackupSchedule::default(),
    }
}

/// Resolve a flavor or image reference.
///
/// The flat field (1.0) wins whenever it is present, even if the nested form
/// (1.1) is there too. A present but unparseable flat field is an error.
pub fn resolve_resource_id(
    flat_field: &'static str,
    flat: Option<&Scalar>,
    nested_field: &'static str,
    nested: Option<&ResourceRef>,
) -> NormalizeResult<i64> {
    if let Some(flat) = flat {
        return parse_integer(flat_field, flat);
    }

    match nested.and_then(ResourceRef::id) {
        Some(id) => parse_integer(nested_field, id),
        None => Err(NormalizeError::UnresolvedReference {
            flat: flat_field,
            nested: nested_field,
        }),
    }
}

pub fn normalize_server(listing: &ServerListing) -> NormalizeResult<Server> {
    let server = &listing.server;

    let server_id = require("id", server.id.as_ref())?.to_string();
    let flavor_id = resolve_resource_id(
        "flavorId",
        server.flavor_id.as_ref(),
        "flavor.id",
        server.flavor.as_ref(),
    )?;
    let image_id = resolve_resource_id(
        "imageId",
        server.image_id.as_ref(),
        "image.id",
        server.image.as_ref(),
    )?;

    let backup = resolve_backup_schedule(listing.backup_schedule.as_ref());
    let ips = resolve_addresses(server);

    Ok(Server {
        id: ResourceKind::Server.component_id(&server_id),
        title: server.name.clone().unwrap_or_default(),
        server_id,
        status: server.status.clone().unwrap_or_default(),
        host_id: server.host_id.clone().unwrap_or_default(),
        flavor_id,
        image_id,
        public_ips: ips.public,
        private_ips: ips.private,
        backup_enabled: backup.enabled,
        backup_daily: backup.daily,
        backup_weekly: backup.weekly,
    })
}
