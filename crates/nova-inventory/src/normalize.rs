//! Conversion of raw compute API records into canonical inventory records.
//!
//! Every function here is pure. A record that cannot be normalized yields a
//! [`NormalizeError`]; [`normalize`] collects those per record and carries on
//! with the rest of the batch.

use nova_api::{RawFlavor, RawImage, Scalar};
use tracing::warn;

use crate::model::{Flavor, Image, InventoryUpdate, RecordError, RelationshipMap, ResourceKind};
use crate::server::normalize_server;
use crate::source::RawInventory;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not an integer: {value}")]
    NotAnInteger { field: &'static str, value: String },

    #[error("field `{field}` is negative: {value}")]
    NegativeQuantity { field: &'static str, value: i64 },

    #[error("field `{field}` overflows when converted to bytes: {value}")]
    Overflow { field: &'static str, value: i64 },

    #[error("neither `{flat}` nor `{nested}` resolves to an integer id")]
    UnresolvedReference {
        flat: &'static str,
        nested: &'static str,
    },
}

pub type NormalizeResult<T> = std::result::Result<T, NormalizeError>;

/// Parse an integer that may arrive as a JSON number or a numeric string.
pub(crate) fn parse_integer(field: &'static str, value: &Scalar) -> NormalizeResult<i64> {
    match value {
        Scalar::Int(n) => Ok(*n),
        Scalar::Text(s) => s.trim().parse().map_err(|_| NormalizeError::NotAnInteger {
            field,
            value: s.clone(),
        }),
        Scalar::Other(v) => Err(NormalizeError::NotAnInteger {
            field,
            value: v.to_string(),
        }),
    }
}

pub(crate) fn require<'a, T>(field: &'static str, value: Option<&'a T>) -> NormalizeResult<&'a T> {
    value.ok_or(NormalizeError::MissingField(field))
}

fn to_bytes(field: &'static str, value: i64, unit: u64) -> NormalizeResult<u64> {
    let units = u64::try_from(value).map_err(|_| NormalizeError::NegativeQuantity { field, value })?;
    units
        .checked_mul(unit)
        .ok_or(NormalizeError::Overflow { field, value })
}

/// Flavor sizes arrive as RAM megabytes and disk gigabytes; both become bytes.
pub fn normalize_flavor(raw: &RawFlavor) -> NormalizeResult<Flavor> {
    let flavor_id = parse_integer("id", require("id", raw.id.as_ref())?)?;
    let ram = parse_integer("ram", require("ram", raw.ram.as_ref())?)?;
    let disk = parse_integer("disk", require("disk", raw.disk.as_ref())?)?;

    Ok(Flavor {
        id: ResourceKind::Flavor.component_id(flavor_id),
        title: raw.name.clone().unwrap_or_default(),
        flavor_id,
        ram_bytes: to_bytes("ram", ram, MIB)?,
        disk_bytes: to_bytes("disk", disk, GIB)?,
    })
}

/// Providers omit `created` for some system images; that is not an error.
/// `updated` has no such exemption.
pub fn normalize_image(raw: &RawImage) -> NormalizeResult<Image> {
    let image_id = parse_integer("id", require("id", raw.id.as_ref())?)?;
    let updated_at = require("updated", raw.updated.as_ref())?.clone();

    Ok(Image {
        id: ResourceKind::Image.component_id(image_id),
        title: raw.name.clone().unwrap_or_default(),
        image_id,
        status: raw.status.clone().unwrap_or_default(),
        created_at: raw.created.clone().unwrap_or_default(),
        updated_at,
    })
}

/// Normalize a whole cycle. Output order follows input order per collection.
pub fn normalize(raw: &RawInventory) -> InventoryUpdate {
    let mut errors = Vec::new();

    let flavors = normalize_each(
        ResourceKind::Flavor,
        &raw.flavors,
        |f| f.id.as_ref().map(Scalar::to_string),
        normalize_flavor,
        &mut errors,
    );
    let images = normalize_each(
        ResourceKind::Image,
        &raw.images,
        |i| i.id.as_ref().map(Scalar::to_string),
        normalize_image,
        &mut errors,
    );
    let servers = normalize_each(
        ResourceKind::Server,
        &raw.servers,
        |s| s.server.id_string(),
        normalize_server,
        &mut errors,
    );

    InventoryUpdate {
        flavors: RelationshipMap::new(ResourceKind::Flavor, flavors),
        images: RelationshipMap::new(ResourceKind::Image, images),
        servers: RelationshipMap::new(ResourceKind::Server, servers),
        errors,
    }
}

fn normalize_each<R, T>(
    kind: ResourceKind,
    raws: &[R],
    record_id: impl Fn(&R) -> Option<String>,
    normalize: impl Fn(&R) -> NormalizeResult<T>,
    errors: &mut Vec<RecordError>,
) -> Vec<T> {
    let mut records = Vec::with_capacity(raws.len());
    for raw in raws {
        match normalize(raw) {
            Ok(record) => records.push(record),
            Err(error) => {
                let record_id = record_id(raw);
                warn!(
                    %kind,
                    record_id = record_id.as_deref().unwrap_or("<none>"),
                    %error,
                    "skipping record that could not be normalized"
                );
                errors.push(RecordError {
                    kind,
                    record_id,
                    error,
                });
            }
        }
    }
    records
}
