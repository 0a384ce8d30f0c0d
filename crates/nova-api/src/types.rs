use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Scalars ──────────────────────────────────────────────────────────

/// A scalar whose JSON type drifts between API generations.
///
/// The 1.0 API sends ids and sizes as integers, 1.1 sends ids as strings.
/// Anything else is kept verbatim in `Other` so a single odd record never
/// fails decoding of the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
    Other(Value),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Decode an optional field, treating a value of the wrong JSON type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ── Flavors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFlavor {
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Megabytes.
    pub ram: Option<Scalar>,
    /// Gigabytes.
    pub disk: Option<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListFlavorsResponse {
    #[serde(default)]
    pub flavors: Vec<RawFlavor>,
}

// ── Images ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawImage {
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListImagesResponse {
    #[serde(default)]
    pub images: Vec<RawImage>,
}

// ── Servers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawServer {
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(rename = "hostId", default, deserialize_with = "lenient")]
    pub host_id: Option<String>,

    // 1.0 references flavor and image by flat id fields.
    #[serde(rename = "flavorId")]
    pub flavor_id: Option<Scalar>,
    #[serde(rename = "imageId")]
    pub image_id: Option<Scalar>,

    // 1.1 nests them as `{"id": ..., "links": [...]}`.
    pub flavor: Option<ResourceRef>,
    pub image: Option<ResourceRef>,

    pub public_ip: Option<AddressField>,
    pub private_ip: Option<AddressField>,
    #[serde(rename = "accessIPv4", default, deserialize_with = "lenient")]
    pub access_ipv4: Option<String>,
    #[serde(rename = "accessIPv6", default, deserialize_with = "lenient")]
    pub access_ipv6: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub addresses: Option<BTreeMap<String, NetworkAddresses>>,
}

impl RawServer {
    /// Provider id rendered as a string, if present.
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(Scalar::to_string)
    }
}

/// Nested flavor/image reference.
///
/// Boot-from-volume servers report `"image": ""`, which lands in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    Linked { id: Option<Scalar> },
    Other(Value),
}

impl ResourceRef {
    pub fn id(&self) -> Option<&Scalar> {
        match self {
            Self::Linked { id } => id.as_ref(),
            Self::Other(_) => None,
        }
    }
}

/// Legacy `public_ip` / `private_ip` field.
///
/// List elements are decoded one by one, so a bad element only loses itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressField {
    Single(String),
    Many(Vec<AddressEntry>),
    Other(Value),
}

/// Value of one network in the `addresses` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkAddresses {
    List(Vec<AddressEntry>),
    Other(Value),
}

/// One entry of an `addresses` network list.
///
/// 1.0 lists bare strings, 1.1 lists `{"version": 4, "addr": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressEntry {
    Bare(String),
    Structured { addr: String },
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListServersResponse {
    #[serde(default)]
    pub servers: Vec<RawServer>,
}

// ── Backup schedules ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBackupSchedule {
    pub enabled: Option<bool>,
    pub daily: Option<String>,
    pub weekly: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupScheduleResponse {
    #[serde(rename = "backupSchedule")]
    pub backup_schedule: RawBackupSchedule,
}
