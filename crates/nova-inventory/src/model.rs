use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::NormalizeError;

/// The three inventory collections produced per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Flavor,
    Image,
    Server,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flavor => "flavor",
            Self::Image => "image",
            Self::Server => "server",
        }
    }

    /// Relation name the host platform merges the collection into.
    pub fn relname(&self) -> &'static str {
        match self {
            Self::Flavor => "flavors",
            Self::Image => "images",
            Self::Server => "servers",
        }
    }

    /// Target entity type of the relation.
    pub fn modname(&self) -> &'static str {
        match self {
            Self::Flavor => "ZenPacks.zenoss.OpenStack.Flavor",
            Self::Image => "ZenPacks.zenoss.OpenStack.Image",
            Self::Server => "ZenPacks.zenoss.OpenStack.Server",
        }
    }

    /// Component id of one record, e.g. `flavor1`.
    pub fn component_id(&self, id: impl fmt::Display) -> String {
        format!("{}{id}", self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Canonical records ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flavor {
    pub id: String,
    pub title: String,
    pub flavor_id: i64,
    pub ram_bytes: u64,
    pub disk_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: String,
    pub title: String,
    pub image_id: i64,
    pub status: String,
    /// Empty when the provider omits the creation timestamp.
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    pub id: String,
    pub title: String,
    /// Provider id, integers rendered in decimal.
    pub server_id: String,
    pub status: String,
    pub host_id: String,
    pub flavor_id: i64,
    pub image_id: i64,
    pub public_ips: BTreeSet<String>,
    pub private_ips: BTreeSet<String>,
    pub backup_enabled: bool,
    pub backup_daily: String,
    pub backup_weekly: String,
}

// ── Update records ───────────────────────────────────────────────────

/// A named, typed collection of records for the host platform to merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipMap<T> {
    pub relname: &'static str,
    pub modname: &'static str,
    pub objmaps: Vec<T>,
}

impl<T> RelationshipMap<T> {
    pub fn new(kind: ResourceKind, objmaps: Vec<T>) -> Self {
        Self {
            relname: kind.relname(),
            modname: kind.modname(),
            objmaps,
        }
    }

    pub fn len(&self) -> usize {
        self.objmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objmaps.is_empty()
    }
}

/// A record that could not be normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordError {
    pub kind: ResourceKind,
    pub record_id: Option<String>,
    #[serde(serialize_with = "serialize_display")]
    pub error: NormalizeError,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record_id {
            Some(id) => write!(f, "{} {id}: {}", self.kind, self.error),
            None => write!(f, "{} without id: {}", self.kind, self.error),
        }
    }
}

/// Result of one collection cycle.
///
/// Partial success is the normal case: records that fail normalization are
/// reported in `errors` alongside everything that succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryUpdate {
    pub flavors: RelationshipMap<Flavor>,
    pub images: RelationshipMap<Image>,
    pub servers: RelationshipMap<Server>,
    pub errors: Vec<RecordError>,
}

impl InventoryUpdate {
    pub fn record_count(&self) -> usize {
        self.flavors.len() + self.images.len() + self.servers.len()
    }

    pub fn errors_for(&self, kind: ResourceKind) -> impl Iterator<Item = &RecordError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
