//! Server address discovery.
//!
//! Addresses can show up in three shapes at once, depending on API
//! generation: legacy `public_ip` / `private_ip` fields, `accessIPv4` /
//! `accessIPv6`, and the per-network `addresses` map. All of them are merged
//! into two deduplicated sets.

use std::collections::BTreeSet;

use nova_api::{AddressEntry, AddressField, NetworkAddresses, RawServer};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkClass {
    Public,
    Private,
}

/// A network is public when its name contains `public`, ignoring case.
/// Every other network is private.
pub fn classify_network(name: &str) -> NetworkClass {
    if name.to_lowercase().contains("public") {
        NetworkClass::Public
    } else {
        NetworkClass::Private
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpSets {
    pub public: BTreeSet<String>,
    pub private: BTreeSet<String>,
}

impl IpSets {
    fn insert(&mut self, class: NetworkClass, addr: &str) {
        if addr.is_empty() {
            return;
        }
        let set = match class {
            NetworkClass::Public => &mut self.public,
            NetworkClass::Private => &mut self.private,
        };
        set.insert(addr.to_string());
    }

    fn insert_entry(&mut self, class: NetworkClass, entry: &AddressEntry, server_id: &str, source: &str) {
        match entry {
            AddressEntry::Bare(addr) | AddressEntry::Structured { addr } => self.insert(class, addr),
            AddressEntry::Other(value) => {
                debug!(server_id, source, %value, "skipping unrecognized address entry");
            }
        }
    }

    fn insert_field(&mut self, class: NetworkClass, field: &AddressField, server_id: &str, source: &str) {
        match field {
            AddressField::Single(addr) => self.insert(class, addr),
            AddressField::Many(entries) => {
                for entry in entries {
                    self.insert_entry(class, entry, server_id, source);
                }
            }
            AddressField::Other(value) => {
                debug!(server_id, source, %value, "ignoring unrecognized address field");
            }
        }
    }
}

pub fn resolve_addresses(server: &RawServer) -> IpSets {
    let server_id = server.id_string().unwrap_or_default();
    let mut ips = IpSets::default();

    if let Some(field) = &server.public_ip {
        ips.insert_field(NetworkClass::Public, field, &server_id, "public_ip");
    }
    if let Some(field) = &server.private_ip {
        ips.insert_field(NetworkClass::Private, field, &server_id, "private_ip");
    }

    // Access IPs are always public.
    for addr in [&server.access_ipv4, &server.access_ipv6].into_iter().flatten() {
        ips.insert(NetworkClass::Public, addr);
    }

    for (network, addresses) in server.addresses.iter().flatten() {
        let class = classify_network(network);
        match addresses {
            NetworkAddresses::List(entries) => {
                for entry in entries {
                    ips.insert_entry(class, entry, &server_id, network);
                }
            }
            NetworkAddresses::Other(value) => {
                debug!(
                    %server_id,
                    network,
                    %value,
                    "skipping network with unrecognized address list"
                );
            }
        }
    }

    ips
}
