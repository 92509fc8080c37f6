//! Local network queries: primary IPv4 address and a network snapshot.

mod error;
mod interface;
mod route;

use std::net::Ipv4Addr;

use serde::Serialize;

pub use error::{NetInfoError, Result};
pub use interface::{InterfaceV4, ipv4_interfaces, primary_ipv4, select_primary};
pub use route::{DefaultRoute, default_route, parse_default_route};

/// Point-in-time view of the host's primary network attachment.
///
/// Every field is `None` when the host has no usable interface, which callers
/// treat as "cellular / offline".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    pub interface: Option<String>,
    pub ip: Option<Ipv4Addr>,
    pub netmask: Option<Ipv4Addr>,
    pub subnet: Option<Ipv4Addr>,
    pub gateway: Option<Ipv4Addr>,
}

impl NetworkInfo {
    fn from_parts(primary: Option<&InterfaceV4>, route: Option<DefaultRoute>) -> Self {
        let subnet = primary.and_then(|i| {
            i.netmask
                .map(|mask| Ipv4Addr::from(i.ip.to_bits() & mask.to_bits()))
        });
        Self {
            interface: primary.map(|i| i.name.clone()),
            ip: primary.map(|i| i.ip),
            netmask: primary.and_then(|i| i.netmask),
            subnet,
            gateway: route.map(|r| r.gateway),
        }
    }
}

/// Collect a [`NetworkInfo`] snapshot.
///
/// Lookup failures are logged and produce an empty snapshot.
pub fn snapshot() -> NetworkInfo {
    let interfaces = match ipv4_interfaces() {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("network info unavailable: {e}");
            return NetworkInfo::default();
        }
    };
    let route = default_route().unwrap_or_else(|e| {
        tracing::warn!("default route unavailable: {e}");
        None
    });
    NetworkInfo::from_parts(select_primary(&interfaces), route)
}
