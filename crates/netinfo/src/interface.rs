//! IPv4 interface enumeration via `getifaddrs(3)`.

use std::net::Ipv4Addr;

use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;

use crate::error::Result;

/// One IPv4 address bound to a local interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceV4 {
    pub name: String,
    pub ip: Ipv4Addr,
    pub netmask: Option<Ipv4Addr>,
    pub is_up: bool,
    pub is_loopback: bool,
}

/// List every IPv4 address currently assigned to a local interface.
pub fn ipv4_interfaces() -> Result<Vec<InterfaceV4>> {
    let mut out = Vec::new();
    for ifaddr in getifaddrs()? {
        let Some(ip) = ifaddr
            .address
            .as_ref()
            .and_then(|a| a.as_sockaddr_in())
            .map(|sin| sin.ip())
        else {
            continue;
        };
        let netmask = ifaddr
            .netmask
            .as_ref()
            .and_then(|a| a.as_sockaddr_in())
            .map(|sin| sin.ip());
        out.push(InterfaceV4 {
            name: ifaddr.interface_name,
            ip,
            netmask,
            is_up: ifaddr.flags.contains(InterfaceFlags::IFF_UP),
            is_loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
        });
    }
    Ok(out)
}

/// Pick the address a LAN peer would most likely reach us on.
///
/// Only up, non-loopback, non-link-local addresses qualify. Private
/// (RFC 1918) addresses win over public ones; otherwise enumeration order
/// decides.
pub fn select_primary(interfaces: &[InterfaceV4]) -> Option<&InterfaceV4> {
    let mut usable = interfaces
        .iter()
        .filter(|i| i.is_up && !i.is_loopback && !i.ip.is_loopback() && !i.ip.is_link_local());
    let first = usable.clone().next();
    usable.find(|i| i.ip.is_private()).or(first)
}

/// The primary local IPv4 address, if any interface qualifies.
pub fn primary_ipv4() -> Result<Option<Ipv4Addr>> {
    let interfaces = ipv4_interfaces()?;
    let primary = select_primary(&interfaces).map(|i| i.ip);
    tracing::debug!(count = interfaces.len(), ?primary, "enumerated IPv4 interfaces");
    Ok(primary)
}
