//! Default gateway lookup from the kernel routing table.
//!
//! `/proc/net/route` lists one route per line after a header. Addresses are
//! 8 hex digits in host (little-endian) byte order.

use std::net::Ipv4Addr;
use std::path::Path;

use crate::error::{NetInfoError, Result};

pub const PROC_NET_ROUTE: &str = "/proc/net/route";

/// RTF_GATEWAY: the route goes through a gateway.
const RTF_GATEWAY: u32 = 0x0002;

/// A default route: interface and gateway address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRoute {
    pub interface: String,
    pub gateway: Ipv4Addr,
}

fn parse_hex_addr(s: &str) -> Option<Ipv4Addr> {
    if s.len() != 8 {
        return None;
    }
    let raw = u32::from_str_radix(s, 16).ok()?;
    Some(Ipv4Addr::from(raw.to_le_bytes()))
}

/// Parse the contents of `/proc/net/route` and return the first default route.
pub fn parse_default_route(content: &str) -> Option<DefaultRoute> {
    content.lines().skip(1).find_map(|line| {
        let mut fields = line.split_whitespace();
        let interface = fields.next()?;
        let destination = parse_hex_addr(fields.next()?)?;
        let gateway = parse_hex_addr(fields.next()?)?;
        let flags = u32::from_str_radix(fields.next()?, 16).ok()?;
        if destination.is_unspecified() && flags & RTF_GATEWAY != 0 {
            Some(DefaultRoute {
                interface: interface.to_string(),
                gateway,
            })
        } else {
            None
        }
    })
}

/// Read the default route from a routing table file.
///
/// A missing file (non-Linux hosts, restricted sandboxes) is treated as "no
/// default route" rather than an error.
pub fn default_route_from(path: &Path) -> Result<Option<DefaultRoute>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_default_route(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(NetInfoError::RouteTable {
            path: path.display().to_string(),
            source,
        }),
    }
}

pub fn default_route() -> Result<Option<DefaultRoute>> {
    default_route_from(Path::new(PROC_NET_ROUTE))
}
