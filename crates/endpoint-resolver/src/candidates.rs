//! Development candidate list, in probe order.

use std::net::Ipv4Addr;

use crate::config::ResolverConfig;

fn origin(host: &str, port: u16) -> String {
    format!("http://{host}:{port}")
}

/// Build the ordered development candidates:
///
/// 1. the remote deployment (works on mobile data),
/// 2. the local interface address, or the fallback host when none was found,
/// 3. each loopback / emulator alias.
///
/// All on the configured port except the remote. Duplicates keep their first
/// position.
pub fn development_candidates(config: &ResolverConfig, local_ip: Option<Ipv4Addr>) -> Vec<String> {
    let dev = &config.development;
    let local = match local_ip {
        Some(ip) => origin(&ip.to_string(), dev.port),
        None => origin(&dev.fallback_host, dev.port),
    };

    let all = std::iter::once(dev.remote_url.clone())
        .chain(std::iter::once(local))
        .chain(dev.loopback_hosts.iter().map(|h| origin(h, dev.port)));

    let mut out: Vec<String> = Vec::new();
    for url in all {
        if !out.contains(&url) {
            out.push(url);
        }
    }
    out
}
