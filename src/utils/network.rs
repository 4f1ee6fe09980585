use std::net::{IpAddr, SocketAddr, TcpListener};
use tracing::warn;

/// How far past the preferred port to look before giving up.
const PORT_SEARCH_SPAN: u16 = 100;

/// Check whether `port` can be bound on `host`.
pub fn can_bind(host: IpAddr, port: u16) -> bool {
    TcpListener::bind(SocketAddr::new(host, port)).is_ok()
}

/// The preferred port if free, else the next free one within the search
/// span. Falls back to the preferred port so the bind error surfaces later.
pub fn pick_port(host: IpAddr, preferred: u16) -> u16 {
    if can_bind(host, preferred) {
        return preferred;
    }

    warn!("Port {} is busy, looking for another one", preferred);
    let end = preferred.saturating_add(PORT_SEARCH_SPAN);
    match (preferred.saturating_add(1)..=end).find(|&p| can_bind(host, p)) {
        Some(port) => {
            warn!("Using port {} instead", port);
            port
        }
        None => {
            warn!("No free port in {}..={}, keeping {}", preferred, end, preferred);
            preferred
        }
    }
}

/// Parse the configured host, defaulting to all interfaces.
pub fn parse_host(host: &str) -> IpAddr {
    host.parse().unwrap_or_else(|_| {
        warn!("Invalid host {:?}, listening on 0.0.0.0", host);
        IpAddr::from([0, 0, 0, 0])
    })
}
