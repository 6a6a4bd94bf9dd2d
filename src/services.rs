//! Service hints based on well-known port numbers.
//!
//! A hint is a best-effort label inferred from the port alone; no protocol
//! inspection happens.

/// Label used for open ports without a more specific hint.
pub const GENERIC_OPEN: &str = "tcp_open";

/// Look up the service hint for an open port.
pub fn service_hint(port: u16) -> &'static str {
    match port {
        80 | 8080 => "http",
        443 | 8443 => "https/tls",
        _ => GENERIC_OPEN,
    }
}
