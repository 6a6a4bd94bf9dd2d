//! TCP connect attempts over the OS socket API.
//!
//! A full handshake is performed and the stream is dropped straight away;
//! no application data is exchanged. Hostnames are resolved through
//! `trust-dns-resolver`, IP literals are used as-is.

use crate::error::{ScanAttempt, ScanError};
use crate::scanner::traits::Connector;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Connector backed by `tokio::net::TcpStream`.
pub struct TcpConnector {
    resolver: TokioAsyncResolver,
}

impl TcpConnector {
    /// Create a connector using the system resolver configuration, falling
    /// back to the library defaults when it cannot be read.
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            tracing::debug!("system resolver config unavailable ({}), using defaults", e);
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }

    async fn resolve(&self, host: &str, limit: Duration) -> ScanAttempt<Vec<IpAddr>> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let response = timeout(limit, self.resolver.lookup_ip(host))
            .await
            .map_err(|_| ScanError::DnsResolution(format!("lookup of '{}' timed out", host)))?
            .map_err(|e| ScanError::DnsResolution(format!("'{}': {}", host, e)))?;

        let addrs: Vec<IpAddr> = response.iter().collect();
        if addrs.is_empty() {
            return Err(ScanError::DnsResolution(format!("no addresses for '{}'", host)));
        }
        Ok(addrs)
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, port: u16, limit: Duration) -> ScanAttempt<()> {
        let addrs = self.resolve(host, limit).await?;
        connect_any(&addrs, host, port, limit).await
    }
}

/// Try each address in order; the first handshake wins. When all of them
/// fail, the error from the last address is reported.
pub async fn connect_any(addrs: &[IpAddr], host: &str, port: u16, limit: Duration) -> ScanAttempt<()> {
    let mut last_err = ScanError::DnsResolution(format!("no addresses for '{}'", host));

    for ip in addrs {
        let addr = SocketAddr::new(*ip, port);
        match timeout(limit, TcpStream::connect(addr)).await {
            // The stream is dropped here, closing the socket.
            Ok(Ok(_stream)) => return Ok(()),
            Ok(Err(e)) => {
                tracing::trace!(%addr, error = %e, "address failed");
                last_err = classify_io_error(e, host, port);
            }
            Err(_) => last_err = ScanError::Timeout,
        }
    }

    Err(last_err)
}

/// Map a socket error onto the scan error taxonomy.
pub fn classify_io_error(e: io::Error, host: &str, port: u16) -> ScanError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => ScanError::ConnectionRefused,
        io::ErrorKind::TimedOut => ScanError::Timeout,
        _ => {
            let error_str = e.to_string().to_lowercase();
            if error_str.contains("host is unreachable")
                || error_str.contains("no route to host")
            {
                ScanError::HostUnreachable
            } else if error_str.contains("unreachable") {
                ScanError::NetworkUnreachable(e.to_string())
            } else {
                ScanError::ConnectionFailed {
                    target: host.to_string(),
                    port,
                    reason: e.to_string(),
                }
            }
        }
    }
}
