//! Target list loading.
//!
//! The target file holds one entry per line, either a bare host or
//! `host:port`. Only the host is scanned: a port suffix is dropped and every
//! host is probed against the full port set.
//!
//! Supported line forms:
//! - `192.168.1.10`, `example.com`, `::1`
//! - `example.com:8080`, `10.0.0.1:22`
//! - `[2001:db8::1]:443`
//! - blank lines and `#` comments are ignored

use crate::error::TargetError;
use crate::report::Reporter;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::Path;

/// One line of a target file after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    /// Host component that will be scanned.
    pub host: String,
    /// Port suffix found on the line, if any. Not used by the scanner.
    pub port_hint: Option<u16>,
}

impl TargetEntry {
    /// Parse a single trimmed, non-empty line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        // A bare IP literal, including IPv6 with its colons.
        if line.parse::<IpAddr>().is_ok() {
            return Some(Self::bare(line));
        }

        // Bracketed IPv6: [addr] or [addr]:port
        if let Some(rest) = line.strip_prefix('[') {
            let (addr, tail) = rest.split_once(']')?;
            addr.parse::<IpAddr>().ok()?;
            let port_hint = match tail {
                "" => None,
                t => Some(t.strip_prefix(':')?.parse::<u16>().ok()?),
            };
            return Some(Self {
                host: addr.to_string(),
                port_hint,
            });
        }

        match line.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() || host.contains(':') {
                    return None;
                }
                let port_hint = port.parse::<u16>().ok()?;
                Some(Self {
                    host: host.to_string(),
                    port_hint: Some(port_hint),
                })
            }
            None => {
                if line.contains(char::is_whitespace) {
                    return None;
                }
                Some(Self::bare(line))
            }
        }
    }

    fn bare(host: &str) -> Self {
        Self {
            host: host.to_string(),
            port_hint: None,
        }
    }
}

/// Ordered, duplicate-free list of hosts to scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    hosts: Vec<String>,
}

impl TargetList {
    /// Read a target file from disk.
    pub fn load(path: &Path, reporter: &dyn Reporter) -> Result<Self, TargetError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TargetError::NotFound(path.to_path_buf()),
            _ => TargetError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        Ok(Self::parse(&content, reporter))
    }

    /// Parse target file contents.
    pub fn parse(content: &str, reporter: &dyn Reporter) -> Self {
        let mut seen = HashSet::new();
        let mut hosts = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(entry) = TargetEntry::parse(line) else {
                reporter.warn(&format!("line {}: skipping malformed target '{}'", idx + 1, line));
                continue;
            };

            if let Some(port) = entry.port_hint {
                reporter.debug(&format!(
                    "line {}: ignoring port suffix :{} for {}",
                    idx + 1,
                    port,
                    entry.host
                ));
            }

            if seen.insert(entry.host.clone()) {
                hosts.push(entry.host);
            } else {
                reporter.warn(&format!(
                    "line {}: duplicate target '{}' will be scanned once",
                    idx + 1,
                    entry.host
                ));
            }
        }

        Self { hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
