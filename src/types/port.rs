//! Port types and the port specification parser.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! [`parse_port_spec`] turns strings like `"22,80,8000-8100"` into a [`PortSet`].
//! Unlike most parsers in this crate it never fails: bad tokens are reported
//! and skipped.

use crate::report::{Reporter, TracingReporter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Why a single token of a port specification was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("empty port token")]
    Empty,
    #[error("invalid port number: '{0}'")]
    InvalidFormat(String),
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(String),
    #[error("malformed port range: '{0}'")]
    MalformedRange(String),
}

/// An inclusive range of ports. Reversed bounds are swapped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    pub fn new(a: Port, b: Port) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }

    /// Parse one comma-separated token: `"80"` or `"8000-8100"`.
    pub fn parse_token(token: &str) -> Result<Self, PortError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PortError::Empty);
        }

        match token.split_once('-') {
            Some((lo, hi)) => {
                if lo.trim().is_empty() || hi.trim().is_empty() || hi.contains('-') {
                    return Err(PortError::MalformedRange(token.to_string()));
                }
                Ok(Self::new(parse_port(lo)?, parse_port(hi)?))
            }
            None => Ok(Self::single(parse_port(token)?)),
        }
    }
}

fn parse_port(s: &str) -> Result<Port, PortError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortError::InvalidFormat(s.to_string()));
    }
    // All digits, so a parse failure can only mean overflow.
    let value: u32 = s
        .parse()
        .map_err(|_| PortError::OutOfRange(s.to_string()))?;
    u16::try_from(value)
        .ok()
        .and_then(Port::new)
        .ok_or_else(|| PortError::OutOfRange(s.to_string()))
}

/// Ascending set of distinct ports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    /// Parse a port specification, logging malformed tokens through `tracing`.
    pub fn parse(spec: &str) -> Self {
        parse_port_spec(spec, &TracingReporter)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    /// Raw port numbers, ascending.
    pub fn to_u16s(&self) -> Vec<u16> {
        self.ports.iter().map(|p| p.as_u16()).collect()
    }
}

impl FromIterator<Port> for PortSet {
    fn from_iter<I: IntoIterator<Item = Port>>(iter: I) -> Self {
        let set: BTreeSet<Port> = iter.into_iter().collect();
        Self {
            ports: set.into_iter().collect(),
        }
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Parse a comma-separated port specification.
///
/// Supports single ports (`"80"`), ranges (`"1-1000"`, reversed ranges are
/// swapped) and any mix of them. Tokens that fail to parse are reported as
/// warnings and skipped; the result is the sorted union of everything else.
pub fn parse_port_spec(spec: &str, reporter: &dyn Reporter) -> PortSet {
    let mut ports = BTreeSet::new();

    for token in spec.split(',') {
        match PortRange::parse_token(token) {
            Ok(range) => ports.extend(range.iter()),
            Err(e) => reporter.warn(&format!("skipping port token '{}': {}", token.trim(), e)),
        }
    }

    PortSet {
        ports: ports.into_iter().collect(),
    }
}
