//! Core type definitions: validated ports, port sets and target lists.

mod port;
mod target;

pub use port::{parse_port_spec, Port, PortError, PortRange, PortSet};
pub use target::{TargetEntry, TargetList};
