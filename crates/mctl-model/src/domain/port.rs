use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Transport protocol of a port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host port to container port mapping, `HOST:CONTAINER[/PROTO]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub host_port: u32,
    pub container_port: u32,
    #[serde(default)]
    pub protocol: Protocol,
}

impl PortMapping {
    pub fn new(host_port: u32, container_port: u32, protocol: Protocol) -> Self {
        Self {
            host_port,
            container_port,
            protocol,
        }
    }

    pub fn tcp(host_port: u32, container_port: u32) -> Self {
        Self::new(host_port, container_port, Protocol::Tcp)
    }
}

/// Plain decimal digits only: no sign, no whitespace.
fn port_number(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl FromStr for PortMapping {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ValidationError::InvalidPortMapping(s.to_string());

        let mut segments = s.split(':');
        let (Some(host), Some(rest), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(bad());
        };
        let (container, protocol) = match rest.split_once('/') {
            Some((container, proto)) => (container, proto.parse().map_err(|_| bad())?),
            None => (rest, Protocol::Tcp),
        };

        Ok(Self {
            host_port: port_number(host).ok_or_else(bad)?,
            container_port: port_number(container).ok_or_else(bad)?,
            protocol,
        })
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}",
            self.host_port, self.container_port, self.protocol
        )
    }
}
