//! Address matching logic.
//!
//! # Responsibilities
//! - Parse a rule input as a single address or a subnet
//! - Decide whether a candidate address satisfies a rule input
//!
//! # Design Decisions
//! - Single address is tried before subnet notation
//! - No implicit family coercion (`::ffff:10.0.0.1` never matches `10.0.0.0/8`)
//! - Host bits in a subnet are tolerated: `10.0.0.1/25` covers `10.0.0.0/25`
//! - IPv6 zones (`fe80::1%eth0`) are part of an address; subnets never contain
//!   a zoned address

use std::net::{AddrParseError, IpAddr, Ipv6Addr};
use std::str::FromStr;

use ipnet::IpNet;
use thiserror::Error;

/// A rule input that is neither an address nor a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' doesn't look like an IP or subnet")]
pub struct InvalidInput(pub String);

/// An address with an optional IPv6 zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedAddr {
    pub addr: IpAddr,
    pub zone: Option<Box<str>>,
}

impl FromStr for ZonedAddr {
    type Err = AddrParseError;

    /// Only IPv6 takes a zone, and it must not be empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('%') {
            Some((addr, zone)) if !zone.is_empty() => Ok(Self {
                addr: IpAddr::V6(addr.parse::<Ipv6Addr>()?),
                zone: Some(zone.into()),
            }),
            _ => Ok(Self {
                addr: s.parse()?,
                zone: None,
            }),
        }
    }
}

/// The parsed left-hand side of a mapping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleInput {
    /// Matches one address exactly, zone included.
    Address(ZonedAddr),
    /// Matches every unzoned address the network contains.
    Subnet(IpNet),
}

impl RuleInput {
    /// Parse an address, falling back to CIDR notation.
    pub fn parse(input: &str) -> Result<Self, InvalidInput> {
        if let Ok(addr) = input.parse::<ZonedAddr>() {
            return Ok(Self::Address(addr));
        }
        input
            .parse::<IpNet>()
            .map(Self::Subnet)
            .map_err(|_| InvalidInput(input.to_string()))
    }

    /// Returns true if `candidate` equals the address or falls inside the subnet.
    pub fn matches(&self, candidate: &ZonedAddr) -> bool {
        match self {
            Self::Address(addr) => addr == candidate,
            Self::Subnet(net) => candidate.zone.is_none() && net.contains(&candidate.addr),
        }
    }
}

/// Parse a request-supplied value into a candidate address.
///
/// Failure here is a per-request condition; callers treat it as "no rule matches".
pub fn parse_candidate(value: &str) -> Result<ZonedAddr, AddrParseError> {
    value.parse()
}
