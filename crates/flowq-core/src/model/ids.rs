// ── Core identity types ──
//
// Every flow record, index key and query criterion is built from these.
// MAC addresses are validated and normalized once, at the edge, so the
// rest of the engine compares plain values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest valid 802.1Q VLAN identifier.
pub const VLAN_ID_MAX: u16 = 4095;

// ── ContextId ───────────────────────────────────────────────────────

/// Owning context (tenant) under which flow records are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ── FlowId ──────────────────────────────────────────────────────────

/// Identifier of a flow record, unique within its owning context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FlowId(pub u64);

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FlowId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ── NodeId / PortId ─────────────────────────────────────────────────

/// Switch identifier, e.g. `openflow:1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Concrete port identifier local to a switch, e.g. `3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(String);

impl PortId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PortId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A resolved switch port: the key of the switch-port index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortKey {
    pub node: NodeId,
    pub port: PortId,
}

impl PortKey {
    pub fn new(node: impl Into<NodeId>, port: impl Into<PortId>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<String> for PortId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.port)
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// Error returned when a string is not a usable MAC address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MAC address '{0}'")]
pub struct InvalidMacAddress(pub String);

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse and normalize a MAC address.
    ///
    /// Accepts colon- or dash-separated octets in any case.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InvalidMacAddress> {
        let raw = raw.as_ref();
        let normalized = raw.trim().to_lowercase().replace('-', ":");

        let octets: Vec<&str> = normalized.split(':').collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(InvalidMacAddress(raw.to_owned()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Group (multicast or broadcast) addresses have the low bit of the
    /// first octet set. They never identify a single host.
    pub fn is_group(&self) -> bool {
        u8::from_str_radix(&self.0[..2], 16).is_ok_and(|b| b & 0x01 != 0)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = InvalidMacAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = InvalidMacAddress;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

// ── SourceHostKey ───────────────────────────────────────────────────

/// A host on a virtual network: MAC address plus VLAN (0 = untagged).
/// The key of the source-host index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceHostKey {
    pub mac: MacAddress,
    pub vlan: u16,
}

impl fmt::Display for SourceHostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.mac, self.vlan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_address_normalizes_dashes_and_case() {
        let mac = MacAddress::parse("AA-BB-CC-DD-EE-0F").unwrap();
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:0f");
    }

    #[test]
    fn mac_address_rejects_garbage() {
        assert!(MacAddress::parse("not-a-mac").is_err());
        assert!(MacAddress::parse("aa:bb:cc:dd:ee").is_err());
        assert!(MacAddress::parse("aa:bb:cc:dd:ee:fg").is_err());
        assert!(MacAddress::parse("aabb.ccdd.eeff").is_err());
        assert!(MacAddress::parse("").is_err());
    }

    #[test]
    fn mac_address_detects_group_addresses() {
        assert!(MacAddress::parse("ff:ff:ff:ff:ff:ff").unwrap().is_group());
        assert!(MacAddress::parse("01:00:5e:00:00:01").unwrap().is_group());
        assert!(!MacAddress::parse("00:11:22:33:44:55").unwrap().is_group());
    }

    #[test]
    fn mac_address_serde_validates() {
        let ok: MacAddress = serde_json::from_str("\"00-11-22-33-44-55\"").unwrap();
        assert_eq!(ok.to_string(), "00:11:22:33:44:55");
        assert!(serde_json::from_str::<MacAddress>("\"nope\"").is_err());
    }

    #[test]
    fn flow_id_from_str() {
        let id: FlowId = " 42 ".parse().unwrap();
        assert_eq!(id, FlowId(42));
        assert!("x".parse::<FlowId>().is_err());
    }

    #[test]
    fn port_key_display() {
        let key = PortKey::new("openflow:1", "3");
        assert_eq!(key.to_string(), "openflow:1:3");
    }
}
