//! DNS record descriptor types
//!
//! A [`RecordConfig`] describes one managed resource record: the zone it
//! lives in, its name, its type, and the single type-specific value the
//! type requires. All fields are create-time-only; changing any of them is
//! modeled by the caller as delete-then-create, never as an in-place update.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Supported resource-record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// Address record (IPv4)
    A,
    /// Canonical-name alias
    Cname,
    /// Reverse-lookup pointer
    Ptr,
}

impl RecordType {
    /// Canonical token used in commands and record identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Cname => "CNAME",
            RecordType::Ptr => "PTR",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "CNAME" => Ok(RecordType::Cname),
            "PTR" => Ok(RecordType::Ptr),
            other => Err(Error::UnsupportedRecordType(other.to_string())),
        }
    }
}

/// One managed DNS record
///
/// Exactly one of the three type-specific fields must be populated, and it
/// must match `record_type`. The translator enforces this before any remote
/// command is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Name of the zone where the record is managed
    pub zone_name: String,

    /// Name of the record within the zone
    pub record_name: String,

    /// Type of the record
    pub record_type: RecordType,

    /// Mandatory when `record_type` is A: the address the record points to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,

    /// Mandatory when `record_type` is CNAME: the hostname the alias points to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_alias: Option<String>,

    /// Mandatory when `record_type` is PTR: the domain name the pointer resolves to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptr_domainname: Option<String>,
}

impl RecordConfig {
    /// Create a new record configuration with no type-specific value set
    pub fn new(
        zone_name: impl Into<String>,
        record_name: impl Into<String>,
        record_type: RecordType,
    ) -> Self {
        Self {
            zone_name: zone_name.into(),
            record_name: record_name.into(),
            record_type,
            ipv4_address: None,
            hostname_alias: None,
            ptr_domainname: None,
        }
    }

    /// Set the IPv4 address (for A records)
    pub fn with_ipv4_address(mut self, address: impl Into<String>) -> Self {
        self.ipv4_address = Some(address.into());
        self
    }

    /// Set the alias target (for CNAME records)
    pub fn with_hostname_alias(mut self, alias: impl Into<String>) -> Self {
        self.hostname_alias = Some(alias.into());
        self
    }

    /// Set the pointer target (for PTR records)
    pub fn with_ptr_domainname(mut self, domainname: impl Into<String>) -> Self {
        self.ptr_domainname = Some(domainname.into());
        self
    }

    /// Stable identifier for the managed record.
    ///
    /// Two records sharing zone, name, and type map to the same identifier;
    /// the server addresses records by that triple, so the collision is the
    /// accepted uniqueness boundary.
    pub fn record_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.zone_name, self.record_name, self.record_type
        )
    }

    /// The type-specific value the record's type requires, if populated
    pub(crate) fn type_value(&self) -> Option<&str> {
        let value = match self.record_type {
            RecordType::A => self.ipv4_address.as_deref(),
            RecordType::Cname => self.hostname_alias.as_deref(),
            RecordType::Ptr => self.ptr_domainname.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}
