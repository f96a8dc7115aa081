// Types for record authoring - canonical record model shared by store, codec and UI

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::reverse_name;

/// TTL applied when a record does not carry one
pub const DEFAULT_TTL: u32 = 3600;

/// Sentinel shown in place of a reverse name for non-address records
pub const NO_REVERSE_NAME: &str = "N/A";

// =============================================================================
// RECORD TYPES
// =============================================================================

/// Record type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// Hostname to IPv4 address
    A,
    /// Alias to canonical hostname
    #[serde(rename = "CNAME")]
    Cname,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Cname => "CNAME",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "CNAME" => Ok(RecordType::Cname),
            other => Err(format!("unsupported record type '{}'", other)),
        }
    }
}

/// Canonical record, only produced by the validators and import coercion.
///
/// Serialized with an internal `type` tag so the stored and exported JSON
/// shape is `{"type": "A", "hostname": ..., "target": ..., "ttl": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Record {
    /// Address record: `target` is an IPv4 dotted quad, kept as entered
    #[serde(rename = "A")]
    A {
        hostname: String,
        target: String,
        ttl: u32,
    },
    /// Alias record: `hostname` is the alias, `target` the canonical name
    #[serde(rename = "CNAME")]
    Cname {
        hostname: String,
        target: String,
        ttl: u32,
    },
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        match self {
            Record::A { .. } => RecordType::A,
            Record::Cname { .. } => RecordType::Cname,
        }
    }

    /// Hostname (A) or alias (CNAME)
    pub fn name(&self) -> &str {
        match self {
            Record::A { hostname, .. } | Record::Cname { hostname, .. } => hostname,
        }
    }

    /// IPv4 address (A) or canonical name (CNAME)
    pub fn target(&self) -> &str {
        match self {
            Record::A { target, .. } | Record::Cname { target, .. } => target,
        }
    }

    pub fn ttl(&self) -> u32 {
        match self {
            Record::A { ttl, .. } | Record::Cname { ttl, .. } => *ttl,
        }
    }

    /// Reverse lookup name, derived on every call and never stored.
    ///
    /// Alias records have no address to reverse and yield [`NO_REVERSE_NAME`].
    pub fn reverse_name(&self) -> String {
        match self {
            Record::A { target, .. } => {
                reverse_name(target).unwrap_or_else(|| NO_REVERSE_NAME.to_string())
            }
            Record::Cname { .. } => NO_REVERSE_NAME.to_string(),
        }
    }
}

// =============================================================================
// RECORD SET
// =============================================================================

/// Ordered, append-only collection of records (duplicates allowed)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Create empty set
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record at the end
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Append a batch, preserving its order
    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Get total count
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
