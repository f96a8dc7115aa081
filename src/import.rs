//! Bulk import coercion
//!
//! Rows decoded from an import file arrive as loosely-typed [`RawRow`]s and
//! are coerced into canonical records here. A batch is all-or-nothing: the
//! first bad row aborts it before anything reaches the record set.

use tracing::debug;

use crate::codec::CodecError;
use crate::types::{Record, RecordType};
use crate::validation::{parse_ttl, sanitize_input, ValidationError, ValidationRules};

/// One row as read from CSV or JSON, before any validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based data row number within the file (header excluded)
    pub row: usize,
    /// Type column, absent in address-only files
    pub record_type: Option<String>,
    pub name: Option<String>,
    pub target: Option<String>,
    pub ttl: Option<String>,
}

/// How imported rows are turned into records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportPolicy {
    pub rules: ValidationRules,
    /// Run the interactive-entry validators over every row
    pub revalidate: bool,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            rules: ValidationRules::default(),
            revalidate: true,
        }
    }
}

/// Coerce a single imported row into a record
pub fn coerce_imported_row(row: &RawRow, policy: &ImportPolicy) -> Result<Record, ImportError> {
    let name = present(row, &row.name, "hostname")?;
    let target = present(row, &row.target, "target")?;
    let ttl = present(row, &row.ttl, "ttl")?;

    let record_type = match row.record_type.as_deref().map(str::trim) {
        None | Some("") => RecordType::A,
        Some(raw) => raw.parse::<RecordType>().map_err(|reason| ImportError::MalformedRow {
            row: row.row,
            reason,
        })?,
    };

    if policy.revalidate {
        let result = match record_type {
            RecordType::A => policy.rules.validate_address_record(&name, &target, &ttl),
            RecordType::Cname => policy.rules.validate_alias_record(&name, &target, Some(&ttl)),
        };
        return result.map_err(|source| ImportError::InvalidRow {
            row: row.row,
            source,
        });
    }

    // Trusting path: only the TTL must still fit the record type
    let ttl = parse_ttl(&ttl).map_err(|_| ImportError::MalformedRow {
        row: row.row,
        reason: format!("ttl '{}' is not a non-negative integer", ttl),
    })?;

    Ok(match record_type {
        RecordType::A => Record::A {
            hostname: name,
            target,
            ttl,
        },
        RecordType::Cname => Record::Cname {
            hostname: name,
            target,
            ttl,
        },
    })
}

/// Coerce every row, failing on the first bad one
pub fn coerce_batch(rows: &[RawRow], policy: &ImportPolicy) -> Result<Vec<Record>, ImportError> {
    let records = rows
        .iter()
        .map(|row| coerce_imported_row(row, policy))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Coerced {} imported rows", records.len());
    Ok(records)
}

fn present(row: &RawRow, value: &Option<String>, field: &str) -> Result<String, ImportError> {
    let value = value.as_deref().map(sanitize_input).unwrap_or_default();
    if value.is_empty() {
        Err(ImportError::MalformedRow {
            row: row.row,
            reason: format!("missing {}", field),
        })
    } else {
        Ok(value)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Invalid row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Import format not recognized (expected CSV or JSON)")]
    FormatUnrecognized,

    #[error("Failed to decode import file: {0}")]
    Decode(#[from] CodecError),

    #[error("Failed to read import file: {0}")]
    Io(#[from] std::io::Error),
}
