//! CSV and JSON encoding of record sets
//!
//! Two layouts exist: the typed layout (`Type,Hostname,Target,TTL`) that can
//! carry every record, and the older address-only layout
//! (`Hostname,IP Address,TTL`) that can only carry A records.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::import::RawRow;
use crate::types::Record;

const TYPED_HEADER: [&str; 4] = ["Type", "Hostname", "Target", "TTL"];
const ADDRESS_HEADER: [&str; 3] = ["Hostname", "IP Address", "TTL"];
const REVERSE_HEADER: &str = "PTR";

/// Column/key layout of exported files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// type, hostname, target, ttl
    #[default]
    Typed,
    /// hostname, ipAddress, ttl (A records only)
    AddressOnly,
}

/// Quoting applied to CSV fields on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CsvQuoting {
    /// Quote fields containing delimiters, quotes or newlines
    #[default]
    Rfc4180,
    /// Plain comma join, never quoted
    Never,
}

/// File formats understood by export and import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub layout: Layout,
    pub quoting: CsvQuoting,
    /// Append the derived reverse name as an extra column/key
    pub reverse_names: bool,
}

/// Encode records in the given format
pub fn encode(records: &[Record], format: FileFormat, opts: &ExportOptions) -> Result<String, CodecError> {
    match format {
        FileFormat::Csv => encode_csv(records, opts),
        FileFormat::Json => encode_json(records, opts),
    }
}

/// Decode rows from file content in the given format
pub fn decode(content: &str, format: FileFormat) -> Result<Vec<RawRow>, CodecError> {
    match format {
        FileFormat::Csv => decode_csv(content),
        FileFormat::Json => decode_json(content),
    }
}

/// Pick a format from the file extension, falling back to the content
pub fn detect_format(path: Option<&Path>, content: &str) -> Option<FileFormat> {
    let by_extension = path
        .and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match by_extension.as_deref() {
        Some("csv") => return Some(FileFormat::Csv),
        Some("json") => return Some(FileFormat::Json),
        _ => {}
    }

    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        Some(FileFormat::Json)
    } else if trimmed.lines().next().is_some_and(|line| line.contains(',')) {
        Some(FileFormat::Csv)
    } else {
        None
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Encode records as CSV with a header row
pub fn encode_csv(records: &[Record], opts: &ExportOptions) -> Result<String, CodecError> {
    let quote_style = match opts.quoting {
        CsvQuoting::Rfc4180 => csv::QuoteStyle::Necessary,
        CsvQuoting::Never => csv::QuoteStyle::Never,
    };

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(quote_style)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(false)
        .from_writer(Vec::new());

    let mut header: Vec<&str> = match opts.layout {
        Layout::Typed => TYPED_HEADER.to_vec(),
        Layout::AddressOnly => ADDRESS_HEADER.to_vec(),
    };
    if opts.reverse_names {
        header.push(REVERSE_HEADER);
    }
    wtr.write_record(&header)?;

    for (index, record) in records.iter().enumerate() {
        let ttl = record.ttl().to_string();
        let mut row: Vec<String> = match opts.layout {
            Layout::Typed => vec![
                record.record_type().to_string(),
                record.name().to_string(),
                record.target().to_string(),
                ttl,
            ],
            Layout::AddressOnly => match record {
                Record::A { hostname, target, .. } => vec![hostname.clone(), target.clone(), ttl],
                Record::Cname { .. } => return Err(not_representable(index, record)),
            },
        };
        if opts.reverse_names {
            row.push(record.reverse_name());
        }
        wtr.write_record(&row)?;
    }

    let bytes = wtr.into_inner().map_err(|e| CodecError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode CSV content, skipping the header row and blank lines.
///
/// The header decides the layout: a leading `Type` column means typed rows,
/// otherwise four or more columns are read as typed and three as
/// address-only.
pub fn decode_csv(content: &str) -> Result<Vec<RawRow>, CodecError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = rdr.records();
    let header = match records.next() {
        Some(header) => header?,
        None => return Ok(Vec::new()),
    };

    let typed = match header.get(0) {
        Some(first) if first.eq_ignore_ascii_case("type") => true,
        Some(first) if first.eq_ignore_ascii_case("hostname") => false,
        _ => header.len() >= TYPED_HEADER.len(),
    };

    let mut rows = Vec::new();
    for result in records {
        let fields = result?;
        if fields.iter().all(str::is_empty) {
            continue;
        }

        let field = |i: usize| fields.get(i).map(str::to_string);
        let row = rows.len() + 1;
        rows.push(if typed {
            RawRow {
                row,
                record_type: field(0),
                name: field(1),
                target: field(2),
                ttl: field(3),
            }
        } else {
            RawRow {
                row,
                record_type: None,
                name: field(0),
                target: field(1),
                ttl: field(2),
            }
        });
    }

    Ok(rows)
}

// =============================================================================
// JSON
// =============================================================================

#[derive(Serialize)]
struct TypedJsonRow<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    hostname: &'a str,
    target: &'a str,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    ptr: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddressJsonRow<'a> {
    hostname: &'a str,
    ip_address: &'a str,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    ptr: Option<String>,
}

/// Imported JSON object; accepts both layouts' key names.
///
/// `hostname` wins over `name` and `target` over `ipAddress` when an object
/// carries both.
#[derive(Deserialize)]
struct JsonImportRow {
    #[serde(rename = "type")]
    record_type: Option<String>,
    hostname: Option<String>,
    name: Option<String>,
    target: Option<String>,
    #[serde(rename = "ipAddress")]
    ip_address: Option<String>,
    ttl: Option<serde_json::Value>,
}

/// Encode records as a pretty-printed JSON array
pub fn encode_json(records: &[Record], opts: &ExportOptions) -> Result<String, CodecError> {
    let ptr = |record: &Record| opts.reverse_names.then(|| record.reverse_name());

    let json = match opts.layout {
        Layout::Typed => {
            let rows: Vec<TypedJsonRow<'_>> = records
                .iter()
                .map(|record| TypedJsonRow {
                    record_type: record.record_type().as_str(),
                    hostname: record.name(),
                    target: record.target(),
                    ttl: record.ttl(),
                    ptr: ptr(record),
                })
                .collect();
            serde_json::to_string_pretty(&rows)?
        }
        Layout::AddressOnly => {
            let mut rows = Vec::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                match record {
                    Record::A {
                        hostname,
                        target,
                        ttl,
                    } => rows.push(AddressJsonRow {
                        hostname,
                        ip_address: target,
                        ttl: *ttl,
                        ptr: ptr(record),
                    }),
                    Record::Cname { .. } => return Err(not_representable(index, record)),
                }
            }
            serde_json::to_string_pretty(&rows)?
        }
    };

    Ok(json)
}

/// Decode a JSON array of record objects
pub fn decode_json(content: &str) -> Result<Vec<RawRow>, CodecError> {
    let items: Vec<JsonImportRow> = serde_json::from_str(content)?;

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, item)| RawRow {
            row: i + 1,
            record_type: item.record_type,
            name: item.hostname.or(item.name),
            target: item.target.or(item.ip_address),
            ttl: item.ttl.and_then(json_scalar),
        })
        .collect())
}

/// TTLs were historically stored both as numbers and as strings
fn json_scalar(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn not_representable(index: usize, record: &Record) -> CodecError {
    CodecError::NotRepresentable {
        index,
        record_type: record.record_type().to_string(),
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Record {index} ({record_type}) cannot be written in the address-only layout")]
    NotRepresentable { index: usize, record_type: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoded output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
