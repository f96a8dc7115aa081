// CLI - Command line interface for the record form

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::codec::{FileFormat, Layout};

/// A Record Creator - author A and CNAME records locally
#[derive(Parser, Debug)]
#[command(name = "arecord-creator")]
#[command(author = "A Record Creator Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Author A and CNAME records with CSV/JSON import and export")]
#[command(long_about = r#"
Author DNS-style A and CNAME records, keep them in a local store, and
move them in and out as CSV or JSON.

Open the interactive form:
  arecord-creator

Add a record directly:
  arecord-creator add-a host1 192.168.1.10 --ttl 3600
  arecord-creator add-cname www example.com

Export and import:
  arecord-creator export --format csv --output records.csv
  arecord-creator import records.json
"#)]
pub struct Cli {
    /// Subcommand to execute (interactive form when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "arecord.toml", env = "ARECORD_CONFIG")]
    pub config: PathBuf,

    /// Directory holding the record store
    #[arg(short = 'd', long, global = true, env = "ARECORD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Key the records are stored under
    #[arg(long, global = true)]
    pub storage_key: Option<String>,

    /// Keep records in memory only for this run
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Use the strict hostname rule
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", env = "ARECORD_LOG")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive form
    Interactive,

    /// Add an address (A) record
    AddA(AddAddressCmd),

    /// Add an alias (CNAME) record
    AddCname(AddAliasCmd),

    /// Show stored records
    List,

    /// Export records as CSV or JSON
    Export(ExportCmd),

    /// Import records from a CSV or JSON file
    Import(ImportCmd),

    /// Check whether a value is a class A/B/C subnet mask
    Mask(MaskCmd),
}

/// Add an address record
#[derive(Parser, Debug)]
pub struct AddAddressCmd {
    /// Hostname
    pub hostname: String,

    /// IPv4 address (dotted quad)
    pub ip_address: String,

    /// Time to live in seconds
    #[arg(long, default_value = "3600")]
    pub ttl: String,
}

/// Add an alias record
#[derive(Parser, Debug)]
pub struct AddAliasCmd {
    /// Alias name
    pub alias: String,

    /// Canonical name the alias points to
    pub canonical: String,

    /// Time to live in seconds (configured default when omitted)
    #[arg(long)]
    pub ttl: Option<String>,
}

/// Export records
#[derive(Parser, Debug)]
pub struct ExportCmd {
    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: FileFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Column layout (overrides the configuration)
    #[arg(long, value_enum)]
    pub layout: Option<Layout>,

    /// Add the reverse name (PTR) column
    #[arg(long)]
    pub reverse_names: bool,
}

/// Import records
#[derive(Parser, Debug)]
pub struct ImportCmd {
    /// CSV or JSON file
    pub file: PathBuf,
}

/// Check a subnet mask
#[derive(Parser, Debug)]
pub struct MaskCmd {
    /// Mask in dotted-quad form, e.g. 255.255.255.0
    pub value: String,
}
