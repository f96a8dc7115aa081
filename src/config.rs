//! Record form configuration
//!
//! Loaded from a TOML file when present; every field has a default so a
//! partial file is fine. CLI flags are applied afterwards through the
//! builder-style `with_*` methods.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codec::{CsvQuoting, ExportOptions, Layout};
use crate::import::ImportPolicy;
use crate::storage::DEFAULT_STORAGE_KEY;
use crate::types::DEFAULT_TTL;
use crate::validation::{DomainRule, ValidationRules};

/// Main configuration for the record form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    // === Storage ===

    /// Directory holding the key-value files (platform data dir when unset)
    pub data_dir: Option<PathBuf>,

    /// Key the record array is stored under
    pub storage_key: String,

    // === Validation ===

    /// TTL for alias records submitted without one
    pub default_ttl: u32,

    /// Hostname strictness
    pub domain_rule: DomainRule,

    /// Re-run the form validators over imported rows
    pub revalidate_imports: bool,

    // === Export ===

    /// CSV quoting on export
    pub csv_quoting: CsvQuoting,

    /// Column/key layout of exported files
    pub layout: Layout,

    /// Add the derived reverse name to exported rows
    pub export_reverse_names: bool,

    // === UI ===

    /// Seconds an error message stays on screen in interactive mode
    pub notice_secs: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),

            default_ttl: DEFAULT_TTL,
            domain_rule: DomainRule::Loose,
            revalidate_imports: true,

            csv_quoting: CsvQuoting::Rfc4180,
            layout: Layout::Typed,
            export_reverse_names: false,

            notice_secs: 5,
        }
    }
}

impl FormConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    // Builder-style methods for CLI overrides

    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.data_dir = dir;
        }
        self
    }

    pub fn with_storage_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key {
            self.storage_key = key;
        }
        self
    }

    pub fn with_layout(mut self, layout: Option<Layout>) -> Self {
        if let Some(layout) = layout {
            self.layout = layout;
        }
        self
    }

    pub fn with_strict_domains(mut self, strict: bool) -> Self {
        if strict {
            self.domain_rule = DomainRule::Strict;
        }
        self
    }

    /// Directory the store writes to
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("arecord-creator")
        })
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules::default()
            .with_domain_rule(self.domain_rule)
            .with_default_ttl(self.default_ttl)
    }

    pub fn import_policy(&self) -> ImportPolicy {
        ImportPolicy {
            rules: self.validation_rules(),
            revalidate: self.revalidate_imports,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            layout: self.layout,
            quoting: self.csv_quoting,
            reverse_names: self.export_reverse_names,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.storage_key.trim().is_empty() {
            anyhow::bail!("storage_key must not be empty");
        }

        if self
            .storage_key
            .chars()
            .any(|c| std::path::is_separator(c) || c == '.')
        {
            anyhow::bail!(
                "storage_key ({}) must not contain path separators or dots",
                self.storage_key
            );
        }

        if self.notice_secs == 0 {
            anyhow::bail!("notice_secs must be at least 1");
        }

        Ok(())
    }
}
