//! Record session
//!
//! Owns the in-memory record set for one run of the tool together with the
//! injected store. Every successful append goes to memory first and is then
//! persisted; a persistence failure is reported but the record stays usable
//! in memory.
//!
//! [`SessionHandle`] is the shared, single-flight front: an import holds the
//! session for its whole duration (including the file read), and a submit
//! arriving meanwhile is refused with [`SessionError::Busy`].

use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::codec::{self, CodecError, ExportOptions, FileFormat};
use crate::import::{coerce_batch, ImportError, ImportPolicy};
use crate::storage::{RecordStore, StoreError};
use crate::types::{Record, RecordSet};
use crate::validation::{ValidationError, ValidationRules};

/// Session state: the record set and the store it is mirrored to
pub struct RecordSession<S: RecordStore> {
    records: RecordSet,
    store: S,
    rules: ValidationRules,
    import_policy: ImportPolicy,
}

impl<S: RecordStore> RecordSession<S> {
    /// Open a session, reading back everything the store holds
    pub fn open(store: S, rules: ValidationRules, import_policy: ImportPolicy) -> Self {
        let records = store.load_all();
        info!("📦 Loaded {} stored records", records.len());

        Self {
            records,
            store,
            rules,
            import_policy,
        }
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// Validate and append an address (A) record
    pub fn submit_address(
        &mut self,
        hostname: &str,
        ip_address: &str,
        ttl: &str,
    ) -> Result<Record, SessionError> {
        let record = self.rules.validate_address_record(hostname, ip_address, ttl)?;
        self.append(record)
    }

    /// Validate and append an alias (CNAME) record
    pub fn submit_alias(
        &mut self,
        alias: &str,
        canonical: &str,
        ttl: Option<&str>,
    ) -> Result<Record, SessionError> {
        let record = self.rules.validate_alias_record(alias, canonical, ttl)?;
        self.append(record)
    }

    /// Decode, coerce and append an import file's content as one batch.
    ///
    /// Nothing is appended unless every row coerces. Returns the number of
    /// records added.
    pub fn import_content(&mut self, content: &str, path: Option<&Path>) -> Result<usize, SessionError> {
        let format = codec::detect_format(path, content).ok_or(ImportError::FormatUnrecognized)?;
        let rows = codec::decode(content, format).map_err(ImportError::from)?;
        let records = coerce_batch(&rows, &self.import_policy)?;

        let count = records.len();
        if count == 0 {
            return Ok(0);
        }

        self.records.extend(records.iter().cloned());
        info!("📥 Imported {} records ({:?})", count, format);

        if let Err(e) = self.store.append_all(&records) {
            warn!("Imported records kept in memory only: {}", e);
            return Err(SessionError::Storage(e));
        }

        Ok(count)
    }

    /// Encode the current record set
    pub fn export(&self, format: FileFormat, opts: &ExportOptions) -> Result<String, SessionError> {
        Ok(codec::encode(self.records.as_slice(), format, opts)?)
    }

    fn append(&mut self, record: Record) -> Result<Record, SessionError> {
        self.records.push(record.clone());

        if let Err(e) = self.store.append(&record) {
            warn!("Record kept in memory only: {}", e);
            return Err(SessionError::Storage(e));
        }

        Ok(record)
    }
}

// =============================================================================
// SHARED HANDLE
// =============================================================================

/// Cloneable, single-flight access to a session
pub struct SessionHandle<S: RecordStore> {
    inner: Arc<Mutex<RecordSession<S>>>,
}

impl<S: RecordStore> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: RecordStore> SessionHandle<S> {
    pub fn new(session: RecordSession<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Wait for exclusive access
    pub async fn lock(&self) -> MutexGuard<'_, RecordSession<S>> {
        self.inner.lock().await
    }

    fn try_lock(&self) -> Result<MutexGuard<'_, RecordSession<S>>, SessionError> {
        self.inner.try_lock().map_err(|_| SessionError::Busy)
    }

    /// Submit an address record unless another operation is in flight
    pub fn submit_address(&self, hostname: &str, ip_address: &str, ttl: &str) -> Result<Record, SessionError> {
        let mut session = self.try_lock()?;
        session.submit_address(hostname, ip_address, ttl)
    }

    /// Submit an alias record unless another operation is in flight
    pub fn submit_alias(&self, alias: &str, canonical: &str, ttl: Option<&str>) -> Result<Record, SessionError> {
        let mut session = self.try_lock()?;
        session.submit_alias(alias, canonical, ttl)
    }

    /// Read an import file and apply it as one batch.
    ///
    /// The session stays claimed while the file is read, so submits are
    /// refused until the batch is done.
    pub async fn import_file(&self, path: &Path) -> Result<usize, SessionError> {
        let mut session = self.try_lock()?;
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ImportError::from)?;
        session.import_content(&content, Some(path))
    }

    /// Snapshot of the current records
    pub async fn records(&self) -> RecordSet {
        self.lock().await.records().clone()
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Unable to save records: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Another operation is still in progress")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore, DEFAULT_STORAGE_KEY};
    use crate::types::RecordType;
    use tempfile::tempdir;

    /// Store whose writes always fail
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn load_all(&self) -> RecordSet {
            RecordSet::new()
        }

        fn append(&mut self, _record: &Record) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn memory_session() -> RecordSession<MemoryStore> {
        RecordSession::open(MemoryStore::new(), ValidationRules::default(), ImportPolicy::default())
    }

    #[test]
    fn test_submit_appends_and_persists() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path(), DEFAULT_STORAGE_KEY);
        let mut session = RecordSession::open(store, ValidationRules::default(), ImportPolicy::default());

        session.submit_address("host1", "192.168.1.10", "3600").unwrap();
        session.submit_alias("www", "example.com", None).unwrap();
        assert_eq!(session.records().len(), 2);

        // A new session reads the same sequence back
        let reopened = RecordSession::open(
            JsonFileStore::new(dir.path(), DEFAULT_STORAGE_KEY),
            ValidationRules::default(),
            ImportPolicy::default(),
        );
        assert_eq!(reopened.records(), session.records());
    }

    #[test]
    fn test_validation_failure_leaves_set_untouched() {
        let mut session = memory_session();

        let err = session.submit_address("host1", "10.0.0.300", "60").unwrap_err();
        assert!(matches!(err, SessionError::Validation(ValidationError::InvalidAddress(_))));
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_storage_failure_keeps_record_in_memory() {
        let mut session = RecordSession::open(BrokenStore, ValidationRules::default(), ImportPolicy::default());

        let err = session.submit_address("host1", "10.0.0.1", "60").unwrap_err();
        assert!(matches!(err, SessionError::Storage(StoreError::Unavailable(_))));
        assert_eq!(session.records().len(), 1);

        // Session remains usable
        assert!(session.submit_alias("www", "example.com", None).is_err());
        assert_eq!(session.records().len(), 2);
    }

    #[test]
    fn test_import_batch_is_all_or_nothing() {
        let mut session = memory_session();
        session.submit_address("existing", "10.0.0.1", "60").unwrap();

        let bad = "Type,Hostname,Target,TTL\nA,host1,10.0.0.2,60\nA,host2,10.0.0.256,60\n";
        let err = session.import_content(bad, None).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Import(ImportError::InvalidRow { row: 2, .. })
        ));
        assert_eq!(session.records().len(), 1);

        let good = "Type,Hostname,Target,TTL\nA,host1,10.0.0.2,60\nCNAME,www,example.com,300\n";
        assert_eq!(session.import_content(good, None).unwrap(), 2);
        assert_eq!(session.records().len(), 3);
        assert_eq!(session.records().as_slice()[2].record_type(), RecordType::Cname);
    }

    #[test]
    fn test_import_unrecognized_format() {
        let mut session = memory_session();
        let err = session
            .import_content("just some text", Some(Path::new("notes.txt")))
            .unwrap_err();
        assert!(matches!(err, SessionError::Import(ImportError::FormatUnrecognized)));
    }

    #[tokio::test]
    async fn test_submit_refused_while_busy() {
        let handle = SessionHandle::new(memory_session());

        {
            let _claimed = handle.lock().await;
            assert!(matches!(
                handle.submit_address("host1", "10.0.0.1", "60"),
                Err(SessionError::Busy)
            ));
        }

        let record = handle.submit_address("host1", "10.0.0.1", "60").unwrap();
        assert_eq!(record.name(), "host1");
        assert_eq!(handle.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_import_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[{"type": "A", "hostname": "host1", "target": "10.0.0.1", "ttl": 60}]"#,
        )
        .unwrap();

        let handle = SessionHandle::new(memory_session());
        assert_eq!(handle.import_file(&path).await.unwrap(), 1);

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            handle.import_file(&missing).await,
            Err(SessionError::Import(ImportError::Io(_)))
        ));
    }
}
