// End-to-end tests for the record pipeline
// Form fields -> validation -> session -> store -> CSV/JSON and back

#[cfg(test)]
mod pipeline_tests {
    use crate::codec::{CsvQuoting, ExportOptions, FileFormat, Layout};
    use crate::config::FormConfig;
    use crate::session::{RecordSession, SessionError, SessionHandle};
    use crate::storage::{JsonFileStore, MemoryStore, RecordStore};
    use crate::types::{Record, RecordType};
    use crate::validation::ValidationError;
    use tempfile::tempdir;

    // ===== HELPER FUNCTIONS =====

    fn open_session<S: RecordStore>(store: S, config: &FormConfig) -> RecordSession<S> {
        RecordSession::open(store, config.validation_rules(), config.import_policy())
    }

    // ===== TEST 1: FORM SUBMIT TO CSV =====

    #[test]
    fn test_submit_then_export_csv() {
        let config = FormConfig::default();
        let mut session = open_session(MemoryStore::new(), &config);

        session.submit_address("host1", "192.168.1.10", "3600").unwrap();
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.records().as_slice()[0].record_type(), RecordType::A);

        let typed = session.export(FileFormat::Csv, &config.export_options()).unwrap();
        assert!(typed.lines().any(|line| line == "A,host1,192.168.1.10,3600"));

        let address_only = ExportOptions {
            layout: Layout::AddressOnly,
            ..config.export_options()
        };
        let csv = session.export(FileFormat::Csv, &address_only).unwrap();
        assert_eq!(csv.lines().next(), Some("Hostname,IP Address,TTL"));
        assert!(csv.lines().any(|line| line == "host1,192.168.1.10,3600"));
    }

    // ===== TEST 2: JSON ROUND TRIP THROUGH A SECOND STORE =====

    #[test]
    fn test_json_export_import_round_trip() {
        let dir = tempdir().unwrap();
        let config = FormConfig::default();

        let mut source = open_session(JsonFileStore::new(dir.path(), "source"), &config);
        source.submit_address("host1", "192.168.1.10", "3600").unwrap();
        source.submit_alias("www", "example.com", Some("300")).unwrap();
        source.submit_address("host1", "192.168.1.10", "3600").unwrap();
        source.submit_address("db", "10.00.0.7", "0").unwrap();

        let json = source.export(FileFormat::Json, &config.export_options()).unwrap();

        let mut target = open_session(JsonFileStore::new(dir.path(), "target"), &config);
        let export_path = dir.path().join("export.json");
        assert_eq!(target.import_content(&json, Some(&export_path)).unwrap(), 4);
        assert_eq!(target.records(), source.records());

        // And the target's store reads back the same sequence
        let reopened = open_session(JsonFileStore::new(dir.path(), "target"), &config);
        assert_eq!(reopened.records(), source.records());
    }

    // ===== TEST 3: CSV ROUND TRIP WITH QUOTING =====

    #[test]
    fn test_csv_round_trip_with_quoted_fields() {
        let config = FormConfig::default();
        let mut source = open_session(MemoryStore::new(), &config);
        source.submit_alias("a,b", "example.com", None).unwrap();

        let opts = ExportOptions {
            quoting: CsvQuoting::Rfc4180,
            ..config.export_options()
        };
        let csv = source.export(FileFormat::Csv, &opts).unwrap();

        let mut target = open_session(MemoryStore::new(), &config);
        target.import_content(&csv, None).unwrap();
        assert_eq!(target.records(), source.records());
    }

    // ===== TEST 4: LEGACY ADDRESS-ONLY DATA =====

    #[test]
    fn test_import_legacy_address_only_json() {
        let config = FormConfig::default();
        let mut session = open_session(MemoryStore::new(), &config);

        let legacy = r#"[
            {"hostname": "host1", "ipAddress": "192.168.1.10", "ttl": "3600"},
            {"hostname": "host2", "ipAddress": "192.168.1.11", "ttl": 60}
        ]"#;
        assert_eq!(session.import_content(legacy, None).unwrap(), 2);

        let first = &session.records().as_slice()[0];
        assert_eq!(
            first,
            &Record::A {
                hostname: "host1".to_string(),
                target: "192.168.1.10".to_string(),
                ttl: 3600,
            }
        );
        assert_eq!(first.reverse_name(), "10.1.168.192.in-addr.arpa");
    }

    // ===== TEST 5: STRICT CONFIGURATION =====

    #[test]
    fn test_strict_config_applies_to_form_and_import() {
        let config = FormConfig::default().with_strict_domains(true);
        let mut session = open_session(MemoryStore::new(), &config);

        let err = session.submit_alias("www", "example.c", None).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::InvalidDomainFormat(_))
        ));

        let csv = "Type,Hostname,Target,TTL\nCNAME,www,example.c,60\n";
        assert!(session.import_content(csv, None).is_err());
        assert!(session.records().is_empty());
    }

    // ===== TEST 6: SHARED HANDLE =====

    #[tokio::test]
    async fn test_handle_import_then_submit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        std::fs::write(
            &path,
            "Type,Hostname,Target,TTL\nA,host1,10.0.0.1,60\nCNAME,www,example.com,300\n\n",
        )
        .unwrap();

        let config = FormConfig::default();
        let handle = SessionHandle::new(open_session(
            JsonFileStore::new(dir.path(), &config.storage_key),
            &config,
        ));

        assert_eq!(handle.import_file(&path).await.unwrap(), 2);
        handle.submit_address("host3", "10.0.0.3", "60").unwrap();

        let names: Vec<String> = handle
            .records()
            .await
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["host1", "www", "host3"]);
    }
}
