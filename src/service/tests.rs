//! Service Module Tests
//!
//! Drives `KvsService::execute` the way the transport does, with raw
//! parameter batches, and checks the rendered envelopes.
//!
//! ## Test Scopes
//! - **Scenarios**: create, merge-overwrite, remove-then-fetch, callback wrapping.
//! - **User errors**: every "ng" path, including the ones that must not touch storage.
//! - **Integration errors**: missing parameter batches and corrupt records.
//! - **Transport limits**: the request body cap stays above the record quota.

#[cfg(test)]
mod tests {
    use crate::config::KvsConfig;
    use crate::error::KvsError;
    use crate::request::types::{KvsRequest, PersonId, RawParams};
    use crate::response::envelope::Status;
    use crate::service::handlers::body_limit;
    use crate::service::orchestrator::KvsService;
    use serde_json::Value;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn service() -> (TempDir, KvsService) {
        let dir = tempdir().unwrap();
        let config = KvsConfig {
            data_dir: dir.path().join("data"),
            ..KvsConfig::default()
        };
        (dir, KvsService::new(config))
    }

    fn request(pairs: &[(&str, &str)]) -> KvsRequest {
        KvsRequest::new().with_parameters(RawParams::from_pairs(pairs.iter().copied()))
    }

    fn run(service: &KvsService, pairs: &[(&str, &str)]) -> Value {
        let response = service.execute(&request(pairs)).unwrap();
        serde_json::from_str(&response.body).unwrap()
    }

    fn assert_ng(value: &Value, message: &str) {
        assert_eq!(value["status"], "ng");
        assert_eq!(value["message"], message);
        assert!(value["data"].is_null());
    }

    // ============================================================
    // SCENARIO TESTS
    // ============================================================

    #[test]
    fn test_create_merge_remove_scenario() {
        let (_dir, service) = service();

        let created = run(
            &service,
            &[
                ("__mode__", "update"),
                ("__person_id__", "goodman"),
                ("a", "1"),
                ("b", "two"),
                ("c", "abc\ndef\nghi"),
            ],
        );
        assert_eq!(created["status"], "ok");
        assert_eq!(created["message"], "Succeeded updating data, data-size=`15`");

        let fetched = run(&service, &[("__mode__", "fetch"), ("__person_id__", "goodman")]);
        assert_eq!(fetched["status"], "ok");
        assert_eq!(fetched["message"], "Succeeded fetching data");
        assert_eq!(
            fetched["data"],
            serde_json::json!({"a": "1", "b": "two", "c": "abc\ndef\nghi"})
        );

        run(
            &service,
            &[
                ("__mode__", "update"),
                ("__person_id__", "goodman"),
                ("a", "11"),
                ("d", "new_key"),
            ],
        );
        let merged = run(&service, &[("__person_id__", "goodman")]);
        assert_eq!(
            merged["data"],
            serde_json::json!({"a": "11", "b": "two", "c": "abc\ndef\nghi", "d": "new_key"})
        );

        let removed = run(&service, &[("__mode__", "remove"), ("__person_id__", "goodman")]);
        assert_eq!(removed["status"], "ok");
        assert_eq!(removed["message"], "Succeeded removing data");

        let gone = run(&service, &[("__mode__", "fetch"), ("__person_id__", "goodman")]);
        assert_ng(&gone, "Data not found");
    }

    #[test]
    fn test_fetch_without_callback_is_bare_json() {
        let (_dir, service) = service();
        run(
            &service,
            &[("__mode__", "update"), ("__person_id__", "goodman"), ("_hoge", "1")],
        );

        let response = service
            .execute(&request(&[("__person_id__", "goodman")]))
            .unwrap();

        assert!(response.body.starts_with('{'));
        assert_eq!(response.status, Status::Ok);
    }

    #[test]
    fn test_fetch_with_callback_is_wrapped() {
        let (_dir, service) = service();
        run(
            &service,
            &[("__mode__", "update"), ("__person_id__", "goodman"), ("_hoge", "1")],
        );

        let response = service
            .execute(&request(&[
                ("__mode__", "fetch"),
                ("__person_id__", "goodman"),
                ("__jsonp__", "__myCallback"),
            ]))
            .unwrap();

        let body = response.body;
        assert!(body.starts_with("__myCallback("));
        assert!(body.ends_with(')'));
        let inner: Value =
            serde_json::from_str(&body["__myCallback(".len()..body.len() - 1]).unwrap();
        assert_eq!(inner["status"], "ok");
        assert_eq!(inner["data"]["_hoge"], "1");
    }

    #[test]
    fn test_ng_response_is_wrapped_too() {
        let (_dir, service) = service();

        let response = service
            .execute(&request(&[("__person_id__", "nobody_here"), ("__jsonp__", "cb")]))
            .unwrap();

        assert_eq!(response.status, Status::Ng);
        assert!(response.body.starts_with("cb({\"status\":\"ng\""));
    }

    #[test]
    fn test_invalid_callback_is_ignored() {
        let (_dir, service) = service();

        let response = service
            .execute(&request(&[
                ("__person_id__", "nobody_here"),
                ("__jsonp__", "alert(document.cookie)"),
            ]))
            .unwrap();

        assert!(response.body.starts_with('{'));
    }

    // ============================================================
    // USER ERROR TESTS
    // ============================================================

    #[test]
    fn test_missing_person_id_touches_nothing() {
        let (_dir, service) = service();

        for mode in ["fetch", "update", "remove"] {
            let value = run(&service, &[("__mode__", mode), ("a", "1")]);
            assert_ng(&value, "None `__person_id__` in params");
        }
        let invalid = run(&service, &[("__mode__", "update"), ("__person_id__", "abc"), ("a", "1")]);
        assert_ng(&invalid, "None `__person_id__` in params");

        assert!(!service.engine().root().exists());
    }

    #[test]
    fn test_missing_person_id_wins_over_oversized_value() {
        let (_dir, service) = service();
        let big = "x".repeat(64_001);

        let value = run(&service, &[("__mode__", "update"), ("bigsize", big.as_str())]);

        assert_ng(&value, "None `__person_id__` in params");
    }

    #[test]
    fn test_update_without_data() {
        let (_dir, service) = service();

        let value = run(&service, &[("__mode__", "update"), ("__person_id__", "tester")]);

        assert_ng(&value, "None data");
    }

    #[test]
    fn test_update_with_only_invalid_keys_is_empty() {
        let (_dir, service) = service();

        let value = run(
            &service,
            &[("__mode__", "update"), ("__person_id__", "tester"), ("a.b", "1")],
        );

        assert_ng(&value, "None data");
    }

    #[test]
    fn test_oversized_value_rejects_whole_update() {
        let (_dir, service) = service();
        let big = format!("a{}", "1".repeat(64_000));

        let value = run(
            &service,
            &[
                ("__mode__", "update"),
                ("__person_id__", "tester"),
                ("small", "ok"),
                ("bigsize", big.as_str()),
            ],
        );

        assert_ng(&value, "`bigsize`'s value size is too big");
        let fetched = run(&service, &[("__person_id__", "tester")]);
        assert_ng(&fetched, "Data not found");
    }

    #[test]
    fn test_quota_overflow() {
        let dir = tempdir().unwrap();
        let service = KvsService::new(KvsConfig {
            data_dir: dir.path().join("data"),
            max_data_size: 5,
            ..KvsConfig::default()
        });

        let value = run(
            &service,
            &[("__mode__", "update"), ("__person_id__", "tester"), ("a", "123456")],
        );

        assert_ng(&value, "Overflow data-size=`6`");
        let location = service.engine().locate(&PersonId::parse("tester").unwrap());
        assert!(!location.file.exists());
    }

    #[test]
    fn test_remove_missing_record() {
        let (_dir, service) = service();

        let first = run(&service, &[("__mode__", "remove"), ("__person_id__", "sonzai_shimasen")]);
        let second = run(&service, &[("__mode__", "remove"), ("__person_id__", "sonzai_shimasen")]);

        assert_ng(&first, "Data not found");
        assert_ng(&second, "Data not found");
    }

    #[test]
    fn test_reserved_keys_never_stored() {
        let (_dir, service) = service();
        run(
            &service,
            &[
                ("__mode__", "update"),
                ("__person_id__", "tester"),
                ("__jsonp__", "cb"),
                ("a", "1"),
            ],
        );

        let response = service
            .execute(&request(&[("__person_id__", "tester")]))
            .unwrap();
        let value: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(value["data"], serde_json::json!({"a": "1"}));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_fetch() {
        let (_dir, service) = service();

        let value = run(
            &service,
            &[("__mode__", "truncate"), ("__person_id__", "tester"), ("a", "1")],
        );

        // Treated as a fetch of a record that does not exist, nothing written
        assert_ng(&value, "Data not found");
    }

    // ============================================================
    // INTEGRATION ERROR TESTS
    // ============================================================

    #[test]
    fn test_request_without_parameters_is_fatal() {
        let (_dir, service) = service();

        let err = service.execute(&KvsRequest::new()).unwrap_err();

        assert!(matches!(err, KvsError::MissingParameters));
    }

    #[test]
    fn test_empty_parameter_batch_is_not_fatal() {
        let (_dir, service) = service();

        let response = service
            .execute(&KvsRequest::new().with_parameters(RawParams::new()))
            .unwrap();

        assert_eq!(response.status, Status::Ng);
    }

    #[test]
    fn test_corrupt_record_is_fatal() {
        let (_dir, service) = service();
        let location = service.engine().locate(&PersonId::parse("tester").unwrap());
        fs::create_dir_all(&location.dir).unwrap();
        fs::write(&location.file, "no separator here\n").unwrap();

        let err = service
            .execute(&request(&[("__person_id__", "tester")]))
            .unwrap_err();

        assert!(matches!(err, KvsError::CorruptRecord { .. }));
    }

    // ============================================================
    // TRANSPORT LIMIT TESTS
    // ============================================================

    #[test]
    fn test_body_limit_exceeds_record_quota() {
        let config = KvsConfig::default();
        let limit = body_limit(&config) as u64;

        // Percent-encoding triples every byte at most
        assert!(limit > config.max_data_size * 3);
    }

    #[test]
    fn test_body_limit_follows_config() {
        let small = KvsConfig {
            max_data_size: 1_000,
            ..KvsConfig::default()
        };

        assert!(body_limit(&small) < body_limit(&KvsConfig::default()));
        assert_eq!(service().1.config().max_data_size, 10_000_000);
    }
}
