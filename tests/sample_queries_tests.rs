//! End-to-end behavior of the setup and example operations against a
//! database file.

mod common;

#[cfg(test)]
mod tests {
    use super::common::SampleDb;
    use sqldemo::core::db::{Pool, SqlType};
    use sqldemo::core::DemoError;
    use sqldemo::samples::{self, TransactionOutcome};
    use sqldemo::setup::{setup_database, INFO_SEED, USERS_SEED};

    #[test]
    fn test_setup_is_idempotent() {
        let db = SampleDb::empty();
        setup_database(&db.config).unwrap();
        let report = setup_database(&db.config).unwrap();

        assert_eq!(report.info_count, 10);
        assert_eq!(report.users_count, 5);
        assert_eq!(db.count("info"), 10);
        assert_eq!(db.count("users"), 5);
        assert_eq!(db.info_names(), INFO_SEED.to_vec());
    }

    #[test]
    fn test_setup_discards_extra_rows() {
        let db = SampleDb::seeded();
        samples::insert_record(&db.config, "Leftover").unwrap();
        assert_eq!(db.count("info"), 11);

        setup_database(&db.config).unwrap();
        assert_eq!(db.count("info"), 10);
    }

    #[test]
    fn test_users_seed_has_timestamps() {
        let db = SampleDb::empty();
        let report = setup_database(&db.config).unwrap();

        let emails: Vec<_> = report.users.iter().map(|u| u.email.as_deref().unwrap()).collect();
        let expected: Vec<_> = USERS_SEED.iter().map(|(_, email)| *email).collect();
        assert_eq!(emails, expected);
        assert!(report.users.iter().all(|u| u.created_date.and_utc().timestamp() > 0));
    }

    #[test]
    fn test_insert_then_read() {
        let db = SampleDb::seeded();
        let id = samples::insert_record(&db.config, "Grace Hopper").unwrap();

        let record = samples::get_record_by_id(&db.config, id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.name, "Grace Hopper");
    }

    #[test]
    fn test_update_then_read() {
        let db = SampleDb::seeded();
        let affected = samples::update_record(&db.config, 2, "Jane Doe").unwrap();
        assert_eq!(affected, 1);

        let record = samples::get_record_by_id(&db.config, 2).unwrap().unwrap();
        assert_eq!(record.name, "Jane Doe");
    }

    #[test]
    fn test_update_nonexistent_reports_zero() {
        let db = SampleDb::seeded();
        assert_eq!(samples::update_record(&db.config, 9999, "Nobody").unwrap(), 0);
        assert_eq!(db.info_names(), INFO_SEED.to_vec());
    }

    #[test]
    fn test_delete_then_read() {
        let db = SampleDb::seeded();
        assert_eq!(samples::delete_record(&db.config, 3).unwrap(), 1);

        let all = samples::get_all_records(&db.config).unwrap();
        assert_eq!(all.len(), 9);
        assert!(all.iter().all(|row| row.get_i64("id") != Some(3)));
        assert_eq!(samples::get_record_by_id(&db.config, 3).unwrap(), None);
    }

    #[test]
    fn test_delete_nonexistent_reports_zero() {
        let db = SampleDb::seeded();
        assert_eq!(samples::delete_record(&db.config, 9999).unwrap(), 0);
        assert_eq!(db.count("info"), 10);
    }

    #[test]
    fn test_search_matches_substring() {
        let db = SampleDb::seeded();
        let found = samples::search_by_name(&db.config, "John").unwrap();
        let mut names: Vec<_> = found.iter().filter_map(|r| r.get_str("name")).collect();
        names.sort();
        assert_eq!(names, vec!["John Doe", "Mike Johnson"]);

        let none = samples::search_by_name(&db.config, "Zebra").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_is_ascii_case_insensitive() {
        let db = SampleDb::seeded();
        let lower = samples::search_by_name(&db.config, "smith").unwrap();
        assert_eq!(lower.len(), 1);
        assert_eq!(lower.rows()[0].get_str("name"), Some("Jane Smith"));
    }

    #[test]
    fn test_transaction_rolls_back_when_second_insert_fails() {
        let db = SampleDb::seeded();
        let too_long = "x".repeat(51);

        let outcome = samples::transaction_example(&db.config, "Should Vanish", &too_long).unwrap();
        match outcome {
            TransactionOutcome::RolledBack(reason) => assert!(reason.contains("VARCHAR(50)")),
            other => panic!("Expected rollback, got {:?}", other),
        }

        assert_eq!(db.count("info"), 10);
        assert!(!db.info_names().iter().any(|n| n == "Should Vanish"));
    }

    #[test]
    fn test_check_constraint_rejects_long_name() {
        let db = SampleDb::seeded();
        // TEXT skips the bind-time length check, so the table constraint rejects the row.
        let pool = Pool::connect(&db.config).unwrap();
        let result = pool
            .request()
            .input("name", SqlType::Text, "y".repeat(60))
            .query("INSERT INTO info (name) VALUES (@name)");
        assert!(matches!(result, Err(DemoError::Query(_))));
        pool.close().unwrap();

        assert_eq!(db.count("info"), 10);
    }

    #[test]
    fn test_join_includes_unmatched_rows() {
        let db = SampleDb::seeded();
        // Remove the first info rows so users 1 and 2 have no info partner.
        samples::delete_record(&db.config, 1).unwrap();
        samples::delete_record(&db.config, 2).unwrap();

        let joined = samples::join_example(&db.config).unwrap();
        let first = &joined.rows()[0];
        assert!(first.get("id").unwrap().is_null());
        assert!(first.get("info_name").unwrap().is_null());
        assert_eq!(first.get_str("user_name"), Some("Alice Johnson"));
    }

    #[test]
    fn test_examples_fail_cleanly_without_tables() {
        let db = SampleDb::empty();
        assert!(samples::count_records(&db.config).is_err());
        assert!(samples::stored_procedure_example(&db.config, "John").is_err());
        // The failed examples released their pools; setup can run afterwards.
        setup_database(&db.config).unwrap();
        assert_eq!(samples::count_records(&db.config).unwrap(), 10);
    }
}
