// ==========================================
// SqliteLedgerRepository 集成测试
// ==========================================
// 测试目标: 台账快照写入/读取往返、约束映射、脏数据快速失败
// ==========================================

mod helpers;

#[path = "fixtures/demo_project.rs"]
mod demo_project;

use helpers::test_data_builder::*;
use project_evm::domain::types::{ConfidenceLevel, ObligationStatus};
use project_evm::engine::EvmError;
use project_evm::repository::{
    InMemoryLedger, LedgerReader, RepositoryError, SqliteLedgerRepository,
};
use rusqlite::params;
use test_helpers::{create_test_db, open_shared_connection};

#[test]
fn test_snapshot_round_trip() {
    project_evm::logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteLedgerRepository::new(&db_path).expect("Failed to create repository");

    let snapshot = demo_project::demo_snapshot();
    repo.insert_snapshot(&snapshot).unwrap();

    let loaded = repo
        .read_snapshot(demo_project::DEMO_PROJECT_ID)
        .unwrap()
        .expect("snapshot should exist");

    assert_eq!(loaded.project, snapshot.project);
    assert_eq!(loaded.phases, snapshot.phases);
    assert_eq!(loaded.cost_entries, snapshot.cost_entries);
    assert_eq!(loaded.obligations, snapshot.obligations);
}

#[test]
fn test_missing_project_returns_none() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteLedgerRepository::new(&db_path).unwrap();

    assert!(repo.read_snapshot("NOPE").unwrap().is_none());
    assert!(repo.project_ids().unwrap().is_empty());
}

#[test]
fn test_duplicate_project_maps_to_unique_violation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteLedgerRepository::new(&db_path).unwrap();

    let project = ProjectBuilder::new("P1").build();
    repo.insert_project(&project).unwrap();

    let err = repo.insert_project(&project).unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[test]
fn test_orphan_cost_entry_maps_to_foreign_key_violation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteLedgerRepository::new(&db_path).unwrap();

    let entry = CostEntryBuilder::new("E1", "GHOST").amount(10.0).build();
    let err = repo.insert_cost_entry(&entry).unwrap_err();
    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
}

#[test]
fn test_batch_insert_rolls_back_on_failure() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteLedgerRepository::new(&db_path).unwrap();
    repo.insert_project(&ProjectBuilder::new("P1").build()).unwrap();

    let entries = vec![
        CostEntryBuilder::new("E1", "P1").amount(10.0).build(),
        CostEntryBuilder::new("E1", "P1").amount(20.0).build(),
    ];
    assert!(repo.insert_cost_entries(&entries).is_err());
    assert!(repo.list_cost_entries("P1").unwrap().is_empty());

    let entries = vec![
        CostEntryBuilder::new("E1", "P1").amount(10.0).build(),
        CostEntryBuilder::new("E2", "P1").amount(20.0).outstanding(Some(ymd(2024, 2, 1))).build(),
    ];
    assert_eq!(repo.insert_cost_entries(&entries).unwrap(), 2);
    assert_eq!(repo.list_cost_entries("P1").unwrap().len(), 2);
}

#[test]
fn test_unknown_confidence_level_in_db_fails_fast() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_shared_connection(&db_path).unwrap();
    let repo = SqliteLedgerRepository::from_connection(conn.clone()).unwrap();
    repo.insert_project(&ProjectBuilder::new("P1").build()).unwrap();

    conn.lock()
        .unwrap()
        .execute(
            "INSERT INTO obligation (id, project_id, category_name, amount, confidence_level)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params!["O1", "P1", "Hardware", 1000.0, "certain"],
        )
        .unwrap();

    let err = repo.read_snapshot("P1").unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Validation(EvmError::InvalidConfidenceLevel(ref l)) if l == "certain"
    ));
}

#[test]
fn test_malformed_date_in_db_fails_fast() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_shared_connection(&db_path).unwrap();
    let repo = SqliteLedgerRepository::from_connection(conn.clone()).unwrap();
    repo.insert_project(&ProjectBuilder::new("P1").build()).unwrap();

    conn.lock()
        .unwrap()
        .execute(
            "INSERT INTO cost_entry (id, project_id, category_name, amount, entry_date)
             VALUES ('E1', 'P1', 'Labour', 10.0, '15/01/2024')",
            [],
        )
        .unwrap();

    let err = repo.list_cost_entries("P1").unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::FieldValueError { ref field, .. } if field == "cost_entry.entry_date"
    ));
}

#[test]
fn test_update_obligation_status() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = SqliteLedgerRepository::new(&db_path).unwrap();
    repo.insert_project(&ProjectBuilder::new("P1").build()).unwrap();
    repo.insert_obligation(
        &ObligationBuilder::new("O1", "P1")
            .amount(5_000.0)
            .confidence(ConfidenceLevel::High)
            .build(),
    )
    .unwrap();

    repo.update_obligation_status("O1", ObligationStatus::ConvertedToActual)
        .unwrap();
    let obligations = repo.list_obligations("P1").unwrap();
    assert_eq!(obligations[0].status, ObligationStatus::ConvertedToActual);

    let err = repo
        .update_obligation_status("O404", ObligationStatus::Cancelled)
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_sqlite_and_memory_ledgers_agree() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let sqlite = SqliteLedgerRepository::new(&db_path).unwrap();
    let snapshot = demo_project::demo_snapshot();
    sqlite.insert_snapshot(&snapshot).unwrap();
    sqlite
        .insert_project(&ProjectBuilder::new("A-FIRST").build())
        .unwrap();

    let memory = InMemoryLedger::with_snapshots(vec![
        snapshot.clone(),
        ProjectBuilder::new("A-FIRST").snapshot(),
    ]);

    let readers: Vec<&dyn LedgerReader> = vec![&sqlite, &memory];
    for reader in readers {
        assert_eq!(
            reader.list_project_ids().await.unwrap(),
            vec!["A-FIRST".to_string(), demo_project::DEMO_PROJECT_ID.to_string()]
        );
        let loaded = reader
            .load_snapshot(demo_project::DEMO_PROJECT_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, snapshot);
    }
}
