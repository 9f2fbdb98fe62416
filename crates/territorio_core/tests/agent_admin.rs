use std::sync::Arc;
use territorio_core::db::{open_db_in_memory, share};
use territorio_core::{
    AgentService, AssignmentLedger, ContactUpdate, MunicipalityDirectory, Normalizer, Reconciler,
    ServiceError, SqliteAgentRepository, SqliteAssignmentLedger, StaticDirectoryLoader,
};
use uuid::Uuid;

type TestService = AgentService<SqliteAgentRepository, SqliteAssignmentLedger>;
type TestReconciler = Reconciler<SqliteAgentRepository, SqliteAssignmentLedger>;

fn setup() -> (TestService, TestReconciler, SqliteAssignmentLedger) {
    let conn = share(open_db_in_memory().unwrap());
    let normalizer = Normalizer::default();
    let directory = Arc::new(
        MunicipalityDirectory::load(&StaticDirectoryLoader::builtin(), &normalizer).unwrap(),
    );
    let service = AgentService::new(
        SqliteAgentRepository::new(conn.clone()),
        SqliteAssignmentLedger::new(conn.clone()),
        directory.clone(),
    );
    let reconciler = Reconciler::new(
        SqliteAgentRepository::new(conn.clone()),
        SqliteAssignmentLedger::new(conn.clone()),
        directory,
        normalizer,
    );
    (service, reconciler, SqliteAssignmentLedger::new(conn))
}

fn raw(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn list_assignments_joins_directory_records() {
    let (service, reconciler, _ledger) = setup();

    let report = reconciler
        .reconcile("Rossi", &raw(&["097042", "097001"]))
        .unwrap();

    let records = service.list_assignments(report.agent_id).unwrap();
    let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, vec!["Abbadia Lariana", "Lecco"]);
    assert!(records.iter().all(|record| record.province == "Lecco"));
}

#[test]
fn update_contact_preserves_untouched_fields() {
    let (service, reconciler, _ledger) = setup();
    let report = reconciler.reconcile("Rossi", &raw(&["097042"])).unwrap();

    let updated = service
        .update_contact(
            report.agent_id,
            ContactUpdate {
                phone: Some("3331234567".to_string()),
                email: None,
                color: Some("#4caf50".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("3331234567"));
    assert_eq!(updated.color, "#4caf50");

    let reloaded = service.get_agent(report.agent_id).unwrap().unwrap();
    assert_eq!(reloaded.phone.as_deref(), Some("3331234567"));
    assert!(reloaded.email.is_none());
}

#[test]
fn update_contact_for_unknown_agent_fails() {
    let (service, _reconciler, _ledger) = setup();

    let err = service
        .update_contact(Uuid::new_v4(), ContactUpdate::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
}

#[test]
fn delete_agent_releases_codes_and_removes_row() {
    let (service, reconciler, ledger) = setup();
    let report = reconciler.reconcile("Rossi", &raw(&["097042"])).unwrap();

    service.delete_agent(report.agent_id).unwrap();

    assert_eq!(ledger.owner_of("097042").unwrap(), None);
    assert!(service.get_agent(report.agent_id).unwrap().is_none());

    // The code is claimable again after deletion.
    let second = reconciler.reconcile("Bianchi", &raw(&["097042"])).unwrap();
    assert_eq!(second.accepted, vec!["097042"]);
}

#[test]
fn find_by_name_returns_agent_created_by_reconcile() {
    let (service, reconciler, _ledger) = setup();
    let report = reconciler.reconcile("Rossi", &raw(&["097042"])).unwrap();

    let found = service.find_by_name("Rossi").unwrap().unwrap();
    assert_eq!(found.id, report.agent_id);
}
