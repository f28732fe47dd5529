mod common;

use anyhow::Result;
use chrono::Utc;
use serde_json::json;

use watchdesk::models::{
    CreateGuardInput, CreateIncidentInput, GuardStatus, IncidentSeverity, IncidentStatus,
};
use watchdesk::DataError;

fn guard_row(id: &str, account: &str, first: &str, last: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "account_id": account,
        "first_name": first,
        "last_name": last,
        "status": status,
        "created_at": "2024-01-01T00:00:00+00:00",
        "updated_at": "2024-01-01T00:00:00+00:00",
    })
}

#[tokio::test]
async fn creating_a_guard_invalidates_the_roster_cache() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    backend.seed(
        "guards",
        vec![guard_row("g-1", "acct-1", "Rosa", "Alvarez", "active")],
    );
    let service = backend.service();

    let before = service
        .guards(Some("acct-1"), false)
        .await?
        .into_option()
        .unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(backend.hits("guards"), 1);

    let created = service
        .create_guard(
            Some("acct-1"),
            CreateGuardInput {
                first_name: "Marcus".into(),
                last_name: "Webb".into(),
                badge_number: Some("B-204".into()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(created.status, GuardStatus::Active, "defaults to active");
    assert_eq!(backend.hits("guards"), 2);

    // The cached roster was invalidated, so this read refetches and sees
    // the new guard.
    let after = service
        .guards(Some("acct-1"), false)
        .await?
        .into_option()
        .unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(backend.hits("guards"), 3);
    Ok(())
}

#[tokio::test]
async fn created_guard_carries_explicit_nulls() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    let service = backend.service();

    service
        .create_guard(
            Some("acct-1"),
            CreateGuardInput {
                first_name: "Dee".into(),
                last_name: "Ochoa".into(),
                ..Default::default()
            },
        )
        .await?;

    let stored = backend.rows("guards").pop().unwrap();
    assert!(stored.get("email").unwrap().is_null());
    assert!(stored.get("phone").unwrap().is_null());
    assert!(stored.get("hire_date").unwrap().is_null());
    assert_eq!(stored["status"], json!("active"));
    Ok(())
}

#[tokio::test]
async fn deactivation_invalidates_roster_and_single_entry() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    backend.seed(
        "guards",
        vec![guard_row("g-1", "acct-1", "Rosa", "Alvarez", "active")],
    );
    let service = backend.service();

    let fetched = service
        .guard(Some("acct-1"), "g-1")
        .await?
        .into_option()
        .unwrap()
        .unwrap();
    assert_eq!(fetched.status, GuardStatus::Active);
    assert_eq!(backend.hits("guards"), 1);

    let deactivated = service.deactivate_guard(Some("acct-1"), "g-1").await?;
    assert_eq!(deactivated.status, GuardStatus::Inactive);
    assert_eq!(backend.hits("guards"), 2);

    // Row still exists; nothing was deleted.
    assert_eq!(backend.rows("guards").len(), 1);

    // Single-guard cache entry was dropped too, so this refetches.
    let refetched = service
        .guard(Some("acct-1"), "g-1")
        .await?
        .into_option()
        .unwrap()
        .unwrap();
    assert_eq!(refetched.status, GuardStatus::Inactive);
    assert_eq!(backend.hits("guards"), 3);
    Ok(())
}

#[tokio::test]
async fn incidents_always_open_as_open() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    let service = backend.service();

    let incident = service
        .create_incident(
            Some("acct-1"),
            CreateIncidentInput {
                site_id: "site-1".into(),
                summary: "South gate forced".into(),
                incident_type: "break_in".into(),
                occurred_at: Utc::now(),
                severity: IncidentSeverity::High,
                guard_id: None,
                shift_id: None,
            },
        )
        .await?;

    assert_eq!(incident.status, IncidentStatus::Open);
    let stored = backend.rows("incidents").pop().unwrap();
    assert_eq!(stored["status"], json!("open"));
    Ok(())
}

#[tokio::test]
async fn mutations_without_account_never_reach_the_backend() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    let service = backend.service();

    let err = service
        .create_guard(
            None,
            CreateGuardInput {
                first_name: "Rosa".into(),
                last_name: "Alvarez".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::Precondition(_)));
    assert_eq!(backend.hits("guards"), 0);
    Ok(())
}

#[tokio::test]
async fn update_is_scoped_to_the_account() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    backend.seed(
        "guards",
        vec![
            guard_row("g-1", "acct-1", "Rosa", "Alvarez", "active"),
            guard_row("g-1", "acct-2", "Rosa", "Imposter", "active"),
        ],
    );
    let service = backend.service();

    let query_scope = service.deactivate_guard(Some("acct-1"), "g-1").await?;
    assert_eq!(query_scope.last_name, "Alvarez");

    let rows = backend.rows("guards");
    assert_eq!(rows[0]["status"], json!("inactive"));
    assert_eq!(rows[1]["status"], json!("active"), "other account untouched");
    Ok(())
}
