mod common;

use anyhow::Result;
use serde_json::json;

use watchdesk::account::{AccountResolver, ResolveStatus};
use watchdesk::models::Role;

#[tokio::test]
async fn earliest_membership_wins() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    let user = backend.user_id().to_string();
    backend.seed(
        "account_members",
        vec![
            json!({
                "user_id": user,
                "account_id": "acct-newer",
                "role": "owner",
                "created_at": "2025-06-01T00:00:00+00:00",
            }),
            json!({
                "user_id": user,
                "account_id": "acct-older",
                "role": "supervisor",
                "created_at": "2024-01-15T00:00:00+00:00",
            }),
        ],
    );

    let client = backend.client();
    backend.sign_in(&client);

    let resolver = AccountResolver::start(client).await;
    let state = resolver.state();
    assert_eq!(state.status, ResolveStatus::Ready);
    assert_eq!(state.account_id.as_deref(), Some("acct-older"));
    assert_eq!(state.role, Some(Role::Supervisor));
    Ok(())
}

#[tokio::test]
async fn memberships_of_other_users_are_ignored() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    backend.seed(
        "account_members",
        vec![json!({
            "user_id": "someone-else",
            "account_id": "acct-1",
            "role": "owner",
            "created_at": "2024-01-01T00:00:00+00:00",
        })],
    );

    let client = backend.client();
    backend.sign_in(&client);

    let resolver = AccountResolver::start(client).await;
    let state = resolver.state();
    assert_eq!(state.status, ResolveStatus::Ready);
    assert_eq!(state.account_id, None);
    assert_eq!(state.role, None);
    Ok(())
}

#[tokio::test]
async fn membership_lookup_failure_surfaces_friendly_error() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    backend.fail_next("account_members", common::Failure::Permission);

    let client = backend.client();
    backend.sign_in(&client);

    let resolver = AccountResolver::start(client).await;
    let state = resolver.state();
    assert_eq!(state.status, ResolveStatus::Error);
    assert_eq!(state.account_id, None);
    assert!(state.error.unwrap().contains("view-only access"));
    Ok(())
}

#[tokio::test]
async fn sign_out_drops_the_resolved_account() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    let user = backend.user_id().to_string();
    backend.seed(
        "account_members",
        vec![json!({
            "user_id": user,
            "account_id": "acct-1",
            "role": "manager",
            "created_at": "2024-01-01T00:00:00+00:00",
        })],
    );

    let client = backend.client();
    backend.sign_in(&client);

    let resolver = AccountResolver::start(client.clone()).await;
    assert_eq!(resolver.account_id().as_deref(), Some("acct-1"));

    let mut changes = resolver.subscribe();
    client.auth().sign_out();
    // Wait for the resolver to republish after the auth change.
    loop {
        changes.changed().await?;
        let state = changes.borrow().clone();
        if state.status == ResolveStatus::Ready && state.account_id.is_none() {
            break;
        }
    }
    assert_eq!(resolver.role(), None);
    Ok(())
}

#[tokio::test]
async fn password_sign_in_establishes_session() -> Result<()> {
    let backend = common::TestBackend::spawn().await?;
    let client = backend.client();

    let session = client
        .auth()
        .sign_in_with_password("dispatch@example.com", "hunter2")
        .await?;
    assert_eq!(session.user_id, backend.user_id());
    assert!(client.auth().session().is_some());
    Ok(())
}
