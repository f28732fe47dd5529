use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::RemoteClient;
use crate::config::MOCK_ACCOUNT_ID;
use crate::error::DataError;
use crate::filter::SortDirection;
use crate::models::account_member::MEMBERSHIP_FIELDS;
use crate::models::{PrimaryMembership, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStatus {
    Loading,
    Ready,
    Error,
}

/// Shared account/role state published by the resolver.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub account_id: Option<String>,
    pub role: Option<Role>,
    pub status: ResolveStatus,
    pub error: Option<String>,
}

impl AccountState {
    fn loading() -> Self {
        Self {
            account_id: None,
            role: None,
            status: ResolveStatus::Loading,
            error: None,
        }
    }
}

/// Resolves the current user to their primary account membership and
/// republishes it as watchable state.
///
/// Primary means the earliest-created membership; a user belonging to
/// several accounts always lands on the oldest one. The resolver holds
/// exactly one auth-change subscription and re-resolves on every change;
/// dropping the resolver tears the subscription down.
///
/// With an unconfigured client it short-circuits to a fixed mock account
/// and the manager role without touching the network — the layer's only
/// offline/dev affordance.
pub struct AccountResolver {
    inner: Arc<ResolverInner>,
    watcher: JoinHandle<()>,
}

struct ResolverInner {
    client: RemoteClient,
    state: watch::Sender<AccountState>,
}

impl AccountResolver {
    /// Resolve once, then keep the state current across auth changes.
    pub async fn start(client: RemoteClient) -> Self {
        let (state, _) = watch::channel(AccountState::loading());
        let inner = Arc::new(ResolverInner { client, state });

        inner.refresh().await;

        let watcher = {
            let inner = Arc::clone(&inner);
            let mut changes = inner.client.auth().subscribe();
            tokio::spawn(async move {
                while changes.changed().await.is_ok() {
                    inner.refresh().await;
                }
            })
        };

        Self { inner, watcher }
    }

    pub fn state(&self) -> AccountState {
        self.inner.state.borrow().clone()
    }

    /// Watchable view of the state, for callers that want to react to
    /// account switches rather than poll.
    pub fn subscribe(&self) -> watch::Receiver<AccountState> {
        self.inner.state.subscribe()
    }

    pub fn account_id(&self) -> Option<String> {
        self.inner.state.borrow().account_id.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.inner.state.borrow().role
    }

    pub async fn refresh(&self) {
        self.inner.refresh().await;
    }
}

impl Drop for AccountResolver {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

impl ResolverInner {
    async fn refresh(&self) {
        self.state.send_replace(AccountState::loading());
        match self.resolve().await {
            Ok((account_id, role)) => {
                tracing::debug!(?account_id, ?role, "account context resolved");
                self.state.send_replace(AccountState {
                    account_id,
                    role,
                    status: ResolveStatus::Ready,
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to resolve account context");
                self.state.send_replace(AccountState {
                    account_id: None,
                    role: None,
                    status: ResolveStatus::Error,
                    error: Some(e.user_message()),
                });
            }
        }
    }

    async fn resolve(&self) -> Result<(Option<String>, Option<Role>), DataError> {
        if !self.client.is_configured() {
            return Ok((Some(MOCK_ACCOUNT_ID.to_string()), Some(Role::Manager)));
        }

        let session = match self.client.auth().session() {
            Some(session) => session,
            None => return Ok((None, None)),
        };

        let membership: Option<PrimaryMembership> = self
            .client
            .from("account_members")
            .select(MEMBERSHIP_FIELDS)
            .eq("user_id", session.user_id.to_string())
            .order("created_at", SortDirection::Asc)
            .fetch_maybe_single()
            .await?;

        Ok(match membership {
            Some(m) => (Some(m.account_id), m.role),
            None => (None, None),
        })
    }
}
