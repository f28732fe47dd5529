use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::QueryData;
use crate::cache::{CacheKey, QueryCache};
use crate::client::query::TableQuery;
use crate::client::RemoteClient;
use crate::config::QueryConfig;
use crate::error::DataError;
use crate::filter::SortDirection;
use crate::models::client_account::CLIENT_FIELDS;
use crate::models::guard::GUARD_FIELDS;
use crate::models::incident::INCIDENT_FIELDS;
use crate::models::report::REPORT_FIELDS;
use crate::models::shift::SHIFT_FIELDS;
use crate::models::site::SITE_FIELDS;
use crate::models::{
    ClientAccount, CreateGuardInput, CreateIncidentInput, DashboardMetrics, Guard, GuardStatus,
    IncidentReport, IncidentStatus, OperationsReport, ShiftAssignment, Site, UpdateGuardInput,
};
use crate::retry::RetryPolicy;

const NO_ACCOUNT_FOR_GUARDS: &str = "An account must be selected before creating guards";
const NO_ACCOUNT_FOR_INCIDENTS: &str = "An account must be selected before reporting incidents";
const NO_ACCOUNT_SELECTED: &str = "No account selected";

/// Account-scoped reads and writes for the operational entities.
///
/// Every read is cached under (entity, account, filter options) and
/// wrapped in the retry policy; every successful write invalidates the
/// cached reads its entity/account prefix matches. The cache is only ever
/// invalidated, never hand-patched, so callers see a stale-then-refetch
/// window after writes rather than optimistic local state.
pub struct OpsService {
    client: RemoteClient,
    cache: Arc<QueryCache>,
    retry: RetryPolicy,
}

impl OpsService {
    pub fn new(client: RemoteClient, config: &QueryConfig) -> Self {
        Self {
            client,
            cache: Arc::new(QueryCache::new(config.cache_ttl())),
            retry: RetryPolicy::from_config(config),
        }
    }

    pub fn from_env() -> Self {
        let config = crate::config::query_config().clone();
        Self::new(RemoteClient::from_env(), &config)
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Guards for the account, last name then first name. Inactive and
    /// suspended guards are excluded unless explicitly widened.
    pub async fn guards(
        &self,
        account_id: Option<&str>,
        include_inactive: bool,
    ) -> Result<QueryData<Vec<Guard>>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        let key = CacheKey::new("guards", account).with_param(include_inactive);
        let rows = self
            .cached_rows(key, || {
                let mut query = self
                    .client
                    .from("guards")
                    .select(GUARD_FIELDS)
                    .eq("account_id", account)
                    .order("last_name", SortDirection::Asc)
                    .order("first_name", SortDirection::Asc);
                if !include_inactive {
                    query = query.eq("status", GuardStatus::Active.as_str());
                }
                query
            })
            .await?;
        Ok(QueryData::Ready(rows))
    }

    /// One guard by id, or None when the row does not exist (or RLS hides it).
    pub async fn guard(
        &self,
        account_id: Option<&str>,
        guard_id: &str,
    ) -> Result<QueryData<Option<Guard>>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        if guard_id.is_empty() {
            return Ok(QueryData::Disabled);
        }
        let key = CacheKey::new("guard", account).with_param(guard_id);
        let row = self
            .cached_maybe_single(key, || {
                self.client
                    .from("guards")
                    .select(GUARD_FIELDS)
                    .eq("account_id", account)
                    .eq("id", guard_id)
            })
            .await?;
        Ok(QueryData::Ready(row))
    }

    /// Sites for the account, by name. Inactive sites excluded by default.
    pub async fn sites(
        &self,
        account_id: Option<&str>,
        include_inactive: bool,
    ) -> Result<QueryData<Vec<Site>>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        let key = CacheKey::new("sites", account).with_param(include_inactive);
        let rows = self
            .cached_rows(key, || {
                let mut query = self
                    .client
                    .from("sites")
                    .select(SITE_FIELDS)
                    .eq("account_id", account)
                    .order("name", SortDirection::Asc);
                if !include_inactive {
                    query = query.eq("is_active", "true");
                }
                query
            })
            .await?;
        Ok(QueryData::Ready(rows))
    }

    pub async fn clients(
        &self,
        account_id: Option<&str>,
    ) -> Result<QueryData<Vec<ClientAccount>>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        let key = CacheKey::new("clients", account);
        let rows = self
            .cached_rows(key, || {
                self.client
                    .from("clients")
                    .select(CLIENT_FIELDS)
                    .eq("account_id", account)
                    .order("name", SortDirection::Asc)
            })
            .await?;
        Ok(QueryData::Ready(rows))
    }

    /// Shifts whose interval overlaps [now, now + days_ahead]: a shift is
    /// included when it ends at or after the window start AND starts at or
    /// before the window end, so an in-progress overnight shift counts.
    /// Site and guard come back join-expanded.
    pub async fn upcoming_shifts(
        &self,
        account_id: Option<&str>,
        days_ahead: i64,
    ) -> Result<QueryData<Vec<ShiftAssignment>>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        let key = CacheKey::new("shifts", account).with_param(days_ahead);
        let rows = self
            .cached_rows(key, || {
                let now = Utc::now();
                let end = now + chrono::Duration::days(days_ahead);
                self.client
                    .from("shifts")
                    .select(SHIFT_FIELDS)
                    .eq("account_id", account)
                    .gte("end_time", now.to_rfc3339())
                    .lte("start_time", end.to_rfc3339())
                    .order("start_time", SortDirection::Asc)
            })
            .await?;
        Ok(QueryData::Ready(rows))
    }

    /// Incidents, newest occurrence first, optionally narrowed to one
    /// status. Site and guard come back join-expanded.
    pub async fn incidents(
        &self,
        account_id: Option<&str>,
        status_filter: Option<IncidentStatus>,
    ) -> Result<QueryData<Vec<IncidentReport>>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        let mut key = CacheKey::new("incidents", account);
        if let Some(status) = status_filter {
            key = key.with_param(status.as_str());
        }
        let rows = self
            .cached_rows(key, || {
                let mut query = self
                    .client
                    .from("incidents")
                    .select(INCIDENT_FIELDS)
                    .eq("account_id", account)
                    .order("occurred_at", SortDirection::Desc);
                if let Some(status) = status_filter {
                    query = query.eq("status", status.as_str());
                }
                query
            })
            .await?;
        Ok(QueryData::Ready(rows))
    }

    pub async fn reports(
        &self,
        account_id: Option<&str>,
    ) -> Result<QueryData<Vec<OperationsReport>>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        let key = CacheKey::new("reports", account);
        let rows = self
            .cached_rows(key, || {
                self.client
                    .from("reports")
                    .select(REPORT_FIELDS)
                    .eq("account_id", account)
                    .order("submitted_at", SortDirection::Desc)
            })
            .await?;
        Ok(QueryData::Ready(rows))
    }

    /// Four count-only queries, concurrently. Any one failing fails the
    /// aggregate; there is no partial metrics object.
    pub async fn dashboard_metrics(
        &self,
        account_id: Option<&str>,
    ) -> Result<QueryData<DashboardMetrics>, DataError> {
        let Some(account) = scope(account_id) else {
            return Ok(QueryData::Disabled);
        };
        let key = CacheKey::new("dashboard_metrics", account);

        if let Some(value) = self.cache.get(&key) {
            let metrics = serde_json::from_value(value)
                .map_err(|e| DataError::Decode(e.to_string()))?;
            return Ok(QueryData::Ready(metrics));
        }

        let generation = self.cache.begin(&key);
        let metrics = self
            .retry
            .run(|| async {
                let guards = self
                    .client
                    .from("guards")
                    .select("id")
                    .eq("account_id", account)
                    .eq("status", GuardStatus::Active.as_str())
                    .count();
                let shifts = self
                    .client
                    .from("shifts")
                    .select("id")
                    .eq("account_id", account)
                    .in_list("status", ["scheduled", "filled", "in_progress"])
                    .count();
                let incidents = self
                    .client
                    .from("incidents")
                    .select("id")
                    .eq("account_id", account)
                    .in_list("status", ["open", "in_review"])
                    .count();
                let since = (Utc::now() - chrono::Duration::days(30)).to_rfc3339();
                let reports = self
                    .client
                    .from("reports")
                    .select("id")
                    .eq("account_id", account)
                    .gte("submitted_at", since)
                    .count();

                let (guard_count, active_shift_count, open_incident_count, report_count) =
                    futures::try_join!(guards, shifts, incidents, reports)?;

                Ok(DashboardMetrics {
                    guard_count,
                    active_shift_count,
                    open_incident_count,
                    report_count_last_30_days: report_count,
                })
            })
            .await?;

        if let Ok(value) = serde_json::to_value(metrics) {
            self.cache.commit(&key, generation, value);
        }
        Ok(QueryData::Ready(metrics))
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Create a guard. Optional fields go over the wire as explicit nulls;
    /// status defaults to active. Invalidates the account's guard reads.
    pub async fn create_guard(
        &self,
        account_id: Option<&str>,
        input: CreateGuardInput,
    ) -> Result<Guard, DataError> {
        let account =
            scope(account_id).ok_or(DataError::Precondition(NO_ACCOUNT_FOR_GUARDS))?;
        require_field("first_name", &input.first_name)?;
        require_field("last_name", &input.last_name)?;

        let payload = json!({
            "account_id": account,
            "first_name": input.first_name,
            "last_name": input.last_name,
            "badge_number": input.badge_number,
            "email": input.email,
            "phone": input.phone,
            "status": input.status.unwrap_or(GuardStatus::Active),
            "shift_preference": input.shift_preference,
            "primary_site_id": input.primary_site_id,
            "hire_date": input.hire_date,
        });

        let guard: Guard = self
            .client
            .from("guards")
            .select(GUARD_FIELDS)
            .insert(payload)
            .await?;

        self.cache.invalidate_prefix("guards", account);
        tracing::info!(guard_id = %guard.id, "guard created");
        Ok(guard)
    }

    /// Update a guard in place, scoped by account and id. Invalidates the
    /// collection reads and the single-guard entry.
    pub async fn update_guard(
        &self,
        account_id: Option<&str>,
        guard_id: &str,
        input: UpdateGuardInput,
    ) -> Result<Guard, DataError> {
        let account = scope(account_id).ok_or(DataError::Precondition(NO_ACCOUNT_SELECTED))?;
        require_field("first_name", &input.first_name)?;
        require_field("last_name", &input.last_name)?;

        let payload = json!({
            "first_name": input.first_name,
            "last_name": input.last_name,
            "badge_number": input.badge_number,
            "email": input.email,
            "phone": input.phone,
            "shift_preference": input.shift_preference,
            "primary_site_id": input.primary_site_id,
            "hire_date": input.hire_date,
        });

        let guard: Guard = self
            .client
            .from("guards")
            .select(GUARD_FIELDS)
            .eq("account_id", account)
            .eq("id", guard_id)
            .update(payload)
            .await?;

        self.invalidate_guard(account, guard_id);
        Ok(guard)
    }

    /// Deactivate a guard: a status transition, never a delete.
    pub async fn deactivate_guard(
        &self,
        account_id: Option<&str>,
        guard_id: &str,
    ) -> Result<Guard, DataError> {
        let account = scope(account_id).ok_or(DataError::Precondition(NO_ACCOUNT_SELECTED))?;

        let guard: Guard = self
            .client
            .from("guards")
            .select(GUARD_FIELDS)
            .eq("account_id", account)
            .eq("id", guard_id)
            .update(json!({ "status": GuardStatus::Inactive }))
            .await?;

        self.invalidate_guard(account, guard_id);
        tracing::info!(guard_id = %guard.id, "guard deactivated");
        Ok(guard)
    }

    /// Report an incident. New incidents always open as `open`, whatever
    /// the caller might want. Invalidates the account's incident reads.
    pub async fn create_incident(
        &self,
        account_id: Option<&str>,
        input: CreateIncidentInput,
    ) -> Result<IncidentReport, DataError> {
        let account =
            scope(account_id).ok_or(DataError::Precondition(NO_ACCOUNT_FOR_INCIDENTS))?;
        require_field("site_id", &input.site_id)?;
        require_field("summary", &input.summary)?;
        require_field("type", &input.incident_type)?;

        let payload = json!({
            "account_id": account,
            "site_id": input.site_id,
            "summary": input.summary,
            "type": input.incident_type,
            "occurred_at": input.occurred_at.to_rfc3339(),
            "severity": input.severity,
            "guard_id": input.guard_id,
            "shift_id": input.shift_id,
            "status": IncidentStatus::Open,
        });

        let incident: IncidentReport = self
            .client
            .from("incidents")
            .select(INCIDENT_FIELDS)
            .insert(payload)
            .await?;

        self.cache.invalidate_prefix("incidents", account);
        tracing::info!(incident_id = %incident.id, "incident reported");
        Ok(incident)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    async fn cached_rows<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        build: impl Fn() -> TableQuery,
    ) -> Result<Vec<T>, DataError> {
        if let Some(value) = self.cache.get(&key) {
            return serde_json::from_value(value).map_err(|e| DataError::Decode(e.to_string()));
        }

        let generation = self.cache.begin(&key);
        let rows: Vec<Value> = self.retry.run(|| build().fetch()).await?;
        let value = Value::Array(rows);

        if !self.cache.commit(&key, generation, value.clone()) {
            tracing::debug!(entity = key.entity(), "discarding superseded query result");
        }
        serde_json::from_value(value).map_err(|e| DataError::Decode(e.to_string()))
    }

    async fn cached_maybe_single<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        build: impl Fn() -> TableQuery,
    ) -> Result<Option<T>, DataError> {
        if let Some(value) = self.cache.get(&key) {
            return serde_json::from_value(value).map_err(|e| DataError::Decode(e.to_string()));
        }

        let generation = self.cache.begin(&key);
        let row: Option<Value> = self.retry.run(|| build().fetch_maybe_single()).await?;
        let value = row.unwrap_or(Value::Null);

        if !self.cache.commit(&key, generation, value.clone()) {
            tracing::debug!(entity = key.entity(), "discarding superseded query result");
        }
        serde_json::from_value(value).map_err(|e| DataError::Decode(e.to_string()))
    }

    fn invalidate_guard(&self, account: &str, guard_id: &str) {
        self.cache.invalidate_prefix("guards", account);
        self.cache
            .invalidate(&CacheKey::new("guard", account).with_param(guard_id));
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Override the cache TTL, mainly so tests can pin freshness behavior.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(QueryCache::new(ttl));
        self
    }
}

fn scope(account_id: Option<&str>) -> Option<&str> {
    account_id.filter(|a| !a.is_empty())
}

fn require_field(name: &str, value: &str) -> Result<(), DataError> {
    if value.trim().is_empty() {
        return Err(DataError::Validation(format!(
            "Missing required field: {}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSettings;

    fn service() -> OpsService {
        // Configured but pointing nowhere: disabled reads and precondition
        // failures must return before the address matters.
        OpsService::new(
            RemoteClient::new(
                BackendSettings::new("http://127.0.0.1:9", "anon"),
                QueryConfig::default(),
            ),
            &QueryConfig::default(),
        )
    }

    #[tokio::test]
    async fn absent_account_disables_every_read() {
        let svc = service();
        assert!(svc.guards(None, false).await.unwrap().is_disabled());
        assert!(svc.guard(None, "g-1").await.unwrap().is_disabled());
        assert!(svc.sites(Some(""), false).await.unwrap().is_disabled());
        assert!(svc.clients(None).await.unwrap().is_disabled());
        assert!(svc.upcoming_shifts(None, 14).await.unwrap().is_disabled());
        assert!(svc.incidents(None, None).await.unwrap().is_disabled());
        assert!(svc.reports(None).await.unwrap().is_disabled());
        assert!(svc.dashboard_metrics(None).await.unwrap().is_disabled());
    }

    #[tokio::test]
    async fn mutations_without_account_fail_synchronously() {
        let svc = service();

        let err = svc
            .create_guard(None, CreateGuardInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Precondition(_)));
        assert!(err.to_string().contains("before creating guards"));

        let err = svc
            .deactivate_guard(None, "g-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Precondition(_)));

        let input = CreateIncidentInput {
            site_id: "site-1".into(),
            summary: "gate forced".into(),
            incident_type: "break_in".into(),
            occurred_at: Utc::now(),
            severity: crate::models::IncidentSeverity::High,
            guard_id: None,
            shift_id: None,
        };
        let err = svc.create_incident(None, input).await.unwrap_err();
        assert!(err.to_string().contains("before reporting incidents"));
    }

    #[tokio::test]
    async fn missing_required_fields_fail_before_network() {
        let svc = service();
        let err = svc
            .create_guard(
                Some("acct-1"),
                CreateGuardInput {
                    first_name: "Dana".into(),
                    last_name: "  ".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
    }
}
