use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::guard::GuardRef;
use super::site::SiteRef;

pub const INCIDENT_FIELDS: &str = "id,account_id,site_id,guard_id,shift_id,occurred_at,type,summary,\
     status,severity,follow_up_due_at,created_at,updated_at,site:sites(id,name),\
     guard:guards(id,first_name,last_name)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    InReview,
    Resolved,
    Archived,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::InReview => "in_review",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentReport {
    pub id: String,
    pub account_id: String,
    pub site_id: String,
    pub guard_id: Option<String>,
    pub shift_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub summary: String,
    pub status: IncidentStatus,
    pub severity: IncidentSeverity,
    pub follow_up_due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub site: Option<SiteRef>,
    #[serde(default)]
    pub guard: Option<GuardRef>,
}

/// Creation input. Status is not accepted here: new incidents always open
/// as `open`, regardless of what the caller wants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIncidentInput {
    pub site_id: String,
    pub summary: String,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub occurred_at: DateTime<Utc>,
    pub severity: IncidentSeverity,
    pub guard_id: Option<String>,
    pub shift_id: Option<String>,
}
