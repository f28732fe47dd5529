use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REPORT_FIELDS: &str =
    "id,account_id,site_id,guard_id,shift_id,report_type,submitted_at,title,body,created_at,updated_at";

/// Free-text operations report, optionally tied to a site/guard/shift.
/// Read-only in this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsReport {
    pub id: String,
    pub account_id: String,
    pub site_id: Option<String>,
    pub guard_id: Option<String>,
    pub shift_id: Option<String>,
    pub report_type: String,
    pub submitted_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
