use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::guard::GuardRef;
use super::site::SiteRef;

pub const SHIFT_FIELDS: &str = "id,account_id,site_id,guard_id,start_time,end_time,status,notes,\
     created_at,updated_at,site:sites(id,name,timezone),\
     guard:guards(id,first_name,last_name,badge_number)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Scheduled,
    Filled,
    InProgress,
    Completed,
    Missed,
    Cancelled,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Scheduled => "scheduled",
            ShiftStatus::Filled => "filled",
            ShiftStatus::InProgress => "in_progress",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Missed => "missed",
            ShiftStatus::Cancelled => "cancelled",
        }
    }
}

/// One scheduled block of coverage at a site, optionally assigned to a
/// guard. Site and guard come back join-expanded on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub id: String,
    pub account_id: String,
    pub site_id: String,
    pub guard_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ShiftStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub site: Option<SiteRef>,
    #[serde(default)]
    pub guard: Option<GuardRef>,
}
