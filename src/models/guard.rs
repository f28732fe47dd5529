use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const GUARD_FIELDS: &str = "id,account_id,badge_number,first_name,last_name,email,phone,status,\
     shift_preference,primary_site_id,hire_date,certifications,avatar_url,created_at,updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardStatus {
    Active,
    Inactive,
    Suspended,
}

impl GuardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardStatus::Active => "active",
            GuardStatus::Inactive => "inactive",
            GuardStatus::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftPreference {
    Day,
    Swing,
    Night,
}

/// Personnel record. Guards are never hard-deleted; deactivation is a
/// status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guard {
    pub id: String,
    pub account_id: String,
    pub badge_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: GuardStatus,
    pub shift_preference: Option<ShiftPreference>,
    pub primary_site_id: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub certifications: Option<Vec<String>>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subset embedded into shift and incident rows via join-expansion. The
/// badge number only appears in the shift projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardRef {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub badge_number: Option<String>,
}

/// Creation input. Optional fields are serialized as explicit nulls, never
/// omitted, so the written row comes back fully shaped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGuardInput {
    pub first_name: String,
    pub last_name: String,
    pub badge_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<GuardStatus>,
    pub shift_preference: Option<ShiftPreference>,
    pub primary_site_id: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGuardInput {
    pub first_name: String,
    pub last_name: String,
    pub badge_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub shift_preference: Option<ShiftPreference>,
    pub primary_site_id: Option<String>,
    pub hire_date: Option<NaiveDate>,
}
