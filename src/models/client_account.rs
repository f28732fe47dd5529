use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CLIENT_FIELDS: &str =
    "id,account_id,name,contact_name,contact_email,contact_phone,status,created_at,updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Pending,
    Inactive,
}

/// Billing/contact entity owning zero or more sites. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAccount {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
