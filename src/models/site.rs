use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SITE_FIELDS: &str = "id,account_id,client_id,name,address_line1,address_line2,city,state,\
     postal_code,timezone,is_active,created_at,updated_at";

/// Property record. Read-only in this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub account_id: String,
    pub client_id: Option<String>,
    pub name: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub timezone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subset embedded into shift and incident rows. The timezone only appears
/// in the shift projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub timezone: Option<String>,
}
