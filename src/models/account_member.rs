use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role carried by an account membership. Role gates are enforced by the
/// backend's row policies; the client only uses this for messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Manager,
    Supervisor,
    Guard,
    Client,
    Member,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::Guard => "guard",
            Role::Client => "client",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }
}

/// Full membership row. A user may belong to multiple accounts; the
/// earliest-created membership is treated as primary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMember {
    pub user_id: String,
    pub account_id: String,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

/// Narrow projection used by the account resolver.
pub const MEMBERSHIP_FIELDS: &str = "account_id,role";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryMembership {
    pub account_id: String,
    pub role: Option<Role>,
}
