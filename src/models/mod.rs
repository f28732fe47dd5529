pub mod account_member;
pub mod client_account;
pub mod guard;
pub mod incident;
pub mod metrics;
pub mod report;
pub mod shift;
pub mod site;

pub use account_member::{PrimaryMembership, Role};
pub use client_account::{ClientAccount, ClientStatus};
pub use guard::{CreateGuardInput, Guard, GuardRef, GuardStatus, ShiftPreference, UpdateGuardInput};
pub use incident::{CreateIncidentInput, IncidentReport, IncidentSeverity, IncidentStatus};
pub use metrics::DashboardMetrics;
pub use report::OperationsReport;
pub use shift::{ShiftAssignment, ShiftStatus};
pub use site::{Site, SiteRef};
