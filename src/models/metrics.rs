use serde::{Deserialize, Serialize};

/// Aggregate counters for the dashboard header. Produced from four
/// count-only queries; either all four succeed or the aggregate fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub guard_count: u64,
    pub active_shift_count: u64,
    pub open_incident_count: u64,
    pub report_count_last_30_days: u64,
}
