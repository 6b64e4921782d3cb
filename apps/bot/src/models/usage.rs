/// Input for appending a lookup to the request log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUsageEvent {
    pub user_id: i64,
    pub label: String,
    pub registration: String,
    pub report: String,
}

/// Request counts over the fixed reporting windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    pub last_day: i64,
    pub last_month: i64,
    pub all_time: i64,
}
