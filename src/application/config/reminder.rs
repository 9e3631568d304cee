use chrono::NaiveTime;
use std::env;

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Daily run time (UTC)
    pub run_at: NaiveTime,
}

impl ReminderConfig {
    pub fn from_env() -> Self {
        let run_at = env::var("CASEDESK_REMINDER_TIME")
            .ok()
            .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok())
            .or_else(|| NaiveTime::from_hms_opt(11, 30, 0))
            .unwrap_or_default();

        Self { run_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_time() {
        let parsed = NaiveTime::parse_from_str("11:30", "%H:%M").unwrap();
        assert_eq!(parsed, NaiveTime::from_hms_opt(11, 30, 0).unwrap());
    }
}
