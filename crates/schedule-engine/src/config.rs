//! Scheduler configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Default slot search horizon, in days.
pub const DEFAULT_HORIZON_DAYS: u32 = 100;

/// Largest accepted slot search horizon, in days.
pub const MAX_HORIZON_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub slot_search: SlotSearchConfig,
    /// Whether a declined invitation still blocks the invitee's time.
    pub declined_is_busy: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slot_search: SlotSearchConfig::default(),
            declined_is_busy: true,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        let days = self.slot_search.horizon_days;
        if days == 0 {
            return Err(ScheduleError::InvalidConfig(
                "slot_search.horizon_days must be positive".to_string(),
            ));
        }
        if days > MAX_HORIZON_DAYS {
            return Err(ScheduleError::InvalidConfig(format!(
                "slot_search.horizon_days must be at most {MAX_HORIZON_DAYS}, got {days}"
            )));
        }
        Ok(())
    }
}

/// Bounds the free-slot search. Recurring meetings repeat forever, so the
/// search only looks this far past its start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotSearchConfig {
    pub horizon_days: u32,
}

impl Default for SlotSearchConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl SlotSearchConfig {
    pub fn horizon(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.horizon_days))
    }
}
