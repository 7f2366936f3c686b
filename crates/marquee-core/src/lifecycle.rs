//! Banner lifecycle classification
//!
//! A banner's display state is never stored; it is derived from its date window
//! and an explicit "today". Dates are compared at day granularity: a start date
//! covers the whole of that day from midnight, an end date the whole of that day
//! until 23:59:59.999.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display state of a banner on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// Not yet started, or no start date configured
    Scheduled,
    Active,
    Expired,
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Scheduled => "scheduled",
            LifecycleStatus::Active => "active",
            LifecycleStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a date window relative to `today`.
///
/// Total over every combination of present/absent dates, including inverted
/// windows (`end < start`), which are never Active.
pub fn classify(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> LifecycleStatus {
    let started = matches!(start, Some(s) if s <= today);
    let ended = matches!(end, Some(e) if e < today);

    if started && !ended {
        LifecycleStatus::Active
    } else if ended {
        LifecycleStatus::Expired
    } else {
        LifecycleStatus::Scheduled
    }
}

/// Calendar date of `now` in the display time zone.
pub fn today_in(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}
