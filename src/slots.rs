//! Daily publication time-slots and their availability.
//!
//! The crawler publishes three editions per day. Shards for a slot only exist
//! once its publish time has passed, so queries for today are limited to the
//! slots already published.
//!
//! | Slot | Publish time (portal local) | File stamp |
//! |------|-----------------------------|------------|
//! | Morning | 09:20 | `09-20` |
//! | Afternoon | 15:00 | `15-00` |
//! | Evening | 19:00 | `19-00` |

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One of the fixed daily publication windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// All slots in chronological order.
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    /// Scheduled publish time in portal-local time.
    pub fn publish_time(self) -> NaiveTime {
        let (h, m) = match self {
            TimeSlot::Morning => (9, 20),
            TimeSlot::Afternoon => (15, 0),
            TimeSlot::Evening => (19, 0),
        };
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Stamp used in shard file names, e.g. `09-20`.
    pub fn file_stamp(self) -> &'static str {
        match self {
            TimeSlot::Morning => "09-20",
            TimeSlot::Afternoon => "15-00",
            TimeSlot::Evening => "19-00",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slots to query for `selected` given the current time.
///
/// `now` must already be in the portal's local offset; "today" is its date.
/// - past date: every slot
/// - today: slots whose publish time is at or before `now`
/// - future date: none
pub fn available_slots<Tz: TimeZone>(selected: NaiveDate, now: &DateTime<Tz>) -> Vec<TimeSlot> {
    let today = now.date_naive();
    let slots: Vec<TimeSlot> = if selected < today {
        TimeSlot::ALL.to_vec()
    } else if selected == today {
        let clock = now.time();
        TimeSlot::ALL
            .into_iter()
            .take_while(|slot| slot.publish_time() <= clock)
            .collect()
    } else {
        Vec::new()
    };
    debug!(%selected, %today, count = slots.len(), "Computed available slots");
    slots
}
