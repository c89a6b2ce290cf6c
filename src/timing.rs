use chrono::{DateTime, Duration, LocalResult, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;

use crate::error::TimingError;
use crate::types::{PrayerName, TimeOfDay, TimingsForDay};

/// The upcoming timing and how long until it starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NextPrayerResult {
    pub name: PrayerName,
    pub at: DateTime<Tz>,
    /// Whole minutes, truncated.
    pub remaining_minutes: i64,
    /// Every timing for today had passed, so `at` falls on the next date.
    pub tomorrow: bool,
}

impl NextPrayerResult {
    pub fn hours(&self) -> i64 {
        self.remaining_minutes / 60
    }

    pub fn minutes(&self) -> i64 {
        self.remaining_minutes % 60
    }

    /// `"<h>h <m>m"`
    pub fn remaining_display(&self) -> String {
        format!("{}h {}m", self.hours(), self.minutes())
    }
}

pub fn parse_timezone(timezone: &str) -> Result<Tz, TimingError> {
    timezone
        .parse::<Tz>()
        .map_err(|_| TimingError::UnknownTimezone(timezone.to_string()))
}

/// Works out which timing comes next after `now`, as seen from `timezone`.
///
/// Timings are placed on the calendar date `now` falls on in `timezone`. A timing
/// that starts exactly at `now` counts as already passed. Once Isha has passed the
/// result is Fajr on the following date.
pub fn resolve(
    timings: &TimingsForDay,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<NextPrayerResult, TimingError> {
    let tz = parse_timezone(timezone)?;
    resolve_in(timings, tz, now)
}

pub fn resolve_in(
    timings: &TimingsForDay,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<NextPrayerResult, TimingError> {
    let local_now = now.with_timezone(&tz);
    let today = local_now.date_naive();

    for (name, time) in timings.iter() {
        let at = materialize(tz, today, time)?;
        if at > local_now {
            return Ok(finish(name, at, now, false));
        }
    }

    let tomorrow = today.succ_opt().ok_or_else(|| TimingError::UnrepresentableTime {
        date: today.to_string(),
        time: "next day".to_string(),
        timezone: tz.name().to_string(),
    })?;
    let at = materialize(tz, tomorrow, timings.get(PrayerName::Fajr))?;
    Ok(finish(PrayerName::Fajr, at, now, true))
}

fn finish(name: PrayerName, at: DateTime<Tz>, now: DateTime<Utc>, tomorrow: bool) -> NextPrayerResult {
    let remaining_minutes = at.with_timezone(&Utc).signed_duration_since(now).num_minutes().max(0);
    debug!("next_prayer:: {} at {} in {} minutes (tomorrow={})", name, at, remaining_minutes, tomorrow);
    NextPrayerResult { name, at, remaining_minutes, tomorrow }
}

/// Pins a wall-clock time to a date in `tz`.
///
/// A repeated wall time (clocks going back) takes the earlier instant. A skipped
/// wall time (clocks going forward) is read with the offset from before the jump.
fn materialize(tz: Tz, date: NaiveDate, time: TimeOfDay) -> Result<DateTime<Tz>, TimingError> {
    let naive = date.and_time(time.to_naive());
    let resolved = match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) => Some(at),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            // offset a day earlier is the one in force before the jump
            let before = tz
                .from_local_datetime(&(naive - Duration::days(1)))
                .earliest()
                .map(|at| at.offset().fix().local_minus_utc());
            before.map(|secs| tz.from_utc_datetime(&(naive - Duration::seconds(i64::from(secs)))))
        }
    };
    resolved.ok_or_else(|| TimingError::UnrepresentableTime {
        date: date.to_string(),
        time: time.to_string(),
        timezone: tz.name().to_string(),
    })
}
