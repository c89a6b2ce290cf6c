use std::{collections::HashMap, fmt, str::FromStr};

use chrono::NaiveTime;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::error::TimingError;

/// The daily timings in the order they occur within a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Sunrise,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock hour and minute, meaningful only together with a timezone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<TimeOfDay> {
        (hour < 24 && minute < 60).then_some(TimeOfDay { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn to_naive(&self) -> NaiveTime {
        // hour and minute are range-checked on construction
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for TimeOfDay {
    type Err = ();

    /// Accepts `HH:MM`, ignoring a trailing annotation such as `"04:30 (WIB)"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.split_whitespace().next().ok_or(())?;
        let (hour, minute) = token.split_once(':').ok_or(())?;
        let valid = |part: &str| (1..=2).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit());
        if !valid(hour) || !valid(minute) {
            return Err(());
        }
        let hour = hour.parse().map_err(|_| ())?;
        let minute = minute.parse().map_err(|_| ())?;
        TimeOfDay::new(hour, minute).ok_or(())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One time of day per [`PrayerName`], all for the same date and zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingsForDay {
    times: [TimeOfDay; 6],
}

impl TimingsForDay {
    pub fn new(times: [TimeOfDay; 6]) -> TimingsForDay {
        TimingsForDay { times }
    }

    /// Builds the set from raw `name -> "HH:MM"` pairs. Extra keys are ignored.
    pub fn parse(raw: &HashMap<String, String>) -> Result<TimingsForDay, TimingError> {
        let mut times = [TimeOfDay { hour: 0, minute: 0 }; 6];
        for name in PrayerName::ALL {
            let value = raw.get(name.as_str()).ok_or(TimingError::MissingTiming(name))?;
            times[name.index()] = value.parse().map_err(|_| TimingError::MalformedTime {
                name,
                value: value.clone(),
            })?;
        }
        Ok(TimingsForDay { times })
    }

    pub fn get(&self, name: PrayerName) -> TimeOfDay {
        self.times[name.index()]
    }

    /// Entries in chronological order, Fajr first.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, TimeOfDay)> + '_ {
        PrayerName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

impl Serialize for TimingsForDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.times.len()))?;
        for (name, time) in self.iter() {
            map.serialize_entry(name.as_str(), &time)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_time_of_day() {
        assert_eq!("04:30".parse::<TimeOfDay>(), Ok(TimeOfDay::new(4, 30).unwrap()));
        assert_eq!("4:05".parse::<TimeOfDay>(), Ok(TimeOfDay::new(4, 5).unwrap()));
        assert_eq!("19:15 (WIB)".parse::<TimeOfDay>(), Ok(TimeOfDay::new(19, 15).unwrap()));
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("12:60".parse::<TimeOfDay>().is_err());
        assert!("noon".parse::<TimeOfDay>().is_err());
        assert!("12:00:00".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
        assert!("+1:30".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn parse_timings_ignores_extra_keys() {
        let timings = TimingsForDay::parse(&raw(&[
            ("Fajr", "04:30"),
            ("Sunrise", "05:50"),
            ("Dhuhr", "12:00"),
            ("Asr", "15:15"),
            ("Sunset", "17:58"),
            ("Maghrib", "18:00"),
            ("Isha", "19:15"),
            ("Midnight", "23:55"),
        ]))
        .unwrap();

        assert_eq!(timings.get(PrayerName::Asr), TimeOfDay::new(15, 15).unwrap());
        let order: Vec<PrayerName> = timings.iter().map(|(name, _)| name).collect();
        assert_eq!(order, PrayerName::ALL.to_vec());
    }

    #[test]
    fn parse_timings_reports_missing_and_malformed() {
        let missing = TimingsForDay::parse(&raw(&[("Fajr", "04:30")]));
        assert!(matches!(missing, Err(TimingError::MissingTiming(PrayerName::Sunrise))));

        let malformed = TimingsForDay::parse(&raw(&[
            ("Fajr", "04:30"),
            ("Sunrise", "05:50"),
            ("Dhuhr", "midday"),
            ("Asr", "15:15"),
            ("Maghrib", "18:00"),
            ("Isha", "19:15"),
        ]));
        assert!(matches!(
            malformed,
            Err(TimingError::MalformedTime { name: PrayerName::Dhuhr, .. })
        ));
    }

    #[test]
    fn serializes_in_chronological_order() {
        let t = |h, m| TimeOfDay::new(h, m).unwrap();
        let timings = TimingsForDay::new([t(4, 30), t(5, 50), t(12, 0), t(15, 15), t(18, 0), t(19, 15)]);
        let json = serde_json::to_string(&timings).unwrap();
        assert_eq!(
            json,
            r#"{"Fajr":"04:30","Sunrise":"05:50","Dhuhr":"12:00","Asr":"15:15","Maghrib":"18:00","Isha":"19:15"}"#
        );
    }
}
