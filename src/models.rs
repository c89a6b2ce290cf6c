use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::timing::NextPrayerResult;
use crate::types::TimingsForDay;

// Query strings

#[derive(Deserialize, Clone, Debug, Default)]
pub struct PrayerTimesQuery {
    pub lat: Option<String>,
    pub long: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub method: Option<u32>,
    pub timezone: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AutoQuery {
    pub method: Option<u32>,
    pub timezone: Option<String>,
}

// Aladhan payloads

#[derive(Deserialize, Clone, Debug)]
pub struct AladhanEnvelope {
    pub code: u16,
    pub data: AladhanData,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AladhanData {
    pub timings: HashMap<String, String>,
    pub date: AladhanDate,
    #[serde(default)]
    pub meta: AladhanMeta,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AladhanDate {
    pub readable: String,
    pub gregorian: AladhanGregorian,
    pub hijri: AladhanHijri,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AladhanGregorian {
    pub weekday: EnglishName,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AladhanHijri {
    pub date: String,
    pub month: EnglishName,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EnglishName {
    pub en: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AladhanMeta {
    pub timezone: Option<String>,
}

// ipapi payload

#[derive(Deserialize, Clone, Debug, Default)]
pub struct IpApiResponse {
    pub city: Option<String>,
    pub country_name: Option<String>,
    #[serde(default)]
    pub error: bool,
    pub reason: Option<String>,
}

// Responses

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInfo {
    pub gregorian: String,
    pub hijri: String,
    pub hijri_month: String,
    pub weekday: String,
}

impl From<&AladhanDate> for CalendarInfo {
    fn from(date: &AladhanDate) -> Self {
        CalendarInfo {
            gregorian: date.readable.clone(),
            hijri: date.hijri.date.clone(),
            hijri_month: date.hijri.month.en.clone(),
            weekday: date.gregorian.weekday.en.clone(),
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneSource {
    Request,
    Provider,
    Fallback,
}

#[derive(Serialize, Clone, Debug)]
pub struct TimezoneView {
    pub id: String,
    pub source: TimezoneSource,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NextPrayerView {
    pub name: String,
    pub at: String,
    pub minutes_until: i64,
    pub hours: i64,
    pub minutes: i64,
    #[serde(rename = "in")]
    pub remaining: String,
    pub tomorrow: bool,
}

impl From<&NextPrayerResult> for NextPrayerView {
    fn from(next: &NextPrayerResult) -> Self {
        NextPrayerView {
            name: next.name.to_string(),
            at: next.at.to_rfc3339(),
            minutes_until: next.remaining_minutes,
            hours: next.hours(),
            minutes: next.minutes(),
            remaining: next.remaining_display(),
            tomorrow: next.tomorrow,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PrayerTimesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub date: CalendarInfo,
    pub timings: TimingsForDay,
    pub timezone: TimezoneView,
    pub next_prayer: NextPrayerView,
}
