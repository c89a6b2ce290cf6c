use log::debug;

use crate::error::UpstreamError;
use crate::models::{AladhanEnvelope, CalendarInfo};
use crate::types::TimingsForDay;

/// One day of timings as returned by the Aladhan API, already validated.
#[derive(Clone, Debug)]
pub struct DayTimings {
    pub timings: TimingsForDay,
    pub calendar: CalendarInfo,
    pub timezone: Option<String>,
}

/// Client for the Aladhan prayer times API.
#[derive(Clone)]
pub struct AladhanClient {
    http: reqwest::Client,
    base_url: String,
}

impl AladhanClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> AladhanClient {
        AladhanClient { http, base_url: base_url.into() }
    }

    pub async fn timings_by_coordinates(&self,
        latitude: f64,
        longitude: f64,
        method: u32,
        timestamp: i64) -> Result<DayTimings, UpstreamError> {

        let url = format!("{}/timings/{}", self.base_url, timestamp);
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("method", method.to_string()),
        ];
        self.fetch(&url, &query).await
    }

    pub async fn timings_by_city(&self,
        city: &str,
        country: &str,
        method: u32) -> Result<DayTimings, UpstreamError> {

        let url = format!("{}/timingsByCity", self.base_url);
        let query = [
            ("city", city.to_string()),
            ("country", country.to_string()),
            ("method", method.to_string()),
        ];
        self.fetch(&url, &query).await
    }

    async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<DayTimings, UpstreamError> {
        debug!("aladhan:: GET {} {:?}", url, query);
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = res.text().await?;
        let envelope: AladhanEnvelope =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Payload(e.to_string()))?;
        if envelope.code != 200 {
            return Err(UpstreamError::Payload(format!("response code {}", envelope.code)));
        }

        let data = envelope.data;
        Ok(DayTimings {
            timings: TimingsForDay::parse(&data.timings)?,
            calendar: CalendarInfo::from(&data.date),
            timezone: data.meta.timezone.filter(|tz| !tz.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::ALADHAN_BODY;
    use crate::types::{PrayerName, TimeOfDay};
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> AladhanClient {
        AladhanClient::new(reqwest::Client::new(), format!("{}/v1", server.url()))
    }

    #[tokio::test]
    async fn fetches_by_coordinates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/timings/1710028800")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("latitude".into(), "-6.2".into()),
                Matcher::UrlEncoded("longitude".into(), "106.8".into()),
                Matcher::UrlEncoded("method".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ALADHAN_BODY)
            .expect(1)
            .create_async()
            .await;

        let day = client(&server)
            .timings_by_coordinates(-6.2, 106.8, 2, 1710028800)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(day.timings.get(PrayerName::Isha), TimeOfDay::new(19, 15).unwrap());
        assert_eq!(day.timezone.as_deref(), Some("Asia/Jakarta"));
        assert_eq!(day.calendar.weekday, "Sunday");
    }

    #[tokio::test]
    async fn fetches_by_city() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("city".into(), "South Jakarta".into()),
                Matcher::UrlEncoded("country".into(), "Indonesia".into()),
                Matcher::UrlEncoded("method".into(), "11".into()),
            ]))
            .with_status(200)
            .with_body(ALADHAN_BODY)
            .create_async()
            .await;

        let day = client(&server).timings_by_city("South Jakarta", "Indonesia", 11).await.unwrap();

        mock.assert_async().await;
        assert_eq!(day.calendar.hijri, "29-08-1445");
    }

    #[tokio::test]
    async fn non_success_status_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server).timings_by_city("Jakarta", "Indonesia", 2).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status(status) if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn partial_timings_are_rejected() {
        let mut server = mockito::Server::new_async().await;
        let body = ALADHAN_BODY.replace(r#""Asr": "15:15","#, "");
        let _mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let err = client(&server).timings_by_city("Jakarta", "Indonesia", 2).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timings(_)));
    }

    #[tokio::test]
    async fn garbage_body_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":200,"data":"Invalid city"}"#)
            .create_async()
            .await;

        let err = client(&server).timings_by_city("Nowhere", "Neverland", 2).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Payload(_)));
    }
}
