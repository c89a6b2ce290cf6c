use std::net::IpAddr;

use log::debug;

use crate::error::UpstreamError;
use crate::models::{IpApiResponse, Location};

/// Client for the ipapi.co geolocation API.
#[derive(Clone)]
pub struct GeolocationClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeolocationClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> GeolocationClient {
        GeolocationClient { http, base_url: base_url.into() }
    }

    /// Looks up `addr`, or the address the request reaches ipapi from when
    /// `addr` is absent or not publicly routable.
    pub async fn lookup(&self, addr: Option<IpAddr>) -> Result<Location, UpstreamError> {
        let url = match addr.filter(is_public) {
            Some(ip) => format!("{}/{}/json/", self.base_url, ip),
            None => format!("{}/json/", self.base_url),
        };
        debug!("geolocation:: GET {}", url);

        let res = self.http.get(&url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = res.text().await?;
        let payload: IpApiResponse =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Payload(e.to_string()))?;
        if payload.error {
            return Err(UpstreamError::Payload(
                payload.reason.unwrap_or_else(|| String::from("lookup failed")),
            ));
        }

        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (non_blank(payload.city), non_blank(payload.country_name)) {
            (Some(city), Some(country)) => Ok(Location { city, country }),
            _ => Err(UpstreamError::Payload(String::from("missing city or country"))),
        }
    }
}

pub fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            // 100.64.0.0/10, carrier-grade NAT
            let shared = a == 100 && b & 0xc0 == 0x40;
            !(shared
                || v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation())
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public(&IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            let unique_local = first & 0xfe00 == 0xfc00;
            let link_local = first & 0xffc0 == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}
