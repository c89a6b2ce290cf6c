use actix_web::{get, http::Method, middleware::DefaultHeaders, web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use std::net::{IpAddr, SocketAddr};

use crate::aladhan::{AladhanClient, DayTimings};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::error::{ApiError, UpstreamError};
use crate::geolocation::GeolocationClient;
use crate::models::{
    AutoQuery, Location, NextPrayerView, PrayerTimesQuery, PrayerTimesResponse, TimezoneSource,
    TimezoneView,
};
use crate::timing::{parse_timezone, resolve_in};

const FETCH_FAILED: &str = "Failed to fetch prayer times";
const AUTO_FAILED: &str = "Failed to auto-detect prayer times";
const MISSING_LOCATION: &str = "Please provide either lat & long or city & country";

pub fn configure(cfg: &mut web::ServiceConfig) {
    let query_cfg = web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into());
    cfg.app_data(query_cfg)
        .service(index)
        .service(health)
        .service(prayer_times_auto)
        .service(prayer_times)
        .route("/{tail:.*}", web::method(Method::OPTIONS).to(preflight));
}

/// Headers that let any origin call the API from a browser.
pub fn cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "*"))
        .add(("Access-Control-Max-Age", "86400"))
}

async fn preflight() -> impl Responder {
    HttpResponse::NoContent()
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("Prayer Times API is Running")
}

#[get("/health")]
pub async fn health() -> impl Responder {
    info!("Health check");
    HttpResponse::Ok()
}

#[get("/prayer-times")]
async fn prayer_times(query: web::Query<PrayerTimesQuery>,
    config: web::Data<AppConfig>,
    aladhan: web::Data<AladhanClient>,
    clock: web::Data<dyn Clock>) -> Result<web::Json<PrayerTimesResponse>, ApiError> {

    let requested_tz = requested_timezone(query.timezone.as_deref())?;
    let method = query.method.unwrap_or(config.default_method);
    let target = LocationQuery::from_query(&query)?;
    let now = clock.now();

    let day = match &target {
        LocationQuery::Coordinates { latitude, longitude } => {
            aladhan.timings_by_coordinates(*latitude, *longitude, method, now.timestamp()).await
        }
        LocationQuery::City { city, country } => aladhan.timings_by_city(city, country, method).await,
    }
    .map_err(ApiError::upstream(FETCH_FAILED))?;

    debug!("prayer_times:: {:?} method {}", target, method);
    let response = build_response(day, None, requested_tz, config.fallback_timezone, now)
        .map_err(|e| e.into_api(FETCH_FAILED))?;
    Ok(web::Json(response))
}

#[get("/prayer-times/auto")]
async fn prayer_times_auto(req: HttpRequest,
    query: web::Query<AutoQuery>,
    config: web::Data<AppConfig>,
    aladhan: web::Data<AladhanClient>,
    geolocation: web::Data<GeolocationClient>,
    clock: web::Data<dyn Clock>) -> Result<web::Json<PrayerTimesResponse>, ApiError> {

    let requested_tz = requested_timezone(query.timezone.as_deref())?;
    let method = query.method.unwrap_or(config.default_method);
    let caller = caller_ip(&req);

    let location = geolocation.lookup(caller).await.map_err(ApiError::upstream(AUTO_FAILED))?;
    debug!("prayer_times_auto:: caller {:?} detected {}, {}", caller, location.city, location.country);

    let day = aladhan
        .timings_by_city(&location.city, &location.country, method)
        .await
        .map_err(ApiError::upstream(AUTO_FAILED))?;

    let response = build_response(day, Some(location), requested_tz, config.fallback_timezone, clock.now())
        .map_err(|e| e.into_api(AUTO_FAILED))?;
    Ok(web::Json(response))
}

#[derive(Debug, PartialEq)]
enum LocationQuery {
    Coordinates { latitude: f64, longitude: f64 },
    City { city: String, country: String },
}

impl LocationQuery {
    /// Coordinates win when both are given, then city and country.
    fn from_query(query: &PrayerTimesQuery) -> Result<LocationQuery, ApiError> {
        let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

        if let (Some(lat), Some(long)) = (present(&query.lat), present(&query.long)) {
            let latitude = parse_coordinate(&lat, 90.0)
                .ok_or_else(|| ApiError::InvalidInput(format!("Invalid latitude: {lat}")))?;
            let longitude = parse_coordinate(&long, 180.0)
                .ok_or_else(|| ApiError::InvalidInput(format!("Invalid longitude: {long}")))?;
            return Ok(LocationQuery::Coordinates { latitude, longitude });
        }
        if let (Some(city), Some(country)) = (present(&query.city), present(&query.country)) {
            return Ok(LocationQuery::City { city, country });
        }
        Err(ApiError::InvalidInput(MISSING_LOCATION.to_string()))
    }
}

fn parse_coordinate(value: &str, limit: f64) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
}

fn requested_timezone(timezone: Option<&str>) -> Result<Option<Tz>, ApiError> {
    match timezone.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => Ok(Some(parse_timezone(id)?)),
        None => Ok(None),
    }
}

/// Accepts both `ip` and `ip:port` forms.
fn caller_ip(req: &HttpRequest) -> Option<IpAddr> {
    let info = req.connection_info();
    let addr = info.realip_remote_addr()?;
    addr.parse::<IpAddr>()
        .ok()
        .or_else(|| addr.parse::<SocketAddr>().ok().map(|s| s.ip()))
}

/// Failures after the provider has answered.
#[derive(Debug)]
enum BuildError {
    Request(ApiError),
    Provider(UpstreamError),
}

impl BuildError {
    fn into_api(self, message: &'static str) -> ApiError {
        match self {
            BuildError::Request(e) => e,
            BuildError::Provider(e) => ApiError::upstream(message)(e),
        }
    }
}

fn build_response(day: DayTimings,
    location: Option<Location>,
    requested_tz: Option<Tz>,
    fallback_tz: Tz,
    now: DateTime<Utc>) -> Result<PrayerTimesResponse, BuildError> {

    let (tz, source) = match (requested_tz, day.timezone.as_deref()) {
        (Some(tz), _) => (tz, TimezoneSource::Request),
        (None, Some(id)) => {
            let tz = parse_timezone(id).map_err(|e| BuildError::Provider(e.into()))?;
            (tz, TimezoneSource::Provider)
        }
        (None, None) => {
            warn!("Provider returned no timezone, using fallback {}", fallback_tz.name());
            (fallback_tz, TimezoneSource::Fallback)
        }
    };

    let next = resolve_in(&day.timings, tz, now).map_err(|e| BuildError::Request(e.into()))?;

    Ok(PrayerTimesResponse {
        location,
        date: day.calendar,
        timings: day.timings,
        timezone: TimezoneView { id: tz.name().to_string(), source },
        next_prayer: NextPrayerView::from(&next),
    })
}
