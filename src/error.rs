use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::types::PrayerName;

/// Problems with the inputs to next-prayer resolution.
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("missing timing for {0}")]
    MissingTiming(PrayerName),
    #[error("timing for {name} is not HH:MM: {value:?}")]
    MalformedTime { name: PrayerName, value: String },
    #[error("unknown timezone identifier: {0:?}")]
    UnknownTimezone(String),
    #[error("{time} does not exist on {date} in {timezone}")]
    UnrepresentableTime { date: String, time: String, timezone: String },
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected payload: {0}")]
    Payload(String),
    #[error("unusable timings: {0}")]
    Timings(#[from] TimingError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{message}: {source}")]
    UpstreamUnavailable {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl ApiError {
    /// Logs the upstream failure and hides it behind `message`.
    pub fn upstream(message: &'static str) -> impl FnOnce(UpstreamError) -> ApiError {
        move |source| {
            error!("{}: {}", message, source);
            ApiError::UpstreamUnavailable { message, source }
        }
    }
}

impl From<TimingError> for ApiError {
    fn from(e: TimingError) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::InvalidInput(message) => message.as_str(),
            ApiError::UpstreamUnavailable { message, .. } => message,
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
