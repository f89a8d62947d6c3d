use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use http_cache_reqwest::{CACacheManager, Cache, CacheMode, HttpCache, HttpCacheOptions};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

use crate::error::{PipelineError, Result};
use crate::models::{DailySeries, WeatherQuery};
use crate::utils::constants::{
    ARCHIVE_API_BASE_URL, ARCHIVE_API_PATH, DAILY_VARIABLE, DEFAULT_MAX_RETRIES, HTTP_CACHE_DIR,
    RETRY_MAX_BACKOFF_SECS, RETRY_MIN_BACKOFF_MS,
};

/// Client for the Open-Meteo historical archive.
///
/// Responses land in a persistent cacache store under `.cache` and are
/// served from there on repeat runs regardless of age; transient
/// failures retry with exponential backoff. The cache middleware sits
/// in front of the retry middleware, so a cache hit never goes near the
/// network.
pub struct OpenMeteoClient {
    http: ClientWithMiddleware,
    base_url: String,
    max_retries: u32,
    cache_enabled: bool,
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::build(
            ARCHIVE_API_BASE_URL.to_string(),
            DEFAULT_MAX_RETRIES,
            true,
        )
    }

    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self::build(base_url.into(), self.max_retries, self.cache_enabled)
    }

    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self::build(self.base_url, max_retries, self.cache_enabled)
    }

    pub fn without_cache(self) -> Self {
        Self::build(self.base_url, self.max_retries, false)
    }

    fn build(base_url: String, max_retries: u32, cache_enabled: bool) -> Self {
        let mut builder = ClientBuilder::new(Client::new());
        if cache_enabled {
            builder = builder.with(Cache(HttpCache {
                mode: CacheMode::ForceCache,
                manager: CACacheManager::new(PathBuf::from(HTTP_CACHE_DIR), false),
                options: HttpCacheOptions::default(),
            }));
        }

        let policy = ExponentialBackoff::builder()
            .retry_bounds(
                Duration::from_millis(RETRY_MIN_BACKOFF_MS),
                Duration::from_secs(RETRY_MAX_BACKOFF_SECS),
            )
            .build_with_max_retries(max_retries);
        let http = builder
            .with(RetryTransientMiddleware::new_with_policy(policy))
            .build();

        Self {
            http,
            base_url,
            max_retries,
            cache_enabled,
        }
    }

    /// Fetch the daily precipitation series for a point and date range
    pub async fn fetch_daily_precipitation(&self, query: &WeatherQuery) -> Result<DailySeries> {
        query.validate()?;
        query.validate_dates()?;

        let url = format!("{}{}", self.base_url, ARCHIVE_API_PATH);
        debug!(
            %url,
            latitude = query.latitude,
            longitude = query.longitude,
            start = %query.start_date,
            end = %query.end_date,
            retries = self.max_retries,
            cached = self.cache_enabled,
            "requesting daily precipitation"
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", query.latitude.to_string()),
                ("longitude", query.longitude.to_string()),
                ("start_date", query.start_date.to_string()),
                ("end_date", query.end_date.to_string()),
                ("daily", DAILY_VARIABLE.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.reason,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(PipelineError::Api {
                status: status.as_u16(),
                reason,
            });
        }

        let body: ArchiveResponse = response.json().await?;
        debug!(
            grid_latitude = body.latitude,
            grid_longitude = body.longitude,
            unit = body
                .daily_units
                .as_ref()
                .and_then(|u| u.precipitation_sum.as_deref())
                .unwrap_or("mm"),
            "archive answered"
        );

        series_from_daily(query, body.daily)
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the response against the requested range before trusting the
/// positional alignment between dates and values.
fn series_from_daily(query: &WeatherQuery, daily: DailyBlock) -> Result<DailySeries> {
    let DailyBlock {
        time,
        precipitation_sum,
    } = daily;

    if time.len() != precipitation_sum.len() {
        return Err(PipelineError::SeriesMisaligned {
            dates: time.len(),
            values: precipitation_sum.len(),
        });
    }

    let expected = query.expected_days();
    if time.len() != expected {
        return Err(PipelineError::MissingData(format!(
            "archive returned {} days for a {}-day range",
            time.len(),
            expected
        )));
    }

    if time.first().copied() != Some(query.start_date)
        || time.last().copied() != Some(query.end_date)
    {
        return Err(PipelineError::MissingData(format!(
            "archive dates do not match the requested range {}..{}",
            query.start_date, query.end_date
        )));
    }

    DailySeries::new(*query, DAILY_VARIABLE, precipitation_sum)
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    latitude: f64,
    longitude: f64,
    daily: DailyBlock,
    #[serde(default)]
    daily_units: Option<DailyUnits>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<NaiveDate>,
    precipitation_sum: Vec<Option<f32>>,
}

#[derive(Debug, Deserialize)]
struct DailyUnits {
    #[serde(default)]
    precipitation_sum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}
