use chrono::NaiveDate;
use serde::Serialize;
use validator::Validate;

use crate::error::{PipelineError, Result};

/// Query parameters for one archive request: the point to sample and the
/// inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Validate)]
pub struct WeatherQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl WeatherQuery {
    pub fn new(latitude: f64, longitude: f64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            latitude,
            longitude,
            start_date,
            end_date,
        }
    }

    /// Number of days the inclusive range covers
    pub fn expected_days(&self) -> usize {
        ((self.end_date - self.start_date).num_days() + 1).max(0) as usize
    }

    /// Range ordering check; the derive handles the coordinate ranges
    pub fn validate_dates(&self) -> Result<()> {
        if self.start_date > self.end_date {
            return Err(PipelineError::InvalidFormat(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

/// Daily time series for one variable at one point.
///
/// Values are aligned positionally to the query's date range: index 0 is
/// the start date, the last index is the end date. The constructor
/// enforces the alignment, so a `DailySeries` can always be zipped
/// against its own dates.
#[derive(Debug, Clone)]
pub struct DailySeries {
    pub query: WeatherQuery,
    pub variable: String,
    values: Vec<Option<f32>>,
}

impl DailySeries {
    pub fn new(
        query: WeatherQuery,
        variable: impl Into<String>,
        values: Vec<Option<f32>>,
    ) -> Result<Self> {
        let expected = query.expected_days();
        if values.len() != expected {
            return Err(PipelineError::SeriesMisaligned {
                dates: expected,
                values: values.len(),
            });
        }

        Ok(Self {
            query,
            variable: variable.into(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f32>] {
        &self.values
    }

    /// Dates of the series in order, paired with their values
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, Option<f32>)> + '_ {
        self.query
            .start_date
            .iter_days()
            .zip(self.values.iter().copied())
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.len() - self.valid_count()
    }

    /// Sum of all reported precipitation over the range, in mm
    pub fn total_mm(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .map(|v| f64::from(*v))
            .sum()
    }

    /// Wettest day of the range, if any day reported data
    pub fn max_day(&self) -> Option<(NaiveDate, f32)> {
        self.days()
            .filter_map(|(date, value)| value.map(|v| (date, v)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}
