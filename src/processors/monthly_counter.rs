use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::models::DailySeries;
use crate::utils::constants::DEFAULT_RAINY_THRESHOLD_MM;

/// Folds a daily precipitation series into rainy-day counts per calendar
/// month.
///
/// Months are keyed 1-12, so a multi-year series accumulates all its
/// Januaries into key 1. Every month the date range touches gets an
/// entry, even when its count is zero. A day is rainy when its reported
/// sum is strictly above the threshold; days with no report never count.
pub struct RainyDayCounter {
    threshold_mm: f32,
}

impl RainyDayCounter {
    pub fn new() -> Self {
        Self {
            threshold_mm: DEFAULT_RAINY_THRESHOLD_MM,
        }
    }

    pub fn with_threshold(mut self, threshold_mm: f32) -> Self {
        self.threshold_mm = threshold_mm;
        self
    }

    pub fn threshold_mm(&self) -> f32 {
        self.threshold_mm
    }

    pub fn count(&self, series: &DailySeries) -> BTreeMap<u32, u32> {
        let mut counts = BTreeMap::new();

        for (date, value) in series.days() {
            let entry = counts.entry(date.month()).or_insert(0u32);
            if let Some(mm) = value {
                if mm > self.threshold_mm {
                    *entry += 1;
                }
            }
        }

        debug!(
            months = counts.len(),
            rainy_days = counts.values().sum::<u32>(),
            threshold_mm = self.threshold_mm,
            "counted rainy days"
        );
        counts
    }
}

impl Default for RainyDayCounter {
    fn default() -> Self {
        Self::new()
    }
}
