//! Rainfall series models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, AdvisorResult};

/// Precipitation total for one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyRainfall {
    pub date: NaiveDate,
    pub rainfall_mm: Decimal,
}

impl DailyRainfall {
    pub fn new(date: NaiveDate, rainfall_mm: Decimal) -> Self {
        Self { date, rainfall_mm }
    }
}

/// Daily rainfall covering past and forecast days, oldest first
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RainfallSeries {
    days: Vec<DailyRainfall>,
}

impl RainfallSeries {
    /// Build a series, rejecting negative amounts and dates that are not
    /// strictly increasing.
    pub fn new(days: Vec<DailyRainfall>) -> AdvisorResult<Self> {
        if let Some(day) = days.iter().find(|d| d.rainfall_mm < Decimal::ZERO) {
            return Err(AdvisorError::InvalidRainfallSeries(format!(
                "negative rainfall on {}",
                day.date
            )));
        }
        if let Some(pair) = days.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(AdvisorError::InvalidRainfallSeries(format!(
                "{} does not follow {}",
                pair[1].date, pair[0].date
            )));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> &[DailyRainfall] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }
}

impl<'de> Deserialize<'de> for RainfallSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let days = Vec::<DailyRainfall>::deserialize(deserializer)?;
        RainfallSeries::new(days).map_err(serde::de::Error::custom)
    }
}
