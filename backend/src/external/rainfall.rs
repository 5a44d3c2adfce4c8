//! Open-Meteo daily precipitation client
//!
//! Requests the past and forecast windows the advisory rules need in one call.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    AdvisorError, AdvisorResult, AdvisoryRules, DailyRainfall, DataProvider, GpsCoordinates,
    RainfallSeries, TransportCause,
};

use super::http::HttpTransport;
use super::RainfallDataSource;
use crate::config::{HttpConfig, RainfallConfig};
use crate::error::AppResult;

/// Open-Meteo forecast client
#[derive(Clone)]
pub struct OpenMeteoClient {
    transport: HttpTransport,
    base_url: String,
    timezone: String,
    past_days: usize,
    forecast_days: usize,
}

/// Open-Meteo forecast response
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<String>,
    precipitation_sum: Vec<Option<Decimal>>,
}

fn malformed(detail: impl Into<String>) -> AdvisorError {
    AdvisorError::unavailable(
        DataProvider::Rainfall,
        TransportCause::MalformedResponse(detail.into()),
    )
}

impl OpenMeteoClient {
    pub fn new(config: &RainfallConfig, http: &HttpConfig, rules: &AdvisoryRules) -> AppResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(DataProvider::Rainfall, http)?,
            base_url: config.api_endpoint.clone(),
            timezone: config.timezone.clone(),
            past_days: rules.past_days,
            forecast_days: rules.forecast_days,
        })
    }

    fn convert_response(data: OpenMeteoResponse) -> AdvisorResult<RainfallSeries> {
        let OpenMeteoDaily {
            time,
            precipitation_sum,
        } = data.daily;
        if time.len() != precipitation_sum.len() {
            return Err(malformed(format!(
                "{} dates for {} precipitation values",
                time.len(),
                precipitation_sum.len()
            )));
        }

        let days = time
            .iter()
            .zip(precipitation_sum)
            .map(|(date, amount)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| malformed(format!("unparsable date '{}'", date)))?;
                let rainfall_mm =
                    amount.ok_or_else(|| malformed(format!("no precipitation value for {}", date)))?;
                Ok(DailyRainfall::new(date, rainfall_mm))
            })
            .collect::<AdvisorResult<Vec<_>>>()?;

        RainfallSeries::new(days).map_err(|e| malformed(e.to_string()))
    }
}

#[async_trait]
impl RainfallDataSource for OpenMeteoClient {
    async fn fetch_rainfall(&self, coordinates: GpsCoordinates) -> AdvisorResult<RainfallSeries> {
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("daily", "precipitation_sum".to_string()),
            ("timezone", self.timezone.clone()),
            ("past_days", self.past_days.to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ];
        let data: OpenMeteoResponse = self.transport.get_json(&self.base_url, &query).await?;
        let series = Self::convert_response(data)?;
        tracing::debug!(days = series.len(), "Rainfall series received");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AdvisorResult<RainfallSeries> {
        OpenMeteoClient::convert_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_convert_response() {
        let series = parse(
            r#"{"daily": {"time": ["2025-03-01", "2025-03-02"], "precipitation_sum": [0.0, 12.4]}}"#,
        )
        .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.days()[1].rainfall_mm, Decimal::new(124, 1));
    }

    #[test]
    fn test_null_amount_is_malformed() {
        let err = parse(
            r#"{"daily": {"time": ["2025-03-01", "2025-03-02"], "precipitation_sum": [1.0, null]}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::DataSourceUnavailable {
                cause: TransportCause::MalformedResponse(_),
                ..
            }
        ));
    }

    #[test]
    fn test_length_mismatch_is_malformed() {
        let err = parse(r#"{"daily": {"time": ["2025-03-01"], "precipitation_sum": [1.0, 2.0]}}"#)
            .unwrap_err();
        assert_eq!(err.code(), "DATA_SOURCE_UNAVAILABLE");
    }

    #[test]
    fn test_bad_date_is_malformed() {
        let err = parse(r#"{"daily": {"time": ["01/03/2025"], "precipitation_sum": [1.0]}}"#)
            .unwrap_err();
        assert_eq!(err.code(), "DATA_SOURCE_UNAVAILABLE");
    }

    #[test]
    fn test_out_of_order_dates_are_malformed() {
        let err = parse(
            r#"{"daily": {"time": ["2025-03-02", "2025-03-01"], "precipitation_sum": [1.0, 2.0]}}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), "DATA_SOURCE_UNAVAILABLE");
    }
}
