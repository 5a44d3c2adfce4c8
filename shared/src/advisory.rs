//! Planting-timing advisory from rainfall
//!
//! The advisor sums rainfall over fixed windows and walks an ordered rule
//! table; the first matching rule decides the verdict.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, AdvisorResult};
use crate::models::RainfallSeries;
use crate::types::Language;

/// Longest past window the rainfall provider serves
pub const MAX_PAST_DAYS: usize = 92;
/// Longest forecast window the rainfall provider serves
pub const MAX_FORECAST_DAYS: usize = 16;

/// Windows and thresholds for the planting rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdvisoryRules {
    pub past_days: usize,
    pub recent_days: usize,
    pub forecast_days: usize,
    /// Below this much past rain the soil is too dry
    pub min_past_rain_mm: Decimal,
    /// Above this much past rain the soil is waterlogged
    pub max_past_rain_mm: Decimal,
    pub min_forecast_rain_mm: Decimal,
    pub max_forecast_rain_mm: Decimal,
}

impl Default for AdvisoryRules {
    fn default() -> Self {
        Self {
            past_days: 5,
            recent_days: 3,
            forecast_days: 10,
            min_past_rain_mm: Decimal::from(23),
            max_past_rain_mm: Decimal::from(80),
            min_forecast_rain_mm: Decimal::from(20),
            max_forecast_rain_mm: Decimal::from(100),
        }
    }
}

impl AdvisoryRules {
    /// Days of data `evaluate` needs
    pub fn required_days(&self) -> usize {
        self.past_days.saturating_add(self.forecast_days)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.past_days == 0 || self.forecast_days == 0 {
            return Err("past_days and forecast_days must be positive");
        }
        if self.past_days > MAX_PAST_DAYS {
            return Err("past_days exceeds 92");
        }
        if self.forecast_days > MAX_FORECAST_DAYS {
            return Err("forecast_days exceeds 16");
        }
        if self.recent_days == 0 || self.recent_days > self.past_days {
            return Err("recent_days must be between 1 and past_days");
        }
        if self.min_past_rain_mm < Decimal::ZERO || self.min_forecast_rain_mm < Decimal::ZERO {
            return Err("rainfall thresholds cannot be negative");
        }
        if self.min_past_rain_mm > self.max_past_rain_mm {
            return Err("min_past_rain_mm exceeds max_past_rain_mm");
        }
        if self.min_forecast_rain_mm > self.max_forecast_rain_mm {
            return Err("min_forecast_rain_mm exceeds max_forecast_rain_mm");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlantingVerdict {
    Wait,
    Plant,
}

impl PlantingVerdict {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (PlantingVerdict::Wait, Language::English) => "WAIT",
            (PlantingVerdict::Plant, Language::English) => "PLANT",
            (PlantingVerdict::Wait, Language::Swahili) => "SUBIRI",
            (PlantingVerdict::Plant, Language::Swahili) => "PANDA",
        }
    }
}

/// Which rule decided the advisory
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryReason {
    SoilMoistureTooLow,
    LikelyWaterlogged,
    InsufficientForecast,
    ExcessiveForecast,
    BothExcessive,
    WaterlogThenDrought,
    IdealConditions,
}

impl AdvisoryReason {
    pub fn rule(&self) -> char {
        match self {
            AdvisoryReason::SoilMoistureTooLow => 'a',
            AdvisoryReason::LikelyWaterlogged => 'b',
            AdvisoryReason::InsufficientForecast => 'c',
            AdvisoryReason::ExcessiveForecast => 'd',
            AdvisoryReason::BothExcessive => 'e',
            AdvisoryReason::WaterlogThenDrought => 'f',
            AdvisoryReason::IdealConditions => 'g',
        }
    }

    pub fn verdict(&self) -> PlantingVerdict {
        match self {
            AdvisoryReason::IdealConditions => PlantingVerdict::Plant,
            _ => PlantingVerdict::Wait,
        }
    }

    pub fn message_en(&self) -> &'static str {
        match self {
            AdvisoryReason::SoilMoistureTooLow => {
                "Too little rainfall in the past five days. Soil moisture might be too low. Wait for rains before planting"
            }
            AdvisoryReason::LikelyWaterlogged => {
                "Excessive rainfall in the past five days. Soil is likely waterlogged, and your seeds could rot and fail to germinate. Wait 2-3 dry days for the soil to drain before planting"
            }
            AdvisoryReason::InsufficientForecast => {
                "Insufficient rainfall is expected in the next 10 days. Planting now may lead to poor germination, weak seedlings, and stunted root development. Consider waiting for more rainfall before planting"
            }
            AdvisoryReason::ExcessiveForecast => {
                "Excessive rainfall expected in the next 10 days. This could drown your seeds, lead to poor germination, and wash away nutrients your crops need to thrive. Wait for at least 2-3 days after the rain subsides for the soil to dry out before planting."
            }
            AdvisoryReason::BothExcessive => {
                "Both past and forecasted rainfall are excessive. This increases the risk of waterlogging, seed rot, and stunted growth. Wait for 2-3 dry days for the soil to drain before planting."
            }
            AdvisoryReason::WaterlogThenDrought => {
                "Excessive past rainfall followed by low expected rainfall can cause waterlogged soil now and drought stress later. Wait for the soil to drain and more rainfall to ensure proper moisture levels."
            }
            AdvisoryReason::IdealConditions => {
                "Ideal conditions! You can plant now. Past and forecasted rainfall are favorable for healthy seed germination and growth. Ensure soil is well-prepared and monitor weather for any changes."
            }
        }
    }

    pub fn message_sw(&self) -> &'static str {
        match self {
            AdvisoryReason::SoilMoistureTooLow => {
                "Mvua imekuwa kidogo sana katika siku tano zilizopita. Unyevu wa udongo huenda ni mdogo. Subiri mvua kabla ya kupanda"
            }
            AdvisoryReason::LikelyWaterlogged => {
                "Mvua imekuwa nyingi kupita kiasi katika siku tano zilizopita. Udongo huenda umejaa maji na mbegu zinaweza kuoza bila kuota. Subiri siku 2-3 za jua ili maji yakauke kabla ya kupanda"
            }
            AdvisoryReason::InsufficientForecast => {
                "Mvua inayotarajiwa katika siku 10 zijazo haitoshi. Kupanda sasa kunaweza kusababisha uotaji duni, miche dhaifu na mizizi iliyodumaa. Fikiria kusubiri mvua zaidi kabla ya kupanda"
            }
            AdvisoryReason::ExcessiveForecast => {
                "Mvua nyingi kupita kiasi inatarajiwa katika siku 10 zijazo. Inaweza kuzamisha mbegu, kuharibu uotaji na kusomba virutubisho. Subiri angalau siku 2-3 baada ya mvua kupungua ili udongo ukauke kabla ya kupanda."
            }
            AdvisoryReason::BothExcessive => {
                "Mvua iliyopita na inayotarajiwa ni nyingi kupita kiasi. Hii inaongeza hatari ya udongo kujaa maji, mbegu kuoza na ukuaji kudumaa. Subiri siku 2-3 za jua ili maji yakauke kabla ya kupanda."
            }
            AdvisoryReason::WaterlogThenDrought => {
                "Mvua nyingi iliyopita ikifuatwa na mvua kidogo inayotarajiwa inaweza kusababisha udongo kujaa maji sasa na ukame baadaye. Subiri udongo ukauke na mvua zaidi ili kupata unyevu unaofaa."
            }
            AdvisoryReason::IdealConditions => {
                "Hali ni nzuri! Unaweza kupanda sasa. Mvua iliyopita na inayotarajiwa inafaa kwa uotaji na ukuaji mzuri wa mbegu. Hakikisha shamba limetayarishwa vizuri na fuatilia hali ya hewa."
            }
        }
    }
}

/// Rainfall totals the rules are evaluated against, in millimetres
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RainfallMetrics {
    pub past_rain: Decimal,
    pub recent_rain: Decimal,
    pub forecast_rain: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advisory {
    pub verdict: PlantingVerdict,
    pub reason: AdvisoryReason,
    pub rule: char,
    pub metrics: RainfallMetrics,
    pub message: String,
    pub message_sw: String,
}

impl Advisory {
    fn from_reason(reason: AdvisoryReason, metrics: RainfallMetrics) -> Self {
        Self {
            verdict: reason.verdict(),
            reason,
            rule: reason.rule(),
            metrics,
            message: reason.message_en().to_string(),
            message_sw: reason.message_sw().to_string(),
        }
    }

    pub fn message(&self, language: Language) -> &str {
        match language {
            Language::English => &self.message,
            Language::Swahili => &self.message_sw,
        }
    }
}

type RulePredicate = fn(&RainfallMetrics, &AdvisoryRules) -> bool;

// Rules e and f can never fire after b, c and d; they stay in the table so
// reordering the rules keeps their meaning.
const RULES: [(AdvisoryReason, RulePredicate); 6] = [
    (AdvisoryReason::SoilMoistureTooLow, |m, r| {
        m.past_rain < r.min_past_rain_mm
    }),
    (AdvisoryReason::LikelyWaterlogged, |m, r| {
        m.past_rain > r.max_past_rain_mm
    }),
    (AdvisoryReason::InsufficientForecast, |m, r| {
        m.forecast_rain < r.min_forecast_rain_mm
    }),
    (AdvisoryReason::ExcessiveForecast, |m, r| {
        m.forecast_rain > r.max_forecast_rain_mm
    }),
    (AdvisoryReason::BothExcessive, |m, r| {
        m.past_rain > r.max_past_rain_mm && m.forecast_rain > r.max_forecast_rain_mm
    }),
    (AdvisoryReason::WaterlogThenDrought, |m, r| {
        m.past_rain > r.max_past_rain_mm && m.forecast_rain < r.min_forecast_rain_mm
    }),
];

/// Applies [`AdvisoryRules`] to rainfall series
#[derive(Debug, Clone, Default)]
pub struct RainfallAdvisor {
    rules: AdvisoryRules,
}

impl RainfallAdvisor {
    pub fn new(rules: AdvisoryRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AdvisoryRules {
        &self.rules
    }

    /// Window totals for `series`.
    ///
    /// The past window is the first `past_days` entries, the forecast window
    /// the `forecast_days` entries after it. Anything beyond is ignored.
    pub fn metrics(&self, series: &RainfallSeries) -> AdvisorResult<RainfallMetrics> {
        let required = self.rules.required_days();
        if series.len() < required {
            return Err(AdvisorError::InsufficientRainfallData {
                required,
                actual: series.len(),
            });
        }

        let days = series.days();
        let past = &days[..self.rules.past_days];
        let recent = &past[self.rules.past_days.saturating_sub(self.rules.recent_days)..];
        let forecast = &days[self.rules.past_days..required];
        let total = |window: &[crate::models::DailyRainfall]| -> AdvisorResult<Decimal> {
            window.iter().try_fold(Decimal::ZERO, |sum, day| {
                sum.checked_add(day.rainfall_mm).ok_or_else(|| {
                    AdvisorError::InvalidRainfallSeries(format!(
                        "rainfall total overflows at {}",
                        day.date
                    ))
                })
            })
        };

        Ok(RainfallMetrics {
            past_rain: total(past)?,
            recent_rain: total(recent)?,
            forecast_rain: total(forecast)?,
        })
    }

    pub fn evaluate(&self, series: &RainfallSeries) -> AdvisorResult<Advisory> {
        let metrics = self.metrics(series)?;
        Ok(Advisory::from_reason(self.decide(&metrics), metrics))
    }

    /// First matching rule, or ideal conditions when none match
    pub fn decide(&self, metrics: &RainfallMetrics) -> AdvisoryReason {
        RULES
            .iter()
            .find(|(_, applies)| applies(metrics, &self.rules))
            .map(|(reason, _)| *reason)
            .unwrap_or(AdvisoryReason::IdealConditions)
    }
}
