use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PlannerError;

// ─── Irradiance input ────────────────────────────────────────────────────────

/// One hourly reading of global horizontal irradiance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IrradianceSample {
    /// Local wall-clock time at the location
    pub timestamp: NaiveDateTime,
    /// GHI in W/m²; `None` when the archive has a gap
    pub ghi: Option<f64>,
}

/// Hourly irradiance for one coordinate and date range, as resolved by the archive.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IrradianceSeries {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub samples: Vec<IrradianceSample>,
}

impl IrradianceSeries {
    /// True when at least one sample carries a reading.
    pub fn has_readings(&self) -> bool {
        self.samples.iter().any(|s| s.ghi.is_some())
    }
}

// ─── System parameters ───────────────────────────────────────────────────────

/// PV system and tariff parameters for one estimation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SystemConfig {
    /// Proposed system size (kW peak)
    pub capacity_kw: f64,
    /// Overall system efficiency, fraction in (0, 1]
    pub efficiency: f64,
    /// Electricity price per kWh
    pub electricity_rate: f64,
    /// Average monthly electricity bill, same currency as the rate
    pub monthly_bill: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            capacity_kw: 5.0,
            efficiency: 0.78,
            electricity_rate: 8.5,
            monthly_bill: 3000.0,
        }
    }
}

impl SystemConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        let positive = [
            ("capacity_kw", self.capacity_kw),
            ("electricity_rate", self.electricity_rate),
            ("monthly_bill", self.monthly_bill),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlannerError::Configuration(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !self.efficiency.is_finite() || self.efficiency <= 0.0 || self.efficiency > 1.0 {
            return Err(PlannerError::Configuration(format!(
                "efficiency must be in (0, 1], got {}",
                self.efficiency
            )));
        }
        Ok(())
    }
}

// ─── Derived output ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductionSample {
    pub timestamp: NaiveDateTime,
    /// GHI used for the estimate (W/m²), gaps already zeroed
    pub ghi: f64,
    pub production_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyAggregate {
    /// Calendar month, 1 = January
    pub month: u32,
    /// Short month name, e.g. "Apr"
    pub label: String,
    pub total_production_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FinancialSummary {
    pub annual_generation_kwh: f64,
    pub monthly_generation_kwh: f64,
    pub annual_savings: f64,
    pub bill_offset_percent: f64,
    pub co2_saved_tonnes: f64,
    pub tree_equivalent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeocodedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub canonical_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AreaEstimate {
    pub area_square_meters: f64,
    pub implied_capacity_kw: f64,
}

/// GeoJSON geometry exactly as produced by the drawing surface.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = Object)]
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

// ─── Assessment request / response ───────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssessmentRequest {
    pub address: String,
    /// Falls back to the configured defaults when omitted
    pub system: Option<SystemConfig>,
    /// Calendar year used as the financial baseline
    pub year: Option<i32>,
    pub hourly_start: Option<NaiveDate>,
    pub hourly_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Assessment {
    pub location: GeocodedLocation,
    pub system: SystemConfig,
    pub period: AnalysisPeriod,
    pub financial: FinancialSummary,
    pub monthly: Vec<MonthlyAggregate>,
    pub hourly_start: NaiveDate,
    pub hourly_end: NaiveDate,
    pub hourly: Vec<ProductionSample>,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlannerDefaults {
    pub system: SystemConfig,
    pub baseline_year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub cached_locations: usize,
    pub cached_series: usize,
}

// ─── Nominatim wire types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

// ─── Open-Meteo archive wire types ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub hourly: Option<ArchiveHourly>,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveHourly {
    pub time: Vec<String>,
    pub shortwave_radiation: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SystemConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_rate_and_bill() {
        let zero_rate = SystemConfig { electricity_rate: 0.0, ..Default::default() };
        assert!(matches!(zero_rate.validate(), Err(PlannerError::Configuration(_))));

        let zero_bill = SystemConfig { monthly_bill: 0.0, ..Default::default() };
        assert!(matches!(zero_bill.validate(), Err(PlannerError::Configuration(_))));
    }

    #[test]
    fn test_rejects_out_of_range_efficiency() {
        for efficiency in [0.0, -0.1, 1.01, f64::NAN] {
            let cfg = SystemConfig { efficiency, ..Default::default() };
            assert!(cfg.validate().is_err(), "efficiency {efficiency} accepted");
        }
        let full = SystemConfig { efficiency: 1.0, ..Default::default() };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let cfg = SystemConfig { capacity_kw: -5.0, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("capacity_kw"));
    }

    #[test]
    fn test_archive_response_accepts_null_readings() {
        let body = r#"{
            "latitude": 18.5, "longitude": 73.875, "timezone": "Asia/Kolkata",
            "utc_offset_seconds": 19800,
            "hourly": {"time": ["2023-01-01T00:00", "2023-01-01T01:00"],
                       "shortwave_radiation": [null, 12.5]}
        }"#;
        let parsed: ArchiveResponse = serde_json::from_str(body).unwrap();
        let hourly = parsed.hourly.unwrap();
        assert_eq!(hourly.shortwave_radiation, vec![None, Some(12.5)]);
        assert_eq!(parsed.utc_offset_seconds, 19800);
    }
}
