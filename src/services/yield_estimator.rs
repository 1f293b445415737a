//! Production, financial and environmental estimates from hourly GHI.
//!
//!   production_kwh = GHI/1000 × capacity_kw × efficiency   (per hourly sample)
//!
//! Financial figures are derived from the plain sum of the supplied samples.
//! A range shorter than a year is NOT scaled up; callers pass a full calendar
//! year when they want annual numbers.

use crate::error::PlannerError;
use crate::models::solar::{FinancialSummary, IrradianceSample, ProductionSample, SystemConfig};

// ─── Constants ───────────────────────────────────────────────
/// Standard test condition irradiance, W/m²
const STC_IRRADIANCE: f64 = 1000.0;
/// Grid emission factor, kg CO2 per kWh
const CO2_KG_PER_KWH: f64 = 0.7;
/// Trees needed to absorb one tonne of CO2 per year
const TREES_PER_TONNE: f64 = 45.0;

/// Energy of one hourly sample in kWh. Gaps count as zero irradiance.
pub fn production_kwh(ghi: Option<f64>, config: &SystemConfig) -> f64 {
    let g = sanitize_ghi(ghi);
    (g / STC_IRRADIANCE) * config.capacity_kw * config.efficiency
}

#[inline]
fn sanitize_ghi(ghi: Option<f64>) -> f64 {
    match ghi {
        Some(g) if g.is_finite() => g.max(0.0),
        _ => 0.0,
    }
}

pub fn estimate_production(
    samples: &[IrradianceSample],
    config: &SystemConfig,
) -> Vec<ProductionSample> {
    samples
        .iter()
        .map(|s| ProductionSample {
            timestamp: s.timestamp,
            ghi: sanitize_ghi(s.ghi),
            production_kwh: production_kwh(s.ghi, config),
        })
        .collect()
}

pub fn total_production(samples: &[ProductionSample]) -> f64 {
    samples.iter().map(|s| s.production_kwh).sum()
}

/// Rolls an annual production total up into the headline figures.
pub fn summarize(annual_kwh: f64, config: &SystemConfig) -> Result<FinancialSummary, PlannerError> {
    config.validate()?;

    let monthly_kwh = annual_kwh / 12.0;
    // Bill assumed purely volumetric: no fixed charges in the consumption estimate.
    let monthly_consumption_kwh = config.monthly_bill / config.electricity_rate;
    let co2_tonnes = annual_kwh * CO2_KG_PER_KWH / 1000.0;

    Ok(FinancialSummary {
        annual_generation_kwh: annual_kwh,
        monthly_generation_kwh: monthly_kwh,
        annual_savings: annual_kwh * config.electricity_rate,
        bill_offset_percent: monthly_kwh / monthly_consumption_kwh * 100.0,
        co2_saved_tonnes: co2_tonnes,
        tree_equivalent: (co2_tonnes * TREES_PER_TONNE).floor().max(0.0) as u64,
    })
}
