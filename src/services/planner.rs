use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::PlannerError;
use crate::models::solar::{
    AnalysisPeriod, Assessment, AssessmentRequest, GeocodedLocation, IrradianceSeries,
    PlannerDefaults, ProductionSample, SystemConfig,
};
use crate::services::aggregator::{filter_range, monthly_totals};
use crate::services::cache::TtlCache;
use crate::services::geocoder::GeocoderClient;
use crate::services::irradiance::IrradianceClient;
use crate::services::yield_estimator::{estimate_production, summarize, total_production};

/// (latitude bits, longitude bits, start, end)
type SeriesKey = (u64, u64, NaiveDate, NaiveDate);

/// One geocode → fetch → estimate → aggregate pass per call, with upstream
/// results memoized on their exact inputs.
pub struct SolarPlanner {
    geocoder: GeocoderClient,
    irradiance: IrradianceClient,
    locations: TtlCache<String, Option<GeocodedLocation>>,
    series: TtlCache<SeriesKey, IrradianceSeries>,
    defaults: SystemConfig,
}

impl SolarPlanner {
    pub fn new(config: &Config) -> Result<Self, PlannerError> {
        let ttl = config.cache.ttl();
        Ok(Self {
            geocoder: GeocoderClient::new(&config.geocoder)?,
            irradiance: IrradianceClient::new(&config.irradiance)?,
            locations: TtlCache::new(ttl),
            series: TtlCache::new(ttl),
            defaults: config.defaults.clone(),
        })
    }

    pub fn defaults(&self) -> PlannerDefaults {
        PlannerDefaults {
            system: self.defaults.clone(),
            baseline_year: self.baseline_year(Utc::now().date_naive()),
        }
    }

    pub fn cached_locations(&self) -> usize {
        self.locations.len()
    }

    pub fn cached_series(&self) -> usize {
        self.series.len()
    }

    /// Most recent calendar year the archive holds in full.
    pub fn baseline_year(&self, today: NaiveDate) -> i32 {
        let latest = self.irradiance.latest_available(today);
        if latest.month() == 12 && latest.day() == 31 {
            latest.year()
        } else {
            latest.year() - 1
        }
    }

    /// Lookups are memoized but not deduplicated: concurrent misses for the
    /// same address each reach the geocoder, and the last answer wins.
    pub async fn locate(&self, address: &str) -> Result<GeocodedLocation, PlannerError> {
        let key = address.to_string();
        let found = match self.locations.get(&key) {
            Some(hit) => {
                debug!(address, "geocode cache hit");
                hit
            }
            None => {
                let found = self.geocoder.geocode(address).await?;
                self.locations.insert(key, found.clone());
                found
            }
        };
        found.ok_or_else(|| {
            PlannerError::AddressNotFound(format!(
                "{address:?}; please be more specific (e.g. add city and state)"
            ))
        })
    }

    /// Same memoization policy as [`Self::locate`]; failures are never stored.
    pub async fn irradiance(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IrradianceSeries, PlannerError> {
        let key = (latitude.to_bits(), longitude.to_bits(), start, end);
        if let Some(hit) = self.series.get(&key) {
            debug!(latitude, longitude, %start, %end, "irradiance cache hit");
            return Ok(hit);
        }
        let series = self.irradiance.fetch(latitude, longitude, start, end).await?;
        self.series.insert(key, series.clone());
        Ok(series)
    }

    pub async fn assess(&self, req: &AssessmentRequest) -> Result<Assessment, PlannerError> {
        self.assess_with_series(req).await.map(|(assessment, _)| assessment)
    }

    /// Full production series for export.
    pub async fn production(&self, req: &AssessmentRequest) -> Result<Vec<ProductionSample>, PlannerError> {
        self.assess_with_series(req).await.map(|(_, production)| production)
    }

    #[instrument(skip(self, req), fields(address = %req.address))]
    async fn assess_with_series(
        &self,
        req: &AssessmentRequest,
    ) -> Result<(Assessment, Vec<ProductionSample>), PlannerError> {
        let system = req.system.clone().unwrap_or_else(|| self.defaults.clone());
        system.validate()?;

        let year = req
            .year
            .unwrap_or_else(|| self.baseline_year(Utc::now().date_naive()));
        let (start, end) = year_bounds(year)?;
        let hourly_start = match req.hourly_start {
            Some(d) => d,
            None => date(year, 4, 1)?,
        };
        let hourly_end = match req.hourly_end {
            Some(d) => d,
            None => date(year, 4, 7)?,
        };

        let location = self.locate(&req.address).await?;
        let series = self
            .irradiance(location.latitude, location.longitude, start, end)
            .await?;

        if !series.has_readings() {
            return Err(PlannerError::DataUnavailable(format!(
                "no irradiance readings for {start}..{end} at ({:.4}, {:.4}); try an older date range",
                location.latitude, location.longitude
            )));
        }

        let production = estimate_production(&series.samples, &system);
        let annual = total_production(&production);
        let financial = summarize(annual, &system)?;
        let monthly = monthly_totals(&production);
        let hourly = filter_range(&production, hourly_start, hourly_end);

        info!(
            year,
            annual_kwh = annual,
            bill_offset_percent = financial.bill_offset_percent,
            "assessment complete"
        );

        let assessment = Assessment {
            location,
            system,
            period: AnalysisPeriod { start, end, timezone: series.timezone.clone() },
            financial,
            monthly,
            hourly_start,
            hourly_end,
            hourly,
            sample_count: production.len(),
        };
        Ok((assessment, production))
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, PlannerError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| PlannerError::InvalidRequest(format!("year {year} is out of range")))
}

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), PlannerError> {
    Ok((date(year, 1, 1)?, date(year, 12, 31)?))
}
