//! Historical hourly shortwave irradiance from the Open-Meteo archive API.

use chrono::{Days, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::IrradianceConfig;
use crate::error::{PlannerError, body_or_read_error};
use crate::models::solar::{ArchiveResponse, IrradianceSample, IrradianceSeries};

const SERVICE: &str = "open-meteo";

/// First day covered by the reanalysis archive.
pub fn archive_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1940, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub struct IrradianceClient {
    client: Client,
    base_url: String,
    archive_delay_days: u32,
}

impl IrradianceClient {
    pub fn new(cfg: &IrradianceConfig) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| PlannerError::network(SERVICE, &e))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            archive_delay_days: cfg.archive_delay_days,
        })
    }

    /// Newest date the archive is expected to have finalized as of `today`.
    pub fn latest_available(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(self.archive_delay_days as u64))
            .unwrap_or(today)
    }

    /// Hourly GHI for `[start, end]` at the location, in its local time zone.
    /// An empty series is a valid answer; callers decide whether it is usable.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<IrradianceSeries, PlannerError> {
        self.fetch_as_of(latitude, longitude, start, end, Utc::now().date_naive())
            .await
    }

    async fn fetch_as_of(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<IrradianceSeries, PlannerError> {
        validate_coordinates(latitude, longitude)?;
        self.check_window(start, end, today)?;

        let url = format!("{}/v1/archive", self.base_url);
        debug!(%url, latitude, longitude, %start, %end, "fetching irradiance");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
                ("hourly", "shortwave_radiation".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| PlannerError::network(SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = body_or_read_error(response.text().await);
            warn!(status = status.as_u16(), "irradiance archive rejected request");
            return Err(PlannerError::upstream_status(SERVICE, status.as_u16(), &body));
        }

        let payload: ArchiveResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::network(SERVICE, &e))?;

        let series = parse_series(payload)?;
        info!(
            samples = series.samples.len(),
            timezone = %series.timezone,
            "irradiance series received"
        );
        Ok(series)
    }

    fn check_window(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<(), PlannerError> {
        if start > end {
            return Err(PlannerError::InvalidRequest(format!(
                "start date {start} is after end date {end}"
            )));
        }
        let latest = self.latest_available(today);
        if end > latest {
            return Err(PlannerError::DataUnavailable(format!(
                "the archive lags {} days behind today; pick an end date on or before {latest} (requested {end})",
                self.archive_delay_days
            )));
        }
        if start < archive_start() {
            return Err(PlannerError::DataUnavailable(format!(
                "the archive starts at {}; requested {start}",
                archive_start()
            )));
        }
        Ok(())
    }
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), PlannerError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(PlannerError::InvalidRequest("latitude must be -90..90".to_string()));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(PlannerError::InvalidRequest("longitude must be -180..180".to_string()));
    }
    Ok(())
}

fn parse_series(payload: ArchiveResponse) -> Result<IrradianceSeries, PlannerError> {
    let samples = match payload.hourly {
        Some(hourly) => {
            if hourly.time.len() != hourly.shortwave_radiation.len() {
                warn!(
                    times = hourly.time.len(),
                    values = hourly.shortwave_radiation.len(),
                    "hourly arrays differ in length, truncating"
                );
            }
            hourly
                .time
                .iter()
                .zip(hourly.shortwave_radiation)
                .map(|(t, ghi)| {
                    Ok(IrradianceSample {
                        timestamp: parse_local_time(t)?,
                        ghi,
                    })
                })
                .collect::<Result<Vec<_>, PlannerError>>()?
        }
        None => Vec::new(),
    };

    Ok(IrradianceSeries {
        latitude: payload.latitude,
        longitude: payload.longitude,
        timezone: payload.timezone,
        utc_offset_seconds: payload.utc_offset_seconds,
        samples,
    })
}

/// Open-Meteo local times look like "2023-04-01T13:00".
fn parse_local_time(raw: &str) -> Result<NaiveDateTime, PlannerError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| PlannerError::Transport {
            service: SERVICE,
            status: None,
            message: format!("unparseable timestamp {raw:?} in response"),
        })
}
