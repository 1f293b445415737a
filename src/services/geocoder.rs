//! Address lookup against a Nominatim-compatible search API.

use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::GeocoderConfig;
use crate::error::{PlannerError, body_or_read_error};
use crate::models::solar::{GeocodedLocation, NominatimPlace};

const SERVICE: &str = "geocoder";

pub struct GeocoderClient {
    client: Client,
    base_url: String,
    min_interval: Duration,
    /// Instant of the last upstream request; serializes callers through the gate
    last_request: Mutex<Option<Instant>>,
}

impl GeocoderClient {
    pub fn new(cfg: &GeocoderConfig) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| PlannerError::network(SERVICE, &e))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            min_interval: cfg.min_interval(),
            last_request: Mutex::new(None),
        })
    }

    /// Resolves free text to coordinates. `Ok(None)` means the provider
    /// answered but knows no such place.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodedLocation>, PlannerError> {
        let query = address.trim();
        if query.is_empty() {
            return Err(PlannerError::InvalidRequest("address must not be empty".to_string()));
        }

        self.wait_turn().await;

        let url = format!("{}/search", self.base_url);
        debug!(%url, address = query, "geocoding");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| PlannerError::network(SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = body_or_read_error(response.text().await);
            return Err(PlannerError::upstream_status(SERVICE, status.as_u16(), &body));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| PlannerError::network(SERVICE, &e))?;

        let Some(place) = places.into_iter().next() else {
            info!(address = query, "address not found");
            return Ok(None);
        };

        let latitude = parse_coordinate(&place.lat, "lat")?;
        let longitude = parse_coordinate(&place.lon, "lon")?;
        info!(address = query, latitude, longitude, resolved = %place.display_name, "address resolved");

        Ok(Some(GeocodedLocation {
            latitude,
            longitude,
            canonical_address: place.display_name,
        }))
    }

    /// Holds the caller until `min_interval` has passed since the previous request.
    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                let wait_ms = (ready_at - now).as_millis() as u64;
                debug!(wait_ms, "geocoder rate limit");
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

fn parse_coordinate(raw: &str, field: &str) -> Result<f64, PlannerError> {
    raw.trim().parse::<f64>().map_err(|_| PlannerError::Transport {
        service: SERVICE,
        status: None,
        message: format!("unparseable {field} {raw:?} in response"),
    })
}
