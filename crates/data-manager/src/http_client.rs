//! Native station source over `reqwest`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared_types::{HistoricalPayload, ProjectionPayload, Station, WidgetError, WidgetResult};
use url::Url;

use crate::fetcher::{StationEndpoints, StationSource};

/// Fetches both payloads from the configured HTTP endpoints
pub struct HttpStationSource {
    client: reqwest::Client,
    endpoints: StationEndpoints,
}

impl HttpStationSource {
    pub fn new(endpoints: StationEndpoints, timeout_ms: u32) -> WidgetResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(u64::from(timeout_ms)))
            .build()
            .map_err(network_error)?;
        Ok(Self { client, endpoints })
    }

    pub fn with_client(client: reqwest::Client, endpoints: StationEndpoints) -> Self {
        Self { client, endpoints }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> WidgetResult<T> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::network(format!("HTTP {status} (URL: {url})")));
        }

        // parse separately so a bad body is a shape error, not a network one
        let body = response.text().await.map_err(network_error)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait(?Send)]
impl StationSource for HttpStationSource {
    async fn fetch_historical(&self, station: &Station) -> WidgetResult<HistoricalPayload> {
        self.get_json(self.endpoints.historical_url(station)).await
    }

    async fn fetch_projection(&self, station: &Station) -> WidgetResult<ProjectionPayload> {
        self.get_json(self.endpoints.projection_url(station)).await
    }
}

/// `reqwest::Error` as a widget error; both types are foreign here, so this
/// cannot be a `From` impl.
pub fn network_error(err: reqwest::Error) -> WidgetError {
    let message = match err.url() {
        Some(url) => format!("{err} (URL: {url})"),
        None => err.to_string(),
    };
    WidgetError::Network { message }
}
