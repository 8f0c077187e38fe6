use std::cell::Cell;

use async_trait::async_trait;
use js_sys::{Array, Promise};
use serde::de::DeserializeOwned;
use shared_types::{HistoricalPayload, ProjectionPayload, Station, WidgetError, WidgetResult};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response, Window};

use crate::fetcher::{StationEndpoints, StationSource};

/// WASM-compatible HTTP client using browser's fetch API
pub struct FetchClient {
    timeout_ms: u32,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

impl FetchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create client with custom timeout
    pub fn with_timeout(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    /// Fetch JSON data from a URL, aborting after `timeout_ms`
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> WidgetResult<T> {
        let opts = RequestInit::new();
        opts.set_method("GET");

        // Create abort controller for timeout
        let abort_controller = AbortController::new()?;
        opts.set_signal(Some(&abort_controller.signal()));

        let headers = Headers::new()?;
        headers.set("Accept", "application/json")?;
        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &opts)?;

        let window = web_sys::window()
            .ok_or_else(|| WidgetError::network("No window object available"))?;

        let timer = Cell::new(None);
        let timeout_promise = Promise::new(&mut |_, reject| {
            let abort_controller = abort_controller.clone();
            let on_timeout = Closure::once(Box::new(move || {
                abort_controller.abort();
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("Request timeout"));
            }) as Box<dyn FnOnce()>);

            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                on_timeout.as_ref().unchecked_ref(),
                self.timeout_ms as i32,
            ) {
                Ok(handle) => timer.set(Some(handle)),
                Err(e) => log::warn!("Cannot arm fetch timeout: {e:?}"),
            }

            on_timeout.forget();
        });

        let result = self.read_json(&window, &request, &timeout_promise, url).await;

        // the body is read, so the abort must not fire any more
        if let Some(handle) = timer.get() {
            window.clear_timeout_with_handle(handle);
        }
        result
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        window: &Window,
        request: &Request,
        timeout: &Promise,
        url: &str,
    ) -> WidgetResult<T> {
        let fetch_promise = window.fetch_with_request(request);
        let raced = Promise::race(&Array::of2(&fetch_promise, timeout));

        let resp_value = JsFuture::from(raced).await.map_err(|e| fetch_failed(&e, url))?;
        let resp: Response = resp_value.dyn_into()?;

        if !resp.ok() {
            return Err(WidgetError::network(format!(
                "HTTP error! status: {} (URL: {url})",
                resp.status()
            )));
        }

        // Read as text so serde reports shape errors with a line number.
        // An abort during the read rejects this promise too.
        let text = JsFuture::from(resp.text()?)
            .await
            .map_err(|e| fetch_failed(&e, url))?;
        let body = text
            .as_string()
            .ok_or_else(|| WidgetError::data_shape("response body is not text"))?;

        Ok(serde_json::from_str(&body)?)
    }
}

fn fetch_failed(err: &JsValue, url: &str) -> WidgetError {
    let reason = err.as_string().unwrap_or_else(|| format!("{err:?}"));
    WidgetError::network(format!("Fetch failed: {reason} (URL: {url})"))
}

/// Browser station source
pub struct FetchStationSource {
    client: FetchClient,
    endpoints: StationEndpoints,
}

impl FetchStationSource {
    pub fn new(endpoints: StationEndpoints, timeout_ms: u32) -> Self {
        Self {
            client: FetchClient::with_timeout(timeout_ms),
            endpoints,
        }
    }
}

#[async_trait(?Send)]
impl StationSource for FetchStationSource {
    async fn fetch_historical(&self, station: &Station) -> WidgetResult<HistoricalPayload> {
        let url = self.endpoints.historical_url(station);
        self.client.fetch_json(url.as_str()).await
    }

    async fn fetch_projection(&self, station: &Station) -> WidgetResult<ProjectionPayload> {
        let url = self.endpoints.projection_url(station);
        self.client.fetch_json(url.as_str()).await
    }
}
