// HTTP client for the forecasting service
use crate::application::error::{DashboardError, Endpoint};
use crate::application::forecast_api::ForecastApi;
use crate::domain::forecast::{FetchResponse, PredictResponse};
use crate::domain::meta::StreamMeta;
use crate::domain::time::LocalTimestamp;
use crate::domain::tunnel::Tunnel;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpForecastClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpForecastClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_url(&self, endpoint: Endpoint, params: &[(&str, String)]) -> String {
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            format!("{}{}", self.endpoint, endpoint.path())
        } else {
            format!("{}{}?{}", self.endpoint, endpoint.path(), query)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<T, DashboardError> {
        let url = self.build_url(endpoint, params);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::unavailable(endpoint, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::unavailable(
                endpoint,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::unavailable(endpoint, e))?;
        serde_json::from_str(&body).map_err(|e| DashboardError::invalid_response(endpoint, e))
    }
}

#[async_trait]
impl ForecastApi for HttpForecastClient {
    async fn get_meta(&self) -> Result<StreamMeta, DashboardError> {
        let meta: StreamMeta = self.get_json(Endpoint::Meta, &[]).await?;
        meta.validate()
            .map_err(|reason| DashboardError::invalid_response(Endpoint::Meta, reason))?;
        Ok(meta)
    }

    async fn fetch_range(
        &self,
        tunnel: Tunnel,
        start: LocalTimestamp,
        end: LocalTimestamp,
    ) -> Result<FetchResponse, DashboardError> {
        let params = [
            ("tunnel", tunnel.code().to_string()),
            ("start_time", start.to_string()),
            ("end_time", end.to_string()),
        ];
        let data: FetchResponse = self.get_json(Endpoint::Fetch, &params).await?;
        data.validate()
            .map_err(|e| DashboardError::invalid_response(Endpoint::Fetch, e))?;
        Ok(data)
    }

    async fn predict_at(
        &self,
        tunnel: Tunnel,
        time: LocalTimestamp,
    ) -> Result<PredictResponse, DashboardError> {
        let params = [("tunnel", tunnel.code().to_string()), ("time", time.to_string())];
        let data: PredictResponse = self.get_json(Endpoint::Predict, &params).await?;
        data.validate()
            .map_err(|e| DashboardError::invalid_response(Endpoint::Predict, e))?;
        Ok(data)
    }
}
