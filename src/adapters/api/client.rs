//! Authenticated HTTP client for the platform backend.
//!
//! Every request except the token exchange carries a bearer token taken
//! from the injected session manager. A 401 from any endpoint tears the
//! session down before the error is surfaced, so the next page load
//! lands on the login screen instead of looping on a dead token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::error::QuantdeskError;
use crate::domain::experiment::ExperimentSpec;
use crate::domain::ohlcv::{normalize, OhlcvBar};
use crate::domain::platform::{
    ConfigEntry, CurvePoint, ExperimentDetail, ExperimentSummary, FactorTable, ModelMetrics,
    ModelSummary, MonitoringSnapshot, UserInfo,
};
use crate::domain::session::{Session, SessionManager};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::platform_port::PlatformPort;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<SessionManager>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Wire shape of one OHLCV row; the backend omits the symbol since the
/// query names it.
#[derive(Debug, Deserialize)]
struct OhlcvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: i64,
}

impl ApiClient {
    pub fn from_config(
        config: &dyn ConfigPort,
        sessions: Arc<SessionManager>,
    ) -> Result<Self, QuantdeskError> {
        let base_url =
            config
                .get_string("api", "base_url")
                .ok_or_else(|| QuantdeskError::ConfigMissing {
                    section: "api".into(),
                    key: "base_url".into(),
                })?;
        let timeout_secs = config.get_int("api", "timeout_secs", 15);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1) as u64))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            sessions,
        })
    }

    pub fn new(base_url: &str, sessions: Arc<SessionManager>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            sessions,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, QuantdeskError> {
        self.sessions
            .token()
            .map(|t| format!("Bearer {}", t))
            .ok_or(QuantdeskError::Unauthorized)
    }

    /// Map a non-success response to a domain error. 401 additionally
    /// tears down the session.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, QuantdeskError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            warn!("backend returned 401; tearing down session");
            let _ = self.sessions.teardown();
            return Err(QuantdeskError::Unauthorized);
        }

        let reason = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(QuantdeskError::Api {
            status: status.as_u16(),
            reason,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, QuantdeskError> {
        let auth = self.bearer()?;
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .header("Authorization", auth)
            .query(query)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, QuantdeskError> {
        let auth = self.bearer()?;
        debug!(path, "POST");
        let response = self
            .http
            .post(self.url(path))
            .header("Authorization", auth)
            .json(body)
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }
}

#[async_trait]
impl PlatformPort for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<Session, QuantdeskError> {
        let response = self
            .http
            .post(self.url("/api/auth/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(QuantdeskError::Api {
                status: 401,
                reason: "invalid username or password".into(),
            });
        }
        if !status.is_success() {
            return Err(QuantdeskError::Api {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("login failed")
                    .to_string(),
            });
        }

        let token: TokenResponse = response.json().await?;

        // Fetch the user record with the fresh token; the session is not
        // installed yet, so the header is attached by hand.
        let me = self
            .http
            .get(self.url("/api/auth/me"))
            .header("Authorization", format!("Bearer {}", token.access_token))
            .send()
            .await?;
        let user: UserInfo = self.check(me).await?.json().await?;

        Ok(Session::new(token.access_token, user))
    }

    async fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, QuantdeskError> {
        self.get_json("/api/experiments", &[]).await
    }

    async fn get_experiment(&self, id: &str) -> Result<ExperimentDetail, QuantdeskError> {
        self.get_json(&format!("/api/experiments/{}", id), &[]).await
    }

    async fn submit_experiment(&self, spec: &ExperimentSpec) -> Result<String, QuantdeskError> {
        let response: SubmitResponse = self.post_json("/api/experiments", spec).await?;
        Ok(response.id)
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, QuantdeskError> {
        self.get_json("/api/models", &[]).await
    }

    async fn get_model_metrics(&self, id: &str) -> Result<ModelMetrics, QuantdeskError> {
        self.get_json(&format!("/api/models/{}/metrics", id), &[])
            .await
    }

    async fn list_configs(&self) -> Result<Vec<ConfigEntry>, QuantdeskError> {
        self.get_json("/api/configs", &[]).await
    }

    async fn monitoring_snapshot(&self) -> Result<MonitoringSnapshot, QuantdeskError> {
        self.get_json("/api/monitoring/status", &[]).await
    }
}

#[async_trait]
impl MarketDataPort for ApiClient {
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, QuantdeskError> {
        let rows: Vec<OhlcvRow> = self
            .get_json(
                "/api/data/ohlcv",
                &[
                    ("symbol", symbol.to_string()),
                    ("start", start_date.to_string()),
                    ("end", end_date.to_string()),
                ],
            )
            .await?;

        if rows.is_empty() {
            return Err(QuantdeskError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let bars = rows
            .into_iter()
            .map(|r| OhlcvBar {
                symbol: symbol.to_string(),
                date: r.date,
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
            })
            .collect();
        Ok(normalize(bars))
    }

    async fn list_symbols(&self) -> Result<Vec<String>, QuantdeskError> {
        self.get_json("/api/data/symbols", &[]).await
    }

    async fn fetch_factor_table(&self) -> Result<FactorTable, QuantdeskError> {
        self.get_json("/api/factors/table", &[]).await
    }

    async fn fetch_benchmark(&self, code: &str) -> Result<Vec<CurvePoint>, QuantdeskError> {
        self.get_json(&format!("/api/benchmarks/{}", code), &[])
            .await
    }
}
