#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use quantdesk::domain::error::QuantdeskError;
use quantdesk::domain::experiment::ExperimentSpec;
use quantdesk::domain::ohlcv::OhlcvBar;
use quantdesk::domain::platform::{
    ConfigEntry, CurvePoint, ExperimentDetail, ExperimentStatus, ExperimentSummary, FactorTable,
    ModelMetrics, ModelSummary, MonitoringSnapshot, UserInfo,
};
use quantdesk::domain::session::{Session, SessionManager};
use quantdesk::ports::config_port::ConfigPort;
use quantdesk::ports::market_data_port::MarketDataPort;
use quantdesk::ports::platform_port::PlatformPort;
use quantdesk::ports::session_port::SessionStorePort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date_str: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

pub fn generate_bars(symbol: &str, start_date: &str, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| OhlcvBar {
            symbol: symbol.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: start_price + i as f64,
            high: start_price + i as f64 + 1.0,
            low: start_price + i as f64 - 1.0,
            close: start_price + i as f64,
            volume: 1000,
        })
        .collect()
}

// ── Session plumbing ────────────────────────────────────────────────

#[derive(Default)]
pub struct MemorySessionStore {
    saved: Mutex<Option<Session>>,
}

impl SessionStorePort for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, QuantdeskError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<(), QuantdeskError> {
        *self.saved.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), QuantdeskError> {
        *self.saved.lock().unwrap() = None;
        Ok(())
    }
}

pub fn empty_sessions() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(Arc::new(MemorySessionStore::default())))
}

pub fn logged_in_sessions(is_admin: bool) -> Arc<SessionManager> {
    let sessions = empty_sessions();
    sessions
        .install(Session::new(
            "test-token".into(),
            UserInfo {
                username: "tester".into(),
                display_name: None,
                is_admin,
            },
        ))
        .unwrap();
    sessions
}

// ── Mock config ─────────────────────────────────────────────────────

pub struct MockConfigPort;

impl ConfigPort for MockConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        match (section, key) {
            ("api", "base_url") => Some("http://localhost:8000".to_string()),
            ("risk", "benchmark") => Some("SPX".to_string()),
            _ => None,
        }
    }

    fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
        default
    }

    fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
        default
    }

    fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
        default
    }
}

// ── Mock market data ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMarketData {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub factor_table: FactorTable,
    pub benchmark: Vec<CurvePoint>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_factor_table(mut self, table: FactorTable) -> Self {
        self.factor_table = table;
        self
    }

    pub fn with_benchmark(mut self, curve: Vec<CurvePoint>) -> Self {
        self.benchmark = curve;
        self
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, QuantdeskError> {
        match self.data.get(symbol) {
            Some(bars) => Ok(bars
                .iter()
                .filter(|b| b.date >= start_date && b.date <= end_date)
                .cloned()
                .collect()),
            None => Err(QuantdeskError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    async fn list_symbols(&self) -> Result<Vec<String>, QuantdeskError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    async fn fetch_factor_table(&self) -> Result<FactorTable, QuantdeskError> {
        Ok(self.factor_table.clone())
    }

    async fn fetch_benchmark(&self, _code: &str) -> Result<Vec<CurvePoint>, QuantdeskError> {
        Ok(self.benchmark.clone())
    }
}

// ── Mock platform ───────────────────────────────────────────────────

pub struct MockPlatform {
    pub experiments: Vec<ExperimentSummary>,
    pub details: HashMap<String, ExperimentDetail>,
    pub models: Vec<ModelSummary>,
    pub metrics: HashMap<String, ModelMetrics>,
    pub configs: Vec<ConfigEntry>,
    pub snapshot: MonitoringSnapshot,
    pub accept_login: bool,
    pub submitted: Mutex<Vec<ExperimentSpec>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            experiments: Vec::new(),
            details: HashMap::new(),
            models: Vec::new(),
            metrics: HashMap::new(),
            configs: Vec::new(),
            snapshot: MonitoringSnapshot {
                api_ok: true,
                queue_depth: 2,
                running_jobs: 1,
                workers: 4,
                last_heartbeat: "2024-06-01T12:00:00Z".into(),
            },
            accept_login: true,
            submitted: Mutex::new(Vec::new()),
        }
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_experiment(mut self, id: &str, name: &str, status: ExperimentStatus) -> Self {
        let summary = ExperimentSummary {
            id: id.to_string(),
            name: name.to_string(),
            kind: "backtest".to_string(),
            status,
            created_at: "2024-06-01".to_string(),
        };
        self.details.insert(
            id.to_string(),
            ExperimentDetail {
                summary: summary.clone(),
                message: None,
                metrics: None,
                equity_curve: Vec::new(),
            },
        );
        self.experiments.push(summary);
        self
    }

    pub fn with_model(mut self, id: &str, name: &str) -> Self {
        self.models.push(ModelSummary {
            id: id.to_string(),
            name: name.to_string(),
            model_type: "lightgbm".to_string(),
            trained_at: "2024-06-01".to_string(),
        });
        self.metrics.insert(id.to_string(), ModelMetrics::default());
        self
    }
}

#[async_trait]
impl PlatformPort for MockPlatform {
    async fn login(&self, username: &str, _password: &str) -> Result<Session, QuantdeskError> {
        if self.accept_login {
            Ok(Session::new(
                "fresh-token".into(),
                UserInfo {
                    username: username.to_string(),
                    display_name: None,
                    is_admin: false,
                },
            ))
        } else {
            Err(QuantdeskError::Api {
                status: 401,
                reason: "invalid username or password".into(),
            })
        }
    }

    async fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, QuantdeskError> {
        Ok(self.experiments.clone())
    }

    async fn get_experiment(&self, id: &str) -> Result<ExperimentDetail, QuantdeskError> {
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| QuantdeskError::Api {
                status: 404,
                reason: format!("no experiment {}", id),
            })
    }

    async fn submit_experiment(&self, spec: &ExperimentSpec) -> Result<String, QuantdeskError> {
        self.submitted.lock().unwrap().push(spec.clone());
        Ok("exp-new".to_string())
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, QuantdeskError> {
        Ok(self.models.clone())
    }

    async fn get_model_metrics(&self, id: &str) -> Result<ModelMetrics, QuantdeskError> {
        self.metrics
            .get(id)
            .cloned()
            .ok_or_else(|| QuantdeskError::Api {
                status: 404,
                reason: format!("no model {}", id),
            })
    }

    async fn list_configs(&self) -> Result<Vec<ConfigEntry>, QuantdeskError> {
        Ok(self.configs.clone())
    }

    async fn monitoring_snapshot(&self) -> Result<MonitoringSnapshot, QuantdeskError> {
        Ok(self.snapshot.clone())
    }
}
