//! HTML templates using Askama.
//!
//! Page templates render content only; full-page responses wrap them in
//! [`BasePage`]. htmx requests get the bare content, everything else the
//! wrapped page.

use askama::Template;

use crate::domain::experiment::FieldError;
use crate::domain::platform::{ConfigEntry, ExperimentSummary, ModelSummary};

#[derive(Template)]
#[template(path = "base.html")]
pub struct BasePage {
    pub title: String,
    pub user_label: String,
    pub content: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "monitoring.html")]
pub struct MonitoringPanelTemplate {
    pub api_label: String,
    pub queue_depth: i64,
    pub running_jobs: i64,
    pub workers: i64,
    pub last_heartbeat: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub monitoring_html: String,
    pub poll_seconds: i64,
    pub experiments: Vec<ExperimentSummary>,
}

#[derive(Template)]
#[template(path = "experiments.html")]
pub struct ExperimentsTemplate {
    pub experiments: Vec<ExperimentSummary>,
}

/// A preformatted label/value pair for metric tables.
pub struct MetricRow {
    pub label: String,
    pub value: String,
}

impl MetricRow {
    pub fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Template)]
#[template(path = "experiment_detail.html")]
pub struct ExperimentDetailTemplate {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub status: String,
    pub message: Option<String>,
    pub metrics: Vec<MetricRow>,
    pub curve_svg: String,
}

#[derive(Template)]
#[template(path = "backtest.html")]
pub struct BacktestFormTemplate {
    pub yaml: String,
    pub field_errors: Vec<FieldError>,
    pub parse_error: Option<String>,
    pub submitted_id: Option<String>,
}

/// One OHLCV table row, preformatted for display.
pub struct BarRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

#[derive(Template)]
#[template(path = "data.html")]
pub struct DataTemplate {
    pub symbols: Vec<String>,
    pub selected: String,
    pub start: String,
    pub end: String,
    pub price_svg: String,
    pub rsi_svg: String,
    pub macd_svg: String,
    pub rows: Vec<BarRow>,
}

#[derive(Template)]
#[template(path = "models.html")]
pub struct ModelsTemplate {
    pub models: Vec<ModelSummary>,
}

#[derive(Template)]
#[template(path = "model_detail.html")]
pub struct ModelDetailTemplate {
    pub id: String,
    pub metrics: Vec<MetricRow>,
    pub importance_svg: String,
}

#[derive(Template)]
#[template(path = "configs.html")]
pub struct ConfigsTemplate {
    pub configs: Vec<ConfigEntry>,
    pub yaml: String,
    pub field_errors: Vec<FieldError>,
    pub parse_error: Option<String>,
    pub validated: bool,
}

pub struct IcRow {
    pub factor: String,
    pub ic: String,
}

#[derive(Template)]
#[template(path = "factors.html")]
pub struct FactorsTemplate {
    pub factors: Vec<String>,
    pub selected: String,
    pub heatmap_svg: String,
    pub histogram_svg: String,
    pub boxplot_svg: String,
    pub ic_rows: Vec<IcRow>,
}

#[derive(Template)]
#[template(path = "risk.html")]
pub struct RiskTemplate {
    pub benchmark: String,
    pub benchmark_svg: String,
    pub returns_histogram_svg: String,
    pub returns_boxplot_svg: String,
    pub drawdown_svg: String,
    pub stats: Vec<MetricRow>,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub monitoring_html: String,
    pub poll_seconds: i64,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}

pub fn fmt_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn fmt_num(value: f64) -> String {
    format!("{:.4}", value)
}
