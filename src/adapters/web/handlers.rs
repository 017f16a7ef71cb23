//! HTTP request handlers for the web adapter.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::domain::chart::{
    curve_chart, histogram_chart, macd_chart, price_chart, rsi_chart, AxisFormat, ChartSpec,
};
use crate::domain::error::QuantdeskError;
use crate::domain::experiment::{parse_experiment_yaml, validate_experiment};
use crate::domain::indicator::{
    calculate_ema, calculate_macd_default, calculate_rsi, calculate_sma, DEFAULT_RSI_PERIOD,
};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::platform::{CurvePoint, MonitoringSnapshot, UserInfo};
use crate::domain::stats::{
    boxplot, correlation_matrix, forward_returns, histogram, information_coefficient,
};

use super::chart_svg::{render_boxplots, render_chart, render_heatmap};
use super::templates::{self, fmt_num, fmt_pct, MetricRow};
use super::{is_htmx_request, AppState, WebError};

const DEFAULT_WINDOW_DAYS: i64 = 180;
const DEFAULT_BENCHMARK: &str = "SPX";

fn require_user(state: &AppState) -> Result<UserInfo, WebError> {
    state.sessions.user().ok_or(WebError::LoginRedirect)
}

/// Wrap content in the base page, or return it bare for htmx requests.
fn respond(headers: &HeaderMap, title: &str, user: &UserInfo, content: String) -> Response {
    if is_htmx_request(headers) {
        return Html(content).into_response();
    }
    let page = templates::BasePage {
        title: title.to_string(),
        user_label: user.label().to_string(),
        content,
    };
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => WebError::internal(format!("template error: {}", e)).into_response(),
    }
}

fn full_page(title: &str, user_label: &str, content: String) -> Result<Response, WebError> {
    let page = templates::BasePage {
        title: title.to_string(),
        user_label: user_label.to_string(),
        content,
    };
    Ok(Html(render_content(&page)?).into_response())
}

fn render_content<T: Template>(template: &T) -> Result<String, WebError> {
    template
        .render()
        .map_err(|e| WebError::internal(format!("template error: {}", e)))
}

fn poll_seconds(state: &AppState) -> i64 {
    state.config.get_int("web", "poll_seconds", 30).max(1)
}

/// Monitoring failures other than 401 degrade to an "unreachable" panel
/// instead of failing the whole page; the dashboard must render even
/// when the backend is down.
async fn monitoring_panel(state: &AppState) -> Result<String, WebError> {
    let snapshot = match state.platform.monitoring_snapshot().await {
        Ok(s) => s,
        Err(QuantdeskError::Unauthorized) => return Err(WebError::LoginRedirect),
        Err(e) => {
            warn!("monitoring snapshot failed: {}", e);
            MonitoringSnapshot::default()
        }
    };

    let template = templates::MonitoringPanelTemplate {
        api_label: if snapshot.api_ok { "up" } else { "unreachable" }.to_string(),
        queue_depth: snapshot.queue_depth,
        running_jobs: snapshot.running_jobs,
        workers: snapshot.workers,
        last_heartbeat: if snapshot.last_heartbeat.is_empty() {
            "n/a".to_string()
        } else {
            snapshot.last_heartbeat
        },
    };
    render_content(&template)
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
}

pub async fn login_form(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    if state.sessions.is_active() {
        return Ok(Redirect::to("/").into_response());
    }
    let content = render_content(&templates::LoginTemplate { error: None })?;
    full_page("Sign in", "", content)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginFormData>,
) -> Result<Response, WebError> {
    match state.platform.login(&form.username, &form.password).await {
        Ok(session) => {
            state.sessions.install(session)?;
            Ok(Redirect::to("/").into_response())
        }
        Err(QuantdeskError::Api { status: 401, .. }) => {
            let content = render_content(&templates::LoginTemplate {
                error: Some("invalid username or password".to_string()),
            })?;
            full_page("Sign in", "", content)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    state.sessions.teardown()?;
    Ok(Redirect::to("/login").into_response())
}

// ── Dashboard & monitoring ──────────────────────────────────────────

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;

    let mut experiments = state.platform.list_experiments().await?;
    experiments.truncate(10);

    let template = templates::DashboardTemplate {
        monitoring_html: monitoring_panel(&state).await?,
        poll_seconds: poll_seconds(&state),
        experiments,
    };
    Ok(respond(&headers, "Dashboard", &user, render_content(&template)?))
}

pub async fn monitoring_fragment(
    State(state): State<Arc<AppState>>,
) -> Result<Response, WebError> {
    require_user(&state)?;
    Ok(Html(monitoring_panel(&state).await?).into_response())
}

// ── Experiments ─────────────────────────────────────────────────────

pub async fn experiments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let experiments = state.platform.list_experiments().await?;
    let template = templates::ExperimentsTemplate { experiments };
    Ok(respond(&headers, "Experiments", &user, render_content(&template)?))
}

pub async fn experiment_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let detail = state.platform.get_experiment(&id).await?;

    let metrics = detail
        .metrics
        .as_ref()
        .map(|m| {
            vec![
                MetricRow::new("Total return", fmt_pct(m.total_return)),
                MetricRow::new("Annualized return", fmt_pct(m.annualized_return)),
                MetricRow::new("Sharpe ratio", format!("{:.2}", m.sharpe_ratio)),
                MetricRow::new("Max drawdown", fmt_pct(m.max_drawdown)),
                MetricRow::new("Win rate", fmt_pct(m.win_rate)),
            ]
        })
        .unwrap_or_default();

    let curve_svg = render_chart(&curve_chart(
        "Equity",
        &[("equity", detail.equity_curve.as_slice())],
    ));

    let template = templates::ExperimentDetailTemplate {
        id: detail.summary.id,
        name: detail.summary.name.clone(),
        kind: detail.summary.kind,
        status: detail.summary.status.to_string(),
        message: detail.message,
        metrics,
        curve_svg,
    };
    let title = format!("Experiment {}", detail.summary.name);
    Ok(respond(&headers, &title, &user, render_content(&template)?))
}

// ── Backtest submission ─────────────────────────────────────────────

const SAMPLE_SPEC: &str = "\
name: my backtest
kind: backtest
symbols: [AAPL]
start_date: 2023-01-01
end_date: 2023-12-31
costs:
  commission_pct: 0.001
  slippage_pct: 0.0005
";

#[derive(Debug, Deserialize)]
pub struct SpecFormData {
    pub yaml: String,
}

pub async fn backtest_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let template = templates::BacktestFormTemplate {
        yaml: SAMPLE_SPEC.to_string(),
        field_errors: Vec::new(),
        parse_error: None,
        submitted_id: None,
    };
    Ok(respond(&headers, "Backtest", &user, render_content(&template)?))
}

pub async fn run_backtest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SpecFormData>,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;

    // Parse and validation problems re-render the form inline; only
    // transport-level failures become error pages.
    let spec = match parse_experiment_yaml(&form.yaml) {
        Ok(spec) => spec,
        Err(e) => {
            let template = templates::BacktestFormTemplate {
                yaml: form.yaml,
                field_errors: Vec::new(),
                parse_error: Some(e.to_string()),
                submitted_id: None,
            };
            return Ok(respond(&headers, "Backtest", &user, render_content(&template)?));
        }
    };

    let field_errors = validate_experiment(&spec);
    if !field_errors.is_empty() {
        let template = templates::BacktestFormTemplate {
            yaml: form.yaml,
            field_errors,
            parse_error: None,
            submitted_id: None,
        };
        return Ok(respond(&headers, "Backtest", &user, render_content(&template)?));
    }

    let id = state.platform.submit_experiment(&spec).await?;
    let template = templates::BacktestFormTemplate {
        yaml: form.yaml,
        field_errors: Vec::new(),
        parse_error: None,
        submitted_id: Some(id),
    };
    Ok(respond(&headers, "Backtest", &user, render_content(&template)?))
}

// ── Market data browser ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub symbol: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn parse_date_or(value: Option<&str>, fallback: NaiveDate) -> NaiveDate {
    value
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or(fallback)
}

pub async fn data_browser(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DataQuery>,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let symbols = state.market.list_symbols().await?;

    let today = chrono::Utc::now().date_naive();
    let end = parse_date_or(query.end.as_deref(), today);
    let start = parse_date_or(
        query.start.as_deref(),
        end - chrono::Duration::days(DEFAULT_WINDOW_DAYS),
    );

    let selected = query.symbol.unwrap_or_default();
    let template = if selected.is_empty() {
        templates::DataTemplate {
            symbols,
            selected,
            start: start.to_string(),
            end: end.to_string(),
            price_svg: String::new(),
            rsi_svg: String::new(),
            macd_svg: String::new(),
            rows: Vec::new(),
        }
    } else {
        let bars = match state.market.fetch_ohlcv(&selected, start, end).await {
            Ok(bars) => bars,
            Err(QuantdeskError::NoData { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let sma20 = calculate_sma(&bars, 20);
        let ema50 = calculate_ema(&bars, 50);
        let rsi14 = calculate_rsi(&bars, DEFAULT_RSI_PERIOD);
        let macd = calculate_macd_default(&bars);

        let price_svg = render_chart(&price_chart(&selected, &bars, &[sma20, ema50]));
        let rsi_svg = render_chart(&rsi_chart(&selected, &bars, &rsi14));
        let macd_svg = render_chart(&macd_chart(&selected, &bars, &macd));

        let rows = bars
            .iter()
            .rev()
            .take(20)
            .map(|b: &OhlcvBar| templates::BarRow {
                date: b.date.to_string(),
                open: format!("{:.2}", b.open),
                high: format!("{:.2}", b.high),
                low: format!("{:.2}", b.low),
                close: format!("{:.2}", b.close),
                volume: b.volume.to_string(),
            })
            .collect();

        templates::DataTemplate {
            symbols,
            selected,
            start: start.to_string(),
            end: end.to_string(),
            price_svg,
            rsi_svg,
            macd_svg,
            rows,
        }
    };

    Ok(respond(&headers, "Data", &user, render_content(&template)?))
}

// ── Models ──────────────────────────────────────────────────────────

pub async fn models(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let models = state.platform.list_models().await?;
    let template = templates::ModelsTemplate { models };
    Ok(respond(&headers, "Models", &user, render_content(&template)?))
}

pub async fn model_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let metrics = state.platform.get_model_metrics(&id).await?;

    let rows = vec![
        MetricRow::new("IC (mean)", fmt_num(metrics.ic_mean)),
        MetricRow::new("Rank IC (mean)", fmt_num(metrics.rank_ic_mean)),
        MetricRow::new("MSE", fmt_num(metrics.mse)),
    ];

    let labels: Vec<String> = metrics
        .feature_importance
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    let mut spec = ChartSpec::new("Feature importance", labels).with_axis(AxisFormat::Plain);
    spec.push_bars(
        "importance",
        metrics
            .feature_importance
            .iter()
            .map(|(_, v)| Some(*v))
            .collect(),
    );

    let template = templates::ModelDetailTemplate {
        id,
        metrics: rows,
        importance_svg: render_chart(&spec),
    };
    Ok(respond(&headers, "Model", &user, render_content(&template)?))
}

// ── Configs ─────────────────────────────────────────────────────────

pub async fn configs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let configs = state.platform.list_configs().await?;
    let template = templates::ConfigsTemplate {
        configs,
        yaml: String::new(),
        field_errors: Vec::new(),
        parse_error: None,
        validated: false,
    };
    Ok(respond(&headers, "Configs", &user, render_content(&template)?))
}

pub async fn validate_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SpecFormData>,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let configs = state.platform.list_configs().await?;

    let (field_errors, parse_error) = match parse_experiment_yaml(&form.yaml) {
        Ok(spec) => (validate_experiment(&spec), None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    let template = templates::ConfigsTemplate {
        configs,
        yaml: form.yaml,
        field_errors,
        parse_error,
        validated: true,
    };
    Ok(respond(&headers, "Configs", &user, render_content(&template)?))
}

// ── Factor analysis ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FactorQuery {
    pub factor: Option<String>,
}

pub async fn factors(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FactorQuery>,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let table = state.market.fetch_factor_table().await?;
    let columns = table.columns();

    let heatmap_svg = render_heatmap(&correlation_matrix(&columns));

    let selected = query
        .factor
        .filter(|f| table.factors.contains(f))
        .or_else(|| table.factors.first().cloned())
        .unwrap_or_default();

    let (histogram_svg, boxplot_svg) = match table.column(&selected) {
        Some(values) => {
            let hist = histogram(&values);
            let hist_svg = render_chart(&histogram_chart(&format!("{} distribution", selected), &hist));
            let box_svg = match boxplot(&values) {
                Some(summary) => render_boxplots(&[(selected.clone(), summary)]),
                None => render_boxplots(&[]),
            };
            (hist_svg, box_svg)
        }
        None => (render_chart(&ChartSpec::new("", vec![])), render_boxplots(&[])),
    };

    // IC against next-day benchmark returns, when a benchmark window of
    // matching length is available.
    let benchmark = state
        .config
        .get_string("risk", "benchmark")
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());
    let ic_rows = match state.market.fetch_benchmark(&benchmark).await {
        Ok(curve) if curve.len() >= 2 => {
            let closes: Vec<f64> = curve.iter().map(|p| p.value).collect();
            let fwd = forward_returns(&closes, 1);
            columns
                .iter()
                .map(|(name, values)| {
                    let n = values.len().min(fwd.len());
                    templates::IcRow {
                        factor: name.clone(),
                        ic: fmt_num(information_coefficient(&values[..n], &fwd[..n])),
                    }
                })
                .collect()
        }
        Ok(_) => Vec::new(),
        Err(QuantdeskError::Unauthorized) => return Err(WebError::LoginRedirect),
        Err(e) => {
            warn!("benchmark fetch failed, skipping IC: {}", e);
            Vec::new()
        }
    };

    let template = templates::FactorsTemplate {
        factors: table.factors.clone(),
        selected,
        heatmap_svg,
        histogram_svg,
        boxplot_svg,
        ic_rows,
    };
    Ok(respond(&headers, "Factors", &user, render_content(&template)?))
}

// ── Risk ────────────────────────────────────────────────────────────

/// Drawdown from running peak, as a non-positive fraction per point.
fn drawdown_series(points: &[CurvePoint]) -> Vec<Option<f64>> {
    let mut peak = f64::NEG_INFINITY;
    points
        .iter()
        .map(|p| {
            peak = peak.max(p.value);
            if peak > 0.0 {
                Some((p.value - peak) / peak)
            } else {
                None
            }
        })
        .collect()
}

pub async fn risk(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    let benchmark = state
        .config
        .get_string("risk", "benchmark")
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());
    let curve = state.market.fetch_benchmark(&benchmark).await?;

    let benchmark_svg = render_chart(&curve_chart(
        &format!("{} benchmark", benchmark),
        &[(benchmark.as_str(), curve.as_slice())],
    ));

    let closes: Vec<f64> = curve.iter().map(|p| p.value).collect();
    let returns: Vec<f64> = forward_returns(&closes, 1)
        .into_iter()
        .filter(|r| r.is_finite())
        .collect();

    let returns_histogram_svg =
        render_chart(&histogram_chart("Daily returns", &histogram(&returns)));
    let returns_boxplot_svg = match boxplot(&returns) {
        Some(summary) => render_boxplots(&[("daily returns".to_string(), summary)]),
        None => render_boxplots(&[]),
    };

    let mut dd_spec = ChartSpec::new(
        "Drawdown",
        curve.iter().map(|p| p.date.to_string()).collect(),
    )
    .with_axis(AxisFormat::Percent);
    dd_spec.push_line("drawdown", drawdown_series(&curve));
    let drawdown_svg = render_chart(&dd_spec);

    let stats = if returns.is_empty() {
        Vec::new()
    } else {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / (returns.len().max(2) - 1) as f64;
        let worst = returns.iter().copied().fold(f64::INFINITY, f64::min);
        let best = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let max_dd = drawdown_series(&curve)
            .into_iter()
            .flatten()
            .fold(0.0_f64, f64::min);
        vec![
            MetricRow::new("Mean daily return", fmt_pct(mean)),
            MetricRow::new("Daily volatility", fmt_pct(var.sqrt())),
            MetricRow::new("Best day", fmt_pct(best)),
            MetricRow::new("Worst day", fmt_pct(worst)),
            MetricRow::new("Max drawdown", fmt_pct(max_dd)),
        ]
    };

    let template = templates::RiskTemplate {
        benchmark,
        benchmark_svg,
        returns_histogram_svg,
        returns_boxplot_svg,
        drawdown_svg,
        stats,
    };
    Ok(respond(&headers, "Risk", &user, render_content(&template)?))
}

// ── Admin ───────────────────────────────────────────────────────────

pub async fn admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let user = require_user(&state)?;
    if !user.is_admin {
        return Err(WebError::forbidden("admin access required"));
    }

    let template = templates::AdminTemplate {
        monitoring_html: monitoring_panel(&state).await?,
        poll_seconds: poll_seconds(&state),
    };
    Ok(respond(&headers, "Admin", &user, render_content(&template)?))
}

pub async fn not_found() -> WebError {
    WebError::not_found("no such page")
}
