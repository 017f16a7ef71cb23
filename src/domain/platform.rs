//! Records returned by the platform backend.
//!
//! Display-oriented: the desk renders these, it does not own them. Field
//! sets follow the backend's JSON; unknown fields are ignored on decode.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserInfo {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExperimentStatus::Queued => "queued",
            ExperimentStatus::Running => "running",
            ExperimentStatus::Completed => "completed",
            ExperimentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub status: ExperimentStatus,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    #[serde(default)]
    pub total_return: f64,
    #[serde(default)]
    pub annualized_return: f64,
    #[serde(default)]
    pub sharpe_ratio: f64,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default)]
    pub win_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentDetail {
    #[serde(flatten)]
    pub summary: ExperimentSummary,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub metrics: Option<RunMetrics>,
    #[serde(default)]
    pub equity_curve: Vec<CurvePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub model_type: String,
    #[serde(default)]
    pub trained_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub ic_mean: f64,
    #[serde(default)]
    pub rank_ic_mean: f64,
    #[serde(default)]
    pub mse: f64,
    /// (feature name, importance), already sorted by the backend.
    #[serde(default)]
    pub feature_importance: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub yaml: String,
}

/// Row-aligned named factor columns; the factor analysis page feeds this
/// straight into the correlation matrix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorTable {
    pub factors: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
}

impl FactorTable {
    /// Transpose rows into (name, column) pairs for the stats layer.
    pub fn columns(&self) -> Vec<(String, Vec<f64>)> {
        self.factors
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let col = self
                    .rows
                    .iter()
                    .map(|row| row.get(i).copied().unwrap_or(f64::NAN))
                    .collect();
                (name.clone(), col)
            })
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.factors.iter().position(|f| f == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).copied().unwrap_or(f64::NAN))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSnapshot {
    #[serde(default)]
    pub api_ok: bool,
    #[serde(default)]
    pub queue_depth: i64,
    #[serde(default)]
    pub running_jobs: i64,
    #[serde(default)]
    pub workers: i64,
    #[serde(default)]
    pub last_heartbeat: String,
}
