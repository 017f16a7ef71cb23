//! Experiment specifications: the YAML documents users submit to the
//! platform.
//!
//! Parsing and validation stay client-side so a bad spec is reported as
//! field-level messages in the form, before anything reaches the queue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::QuantdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentKind {
    Backtest,
    Training,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(rename = "type")]
    pub model_type: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostSection {
    #[serde(default)]
    pub commission_pct: f64,
    #[serde(default)]
    pub slippage_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ExperimentKind,
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub model: Option<ModelSection>,
    #[serde(default)]
    pub costs: CostSection,
    #[serde(default)]
    pub features: Vec<String>,
}

/// One validation problem, addressed to a specific field so forms can
/// render it inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn parse_experiment_yaml(text: &str) -> Result<ExperimentSpec, QuantdeskError> {
    serde_yaml::from_str(text).map_err(|e| QuantdeskError::ExperimentParse {
        reason: e.to_string(),
    })
}

/// All problems at once, not fail-fast: the form shows every message.
pub fn validate_experiment(spec: &ExperimentSpec) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if spec.name.trim().is_empty() {
        errors.push(FieldError::new("name", "name must not be empty"));
    }

    if spec.symbols.is_empty() {
        errors.push(FieldError::new("symbols", "at least one symbol is required"));
    }
    for symbol in &spec.symbols {
        if symbol.trim().is_empty() {
            errors.push(FieldError::new("symbols", "symbols must not be blank"));
            break;
        }
    }

    if spec.start_date >= spec.end_date {
        errors.push(FieldError::new(
            "start_date",
            "start_date must be before end_date",
        ));
    }

    if spec.costs.commission_pct < 0.0 {
        errors.push(FieldError::new(
            "costs.commission_pct",
            "commission_pct must be non-negative",
        ));
    }
    if spec.costs.slippage_pct < 0.0 {
        errors.push(FieldError::new(
            "costs.slippage_pct",
            "slippage_pct must be non-negative",
        ));
    }

    if spec.kind == ExperimentKind::Training {
        match &spec.model {
            None => errors.push(FieldError::new(
                "model",
                "training experiments require a model section",
            )),
            Some(model) if model.model_type.trim().is_empty() => {
                errors.push(FieldError::new("model.type", "model type must not be empty"));
            }
            Some(_) => {}
        }
        if spec.features.is_empty() {
            errors.push(FieldError::new(
                "features",
                "training experiments require at least one feature",
            ));
        }
    }

    errors
}
