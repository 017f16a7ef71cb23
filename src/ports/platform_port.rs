//! Platform access port trait: auth, experiments, models, configs and
//! queue monitoring.

use async_trait::async_trait;

use crate::domain::error::QuantdeskError;
use crate::domain::experiment::ExperimentSpec;
use crate::domain::platform::{
    ConfigEntry, ExperimentDetail, ExperimentSummary, ModelMetrics, ModelSummary,
    MonitoringSnapshot,
};
use crate::domain::session::Session;

#[async_trait]
pub trait PlatformPort {
    /// Exchange credentials for a bearer token and the user record behind
    /// it. Installing the returned session is the caller's decision.
    async fn login(&self, username: &str, password: &str) -> Result<Session, QuantdeskError>;

    async fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, QuantdeskError>;

    async fn get_experiment(&self, id: &str) -> Result<ExperimentDetail, QuantdeskError>;

    /// Submit a validated spec; returns the queued experiment id.
    async fn submit_experiment(&self, spec: &ExperimentSpec) -> Result<String, QuantdeskError>;

    async fn list_models(&self) -> Result<Vec<ModelSummary>, QuantdeskError>;

    async fn get_model_metrics(&self, id: &str) -> Result<ModelMetrics, QuantdeskError>;

    async fn list_configs(&self) -> Result<Vec<ConfigEntry>, QuantdeskError>;

    async fn monitoring_snapshot(&self) -> Result<MonitoringSnapshot, QuantdeskError>;
}
