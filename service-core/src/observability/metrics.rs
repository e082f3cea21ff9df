use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::AppError;

/// Install the process-wide Prometheus recorder. Call once at startup.
pub fn install_recorder() -> Result<PrometheusHandle, AppError> {
    PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "Failed to install Prometheus recorder: {}",
            e
        ))
    })
}
