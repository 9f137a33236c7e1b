use crate::calibration::CalibrationError;
use crate::config::ConfigError;
use crate::predict::ModelError;
use crate::telemetry::TelemetryError;

/// Aggregated error for embedding applications bootstrapping the pipeline.
///
/// Only startup-time operations surface errors; the prediction path itself
/// always returns a best-effort result.
#[derive(Debug, thiserror::Error)]
pub enum AdmitError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("calibration error: {0}")]
    Calibration(#[from] CalibrationError),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
