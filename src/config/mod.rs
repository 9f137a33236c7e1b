use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for embedding applications.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub calibration: CalibrationConfig,
    pub formula: FormulaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let table_path = env::var("ADMIT_CALIBRATION_PATH")
            .ok()
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty());

        let slope = match env::var("ADMIT_FORMULA_SLOPE") {
            Ok(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidSlope { value: raw.clone() })?;
                if !(parsed.is_finite() && parsed > 0.0) {
                    return Err(ConfigError::InvalidSlope { value: raw });
                }
                parsed
            }
            Err(_) => FormulaConfig::DEFAULT_SLOPE,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            calibration: CalibrationConfig { table_path },
            formula: FormulaConfig { slope },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where to source the elite calibration table. `None` selects the
/// built-in table.
#[derive(Debug, Clone, Default)]
pub struct CalibrationConfig {
    pub table_path: Option<PathBuf>,
}

/// Tunables for the formula probability curve.
#[derive(Debug, Clone)]
pub struct FormulaConfig {
    pub slope: f64,
}

impl FormulaConfig {
    pub const DEFAULT_SLOPE: f64 = 0.9;
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            slope: Self::DEFAULT_SLOPE,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSlope { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSlope { value } => {
                write!(
                    f,
                    "ADMIT_FORMULA_SLOPE must be a positive finite number, got '{}'",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
