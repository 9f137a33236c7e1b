//! Hybrid ML+formula prediction.
//!
//! The predictor blends an externally produced model probability with the
//! formula probability using confidence-adaptive weights, applies elite
//! calibration and the optional misc-signal uplift, reconciles the result
//! against the college's acceptance rate, and emits a final probability with
//! a confidence interval. The prediction path never surfaces an error:
//! anything unexpected degrades to a deterministic fallback estimate.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::calibration::{EliteCalibrationTable, ProfileStrength};
use crate::config::AppConfig;
use crate::domain::{ChanceBand, CollegeSnapshot, StudentProfile};
use crate::error::AdmitError;
use crate::formula::{FormulaMapper, LogisticFormula};
use crate::signals::{compute_uplift, extract_signals};

/// Final probability bounds for every prediction path.
pub const PROBABILITY_FLOOR: f64 = 0.02;
pub const PROBABILITY_CEILING: f64 = 0.98;

/// External model-inference collaborator.
///
/// Implementations own their feature engineering and artifact loading; this
/// core only consumes the resulting probability. Inference may be CPU-bound
/// and synchronous; callers on cooperative runtimes should offload it.
pub trait ModelInference: Send + Sync {
    fn name(&self) -> &str;

    /// Probability of admission in [0, 1].
    fn predict_proba(
        &self,
        student: &StudentProfile,
        college: &CollegeSnapshot,
    ) -> Result<f64, ModelError>;

    /// Per-feature importances, when the backing model exposes them.
    fn feature_importances(&self) -> Option<BTreeMap<String, f64>> {
        None
    }
}

/// Error raised by a model-inference collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model backend unavailable: {0}")]
    Unavailable(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Mixing ratio between the ML and formula probabilities. Always sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    #[serde(serialize_with = "round4")]
    pub ml: f64,
    #[serde(serialize_with = "round4")]
    pub formula: f64,
}

/// Interval around the final probability, wider when the model is less
/// decisive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    #[serde(serialize_with = "round4")]
    pub lower: f64,
    #[serde(serialize_with = "round4")]
    pub upper: f64,
}

/// Result of a hybrid prediction. Created once per request from immutable
/// inputs and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(serialize_with = "round4")]
    pub probability: f64,
    pub confidence_interval: ConfidenceInterval,
    #[serde(serialize_with = "round4")]
    pub ml_probability: f64,
    #[serde(serialize_with = "round4")]
    pub formula_probability: f64,
    #[serde(serialize_with = "round4")]
    pub ml_confidence: f64,
    pub blend_weights: BlendWeights,
    pub model_used: String,
    pub band: ChanceBand,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feature_importances: Option<BTreeMap<String, f64>>,
}

fn round4<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 10_000.0).round() / 10_000.0)
}

/// Per-request knobs for [`AdmissionPredictor::predict`].
#[derive(Debug, Clone)]
pub struct PredictOptions {
    /// Requested model by name; `None` selects the first registered model.
    pub model: Option<String>,
    /// When false, a resolved model's probability is used without blending.
    pub use_formula: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            model: None,
            use_formula: true,
        }
    }
}

/// Orchestrates the hybrid prediction pipeline.
///
/// Holds only read-only collaborators (formula, calibration table, model
/// registry), so concurrent use needs no locking.
pub struct AdmissionPredictor {
    formula: Arc<dyn FormulaMapper>,
    calibration: EliteCalibrationTable,
    models: Vec<Arc<dyn ModelInference>>,
}

impl AdmissionPredictor {
    pub fn new(calibration: EliteCalibrationTable) -> Self {
        Self {
            formula: Arc::new(LogisticFormula::default()),
            calibration,
            models: Vec::new(),
        }
    }

    /// Build a predictor from configuration, loading a CSV calibration
    /// table when one is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, AdmitError> {
        let calibration = match &config.calibration.table_path {
            Some(path) => EliteCalibrationTable::from_csv_path(path)?,
            None => EliteCalibrationTable::builtin(),
        };

        Ok(Self {
            formula: Arc::new(LogisticFormula::new(config.formula.slope)),
            calibration,
            models: Vec::new(),
        })
    }

    pub fn with_formula(mut self, formula: Arc<dyn FormulaMapper>) -> Self {
        self.formula = formula;
        self
    }

    pub fn register_model(&mut self, model: Arc<dyn ModelInference>) {
        self.models.push(model);
    }

    pub fn is_available(&self) -> bool {
        !self.models.is_empty()
    }

    /// Predict the admission probability for one student/college pair.
    ///
    /// Never fails: unexpected errors in the pipeline are logged and
    /// replaced with a conservative deterministic estimate.
    pub fn predict(
        &self,
        student: &StudentProfile,
        college: &CollegeSnapshot,
        options: &PredictOptions,
    ) -> PredictionResult {
        match self.try_predict(student, college, options) {
            Ok(result) => result,
            Err(error) => {
                warn!(%error, college = %college.name, "prediction degraded to deterministic fallback");
                fallback_result(student)
            }
        }
    }

    fn try_predict(
        &self,
        student: &StudentProfile,
        college: &CollegeSnapshot,
        options: &PredictOptions,
    ) -> Result<PredictionResult, ModelError> {
        let acceptance_rate = college.acceptance_rate_or_default();
        let policy = college.policy();

        let formula_report =
            self.formula
                .map(&student.factor_scores, acceptance_rate, policy);
        let formula_probability = formula_report.probability.clamp(0.01, PROBABILITY_CEILING);

        let Some(model) = self.resolve_model(options.model.as_deref()) else {
            return Ok(formula_only_result(formula_probability));
        };

        let ml_probability = model.predict_proba(student, college)?;

        // Decisiveness proxy: 0 at p=0.5, 1 at the extremes, then clamped.
        let ml_confidence = (1.0 - 4.0 * ml_probability * (1.0 - ml_probability)).clamp(0.3, 0.9);

        let (ml_weight, formula_weight) = if !options.use_formula {
            (1.0, 0.0)
        } else if ml_confidence > 0.7 {
            (0.60, 0.40)
        } else if ml_confidence > 0.5 {
            (0.50, 0.50)
        } else {
            (0.40, 0.60)
        };

        let mut probability = ml_weight * ml_probability + formula_weight * formula_probability;

        probability = self.calibration.apply(
            probability,
            &college.name,
            ProfileStrength::assess(student),
        );

        if !student.misc_activities.is_empty() {
            let signals = extract_signals(&student.misc_activities);
            let uplift = compute_uplift(&signals, acceptance_rate);
            probability = (probability + uplift).min(PROBABILITY_CEILING);
            debug!(uplift, "misc uplift applied");
        }

        probability = probability.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING);

        // Reconcile with the school's acceptance rate so predictions cannot
        // drift arbitrarily far from base rates.
        let rate = acceptance_rate.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING);
        let max_allowed = (rate + 0.35).min(PROBABILITY_CEILING);
        let min_allowed = (rate * 0.3).max(PROBABILITY_FLOOR);
        let reblended = 0.7 * probability + 0.3 * rate;
        probability = if reblended > max_allowed {
            max_allowed
        } else if reblended < min_allowed {
            min_allowed
        } else {
            reblended
        };

        let ci_width = 0.15 * (1.0 - ml_confidence);
        let confidence_interval = ConfidenceInterval {
            lower: (probability - ci_width).max(PROBABILITY_FLOOR),
            upper: (probability + ci_width).min(PROBABILITY_CEILING),
        };

        let explanation = if options.use_formula {
            format!(
                "Hybrid: {:.0}% ML ({}) + {:.0}% formula",
                ml_weight * 100.0,
                model.name(),
                formula_weight * 100.0
            )
        } else {
            format!("ML-only prediction using {} model", model.name())
        };

        Ok(PredictionResult {
            probability,
            confidence_interval,
            ml_probability,
            formula_probability,
            ml_confidence,
            blend_weights: BlendWeights {
                ml: ml_weight,
                formula: formula_weight,
            },
            model_used: model.name().to_string(),
            band: ChanceBand::from_probability(probability),
            explanation,
            feature_importances: model.feature_importances(),
        })
    }

    fn resolve_model(&self, requested: Option<&str>) -> Option<&Arc<dyn ModelInference>> {
        let Some(name) = requested else {
            return self.models.first();
        };

        if let Some(model) = self.models.iter().find(|model| model.name() == name) {
            return Some(model);
        }

        let fallback = self.models.first();
        if let Some(model) = fallback {
            warn!(
                requested = name,
                using = model.name(),
                "requested model unavailable; falling back to loaded model"
            );
        }
        fallback
    }
}

fn formula_only_result(formula_probability: f64) -> PredictionResult {
    let probability = formula_probability.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING);
    PredictionResult {
        probability,
        confidence_interval: ConfidenceInterval {
            lower: (probability - 0.10).max(PROBABILITY_FLOOR),
            upper: (probability + 0.10).min(PROBABILITY_CEILING),
        },
        ml_probability: formula_probability,
        formula_probability,
        ml_confidence: 0.0,
        blend_weights: BlendWeights {
            ml: 0.0,
            formula: 1.0,
        },
        model_used: "formula_only".to_string(),
        band: ChanceBand::from_probability(probability),
        explanation: "Formula-based prediction (ML not available)".to_string(),
        feature_importances: None,
    }
}

/// Conservative deterministic estimate from academic metrics alone.
///
/// Used when the pipeline fails unexpectedly: the mean of the normalized
/// GPA and test score, each defaulting to neutral when absent, capped well
/// below certainty.
fn fallback_result(student: &StudentProfile) -> PredictionResult {
    let gpa_score = student
        .gpa_unweighted
        .map(|gpa| (gpa / 4.0).min(1.0))
        .or_else(|| student.gpa_weighted.map(|gpa| (gpa / 5.0).min(1.0)))
        .unwrap_or(0.5);

    let test_score = student
        .sat_total
        .map(|sat| ((f64::from(sat) - 1200.0) / 400.0).clamp(0.0, 1.0))
        .or_else(|| {
            student
                .act_composite
                .map(|act| ((f64::from(act) - 20.0) / 16.0).clamp(0.0, 1.0))
        })
        .unwrap_or(0.5);

    let probability = ((gpa_score + test_score) / 2.0).clamp(PROBABILITY_FLOOR, 0.85);

    PredictionResult {
        probability,
        confidence_interval: ConfidenceInterval {
            lower: (probability - 0.10).max(PROBABILITY_FLOOR),
            upper: (probability + 0.10).min(PROBABILITY_CEILING),
        },
        ml_probability: probability,
        formula_probability: probability,
        ml_confidence: 0.0,
        blend_weights: BlendWeights {
            ml: 0.0,
            formula: 1.0,
        },
        model_used: "deterministic_fallback".to_string(),
        band: ChanceBand::from_probability(probability),
        explanation: "Degraded mode: deterministic estimate from GPA and test scores".to_string(),
        feature_importances: None,
    }
}
