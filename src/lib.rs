//! Hybrid formula+ML admission-probability pipeline.
//!
//! The crate turns a student's factor scores and a college's policy snapshot
//! into a calibrated admission probability with a full audit trail:
//!
//! 1. [`scoring`] normalizes factor scores (neutral defaults, policy gates),
//!    aggregates them into a 0-1000 composite with cluster dampening, and
//!    applies the conduct penalty.
//! 2. [`audit`] produces the per-factor explainability breakdown.
//! 3. [`formula`] maps composite-style inputs onto a probability anchored at
//!    the college's acceptance rate.
//! 4. [`predict`] blends that formula probability with an external model's
//!    probability using confidence-adaptive weights, applies
//!    [`calibration`] for ultra-selective schools plus the optional
//!    [`signals`] uplift, and reconciles against the acceptance rate.
//!
//! Every stage is a pure function of its inputs plus two read-only tables
//! ([`weights`] and the calibration table) published at startup, so
//! concurrent use requires no locking. The prediction path never raises:
//! malformed inputs are clamped or defaulted, configuration gaps degrade to
//! the formula-only path, and unexpected failures fall back to a
//! conservative deterministic estimate.

pub mod audit;
pub mod calibration;
pub mod config;
pub mod domain;
pub mod error;
pub mod formula;
pub mod predict;
pub mod scoring;
pub mod signals;
pub mod telemetry;
pub mod weights;

pub use audit::{build_audit, render_audit, AuditReport, AuditRow, Insights};
pub use calibration::{
    CalibrationEntry, CalibrationError, EliteCalibrationTable, ProfileStrength,
    SelectivityCategory,
};
pub use config::AppConfig;
pub use domain::{
    ChanceBand, CollegePolicy, CollegeSnapshot, Factor, FactorScores, RawScore, StudentProfile,
};
pub use error::AdmitError;
pub use formula::{admission_report, FormulaMapper, FormulaReport, LogisticFormula};
pub use predict::{
    AdmissionPredictor, BlendWeights, ConfidenceInterval, ModelError, ModelInference,
    PredictOptions, PredictionResult,
};
pub use scoring::{apply_conduct_penalty, compute_composite, normalize, ScoringResult};
