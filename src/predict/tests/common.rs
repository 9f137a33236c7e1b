use std::collections::BTreeMap;
use std::sync::Arc;

use crate::calibration::EliteCalibrationTable;
use crate::domain::{CollegeSnapshot, Factor, FactorScores, StudentProfile};
use crate::predict::{AdmissionPredictor, ModelError, ModelInference};

/// Stub collaborator returning a fixed probability or a fixed failure.
pub(super) struct StubModel {
    pub(super) name: String,
    pub(super) probability: Result<f64, String>,
    pub(super) importances: Option<BTreeMap<String, f64>>,
}

impl StubModel {
    pub(super) fn returning(name: &str, probability: f64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            probability: Ok(probability),
            importances: None,
        })
    }

    pub(super) fn failing(name: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            probability: Err(message.to_string()),
            importances: None,
        })
    }
}

impl ModelInference for StubModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(
        &self,
        _student: &StudentProfile,
        _college: &CollegeSnapshot,
    ) -> Result<f64, ModelError> {
        self.probability
            .clone()
            .map_err(ModelError::Inference)
    }

    fn feature_importances(&self) -> Option<BTreeMap<String, f64>> {
        self.importances.clone()
    }
}

pub(super) fn student() -> StudentProfile {
    StudentProfile {
        gpa_unweighted: Some(3.7),
        gpa_weighted: Some(4.1),
        sat_total: Some(1430),
        act_composite: None,
        factor_scores: Factor::ALL.into_iter().map(|f| (f, 7.0)).collect(),
        misc_activities: Vec::new(),
    }
}

pub(super) fn college(name: &str, acceptance_rate: f64) -> CollegeSnapshot {
    CollegeSnapshot {
        name: name.to_string(),
        acceptance_rate: Some(acceptance_rate),
        test_policy: "Required".to_string(),
        financial_aid_policy: "Need-blind".to_string(),
    }
}

pub(super) fn predictor_with(models: Vec<Arc<StubModel>>) -> AdmissionPredictor {
    let mut predictor = AdmissionPredictor::new(EliteCalibrationTable::builtin());
    for model in models {
        predictor.register_model(model);
    }
    predictor
}

pub(super) fn empty_scores_student() -> StudentProfile {
    StudentProfile {
        gpa_unweighted: None,
        gpa_weighted: None,
        sat_total: None,
        act_composite: None,
        factor_scores: FactorScores::new(),
        misc_activities: Vec::new(),
    }
}
