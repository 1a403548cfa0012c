//! Assessment pipeline
//!
//! One [`AssessmentEngine`] is constructed at process start with the
//! loaded model, the encoding tables, and the risk policy, then shared
//! read-only by every request handler. Each submission runs a single
//! synchronous encode, predict, classify pass.

use tracing::debug;

use crate::encoding::{encode, ClinicalInput, EncodingTables};
use crate::error::Result;
use crate::model::Predictor;
use crate::risk::{RiskAssessment, RiskPolicy};
use crate::schema::FeatureRecord;

/// Process-wide scoring service object
pub struct AssessmentEngine {
    predictor: Box<dyn Predictor>,
    tables: EncodingTables,
    policy: RiskPolicy,
}

impl AssessmentEngine {
    /// Create an engine from already loaded parts
    pub fn new(
        predictor: Box<dyn Predictor>,
        tables: EncodingTables,
        policy: RiskPolicy,
    ) -> Result<Self> {
        tables.check()?;
        policy.check()?;
        Ok(Self {
            predictor,
            tables,
            policy,
        })
    }

    /// Encoding tables in effect (exposed for UI option lists)
    pub fn tables(&self) -> &EncodingTables {
        &self.tables
    }

    /// Interactive path: validate, encode, score, classify
    pub fn assess(&self, input: &ClinicalInput) -> Result<RiskAssessment> {
        let record = encode(input, &self.tables)?;
        self.assess_record(&record)
    }

    /// Bulk path: score an already encoded record
    pub fn assess_record(&self, record: &FeatureRecord) -> Result<RiskAssessment> {
        let probability = self.predictor.predict(record)?;
        let assessment = self.policy.classify(probability);
        debug!(
            probability,
            risk_index = assessment.risk_index,
            risk_tier = %assessment.risk_tier,
            "scored record"
        );
        Ok(assessment)
    }

    /// Score a decoded bulk document, one assessment per row
    pub fn assess_batch(&self, records: &[FeatureRecord]) -> Result<Vec<RiskAssessment>> {
        records.iter().map(|r| self.assess_record(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::risk::RiskTier;
    use crate::schema::FEATURE_COUNT;

    /// Fixed-output stand-in for the loaded model
    struct FixedPredictor(f64);

    impl Predictor for FixedPredictor {
        fn predict(&self, _record: &FeatureRecord) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn engine(probability: f64) -> AssessmentEngine {
        AssessmentEngine::new(
            Box::new(FixedPredictor(probability)),
            EncodingTables::default(),
            RiskPolicy::default(),
        )
        .unwrap()
    }

    fn sample_input() -> ClinicalInput {
        ClinicalInput {
            age_group: "[50-60)".to_string(),
            race: "Other".to_string(),
            gender: "Male".to_string(),
            time_in_hospital: 7,
            num_lab_procedures: 55,
            num_procedures: 2,
            num_medications: 16,
            number_inpatient: 1,
            discharge_disposition: "Rehab".to_string(),
            medication_change: true,
            a1c_result: ">8".to_string(),
            insulin_status: "Up".to_string(),
            primary_diagnosis: 428,
        }
    }

    #[test]
    fn test_interactive_pipeline() {
        let assessment = engine(0.65).assess(&sample_input()).unwrap();
        assert_eq!(assessment.risk_index, 65);
        assert_eq!(assessment.risk_tier, RiskTier::High);
    }

    #[test]
    fn test_invalid_input_stops_before_scoring() {
        let mut input = sample_input();
        input.insulin_status = "Sometimes".to_string();
        let err = engine(0.1).assess(&input).unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { .. }));
    }

    #[test]
    fn test_batch_preserves_row_order() {
        let engine = engine(0.42);
        let records: Vec<FeatureRecord> = (0..3)
            .map(|i| FeatureRecord::from_values([i as f64; FEATURE_COUNT]))
            .collect();
        let assessments = engine.assess_batch(&records).unwrap();
        assert_eq!(assessments.len(), 3);
        for assessment in assessments {
            assert_eq!(assessment.risk_tier, RiskTier::Medium);
        }
    }
}
