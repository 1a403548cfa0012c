//! Model feature schema
//!
//! The trained readmission model consumes a fixed-order record of 25
//! numeric features. The field set and order here must exactly match the
//! schema the model was fit on; the artifact loader cross-checks this at
//! startup so a drifted schema fails fast instead of silently
//! mispredicting.

use serde::{Deserialize, Serialize};

/// Number of features the model consumes
pub const FEATURE_COUNT: usize = 25;

/// Feature names in model schema order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "race",
    "gender",
    "time_in_hospital",
    "num_lab_procedures",
    "num_procedures",
    "num_medications",
    "number_outpatient",
    "number_inpatient",
    "number_emergency",
    "admission_type_id",
    "discharge_disposition_id",
    "admission_source_id",
    "diag_1",
    "diag_2",
    "diag_3",
    "A1Cresult",
    "diabetesMed",
    "insulin",
    "change",
    "had_prior_visit",
    "total_visits",
    "procedure_per_day",
    "age_group_numeric",
    "gender_race_combo",
];

/// One fully populated model input row
///
/// Field order matches `FEATURE_NAMES`; `values()` is the only place that
/// flattens the record for scoring, so the ordering lives in exactly two
/// spots that the tests hold in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub age: f64,
    pub race: f64,
    pub gender: f64,
    pub time_in_hospital: f64,
    pub num_lab_procedures: f64,
    pub num_procedures: f64,
    pub num_medications: f64,
    pub number_outpatient: f64,
    pub number_inpatient: f64,
    pub number_emergency: f64,
    pub admission_type_id: f64,
    pub discharge_disposition_id: f64,
    pub admission_source_id: f64,
    pub diag_1: f64,
    pub diag_2: f64,
    pub diag_3: f64,
    #[serde(rename = "A1Cresult")]
    pub a1c_result: f64,
    #[serde(rename = "diabetesMed")]
    pub diabetes_med: f64,
    pub insulin: f64,
    pub change: f64,
    pub had_prior_visit: f64,
    pub total_visits: f64,
    pub procedure_per_day: f64,
    pub age_group_numeric: f64,
    pub gender_race_combo: f64,
}

impl FeatureRecord {
    /// Flatten to model schema order
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age,
            self.race,
            self.gender,
            self.time_in_hospital,
            self.num_lab_procedures,
            self.num_procedures,
            self.num_medications,
            self.number_outpatient,
            self.number_inpatient,
            self.number_emergency,
            self.admission_type_id,
            self.discharge_disposition_id,
            self.admission_source_id,
            self.diag_1,
            self.diag_2,
            self.diag_3,
            self.a1c_result,
            self.diabetes_med,
            self.insulin,
            self.change,
            self.had_prior_visit,
            self.total_visits,
            self.procedure_per_day,
            self.age_group_numeric,
            self.gender_race_combo,
        ]
    }

    /// Rebuild a record from values in model schema order
    ///
    /// Used by the bulk path, where rows arrive already encoded.
    pub fn from_values(v: [f64; FEATURE_COUNT]) -> Self {
        Self {
            age: v[0],
            race: v[1],
            gender: v[2],
            time_in_hospital: v[3],
            num_lab_procedures: v[4],
            num_procedures: v[5],
            num_medications: v[6],
            number_outpatient: v[7],
            number_inpatient: v[8],
            number_emergency: v[9],
            admission_type_id: v[10],
            discharge_disposition_id: v[11],
            admission_source_id: v[12],
            diag_1: v[13],
            diag_2: v[14],
            diag_3: v[15],
            a1c_result: v[16],
            diabetes_med: v[17],
            insulin: v[18],
            change: v[19],
            had_prior_visit: v[20],
            total_visits: v[21],
            procedure_per_day: v[22],
            age_group_numeric: v[23],
            gender_race_combo: v[24],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_count() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        let record = FeatureRecord::from_values([0.0; FEATURE_COUNT]);
        assert_eq!(record.values().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_values_round_trip() {
        let mut v = [0.0; FEATURE_COUNT];
        for (i, slot) in v.iter_mut().enumerate() {
            *slot = i as f64 + 0.5;
        }
        let record = FeatureRecord::from_values(v);
        assert_eq!(record.values(), v);
    }

    #[test]
    fn test_serde_names_match_schema() {
        // The JSON field names of the record must be the schema names,
        // including the two non-snake-case model columns.
        let record = FeatureRecord::from_values([1.0; FEATURE_COUNT]);
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), FEATURE_COUNT);
        for name in FEATURE_NAMES {
            assert!(object.contains_key(name), "missing field {name}");
        }
    }
}
