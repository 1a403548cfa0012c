//! Clinical input encoding
//!
//! Maps the attributes collected by the discharge-time form into the
//! fixed 25-field record the model consumes. Categorical mappings are
//! data, not inline literals: an [`EncodingTables`] value carries one
//! lookup table per categorical field plus the placeholder fills for
//! fields the form does not collect, so a fill-policy change is a
//! configuration diff rather than a code edit.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::FeatureRecord;

/// Declared UI bounds for the numeric inputs
pub const TIME_IN_HOSPITAL_RANGE: (u32, u32) = (1, 30);
pub const NUM_LAB_PROCEDURES_RANGE: (u32, u32) = (0, 120);
pub const NUM_PROCEDURES_RANGE: (u32, u32) = (0, 10);
pub const NUM_MEDICATIONS_RANGE: (u32, u32) = (1, 60);
pub const NUMBER_INPATIENT_RANGE: (u32, u32) = (0, 20);
pub const PRIMARY_DIAGNOSIS_RANGE: (u32, u32) = (1, 999);

/// Raw form submission, one per assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInput {
    /// Age bucket, e.g. "[70-80)"
    pub age_group: String,
    pub race: String,
    pub gender: String,
    /// Length of stay in days
    pub time_in_hospital: u32,
    pub num_lab_procedures: u32,
    pub num_procedures: u32,
    pub num_medications: u32,
    /// Prior inpatient visit count
    pub number_inpatient: u32,
    pub discharge_disposition: String,
    /// Medication changed during this visit
    pub medication_change: bool,
    /// Most recent A1C result, e.g. "Norm", ">7", ">8"
    pub a1c_result: String,
    /// Current insulin use, e.g. "No", "Steady", "Up", "Down"
    pub insulin_status: String,
    /// Primary diagnosis code (ICD-9, numeric part)
    pub primary_diagnosis: u32,
}

impl ClinicalInput {
    /// Check every numeric field against its declared UI bound
    pub fn validate(&self) -> Result<()> {
        check_range(
            "time_in_hospital",
            self.time_in_hospital,
            TIME_IN_HOSPITAL_RANGE,
        )?;
        check_range(
            "num_lab_procedures",
            self.num_lab_procedures,
            NUM_LAB_PROCEDURES_RANGE,
        )?;
        check_range("num_procedures", self.num_procedures, NUM_PROCEDURES_RANGE)?;
        check_range(
            "num_medications",
            self.num_medications,
            NUM_MEDICATIONS_RANGE,
        )?;
        check_range(
            "number_inpatient",
            self.number_inpatient,
            NUMBER_INPATIENT_RANGE,
        )?;
        check_range(
            "primary_diagnosis",
            self.primary_diagnosis,
            PRIMARY_DIAGNOSIS_RANGE,
        )?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<()> {
    if value < min || value > max {
        return Err(Error::OutOfRange {
            field,
            value: value as i64,
            min: min as i64,
            max: max as i64,
        });
    }
    Ok(())
}

/// Fixed values for features the interactive form does not collect
///
/// These stand in for measurements the training data set carries but the
/// form never asks for. The bulk path accepts fully measured records and
/// bypasses them entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderFills {
    pub number_outpatient: f64,
    pub number_emergency: f64,
    pub admission_type_id: f64,
    pub admission_source_id: f64,
    pub diag_2: f64,
    pub diag_3: f64,
    pub diabetes_med: f64,
}

impl Default for PlaceholderFills {
    fn default() -> Self {
        Self {
            number_outpatient: 0.0,
            number_emergency: 0.0,
            admission_type_id: 1.0,
            admission_source_id: 1.0,
            diag_2: 250.0,
            diag_3: 250.0,
            diabetes_med: 1.0,
        }
    }
}

/// Versioned categorical lookup tables
///
/// The default tables are the canonical mapping the model was trained
/// against. A TOML file with the same shape can override them (see
/// [`EncodingTables::from_toml_path`]); lookups are total only over the
/// listed values, anything else is rejected with the field and value
/// named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingTables {
    pub version: String,
    pub age_groups: BTreeMap<String, f64>,
    pub races: BTreeMap<String, f64>,
    pub genders: BTreeMap<String, f64>,
    pub discharge_dispositions: BTreeMap<String, f64>,
    pub a1c_results: BTreeMap<String, f64>,
    pub insulin_statuses: BTreeMap<String, f64>,
    pub fills: PlaceholderFills,
}

impl Default for EncodingTables {
    fn default() -> Self {
        let age_groups = [
            ("[0-10)", 5.0),
            ("[10-20)", 15.0),
            ("[20-30)", 25.0),
            ("[30-40)", 35.0),
            ("[40-50)", 45.0),
            ("[50-60)", 55.0),
            ("[60-70)", 65.0),
            ("[70-80)", 75.0),
            ("[80-90)", 85.0),
            ("[90-100)", 95.0),
        ];
        let races = [
            ("Caucasian", 0.0),
            ("AfricanAmerican", 1.0),
            ("Hispanic", 2.0),
            ("Asian", 3.0),
            ("Other", 4.0),
        ];
        let genders = [("Female", 0.0), ("Male", 1.0)];
        let discharge_dispositions = [
            ("Home", 1.0),
            ("Rehab", 3.0),
            ("Skilled Nursing", 5.0),
            ("Other", 6.0),
        ];
        let a1c_results = [("Norm", 0.0), (">7", 1.0), (">8", 2.0)];
        let insulin_statuses = [("No", 0.0), ("Steady", 1.0), ("Up", 2.0), ("Down", 3.0)];

        Self {
            version: "2024.1-canonical".to_string(),
            age_groups: to_table(&age_groups),
            races: to_table(&races),
            genders: to_table(&genders),
            discharge_dispositions: to_table(&discharge_dispositions),
            a1c_results: to_table(&a1c_results),
            insulin_statuses: to_table(&insulin_statuses),
            fills: PlaceholderFills::default(),
        }
    }
}

fn to_table(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

impl EncodingTables {
    /// Load tables from a TOML file
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let tables: EncodingTables = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid tables file {}: {}", path.display(), e)))?;
        tables.check()?;
        Ok(tables)
    }

    /// Reject structurally unusable tables (an empty lookup table would
    /// make every submission fail on that field)
    pub fn check(&self) -> Result<()> {
        let tables: [(&str, &BTreeMap<String, f64>); 6] = [
            ("age_groups", &self.age_groups),
            ("races", &self.races),
            ("genders", &self.genders),
            ("discharge_dispositions", &self.discharge_dispositions),
            ("a1c_results", &self.a1c_results),
            ("insulin_statuses", &self.insulin_statuses),
        ];
        for (name, table) in tables {
            if table.is_empty() {
                return Err(Error::Config(format!("encoding table {name} is empty")));
            }
        }
        Ok(())
    }

    fn lookup(
        table: &BTreeMap<String, f64>,
        field: &'static str,
        value: &str,
    ) -> Result<f64> {
        table
            .get(value)
            .copied()
            .ok_or_else(|| Error::UnknownCategory {
                field,
                value: value.to_string(),
            })
    }
}

/// Encode one validated clinical input into a model feature record
///
/// Deterministic and side-effect free; the same input always yields a
/// bit-identical record.
pub fn encode(input: &ClinicalInput, tables: &EncodingTables) -> Result<FeatureRecord> {
    input.validate()?;

    let age = EncodingTables::lookup(&tables.age_groups, "age_group", &input.age_group)?;
    let race = EncodingTables::lookup(&tables.races, "race", &input.race)?;
    let gender = EncodingTables::lookup(&tables.genders, "gender", &input.gender)?;
    let discharge = EncodingTables::lookup(
        &tables.discharge_dispositions,
        "discharge_disposition",
        &input.discharge_disposition,
    )?;
    let a1c = EncodingTables::lookup(&tables.a1c_results, "a1c_result", &input.a1c_result)?;
    let insulin = EncodingTables::lookup(
        &tables.insulin_statuses,
        "insulin_status",
        &input.insulin_status,
    )?;
    let change = if input.medication_change { 1.0 } else { 0.0 };

    // Denominator floored at 1; the validated range starts there anyway
    let days = input.time_in_hospital.max(1) as f64;

    Ok(FeatureRecord {
        age,
        race,
        gender,
        time_in_hospital: input.time_in_hospital as f64,
        num_lab_procedures: input.num_lab_procedures as f64,
        num_procedures: input.num_procedures as f64,
        num_medications: input.num_medications as f64,
        number_outpatient: tables.fills.number_outpatient,
        number_inpatient: input.number_inpatient as f64,
        number_emergency: tables.fills.number_emergency,
        admission_type_id: tables.fills.admission_type_id,
        discharge_disposition_id: discharge,
        admission_source_id: tables.fills.admission_source_id,
        diag_1: input.primary_diagnosis as f64,
        diag_2: tables.fills.diag_2,
        diag_3: tables.fills.diag_3,
        a1c_result: a1c,
        diabetes_med: tables.fills.diabetes_med,
        insulin,
        change,
        had_prior_visit: if input.number_inpatient > 0 { 1.0 } else { 0.0 },
        total_visits: input.number_inpatient as f64,
        procedure_per_day: input.num_procedures as f64 / days,
        age_group_numeric: age,
        gender_race_combo: gender * 10.0 + race,
    })
}
