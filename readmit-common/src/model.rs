//! Boosted-tree model artifact loading and scoring
//!
//! The trained model arrives as a JSON artifact produced by the training
//! pipeline's `save_model`. It is loaded once at process start and
//! treated as read-only for the process lifetime. The artifact's
//! embedded feature list is cross-checked against [`FEATURE_NAMES`] so a
//! record/model schema drift is a startup failure, not a silent
//! misprediction.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::schema::{FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};

/// Opaque scoring function boundary
///
/// The assessment pipeline only ever sees this trait; [`GbtModel`] is the
/// production implementation, tests substitute fixed-output stubs.
pub trait Predictor: Send + Sync {
    /// Score one record, returning a probability in [0,1]
    fn predict(&self, record: &FeatureRecord) -> Result<f64>;
}

/// One decision tree in evaluation form
#[derive(Debug, Clone)]
struct Tree {
    split_indices: Vec<usize>,
    split_conditions: Vec<f64>,
    left_children: Vec<i32>,
    right_children: Vec<i32>,
}

impl Tree {
    /// Walk from the root to a leaf and return its weight
    ///
    /// Routing rule: value < condition goes left, otherwise right. All
    /// records are fully populated, so missing-value routing is never
    /// consulted.
    fn score(&self, values: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = 0usize;
        while self.left_children[node] >= 0 {
            let feature = self.split_indices[node];
            node = if values[feature] < self.split_conditions[node] {
                self.left_children[node] as usize
            } else {
                self.right_children[node] as usize
            };
        }
        // Leaf weight is stored in the condition slot
        self.split_conditions[node]
    }
}

/// Loaded gradient-boosted-tree model
///
/// Scoring sums leaf weights across trees, adds the base margin, and
/// applies the logistic link.
#[derive(Debug)]
pub struct GbtModel {
    trees: Vec<Tree>,
    base_margin: f64,
}

// --- artifact document shape (only the parts scoring needs) ---

#[derive(Deserialize)]
struct ArtifactDoc {
    learner: LearnerDoc,
}

#[derive(Deserialize)]
struct LearnerDoc {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: BoosterDoc,
    learner_model_param: LearnerModelParamDoc,
    objective: ObjectiveDoc,
}

#[derive(Deserialize)]
struct BoosterDoc {
    #[serde(default)]
    name: String,
    model: BoosterModelDoc,
}

#[derive(Deserialize)]
struct BoosterModelDoc {
    trees: Vec<TreeDoc>,
}

#[derive(Deserialize)]
struct TreeDoc {
    split_indices: Vec<u32>,
    split_conditions: Vec<f64>,
    left_children: Vec<i32>,
    right_children: Vec<i32>,
}

// Numeric learner parameters are serialized as strings in the artifact
#[derive(Deserialize)]
struct LearnerModelParamDoc {
    #[serde(default = "default_base_score")]
    base_score: String,
    #[serde(default)]
    num_class: String,
    #[serde(default)]
    num_feature: String,
}

fn default_base_score() -> String {
    "0.5".to_string()
}

#[derive(Deserialize)]
struct ObjectiveDoc {
    name: String,
}

impl GbtModel {
    /// Load and validate an artifact file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Model(format!("cannot read artifact {}: {}", path.display(), e))
        })?;
        let model = Self::from_slice(&bytes)?;
        info!(
            "Loaded boosted-tree model from {} ({} trees)",
            path.display(),
            model.trees.len()
        );
        Ok(model)
    }

    /// Parse and validate an artifact from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let doc: ArtifactDoc = serde_json::from_slice(bytes)
            .map_err(|e| Error::Model(format!("malformed artifact JSON: {e}")))?;
        let learner = doc.learner;

        if !learner.gradient_booster.name.is_empty() && learner.gradient_booster.name != "gbtree" {
            return Err(Error::Model(format!(
                "unsupported booster: {}",
                learner.gradient_booster.name
            )));
        }

        match learner.objective.name.as_str() {
            "binary:logistic" | "reg:logistic" => {}
            other => {
                return Err(Error::Model(format!("unsupported objective: {other}")));
            }
        }

        if !learner.num_class_is_binary() {
            return Err(Error::Model(format!(
                "multiclass artifact (num_class {}) not supported",
                learner.learner_model_param.num_class
            )));
        }

        check_schema(&learner)?;

        let base_score: f64 = learner
            .learner_model_param
            .base_score
            .parse()
            .map_err(|_| {
                Error::Model(format!(
                    "invalid base_score: {:?}",
                    learner.learner_model_param.base_score
                ))
            })?;
        // Base score is stored in probability space; move it to margin
        // space through the logit before summing leaf weights.
        let clamped = base_score.clamp(1e-6, 1.0 - 1e-6);
        let base_margin = (clamped / (1.0 - clamped)).ln();

        let mut trees = Vec::with_capacity(learner.gradient_booster.model.trees.len());
        for (index, doc) in learner.gradient_booster.model.trees.into_iter().enumerate() {
            trees.push(build_tree(index, doc)?);
        }
        if trees.is_empty() {
            return Err(Error::Model("artifact contains no trees".to_string()));
        }

        Ok(Self { trees, base_margin })
    }
}

impl LearnerDoc {
    fn num_class_is_binary(&self) -> bool {
        matches!(self.learner_model_param.num_class.as_str(), "" | "0" | "1")
    }
}

/// Fail fast when the artifact was not fit on exactly our feature schema
fn check_schema(learner: &LearnerDoc) -> Result<()> {
    if !learner.learner_model_param.num_feature.is_empty() {
        let count: usize = learner.learner_model_param.num_feature.parse().map_err(|_| {
            Error::Model(format!(
                "invalid num_feature: {:?}",
                learner.learner_model_param.num_feature
            ))
        })?;
        if count != FEATURE_COUNT {
            return Err(Error::SchemaMismatch(format!(
                "model expects {count} features, schema has {FEATURE_COUNT}"
            )));
        }
    }

    if learner.feature_names.is_empty() {
        return Ok(());
    }
    if learner.feature_names.len() != FEATURE_COUNT {
        return Err(Error::SchemaMismatch(format!(
            "model names {} features, schema has {}",
            learner.feature_names.len(),
            FEATURE_COUNT
        )));
    }
    for (position, (found, expected)) in learner
        .feature_names
        .iter()
        .zip(FEATURE_NAMES.iter())
        .enumerate()
    {
        if found != expected {
            return Err(Error::SchemaMismatch(format!(
                "feature {position}: model has {found:?}, schema has {expected:?}"
            )));
        }
    }
    Ok(())
}

/// Convert one tree document to evaluation form, rejecting structural
/// damage (ragged arrays, dangling children, bad split indices)
fn build_tree(index: usize, doc: TreeDoc) -> Result<Tree> {
    let nodes = doc.left_children.len();
    if nodes == 0 {
        return Err(Error::Model(format!("tree {index} is empty")));
    }
    if doc.right_children.len() != nodes
        || doc.split_indices.len() != nodes
        || doc.split_conditions.len() != nodes
    {
        return Err(Error::Model(format!("tree {index} has ragged node arrays")));
    }

    for node in 0..nodes {
        let left = doc.left_children[node];
        let right = doc.right_children[node];
        if (left < 0) != (right < 0) {
            return Err(Error::Model(format!(
                "tree {index} node {node} has one-sided children"
            )));
        }
        if left >= 0 {
            // Children always sit after their parent, which also rules
            // out traversal cycles.
            if left as usize >= nodes || right as usize >= nodes || left as usize <= node || right as usize <= node {
                return Err(Error::Model(format!(
                    "tree {index} node {node} has out-of-order children"
                )));
            }
            if doc.split_indices[node] as usize >= FEATURE_COUNT {
                return Err(Error::Model(format!(
                    "tree {index} node {node} splits on feature {} (schema has {})",
                    doc.split_indices[node], FEATURE_COUNT
                )));
            }
            if !doc.split_conditions[node].is_finite() {
                return Err(Error::Model(format!(
                    "tree {index} node {node} has non-finite split condition"
                )));
            }
        }
    }

    Ok(Tree {
        split_indices: doc.split_indices.iter().map(|&i| i as usize).collect(),
        split_conditions: doc.split_conditions,
        left_children: doc.left_children,
        right_children: doc.right_children,
    })
}

impl Predictor for GbtModel {
    fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        let values = record.values();
        let mut margin = self.base_margin;
        for tree in &self.trees {
            margin += tree.score(&values);
        }
        let probability = 1.0 / (1.0 + (-margin).exp());
        Ok(probability.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{encode, ClinicalInput, EncodingTables};

    fn feature_names_json() -> String {
        let quoted: Vec<String> = FEATURE_NAMES.iter().map(|n| format!("{n:?}")).collect();
        quoted.join(",")
    }

    /// Two-tree artifact: tree A splits on number_inpatient at 0.5,
    /// tree B on time_in_hospital at 7.
    fn sample_artifact() -> String {
        format!(
            r#"{{
  "learner": {{
    "feature_names": [{names}],
    "gradient_booster": {{
      "name": "gbtree",
      "model": {{
        "trees": [
          {{
            "split_indices": [8, 0, 0],
            "split_conditions": [0.5, -0.4, 0.6],
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1]
          }},
          {{
            "split_indices": [3, 0, 0],
            "split_conditions": [7.0, -0.2, 0.3],
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1]
          }}
        ]
      }}
    }},
    "learner_model_param": {{
      "base_score": "5E-1",
      "num_class": "0",
      "num_feature": "25"
    }},
    "objective": {{ "name": "binary:logistic" }}
  }},
  "version": [1, 7, 6]
}}"#,
            names = feature_names_json()
        )
    }

    fn sample_input() -> ClinicalInput {
        ClinicalInput {
            age_group: "[70-80)".to_string(),
            race: "Caucasian".to_string(),
            gender: "Female".to_string(),
            time_in_hospital: 4,
            num_lab_procedures: 40,
            num_procedures: 1,
            num_medications: 10,
            number_inpatient: 0,
            discharge_disposition: "Home".to_string(),
            medication_change: false,
            a1c_result: "Norm".to_string(),
            insulin_status: "No".to_string(),
            primary_diagnosis: 250,
        }
    }

    fn sigmoid(margin: f64) -> f64 {
        1.0 / (1.0 + (-margin).exp())
    }

    #[test]
    fn test_scoring_matches_hand_computation() {
        let model = GbtModel::from_slice(sample_artifact().as_bytes()).unwrap();
        let tables = EncodingTables::default();

        // number_inpatient 0 < 0.5 and time_in_hospital 4 < 7: both left
        let record = encode(&sample_input(), &tables).unwrap();
        let p = model.predict(&record).unwrap();
        assert!((p - sigmoid(-0.4 + -0.2)).abs() < 1e-12);

        // prior visits push both splits right
        let mut input = sample_input();
        input.number_inpatient = 3;
        input.time_in_hospital = 10;
        let record = encode(&input, &tables).unwrap();
        let p = model.predict(&record).unwrap();
        assert!((p - sigmoid(0.6 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_predict_deterministic() {
        let model = GbtModel::from_slice(sample_artifact().as_bytes()).unwrap();
        let record = encode(&sample_input(), &EncodingTables::default()).unwrap();
        let first = model.predict(&record).unwrap();
        let second = model.predict(&record).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_reordered_feature_names_rejected() {
        let swapped = sample_artifact().replacen("\"age\",\"race\"", "\"race\",\"age\"", 1);
        let err = GbtModel::from_slice(swapped.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)), "{err:?}");
    }

    #[test]
    fn test_wrong_feature_count_rejected() {
        let shrunk = sample_artifact().replace("\"num_feature\": \"25\"", "\"num_feature\": \"24\"");
        let err = GbtModel::from_slice(shrunk.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)), "{err:?}");
    }

    #[test]
    fn test_unsupported_objective_rejected() {
        let multi = sample_artifact().replace("binary:logistic", "multi:softprob");
        let err = GbtModel::from_slice(multi.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Model(_)), "{err:?}");
    }

    #[test]
    fn test_ragged_tree_rejected() {
        let ragged = sample_artifact().replacen(
            "\"split_indices\": [8, 0, 0]",
            "\"split_indices\": [8, 0]",
            1,
        );
        let err = GbtModel::from_slice(ragged.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Model(_)), "{err:?}");
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = GbtModel::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, Error::Model(_)), "{err:?}");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("safe_model.json");
        std::fs::write(&path, sample_artifact()).unwrap();
        let model = GbtModel::load(&path).unwrap();
        assert_eq!(model.trees.len(), 2);
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = GbtModel::load(Path::new("model/does_not_exist.json")).unwrap_err();
        assert!(matches!(err, Error::Model(_)), "{err:?}");
    }
}
