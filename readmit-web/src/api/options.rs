//! Form option lists
//!
//! The clinical form populates its dropdowns from the encoding tables in
//! effect, so a tables override changes the UI and the encoder together.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Selectable values per categorical field
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub tables_version: String,
    pub age_groups: Vec<String>,
    pub races: Vec<String>,
    pub genders: Vec<String>,
    pub discharge_dispositions: Vec<String>,
    pub a1c_results: Vec<String>,
    pub insulin_statuses: Vec<String>,
}

/// GET /api/options
pub async fn get_form_options(State(state): State<AppState>) -> Json<FormOptions> {
    let tables = state.engine.tables();
    Json(FormOptions {
        tables_version: tables.version.clone(),
        age_groups: tables.age_groups.keys().cloned().collect(),
        races: tables.races.keys().cloned().collect(),
        genders: tables.genders.keys().cloned().collect(),
        discharge_dispositions: tables.discharge_dispositions.keys().cloned().collect(),
        a1c_results: tables.a1c_results.keys().cloned().collect(),
        insulin_statuses: tables.insulin_statuses.keys().cloned().collect(),
    })
}
