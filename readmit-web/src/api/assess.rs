//! Assessment API handlers
//!
//! `POST /api/assess` takes one clinical form submission;
//! `POST /api/assess/batch` takes a CSV body of already encoded feature
//! records. Every rejection is surfaced synchronously with a
//! descriptive message; nothing is swallowed or retried.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use readmit_common::batch::decode_csv;
use readmit_common::encoding::ClinicalInput;
use readmit_common::risk::RiskAssessment;
use readmit_common::Error;

use crate::AppState;

/// POST /api/assess
///
/// Score one form submission. Out-of-domain categorical values and
/// out-of-bound numerics are rejected with 422.
pub async fn assess(
    State(state): State<AppState>,
    Json(input): Json<ClinicalInput>,
) -> Result<Json<RiskAssessment>, ApiError> {
    let assessment = state.engine.assess(&input)?;
    Ok(Json(assessment))
}

/// One scored row of a bulk document
#[derive(Debug, Serialize)]
pub struct BatchRow {
    /// 1-indexed data row number (header not counted)
    pub row: usize,
    #[serde(flatten)]
    pub assessment: RiskAssessment,
}

/// Batch assessment response
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub count: usize,
    pub results: Vec<BatchRow>,
}

/// POST /api/assess/batch
///
/// Score a CSV document of feature records. The whole document is
/// validated before any row reaches inference; a malformed document is
/// rejected with 400 and no partial results.
pub async fn assess_batch(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<BatchResponse>, ApiError> {
    let records = decode_csv(&body)?;
    let assessments = state.engine.assess_batch(&records)?;
    let results: Vec<BatchRow> = assessments
        .into_iter()
        .enumerate()
        .map(|(index, assessment)| BatchRow {
            row: index + 1,
            assessment,
        })
        .collect();
    Ok(Json(BatchResponse {
        count: results.len(),
        results,
    }))
}

/// Assessment API errors
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            // Input domain violations: the submission is wrong
            Error::UnknownCategory { .. } | Error::OutOfRange { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            // Malformed bulk documents
            Error::Csv { .. } => StatusCode::BAD_REQUEST,
            // Everything else is on us
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("assessment failed: {}", self.0);
        }
        let body = Json(json!({
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
