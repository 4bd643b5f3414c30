//! Feedback response entity model and submission DTOs.

use apresiasi_core::assessment::ResponseInput;
use apresiasi_core::scoring::RatedResponse;
use apresiasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `feedback_responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackResponse {
    pub id: DbId,
    pub assignment_id: DbId,
    pub aspect: String,
    pub indicator: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

/// A response joined with the assessor of its assignment.
#[derive(Debug, Clone, FromRow)]
pub struct RatedResponseRow {
    pub assessor_id: DbId,
    pub aspect: String,
    pub indicator: String,
    pub rating: i32,
}

impl From<RatedResponseRow> for RatedResponse {
    fn from(row: RatedResponseRow) -> Self {
        RatedResponse {
            assessor_id: row.assessor_id,
            aspect: row.aspect,
            indicator: row.indicator,
            rating: row.rating,
        }
    }
}

/// A rated response tagged with the assessee it was given to.
#[derive(Debug, Clone, FromRow)]
pub struct AssesseeRatedRow {
    pub assessee_id: DbId,
    #[sqlx(flatten)]
    pub rated: RatedResponseRow,
}

/// Request body for `POST /assessments/submit`.
///
/// Exactly one of `assignment_id` (regular assignment) or `assessee_id`
/// (supervisor assessing directly) must be set.
#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    pub assignment_id: Option<DbId>,
    pub assessee_id: Option<DbId>,
    pub responses: Vec<ResponseInput>,
}
