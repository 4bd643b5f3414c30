//! Assessment assignment entity model.

use apresiasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `assessment_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub assessor_id: DbId,
    pub assessee_id: DbId,
    pub period_id: DbId,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating an assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub assessor_id: DbId,
    pub assessee_id: DbId,
    pub period_id: DbId,
}

/// An assessee as seen from an assessor's to-do list.
///
/// `assignment_id` is `None` for supervisors' implicit assessees that have
/// not been submitted yet.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssigneeStatus {
    pub assignment_id: Option<DbId>,
    pub assessee_id: DbId,
    pub full_name: String,
    pub jabatan: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
}
