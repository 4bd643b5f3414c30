//! Repository for the `assessment_assignments` table.

use apresiasi_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::{AssigneeStatus, Assignment, CreateAssignment};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, assessor_id, assessee_id, period_id, is_completed, completed_at, created_at";

/// Provides CRUD operations for assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Insert a new assignment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssignment,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO assessment_assignments (assessor_id, assessee_id, period_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(input.assessor_id)
            .bind(input.assessee_id)
            .bind(input.period_id)
            .fetch_one(pool)
            .await
    }

    /// Find an assignment by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assessment_assignments WHERE id = $1");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return the assignment for this pair and period, creating it if needed.
    ///
    /// Safe under concurrent calls: the unique pair constraint turns a racing
    /// insert into a no-op and the row is re-read.
    pub async fn find_or_create(
        pool: &PgPool,
        input: &CreateAssignment,
    ) -> Result<Assignment, sqlx::Error> {
        sqlx::query(
            "INSERT INTO assessment_assignments (assessor_id, assessee_id, period_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_assessment_assignments_pair DO NOTHING",
        )
        .bind(input.assessor_id)
        .bind(input.assessee_id)
        .bind(input.period_id)
        .execute(pool)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM assessment_assignments
             WHERE assessor_id = $1 AND assessee_id = $2 AND period_id = $3"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(input.assessor_id)
            .bind(input.assessee_id)
            .bind(input.period_id)
            .fetch_one(pool)
            .await
    }

    /// All assignments targeting an assessee in a period.
    pub async fn list_for_assessee(
        pool: &PgPool,
        assessee_id: DbId,
        period_id: DbId,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assessment_assignments
             WHERE assessee_id = $1 AND period_id = $2
             ORDER BY assessor_id ASC"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(assessee_id)
            .bind(period_id)
            .fetch_all(pool)
            .await
    }

    /// An ordinary assessor's persisted assignments in a period, with names.
    pub async fn list_statuses_for_assessor(
        pool: &PgPool,
        assessor_id: DbId,
        period_id: DbId,
    ) -> Result<Vec<AssigneeStatus>, sqlx::Error> {
        sqlx::query_as::<_, AssigneeStatus>(
            "SELECT a.id AS assignment_id, a.assessee_id, p.full_name, p.jabatan,
                    a.is_completed, a.completed_at
             FROM assessment_assignments a
             JOIN profiles p ON p.id = a.assessee_id
             WHERE a.assessor_id = $1 AND a.period_id = $2
             ORDER BY p.full_name ASC",
        )
        .bind(assessor_id)
        .bind(period_id)
        .fetch_all(pool)
        .await
    }

    /// A supervisor's implicit to-do list: every profile except the
    /// supervisor and `excluded_ids`, joined with any assignment already made.
    pub async fn list_statuses_for_supervisor(
        pool: &PgPool,
        supervisor_id: DbId,
        period_id: DbId,
        excluded_ids: &[DbId],
    ) -> Result<Vec<AssigneeStatus>, sqlx::Error> {
        sqlx::query_as::<_, AssigneeStatus>(
            "SELECT a.id AS assignment_id, p.id AS assessee_id, p.full_name, p.jabatan,
                    COALESCE(a.is_completed, false) AS is_completed, a.completed_at
             FROM profiles p
             LEFT JOIN assessment_assignments a
                    ON a.assessee_id = p.id AND a.assessor_id = $1 AND a.period_id = $2
             WHERE p.id <> $1 AND NOT (p.id = ANY($3))
             ORDER BY p.full_name ASC",
        )
        .bind(supervisor_id)
        .bind(period_id)
        .bind(excluded_ids)
        .fetch_all(pool)
        .await
    }
}
