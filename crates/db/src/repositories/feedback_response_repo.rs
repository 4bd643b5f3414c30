//! Repository for the `feedback_responses` table.

use apresiasi_core::assessment::ResponseInput;
use apresiasi_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::assignment_repo::COLUMNS as ASSIGNMENT_COLUMNS;
use crate::models::assignment::Assignment;
use crate::models::feedback::{AssesseeRatedRow, FeedbackResponse, RatedResponseRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, assignment_id, aspect, indicator, rating, comment, created_at";

/// Provides submission and read operations for feedback responses.
pub struct FeedbackResponseRepo;

impl FeedbackResponseRepo {
    /// Replace every response of an assignment and mark it completed.
    ///
    /// Runs as one transaction: delete old responses, insert the new set,
    /// then set `is_completed` / `completed_at`. Returns the updated
    /// assignment, or `None` if it does not exist.
    pub async fn replace_for_assignment(
        pool: &PgPool,
        assignment_id: DbId,
        responses: &[ResponseInput],
        completed_at: Timestamp,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM feedback_responses WHERE assignment_id = $1")
            .bind(assignment_id)
            .execute(&mut *tx)
            .await?;

        for r in responses {
            sqlx::query(
                "INSERT INTO feedback_responses (assignment_id, aspect, indicator, rating, comment)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(assignment_id)
            .bind(&r.aspect)
            .bind(&r.indicator)
            .bind(r.rating)
            .bind(&r.comment)
            .execute(&mut *tx)
            .await?;
        }

        let update = format!(
            "UPDATE assessment_assignments SET is_completed = true, completed_at = $2
             WHERE id = $1
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let assignment = sqlx::query_as::<_, Assignment>(&update)
            .bind(assignment_id)
            .bind(completed_at)
            .fetch_optional(&mut *tx)
            .await?;

        if assignment.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }
        tx.commit().await?;
        Ok(assignment)
    }

    /// List the responses of one assignment in submission order.
    pub async fn list_for_assignment(
        pool: &PgPool,
        assignment_id: DbId,
    ) -> Result<Vec<FeedbackResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM feedback_responses WHERE assignment_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, FeedbackResponse>(&query)
            .bind(assignment_id)
            .fetch_all(pool)
            .await
    }

    /// Every rating given to an assessee, joined with its assessor.
    ///
    /// When `period_id` is `None`, ratings from all periods are returned.
    pub async fn list_rated_for_assessee(
        pool: &PgPool,
        assessee_id: DbId,
        period_id: Option<DbId>,
    ) -> Result<Vec<RatedResponseRow>, sqlx::Error> {
        sqlx::query_as::<_, RatedResponseRow>(
            "SELECT a.assessor_id, r.aspect, r.indicator, r.rating
             FROM feedback_responses r
             JOIN assessment_assignments a ON a.id = r.assignment_id
             WHERE a.assessee_id = $1 AND ($2::BIGINT IS NULL OR a.period_id = $2)
             ORDER BY r.id ASC",
        )
        .bind(assessee_id)
        .bind(period_id)
        .fetch_all(pool)
        .await
    }

    /// Every rating in a period (or all periods), tagged with its assessee.
    pub async fn list_rated_in_period(
        pool: &PgPool,
        period_id: Option<DbId>,
    ) -> Result<Vec<AssesseeRatedRow>, sqlx::Error> {
        sqlx::query_as::<_, AssesseeRatedRow>(
            "SELECT a.assessee_id, a.assessor_id, r.aspect, r.indicator, r.rating
             FROM feedback_responses r
             JOIN assessment_assignments a ON a.id = r.assignment_id
             WHERE $1::BIGINT IS NULL OR a.period_id = $1
             ORDER BY a.assessee_id ASC, r.id ASC",
        )
        .bind(period_id)
        .fetch_all(pool)
        .await
    }
}
