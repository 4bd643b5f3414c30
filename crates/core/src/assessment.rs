//! Assessment submission rules: rating scale, payload shape, and who may
//! assess whom.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::CoreError;
use crate::roles::RoleDirectory;
use crate::types::DbId;

/// Lowest accepted indicator rating.
pub const MIN_RATING: i32 = 1;
/// Highest accepted indicator rating.
pub const MAX_RATING: i32 = 10;
/// Maximum indicators in one submission.
pub const MAX_RESPONSES: usize = 200;
/// Maximum length of a free-text comment, in characters.
pub const MAX_COMMENT_LEN: usize = 2000;

/// One rated indicator as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct ResponseInput {
    pub aspect: String,
    pub indicator: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

/// What a submission is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionTarget {
    /// A pre-generated assignment owned by the caller.
    Assignment(DbId),
    /// A direct supervisor assessment; the assignment is created on demand.
    Assessee(DbId),
}

impl SubmissionTarget {
    /// Exactly one of `assignment_id` / `assessee_id` must be given.
    pub fn from_ids(
        assignment_id: Option<DbId>,
        assessee_id: Option<DbId>,
    ) -> Result<Self, CoreError> {
        match (assignment_id, assessee_id) {
            (Some(id), None) => Ok(Self::Assignment(id)),
            (None, Some(id)) => Ok(Self::Assessee(id)),
            (Some(_), Some(_)) => Err(CoreError::Validation(
                "Provide either assignment_id or assessee_id, not both".into(),
            )),
            (None, None) => Err(CoreError::Validation(
                "Either assignment_id or assessee_id is required".into(),
            )),
        }
    }
}

/// Validate that a rating is on the `MIN_RATING..=MAX_RATING` scale.
pub fn validate_rating(rating: i32) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

/// Validate and normalize a submission's responses.
///
/// Aspect and indicator names are trimmed and must be non-empty, each
/// `(aspect, indicator)` pair may appear once, and blank comments become `None`.
pub fn validate_responses(responses: Vec<ResponseInput>) -> Result<Vec<ResponseInput>, CoreError> {
    if responses.is_empty() {
        return Err(CoreError::Validation(
            "At least one response is required".into(),
        ));
    }
    if responses.len() > MAX_RESPONSES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_RESPONSES} responses may be submitted at once, got {}",
            responses.len()
        )));
    }

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(responses.len());
    for r in responses {
        let aspect = r.aspect.trim().to_string();
        let indicator = r.indicator.trim().to_string();
        if aspect.is_empty() || indicator.is_empty() {
            return Err(CoreError::Validation(
                "Every response needs a non-empty aspect and indicator".into(),
            ));
        }
        validate_rating(r.rating)?;
        if !seen.insert((aspect.clone(), indicator.clone())) {
            return Err(CoreError::Validation(format!(
                "Indicator '{indicator}' of aspect '{aspect}' was rated more than once"
            )));
        }
        let comment = r
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(c) = &comment {
            if c.chars().count() > MAX_COMMENT_LEN {
                return Err(CoreError::Validation(format!(
                    "Comments are limited to {MAX_COMMENT_LEN} characters"
                )));
            }
        }
        normalized.push(ResponseInput {
            aspect,
            indicator,
            rating: r.rating,
            comment,
        });
    }
    Ok(normalized)
}

/// Check whether `assessor_id` may rate `assessee_id` without an assignment.
///
/// Only supervisors may, never themselves, and admins are never rated.
pub fn authorize_direct_assessment<D: RoleDirectory + ?Sized>(
    assessor_id: DbId,
    assessee_id: DbId,
    roles: &D,
) -> Result<(), CoreError> {
    if !roles.is_supervisor(assessor_id) {
        return Err(CoreError::Forbidden(
            "Only supervisors may assess without an assignment".into(),
        ));
    }
    if assessor_id == assessee_id {
        return Err(CoreError::Validation("Supervisors cannot assess themselves".into()));
    }
    if roles.is_admin(assessee_id) {
        return Err(CoreError::Forbidden("Admins are not assessed".into()));
    }
    Ok(())
}
