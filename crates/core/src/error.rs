use crate::period::PeriodKind;
use crate::types::{Date, DbId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("No active {kind} period is configured")]
    NoActivePeriod { kind: PeriodKind },

    #[error("{date} is outside the active period ({start} to {end})")]
    OutOfPeriodRange { date: Date, start: Date, end: Date },

    #[error("No pins remaining for this period")]
    AllowanceExhausted,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
