//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod allowance_repo;
pub mod assignment_repo;
pub mod feedback_response_repo;
pub mod period_repo;
pub mod pin_repo;
pub mod profile_repo;
pub mod user_role_repo;

pub use allowance_repo::AllowanceRepo;
pub use assignment_repo::AssignmentRepo;
pub use feedback_response_repo::FeedbackResponseRepo;
pub use period_repo::PeriodRepo;
pub use pin_repo::PinRepo;
pub use profile_repo::ProfileRepo;
pub use user_role_repo::UserRoleRepo;
