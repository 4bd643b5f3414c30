pub mod assessments;
pub mod periods;
pub mod pins;
