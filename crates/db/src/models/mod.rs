//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts where the API creates rows

pub mod assignment;
pub mod feedback;
pub mod period;
pub mod pin;
pub mod profile;
pub mod role;
