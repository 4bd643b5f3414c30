//! Profile entity model and DTOs.

use apresiasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    /// Job title as shown in the office directory.
    pub jabatan: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a profile.
#[derive(Debug, Deserialize)]
pub struct CreateProfile {
    pub email: String,
    pub full_name: String,
    pub jabatan: Option<String>,
}
