//! Role names and the role directory used to classify assessors.
//!
//! These must match the `CHECK` constraint in `20250801000002_create_user_roles.sql`.

use std::collections::{HashMap, HashSet};

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPERVISOR: &str = "supervisor";

/// A user's role. Users without a `user_roles` row are [`Role::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Supervisor,
    User,
}

impl Role {
    /// Parse a stored role name. Unknown names fall back to [`Role::User`].
    pub fn from_name(name: &str) -> Self {
        match name {
            ROLE_ADMIN => Self::Admin,
            ROLE_SUPERVISOR => Self::Supervisor,
            _ => Self::User,
        }
    }
}

/// Which weighting bucket an assessor's ratings fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessorClass {
    Supervisor,
    Peer,
    /// Ratings from this assessor are ignored (admins).
    Excluded,
}

/// Read-only role lookups, built once per request.
pub trait RoleDirectory {
    fn role_of(&self, user_id: DbId) -> Role;

    fn is_admin(&self, user_id: DbId) -> bool {
        self.role_of(user_id) == Role::Admin
    }

    fn is_supervisor(&self, user_id: DbId) -> bool {
        self.role_of(user_id) == Role::Supervisor
    }

    /// Every user id with an explicit role (stored or overridden).
    fn all_ids(&self) -> Vec<DbId>;

    fn classify_assessor(&self, assessor_id: DbId) -> AssessorClass {
        match self.role_of(assessor_id) {
            Role::Admin => AssessorClass::Excluded,
            Role::Supervisor => AssessorClass::Supervisor,
            Role::User => AssessorClass::Peer,
        }
    }
}

/// Role assignments forced by deployment configuration.
///
/// Overrides win over stored roles; admin wins over supervisor when an id
/// appears in both lists.
#[derive(Debug, Clone, Default)]
pub struct RoleOverrides {
    pub admin_ids: HashSet<DbId>,
    pub supervisor_ids: HashSet<DbId>,
}

impl RoleOverrides {
    /// Parse a comma-separated id list such as `"3, 7,12"`.
    ///
    /// Blank entries are skipped; anything else that is not an integer is an error.
    pub fn parse_id_list(raw: &str) -> Result<HashSet<DbId>, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<DbId>()
                    .map_err(|_| format!("Invalid profile id '{s}' in role override list"))
            })
            .collect()
    }
}

/// In-memory [`RoleDirectory`] merging stored roles with overrides.
#[derive(Debug, Clone, Default)]
pub struct RoleSnapshot {
    roles: HashMap<DbId, Role>,
}

impl RoleSnapshot {
    /// Build a snapshot from `(user_id, role_name)` rows plus overrides.
    pub fn new<I, S>(stored: I, overrides: &RoleOverrides) -> Self
    where
        I: IntoIterator<Item = (DbId, S)>,
        S: AsRef<str>,
    {
        let mut roles: HashMap<DbId, Role> = stored
            .into_iter()
            .map(|(id, name)| (id, Role::from_name(name.as_ref())))
            .collect();
        for id in &overrides.supervisor_ids {
            roles.insert(*id, Role::Supervisor);
        }
        for id in &overrides.admin_ids {
            roles.insert(*id, Role::Admin);
        }
        Self { roles }
    }
}

impl RoleDirectory for RoleSnapshot {
    fn role_of(&self, user_id: DbId) -> Role {
        self.roles.get(&user_id).copied().unwrap_or(Role::User)
    }

    fn all_ids(&self) -> Vec<DbId> {
        let mut ids: Vec<DbId> = self.roles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
