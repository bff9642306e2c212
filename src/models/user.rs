use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::users;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub role: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name used in event payloads.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Application-level user roles.
pub mod user_role {
    pub const ADMIN: &str = "ADMIN";
    pub const USER: &str = "USER";
}
