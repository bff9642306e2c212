use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::groups;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = groups)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub admin_id: String,
    pub group_type: String,
    pub dedicated_to: Option<String>,
    pub is_public: bool,
    /// Completions needed to close one hatm cycle.
    pub juz_goal: i32,
    /// Cycles completed so far.
    pub hatm_count: i32,
    pub created_at: DateTime<Utc>,
}

pub mod group_type {
    pub const QURAN: &str = "QURAN";
    pub const ZIKR: &str = "ZIKR";
}
