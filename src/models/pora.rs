use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::poralar;

/// One of the 30 bookable Quran portions (juz). Seeded by migration.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = poralar)]
pub struct Pora {
    pub id: String,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}
