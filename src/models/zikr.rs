use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::{group_zikr_activities, zikr_counts, zikrs};

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = zikrs)]
pub struct Zikr {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub description: Option<String>,
    pub body: Option<String>,
    pub sound_url: Option<String>,
    /// Group-wide target count.
    pub goal: i64,
    pub created_at: DateTime<Utc>,
}

/// One user's tally for one zikr on one day. Repeated updates on the same
/// day accumulate into this row.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = zikr_counts)]
pub struct ZikrCount {
    pub id: String,
    pub group_id: String,
    pub zikr_id: String,
    pub user_id: String,
    pub count: i64,
    pub session_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = zikr_counts)]
pub struct NewZikrCount<'a> {
    pub id: &'a str,
    pub group_id: &'a str,
    pub zikr_id: &'a str,
    pub user_id: &'a str,
    pub count: i64,
    pub session_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Group-wide running total for one zikr.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = group_zikr_activities)]
pub struct GroupZikrActivity {
    pub id: String,
    pub group_id: String,
    pub zikr_id: String,
    pub zikr_count: i64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = group_zikr_activities)]
pub struct NewGroupZikrActivity<'a> {
    pub id: &'a str,
    pub group_id: &'a str,
    pub zikr_id: &'a str,
    pub zikr_count: i64,
    pub last_updated: DateTime<Utc>,
}
