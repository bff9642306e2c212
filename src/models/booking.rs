use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::{booked_poralar, finished_pora_counts};

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = booked_poralar)]
pub struct Booking {
    pub id: String,
    pub pora_id: String,
    pub group_id: String,
    pub user_id: String,
    pub is_booked: bool,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = booked_poralar)]
pub struct NewBooking<'a> {
    pub id: &'a str,
    pub pora_id: &'a str,
    pub group_id: &'a str,
    pub user_id: &'a str,
    pub is_booked: bool,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-group count of completed portions within the current cycle.
/// Resets to 0 every time the group's juz goal is reached.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = finished_pora_counts)]
pub struct FinishedPoraCount {
    pub id: String,
    pub group_id: String,
    pub juz_count: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = finished_pora_counts)]
pub struct NewFinishedPoraCount<'a> {
    pub id: &'a str,
    pub group_id: &'a str,
    pub juz_count: i32,
    pub updated_at: DateTime<Utc>,
}
