use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::group_members;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = group_members)]
pub struct GroupMember {
    pub group_id: String,
    pub user_id: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = group_members)]
pub struct NewGroupMember<'a> {
    pub group_id: &'a str,
    pub user_id: &'a str,
    pub role: &'a str,
    pub joined_at: DateTime<Utc>,
}

pub mod member_role {
    pub const GROUP_ADMIN: &str = "GroupAdmin";
    pub const MEMBER: &str = "USER";
}
