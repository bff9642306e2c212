//! PostgreSQL implementation of [`Store`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel_async::AsyncConnection;
use scoped_futures::ScopedFutureExt;

use crate::db::pool::DbPool;
use crate::db::schema::{
    booked_poralar, finished_pora_counts, group_members, group_zikr_activities, groups,
    notifications, poralar, users, zikr_counts, zikrs,
};
use crate::error::StoreError;
use crate::id::{self, prefix};
use crate::models::booking::{Booking, NewBooking, NewFinishedPoraCount};
use crate::models::group::Group;
use crate::models::group_member::{member_role, GroupMember, NewGroupMember};
use crate::models::notification::{invite_status, NewNotification, Notification};
use crate::models::pora::Pora;
use crate::models::user::User;
use crate::models::zikr::{NewGroupZikrActivity, NewZikrCount, Zikr};

use super::{CycleProgress, NotificationView, Store, ZikrTally};

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let user: Option<User> = diesel_async::RunQueryDsl::get_result(
            users::table.find(user_id).select(User::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(user)
    }

    async fn find_group(&self, group_id: &str) -> Result<Option<Group>, StoreError> {
        let mut conn = self.pool.get().await?;
        let group: Option<Group> = diesel_async::RunQueryDsl::get_result(
            groups::table.find(group_id).select(Group::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(group)
    }

    async fn find_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMember>, StoreError> {
        let mut conn = self.pool.get().await?;
        let member: Option<GroupMember> = diesel_async::RunQueryDsl::get_result(
            group_members::table
                .find((group_id, user_id))
                .select(GroupMember::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(member)
    }

    async fn find_pora(&self, pora_id: &str) -> Result<Option<Pora>, StoreError> {
        let mut conn = self.pool.get().await?;
        let pora: Option<Pora> = diesel_async::RunQueryDsl::get_result(
            poralar::table.find(pora_id).select(Pora::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(pora)
    }

    async fn find_booking(&self, booking_id: &str) -> Result<Option<Booking>, StoreError> {
        let mut conn = self.pool.get().await?;
        let booking: Option<Booking> = diesel_async::RunQueryDsl::get_result(
            booked_poralar::table
                .find(booking_id)
                .select(Booking::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(booking)
    }

    async fn find_active_booking(
        &self,
        group_id: &str,
        pora_id: &str,
    ) -> Result<Option<Booking>, StoreError> {
        let mut conn = self.pool.get().await?;
        let booking: Option<Booking> = diesel_async::RunQueryDsl::get_result(
            booked_poralar::table
                .filter(booked_poralar::group_id.eq(group_id))
                .filter(booked_poralar::pora_id.eq(pora_id))
                .filter(booked_poralar::is_booked.eq(true))
                .filter(booked_poralar::is_done.eq(false))
                .select(Booking::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(booking)
    }

    async fn create_booking(
        &self,
        group_id: &str,
        pora_id: &str,
        user_id: &str,
    ) -> Result<Booking, StoreError> {
        let booking_id = id::prefixed_ulid(prefix::BOOKING);
        let mut conn = self.pool.get().await?;
        let booking: Booking = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(booked_poralar::table)
                .values(NewBooking {
                    id: &booking_id,
                    pora_id,
                    group_id,
                    user_id,
                    is_booked: true,
                    is_done: false,
                    created_at: Utc::now(),
                })
                .returning(Booking::as_returning()),
            &mut conn,
        )
        .await?;
        Ok(booking)
    }

    async fn complete_booking(
        &self,
        booking_id: &str,
        group_id: &str,
        juz_goal: i32,
    ) -> Result<Option<CycleProgress>, StoreError> {
        let mut conn = self.pool.get().await?;

        let progress = conn
            .transaction::<_, StoreError, _>(|conn| {
                async move {
                    // Guarded flip: a completion that raced us leaves zero
                    // rows and the counter untouched.
                    let updated = diesel_async::RunQueryDsl::execute(
                        diesel::update(
                            booked_poralar::table
                                .find(booking_id)
                                .filter(booked_poralar::is_done.eq(false)),
                        )
                        .set(booked_poralar::is_done.eq(true)),
                        conn,
                    )
                    .await?;

                    if updated == 0 {
                        return Ok(None);
                    }

                    let now = Utc::now();
                    let advanced: Option<i32> = diesel_async::RunQueryDsl::get_result(
                        diesel::update(
                            finished_pora_counts::table
                                .filter(finished_pora_counts::group_id.eq(group_id)),
                        )
                        .set((
                            finished_pora_counts::juz_count
                                .eq(finished_pora_counts::juz_count + 1),
                            finished_pora_counts::updated_at.eq(now),
                        ))
                        .returning(finished_pora_counts::juz_count),
                        conn,
                    )
                    .await
                    .optional()?;

                    let total = match advanced {
                        Some(count) => count,
                        None => {
                            let counter_id = id::prefixed_ulid(prefix::FINISHED_COUNT);
                            diesel_async::RunQueryDsl::get_result(
                                diesel::insert_into(finished_pora_counts::table)
                                    .values(NewFinishedPoraCount {
                                        id: &counter_id,
                                        group_id,
                                        juz_count: 1,
                                        updated_at: now,
                                    })
                                    .returning(finished_pora_counts::juz_count),
                                conn,
                            )
                            .await?
                        }
                    };

                    if total < juz_goal {
                        return Ok(Some(CycleProgress {
                            total_finished: total,
                            completed_hatm_count: None,
                        }));
                    }

                    diesel_async::RunQueryDsl::execute(
                        diesel::update(
                            finished_pora_counts::table
                                .filter(finished_pora_counts::group_id.eq(group_id)),
                        )
                        .set((
                            finished_pora_counts::juz_count.eq(0),
                            finished_pora_counts::updated_at.eq(now),
                        )),
                        conn,
                    )
                    .await?;

                    let hatm_count: i32 = diesel_async::RunQueryDsl::get_result(
                        diesel::update(groups::table.find(group_id))
                            .set(groups::hatm_count.eq(groups::hatm_count + 1))
                            .returning(groups::hatm_count),
                        conn,
                    )
                    .await?;

                    Ok(Some(CycleProgress {
                        total_finished: total,
                        completed_hatm_count: Some(hatm_count),
                    }))
                }
                .scope_boxed()
            })
            .await?;

        Ok(progress)
    }

    async fn find_zikr(&self, zikr_id: &str) -> Result<Option<Zikr>, StoreError> {
        let mut conn = self.pool.get().await?;
        let zikr: Option<Zikr> = diesel_async::RunQueryDsl::get_result(
            zikrs::table.find(zikr_id).select(Zikr::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(zikr)
    }

    async fn record_zikr_count(
        &self,
        group_id: &str,
        zikr_id: &str,
        user_id: &str,
        count: i64,
        day: NaiveDate,
    ) -> Result<ZikrTally, StoreError> {
        let mut conn = self.pool.get().await?;

        let tally = conn
            .transaction::<_, StoreError, _>(|conn| {
                async move {
                    let now = Utc::now();

                    let existing: Option<String> = diesel_async::RunQueryDsl::get_result(
                        diesel::update(
                            zikr_counts::table
                                .filter(zikr_counts::group_id.eq(group_id))
                                .filter(zikr_counts::zikr_id.eq(zikr_id))
                                .filter(zikr_counts::user_id.eq(user_id))
                                .filter(zikr_counts::session_date.eq(day)),
                        )
                        .set(zikr_counts::count.eq(zikr_counts::count + count))
                        .returning(zikr_counts::id),
                        conn,
                    )
                    .await
                    .optional()?;

                    let entry_id = match existing {
                        Some(entry_id) => entry_id,
                        None => {
                            let new_id = id::prefixed_ulid(prefix::ZIKR_COUNT);
                            diesel_async::RunQueryDsl::get_result(
                                diesel::insert_into(zikr_counts::table)
                                    .values(NewZikrCount {
                                        id: &new_id,
                                        group_id,
                                        zikr_id,
                                        user_id,
                                        count,
                                        session_date: day,
                                        created_at: now,
                                    })
                                    .returning(zikr_counts::id),
                                conn,
                            )
                            .await?
                        }
                    };

                    let advanced: Option<i64> = diesel_async::RunQueryDsl::get_result(
                        diesel::update(
                            group_zikr_activities::table
                                .filter(group_zikr_activities::group_id.eq(group_id))
                                .filter(group_zikr_activities::zikr_id.eq(zikr_id)),
                        )
                        .set((
                            group_zikr_activities::zikr_count
                                .eq(group_zikr_activities::zikr_count + count),
                            group_zikr_activities::last_updated.eq(now),
                        ))
                        .returning(group_zikr_activities::zikr_count),
                        conn,
                    )
                    .await
                    .optional()?;

                    let total_count = match advanced {
                        Some(total) => total,
                        None => {
                            let new_id = id::prefixed_ulid(prefix::ZIKR_ACTIVITY);
                            diesel_async::RunQueryDsl::get_result(
                                diesel::insert_into(group_zikr_activities::table)
                                    .values(NewGroupZikrActivity {
                                        id: &new_id,
                                        group_id,
                                        zikr_id,
                                        zikr_count: count,
                                        last_updated: now,
                                    })
                                    .returning(group_zikr_activities::zikr_count),
                                conn,
                            )
                            .await?
                        }
                    };

                    Ok(ZikrTally {
                        entry_id,
                        total_count,
                    })
                }
                .scope_boxed()
            })
            .await?;

        Ok(tally)
    }

    async fn find_notification(
        &self,
        notification_id: &str,
    ) -> Result<Option<Notification>, StoreError> {
        let mut conn = self.pool.get().await?;
        let notification: Option<Notification> = diesel_async::RunQueryDsl::get_result(
            notifications::table
                .find(notification_id)
                .select(Notification::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(notification)
    }

    async fn find_pending_invitation(
        &self,
        receiver_id: &str,
        group_id: &str,
    ) -> Result<Option<Notification>, StoreError> {
        let mut conn = self.pool.get().await?;
        let notification: Option<Notification> = diesel_async::RunQueryDsl::get_result(
            notifications::table
                .filter(notifications::receiver_id.eq(receiver_id))
                .filter(notifications::group_id.eq(group_id))
                .filter(notifications::is_invite.eq(true))
                .filter(notifications::status.eq(invite_status::PENDING))
                .select(Notification::as_select()),
            &mut conn,
        )
        .await
        .optional()?;
        Ok(notification)
    }

    async fn create_invitation(
        &self,
        sender_id: &str,
        receiver_id: &str,
        group_id: &str,
    ) -> Result<Notification, StoreError> {
        let notification_id = id::prefixed_ulid(prefix::NOTIFICATION);
        let mut conn = self.pool.get().await?;
        let notification: Notification = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(notifications::table)
                .values(NewNotification {
                    id: &notification_id,
                    sender_id,
                    receiver_id,
                    group_id: Some(group_id),
                    is_invite: true,
                    is_read: false,
                    status: invite_status::PENDING,
                    time: Utc::now(),
                })
                .returning(Notification::as_returning()),
            &mut conn,
        )
        .await?;
        Ok(notification)
    }

    async fn accept_invitation(
        &self,
        notification_id: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let existing: Option<GroupMember> = diesel_async::RunQueryDsl::get_result(
                    group_members::table
                        .find((group_id, user_id))
                        .select(GroupMember::as_select()),
                    conn,
                )
                .await
                .optional()?;

                if existing.is_none() {
                    diesel_async::RunQueryDsl::execute(
                        diesel::insert_into(group_members::table).values(NewGroupMember {
                            group_id,
                            user_id,
                            role: member_role::MEMBER,
                            joined_at: Utc::now(),
                        }),
                        conn,
                    )
                    .await?;
                }

                diesel_async::RunQueryDsl::execute(
                    diesel::update(notifications::table.find(notification_id)).set((
                        notifications::status.eq(invite_status::ACCEPTED),
                        notifications::is_read.eq(true),
                    )),
                    conn,
                )
                .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn ignore_invitation(&self, notification_id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        diesel_async::RunQueryDsl::execute(
            diesel::update(notifications::table.find(notification_id)).set((
                notifications::status.eq(invite_status::IGNORED),
                notifications::is_read.eq(true),
            )),
            &mut conn,
        )
        .await?;
        Ok(())
    }

    async fn unread_notifications(
        &self,
        receiver_id: &str,
    ) -> Result<Vec<NotificationView>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<Notification> = diesel_async::RunQueryDsl::load(
            notifications::table
                .filter(notifications::receiver_id.eq(receiver_id))
                .filter(notifications::is_read.eq(false))
                .order(notifications::time.desc())
                .select(Notification::as_select()),
            &mut conn,
        )
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let sender_ids: Vec<&str> = rows.iter().map(|n| n.sender_id.as_str()).collect();
        let senders: Vec<User> = diesel_async::RunQueryDsl::load(
            users::table
                .filter(users::id.eq_any(sender_ids))
                .select(User::as_select()),
            &mut conn,
        )
        .await?;

        let group_ids: Vec<&str> = rows.iter().filter_map(|n| n.group_id.as_deref()).collect();
        let group_rows: Vec<Group> = diesel_async::RunQueryDsl::load(
            groups::table
                .filter(groups::id.eq_any(group_ids))
                .select(Group::as_select()),
            &mut conn,
        )
        .await?;

        let sender_names: HashMap<&str, String> = senders
            .iter()
            .map(|u| (u.id.as_str(), u.full_name()))
            .collect();
        let group_names: HashMap<&str, &str> = group_rows
            .iter()
            .map(|g| (g.id.as_str(), g.name.as_str()))
            .collect();

        let views = rows
            .into_iter()
            .map(|n| NotificationView {
                sender_name: sender_names
                    .get(n.sender_id.as_str())
                    .cloned()
                    .unwrap_or_default(),
                group_name: n
                    .group_id
                    .as_deref()
                    .and_then(|g| group_names.get(g))
                    .map(|name| name.to_string()),
                notification: n,
            })
            .collect();

        Ok(views)
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        diesel_async::RunQueryDsl::execute(
            diesel::update(notifications::table.find(notification_id))
                .set(notifications::is_read.eq(true)),
            &mut conn,
        )
        .await?;
        Ok(())
    }
}
