//! Storage collaborator for the gateway. Backed by PostgreSQL in production
//! and an in-memory map in tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::models::booking::Booking;
use crate::models::group::Group;
use crate::models::group_member::GroupMember;
use crate::models::notification::Notification;
use crate::models::pora::Pora;
use crate::models::user::User;
use crate::models::zikr::Zikr;

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Outcome of one booking completion within a group's hatm cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleProgress {
    /// Finished count after this completion (the goal value on the closing
    /// one, since the reset happens in the same transaction).
    pub total_finished: i32,
    /// Set when this completion closed the cycle: the group's new hatm count.
    pub completed_hatm_count: Option<i32>,
}

/// Outcome of one zikr count update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZikrTally {
    /// Id of the caller's per-day tally row.
    pub entry_id: String,
    /// Group-wide total after this update.
    pub total_count: i64,
}

/// A notification enriched for the wire.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub notification: Notification,
    pub sender_name: String,
    pub group_name: Option<String>,
}

/// Everything the gateway asks of storage.
///
/// The three compound operations (`complete_booking`, `record_zikr_count`,
/// `accept_invitation`) are atomic: one transaction in the Postgres
/// implementation, one lock acquisition in the in-memory one.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn find_group(&self, group_id: &str) -> Result<Option<Group>, StoreError>;

    async fn find_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMember>, StoreError>;

    async fn find_pora(&self, pora_id: &str) -> Result<Option<Pora>, StoreError>;

    async fn find_booking(&self, booking_id: &str) -> Result<Option<Booking>, StoreError>;

    /// The booking currently holding (group, pora), if any: booked and not
    /// yet completed.
    async fn find_active_booking(
        &self,
        group_id: &str,
        pora_id: &str,
    ) -> Result<Option<Booking>, StoreError>;

    async fn create_booking(
        &self,
        group_id: &str,
        pora_id: &str,
        user_id: &str,
    ) -> Result<Booking, StoreError>;

    /// Mark a booking done and advance the group's cycle counter; when the
    /// counter reaches `juz_goal` it resets to 0 and the group's hatm count
    /// increments, all in one atomic unit.
    ///
    /// Returns `None` when the booking was already done (a concurrent
    /// completion won), in which case nothing is changed.
    async fn complete_booking(
        &self,
        booking_id: &str,
        group_id: &str,
        juz_goal: i32,
    ) -> Result<Option<CycleProgress>, StoreError>;

    async fn find_zikr(&self, zikr_id: &str) -> Result<Option<Zikr>, StoreError>;

    /// Accumulate `count` into the caller's tally for `day` (one row per
    /// user/zikr/group/day) and into the group-wide total, atomically.
    async fn record_zikr_count(
        &self,
        group_id: &str,
        zikr_id: &str,
        user_id: &str,
        count: i64,
        day: NaiveDate,
    ) -> Result<ZikrTally, StoreError>;

    async fn find_notification(
        &self,
        notification_id: &str,
    ) -> Result<Option<Notification>, StoreError>;

    async fn find_pending_invitation(
        &self,
        receiver_id: &str,
        group_id: &str,
    ) -> Result<Option<Notification>, StoreError>;

    async fn create_invitation(
        &self,
        sender_id: &str,
        receiver_id: &str,
        group_id: &str,
    ) -> Result<Notification, StoreError>;

    /// Mark the invitation accepted and read, and add the receiver to the
    /// group if not already a member, atomically. Existing membership is
    /// left untouched.
    async fn accept_invitation(
        &self,
        notification_id: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<(), StoreError>;

    /// Mark the invitation ignored and read.
    async fn ignore_invitation(&self, notification_id: &str) -> Result<(), StoreError>;

    /// Unread notifications for a receiver, newest first, with sender and
    /// group names resolved.
    async fn unread_notifications(
        &self,
        receiver_id: &str,
    ) -> Result<Vec<NotificationView>, StoreError>;

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), StoreError>;
}
