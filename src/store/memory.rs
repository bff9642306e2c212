//! In-memory implementation of [`Store`].
//!
//! One mutex over all tables keeps the compound operations atomic without
//! transaction machinery. Integration tests seed it directly and run the
//! gateway against it without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::id::{self, prefix};
use crate::models::booking::{Booking, FinishedPoraCount};
use crate::models::group::{group_type, Group};
use crate::models::group_member::{member_role, GroupMember};
use crate::models::notification::{invite_status, Notification};
use crate::models::pora::Pora;
use crate::models::user::{user_role, User};
use crate::models::zikr::{GroupZikrActivity, Zikr, ZikrCount};

use super::{CycleProgress, NotificationView, Store, ZikrTally};

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    groups: HashMap<String, Group>,
    members: HashMap<(String, String), GroupMember>,
    poralar: HashMap<String, Pora>,
    bookings: HashMap<String, Booking>,
    finished_counts: HashMap<String, FinishedPoraCount>,
    zikrs: HashMap<String, Zikr>,
    zikr_counts: HashMap<String, ZikrCount>,
    activities: HashMap<(String, String), GroupZikrActivity>,
    notifications: HashMap<String, Notification>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    // -----------------------------------------------------------------
    // Seeding (rows normally owned by the CRUD application)
    // -----------------------------------------------------------------

    pub fn seed_user(&self, name: &str, surname: &str) -> User {
        let user = User {
            id: id::prefixed_ulid(prefix::USER),
            name: name.to_string(),
            surname: surname.to_string(),
            phone: None,
            role: user_role::USER.to_string(),
            image_url: None,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .users
            .insert(user.id.clone(), user.clone());
        user
    }

    /// Creates a group and its admin membership, like the CRUD side does.
    pub fn seed_group(&self, name: &str, admin_id: &str, juz_goal: i32) -> Group {
        let group = Group {
            id: id::prefixed_ulid(prefix::GROUP),
            name: name.to_string(),
            admin_id: admin_id.to_string(),
            group_type: group_type::QURAN.to_string(),
            dedicated_to: None,
            is_public: false,
            juz_goal,
            hatm_count: 0,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock();
        inner.groups.insert(group.id.clone(), group.clone());
        inner.members.insert(
            (group.id.clone(), admin_id.to_string()),
            GroupMember {
                group_id: group.id.clone(),
                user_id: admin_id.to_string(),
                role: member_role::GROUP_ADMIN.to_string(),
                joined_at: Utc::now(),
            },
        );
        group
    }

    pub fn seed_member(&self, group_id: &str, user_id: &str) {
        self.inner.lock().members.insert(
            (group_id.to_string(), user_id.to_string()),
            GroupMember {
                group_id: group_id.to_string(),
                user_id: user_id.to_string(),
                role: member_role::MEMBER.to_string(),
                joined_at: Utc::now(),
            },
        );
    }

    pub fn seed_pora(&self, name: &str, position: i32) -> Pora {
        let pora = Pora {
            id: id::prefixed_ulid(prefix::PORA),
            name: name.to_string(),
            position,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .poralar
            .insert(pora.id.clone(), pora.clone());
        pora
    }

    pub fn seed_zikr(&self, group_id: &str, name: &str, goal: i64) -> Zikr {
        let zikr = Zikr {
            id: id::prefixed_ulid(prefix::ZIKR),
            group_id: group_id.to_string(),
            name: name.to_string(),
            description: None,
            body: None,
            sound_url: None,
            goal,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .zikrs
            .insert(zikr.id.clone(), zikr.clone());
        zikr
    }

    pub fn seed_finished_count(&self, group_id: &str, juz_count: i32) {
        self.inner.lock().finished_counts.insert(
            group_id.to_string(),
            FinishedPoraCount {
                id: id::prefixed_ulid(prefix::FINISHED_COUNT),
                group_id: group_id.to_string(),
                juz_count,
                updated_at: Utc::now(),
            },
        );
    }

    // -----------------------------------------------------------------
    // Inspection (assertion helpers)
    // -----------------------------------------------------------------

    pub fn is_member(&self, group_id: &str, user_id: &str) -> bool {
        self.inner
            .lock()
            .members
            .contains_key(&(group_id.to_string(), user_id.to_string()))
    }

    pub fn member_role_of(&self, group_id: &str, user_id: &str) -> Option<String> {
        self.inner
            .lock()
            .members
            .get(&(group_id.to_string(), user_id.to_string()))
            .map(|m| m.role.clone())
    }

    pub fn booking(&self, booking_id: &str) -> Option<Booking> {
        self.inner.lock().bookings.get(booking_id).cloned()
    }

    pub fn bookings_for_group(&self, group_id: &str) -> Vec<Booking> {
        self.inner
            .lock()
            .bookings
            .values()
            .filter(|b| b.group_id == group_id)
            .cloned()
            .collect()
    }

    pub fn finished_count(&self, group_id: &str) -> i32 {
        self.inner
            .lock()
            .finished_counts
            .get(group_id)
            .map(|c| c.juz_count)
            .unwrap_or(0)
    }

    pub fn hatm_count(&self, group_id: &str) -> i32 {
        self.inner
            .lock()
            .groups
            .get(group_id)
            .map(|g| g.hatm_count)
            .unwrap_or(0)
    }

    pub fn notification(&self, notification_id: &str) -> Option<Notification> {
        self.inner.lock().notifications.get(notification_id).cloned()
    }

    pub fn notifications_for(&self, receiver_id: &str) -> Vec<Notification> {
        self.inner
            .lock()
            .notifications
            .values()
            .filter(|n| n.receiver_id == receiver_id)
            .cloned()
            .collect()
    }

    pub fn zikr_count_rows(&self, zikr_id: &str, user_id: &str) -> Vec<ZikrCount> {
        self.inner
            .lock()
            .zikr_counts
            .values()
            .filter(|c| c.zikr_id == zikr_id && c.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().users.get(user_id).cloned())
    }

    async fn find_group(&self, group_id: &str) -> Result<Option<Group>, StoreError> {
        Ok(self.inner.lock().groups.get(group_id).cloned())
    }

    async fn find_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMember>, StoreError> {
        Ok(self
            .inner
            .lock()
            .members
            .get(&(group_id.to_string(), user_id.to_string()))
            .cloned())
    }

    async fn find_pora(&self, pora_id: &str) -> Result<Option<Pora>, StoreError> {
        Ok(self.inner.lock().poralar.get(pora_id).cloned())
    }

    async fn find_booking(&self, booking_id: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self.inner.lock().bookings.get(booking_id).cloned())
    }

    async fn find_active_booking(
        &self,
        group_id: &str,
        pora_id: &str,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .inner
            .lock()
            .bookings
            .values()
            .find(|b| {
                b.group_id == group_id && b.pora_id == pora_id && b.is_booked && !b.is_done
            })
            .cloned())
    }

    async fn create_booking(
        &self,
        group_id: &str,
        pora_id: &str,
        user_id: &str,
    ) -> Result<Booking, StoreError> {
        let booking = Booking {
            id: id::prefixed_ulid(prefix::BOOKING),
            pora_id: pora_id.to_string(),
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            is_booked: true,
            is_done: false,
            created_at: Utc::now(),
        };
        self.inner
            .lock()
            .bookings
            .insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    async fn complete_booking(
        &self,
        booking_id: &str,
        group_id: &str,
        juz_goal: i32,
    ) -> Result<Option<CycleProgress>, StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let booking = match inner.bookings.get_mut(booking_id) {
            Some(b) if !b.is_done => b,
            _ => return Ok(None),
        };
        booking.is_done = true;

        let now = Utc::now();
        let counter = inner
            .finished_counts
            .entry(group_id.to_string())
            .or_insert_with(|| FinishedPoraCount {
                id: id::prefixed_ulid(prefix::FINISHED_COUNT),
                group_id: group_id.to_string(),
                juz_count: 0,
                updated_at: now,
            });
        counter.juz_count += 1;
        counter.updated_at = now;

        let total = counter.juz_count;
        let closed = total >= juz_goal;
        if closed {
            counter.juz_count = 0;
        }

        let completed_hatm_count = if closed {
            let group = inner
                .groups
                .get_mut(group_id)
                .ok_or_else(|| StoreError::Query("group not found".to_string()))?;
            group.hatm_count += 1;
            Some(group.hatm_count)
        } else {
            None
        };

        Ok(Some(CycleProgress {
            total_finished: total,
            completed_hatm_count,
        }))
    }

    async fn find_zikr(&self, zikr_id: &str) -> Result<Option<Zikr>, StoreError> {
        Ok(self.inner.lock().zikrs.get(zikr_id).cloned())
    }

    async fn record_zikr_count(
        &self,
        group_id: &str,
        zikr_id: &str,
        user_id: &str,
        count: i64,
        day: NaiveDate,
    ) -> Result<ZikrTally, StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = Utc::now();

        let existing = inner.zikr_counts.values_mut().find(|c| {
            c.group_id == group_id
                && c.zikr_id == zikr_id
                && c.user_id == user_id
                && c.session_date == day
        });

        let entry_id = match existing {
            Some(row) => {
                row.count += count;
                row.id.clone()
            }
            None => {
                let row = ZikrCount {
                    id: id::prefixed_ulid(prefix::ZIKR_COUNT),
                    group_id: group_id.to_string(),
                    zikr_id: zikr_id.to_string(),
                    user_id: user_id.to_string(),
                    count,
                    session_date: day,
                    created_at: now,
                };
                let entry_id = row.id.clone();
                inner.zikr_counts.insert(row.id.clone(), row);
                entry_id
            }
        };

        let activity = inner
            .activities
            .entry((group_id.to_string(), zikr_id.to_string()))
            .or_insert_with(|| GroupZikrActivity {
                id: id::prefixed_ulid(prefix::ZIKR_ACTIVITY),
                group_id: group_id.to_string(),
                zikr_id: zikr_id.to_string(),
                zikr_count: 0,
                last_updated: now,
            });
        activity.zikr_count += count;
        activity.last_updated = now;

        Ok(ZikrTally {
            entry_id,
            total_count: activity.zikr_count,
        })
    }

    async fn find_notification(
        &self,
        notification_id: &str,
    ) -> Result<Option<Notification>, StoreError> {
        Ok(self.inner.lock().notifications.get(notification_id).cloned())
    }

    async fn find_pending_invitation(
        &self,
        receiver_id: &str,
        group_id: &str,
    ) -> Result<Option<Notification>, StoreError> {
        Ok(self
            .inner
            .lock()
            .notifications
            .values()
            .find(|n| {
                n.receiver_id == receiver_id
                    && n.group_id.as_deref() == Some(group_id)
                    && n.is_invite
                    && n.status == invite_status::PENDING
            })
            .cloned())
    }

    async fn create_invitation(
        &self,
        sender_id: &str,
        receiver_id: &str,
        group_id: &str,
    ) -> Result<Notification, StoreError> {
        let notification = Notification {
            id: id::prefixed_ulid(prefix::NOTIFICATION),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            group_id: Some(group_id.to_string()),
            is_invite: true,
            is_read: false,
            status: invite_status::PENDING.to_string(),
            time: Utc::now(),
        };
        self.inner
            .lock()
            .notifications
            .insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    async fn accept_invitation(
        &self,
        notification_id: &str,
        user_id: &str,
        group_id: &str,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        inner
            .members
            .entry((group_id.to_string(), user_id.to_string()))
            .or_insert_with(|| GroupMember {
                group_id: group_id.to_string(),
                user_id: user_id.to_string(),
                role: member_role::MEMBER.to_string(),
                joined_at: Utc::now(),
            });

        let notification = inner
            .notifications
            .get_mut(notification_id)
            .ok_or_else(|| StoreError::Query("notification not found".to_string()))?;
        notification.status = invite_status::ACCEPTED.to_string();
        notification.is_read = true;

        Ok(())
    }

    async fn ignore_invitation(&self, notification_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let notification = inner
            .notifications
            .get_mut(notification_id)
            .ok_or_else(|| StoreError::Query("notification not found".to_string()))?;
        notification.status = invite_status::IGNORED.to_string();
        notification.is_read = true;
        Ok(())
    }

    async fn unread_notifications(
        &self,
        receiver_id: &str,
    ) -> Result<Vec<NotificationView>, StoreError> {
        let inner = self.inner.lock();

        let mut rows: Vec<Notification> = inner
            .notifications
            .values()
            .filter(|n| n.receiver_id == receiver_id && !n.is_read)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.time.cmp(&a.time));

        let views = rows
            .into_iter()
            .map(|n| NotificationView {
                sender_name: inner
                    .users
                    .get(&n.sender_id)
                    .map(|u| u.full_name())
                    .unwrap_or_default(),
                group_name: n
                    .group_id
                    .as_deref()
                    .and_then(|g| inner.groups.get(g))
                    .map(|g| g.name.clone()),
                notification: n,
            })
            .collect();

        Ok(views)
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let notification = inner
            .notifications
            .get_mut(notification_id)
            .ok_or_else(|| StoreError::Query("notification not found".to_string()))?;
        notification.is_read = true;
        Ok(())
    }
}
