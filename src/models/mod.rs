pub mod booking;
pub mod group;
pub mod group_member;
pub mod notification;
pub mod pora;
pub mod user;
pub mod zikr;
