//! Real-time WebSocket gateway: session registry, room addressing,
//! broadcast fanout and the per-event action handlers.

pub mod broadcast;
pub mod events;
pub mod handlers;
pub mod limiter;
pub mod registry;
pub mod server;
pub mod session;
