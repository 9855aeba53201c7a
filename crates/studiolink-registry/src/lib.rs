//! In-memory room membership for Studiolink sessions.
//!
//! A "room" is the set of connections currently present in a session.
//! The [`RoomRegistry`] tracks every room plus a reverse index from users
//! to the sessions they're in, so a dropped connection can be cleaned out
//! of every room it touched without scanning the world.
//!
//! Membership is ephemeral: rooms are created lazily on first join,
//! pruned when their last member leaves, and nothing here survives a
//! process restart. Durable session data (names, roles, files) lives
//! elsewhere.

mod registry;

pub use registry::RoomRegistry;
