//! Role model and action authorization for Studiolink sessions.
//!
//! Every session carries a per-user role assignment in its durable
//! metadata. This crate answers two questions:
//!
//! - "What is this user's role in this session?" — [`SessionMeta`] and
//!   the [`RoleCache`] in front of a [`MetadataSource`].
//! - "May this role perform this action?" — [`GatedAction::authorize`].
//!
//! # Role ladder
//!
//! ```text
//! owner  ──▶ full control: end session, launch studio, edit, upload
//! editor ──▶ launch studio, edit, upload
//! viewer ──▶ look, listen, chat
//! ```
//!
//! Roles are assigned when a session is created or shared and live in
//! the session metadata store, not in the coordinator's ephemeral room
//! state. The cache reads them once per room entry; a role change made
//! while a user is inside a session is not picked up until they re-enter.

mod cache;
mod error;
mod role;
mod session;

pub use cache::{MetadataSource, RoleCache};
pub use error::RoleError;
pub use role::{GatedAction, Role};
pub use session::{SessionMeta, SessionSettings, SessionStatus};
