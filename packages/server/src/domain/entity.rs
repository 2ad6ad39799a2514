//! Core domain models for the collaborative session server.

use super::value_object::{ConnectionId, RoomKey, Timestamp};

/// Where a connection currently is: the lobby, or inside one room.
///
/// A connection belongs to at most one room at a time; the room key is
/// set on join and only cleared by tearing the session down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Connected but not in any room yet
    Unjoined,
    /// Member of the room with the given key
    InRoom(RoomKey),
}

/// Per-connection session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Connection identifier assigned by the transport layer
    pub id: ConnectionId,
    /// Display name submitted by the client, if any
    pub display_name: Option<String>,
    /// Current room membership
    pub membership: Membership,
    /// Timestamp when the connection was established
    pub connected_at: Timestamp,
}

impl Session {
    /// Create a new session in the lobby with no display name.
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            display_name: None,
            membership: Membership::Unjoined,
            connected_at,
        }
    }

    /// Set the display name. Last write wins; no validation on the name.
    pub fn set_name(&mut self, name: String) {
        self.display_name = Some(name);
    }

    /// Enter a room.
    pub fn join(&mut self, key: RoomKey) {
        self.membership = Membership::InRoom(key);
    }

    /// The room this session is in, if any.
    pub fn room_key(&self) -> Option<&RoomKey> {
        match &self.membership {
            Membership::Unjoined => None,
            Membership::InRoom(key) => Some(key),
        }
    }

    /// Display name shown for this connection: the submitted name, or
    /// the connection id until a name is submitted.
    pub fn effective_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// One shared drawing inside a room. The drawing payload is an opaque
/// blob; the server never interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    /// Per-room drawing identifier
    pub drawing_id: u64,
    /// Connection that created the drawing
    pub user_id: ConnectionId,
    /// Display name of the creator, snapshotted at creation time
    pub name: String,
    /// Creation timestamp
    pub added_at: Timestamp,
    /// Connection that last updated the drawing
    pub last_updated_user_id: ConnectionId,
    /// Last update timestamp
    pub last_updated_at: Timestamp,
    /// Opaque drawing payload
    pub drawing_data: serde_json::Value,
}

/// Ordered log of the drawings in a room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingLog {
    entries: Vec<Drawing>,
}

impl DrawingLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next appended drawing will get.
    ///
    /// Tail-based: `(last entry's id) + 1`, or `0` when the log is empty.
    /// Ids are NOT globally unique over time — removing the highest-id
    /// drawing makes that id come back on the next append. Clients depend
    /// on this exact sequence, so it must not be replaced with a global
    /// counter.
    pub fn next_id(&self) -> u64 {
        match self.entries.last() {
            None => 0,
            Some(last) => last.drawing_id + 1,
        }
    }

    /// Append a drawing created by `user_id`, assigning its id per
    /// [`DrawingLog::next_id`]. Returns a copy of the stored record for
    /// broadcasting.
    pub fn append(
        &mut self,
        user_id: ConnectionId,
        name: String,
        at: Timestamp,
        drawing_data: serde_json::Value,
    ) -> Drawing {
        let drawing = Drawing {
            drawing_id: self.next_id(),
            user_id: user_id.clone(),
            name,
            added_at: at,
            last_updated_user_id: user_id,
            last_updated_at: at,
            drawing_data,
        };
        self.entries.push(drawing.clone());
        drawing
    }

    /// Remove every entry with the given id (at most one in practice).
    /// Removing an id that is not present is not an error.
    pub fn remove(&mut self, drawing_id: u64) {
        self.entries.retain(|d| d.drawing_id != drawing_id);
    }

    /// Empty the log.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The full ordered sequence, used to initialize a newly joined
    /// connection's view.
    pub fn all(&self) -> &[Drawing] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A collaboration session room: its members in join order plus the
/// shared drawing log.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Room key (non-negative integer literal)
    pub key: RoomKey,
    /// Member connection ids in insertion order
    pub members: Vec<ConnectionId>,
    /// Shared drawing log
    pub drawings: DrawingLog,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
}

impl Room {
    /// Create a new empty room.
    pub fn new(key: RoomKey, created_at: Timestamp) -> Self {
        Self {
            key,
            members: Vec::new(),
            drawings: DrawingLog::new(),
            created_at,
        }
    }

    /// Append a member. Duplicates are not checked: a connection joining
    /// the same room twice appends twice (known-acceptable quirk).
    pub fn add_member(&mut self, conn_id: ConnectionId) {
        self.members.push(conn_id);
    }

    /// Remove the first occurrence of the member, if present.
    pub fn remove_member(&mut self, conn_id: &ConnectionId) {
        if let Some(pos) = self.members.iter().position(|m| m == conn_id) {
            self.members.remove(pos);
        }
    }

    /// A room with zero members must not be retained in the store.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn room(key: &str) -> Room {
        Room::new(RoomKey::new(key.to_string()).unwrap(), Timestamp::new(0))
    }

    #[test]
    fn test_effective_name_falls_back_to_connection_id() {
        // given (前提条件): a session with no submitted name
        let session = Session::new(conn("sid-1"), Timestamp::new(0));

        // then (期待する結果): the connection id is the effective name
        assert_eq!(session.effective_name(), "sid-1");
    }

    #[test]
    fn test_effective_name_prefers_submitted_name() {
        // given (前提条件):
        let mut session = Session::new(conn("sid-1"), Timestamp::new(0));

        // when (操作):
        session.set_name("alice".to_string());

        // then (期待する結果):
        assert_eq!(session.effective_name(), "alice");
    }

    #[test]
    fn test_set_name_last_write_wins() {
        // given (前提条件):
        let mut session = Session::new(conn("sid-1"), Timestamp::new(0));

        // when (操作): two submissions
        session.set_name("alice".to_string());
        session.set_name("bob".to_string());

        // then (期待する結果):
        assert_eq!(session.effective_name(), "bob");
    }

    #[test]
    fn test_session_join_sets_membership() {
        // given (前提条件):
        let mut session = Session::new(conn("sid-1"), Timestamp::new(0));
        assert_eq!(session.room_key(), None);

        // when (操作):
        let key = RoomKey::new("42".to_string()).unwrap();
        session.join(key.clone());

        // then (期待する結果):
        assert_eq!(session.room_key(), Some(&key));
        assert_eq!(session.membership, Membership::InRoom(key));
    }

    #[test]
    fn test_drawing_ids_are_sequential_from_zero() {
        // given (前提条件): an empty log
        let mut log = DrawingLog::new();

        // when (操作): three appends with no removals in between
        for i in 0..3u64 {
            let d = log.append(
                conn("a"),
                "a".to_string(),
                Timestamp::new(0),
                json!({ "x": i }),
            );
            // then (期待する結果): ids are 0, 1, 2
            assert_eq!(d.drawing_id, i);
        }
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_drawing_id_reused_after_tail_removal() {
        // given (前提条件): a log with ids 0 and 1
        let mut log = DrawingLog::new();
        log.append(conn("a"), "a".to_string(), Timestamp::new(0), json!(1));
        log.append(conn("a"), "a".to_string(), Timestamp::new(0), json!(2));

        // when (操作): remove the highest id, then append again
        log.remove(1);
        let d = log.append(conn("a"), "a".to_string(), Timestamp::new(0), json!(3));

        // then (期待する結果): the id is tail-based, so 1 is reused
        assert_eq!(d.drawing_id, 1);
    }

    #[test]
    fn test_drawing_id_continues_after_non_tail_removal() {
        // given (前提条件): a log with ids 0, 1, 2
        let mut log = DrawingLog::new();
        for i in 0..3 {
            log.append(conn("a"), "a".to_string(), Timestamp::new(0), json!(i));
        }

        // when (操作): remove a non-tail entry, then append
        log.remove(0);
        let d = log.append(conn("a"), "a".to_string(), Timestamp::new(0), json!(9));

        // then (期待する結果): ids keep increasing from the current tail
        assert_eq!(d.drawing_id, 3);
        assert_eq!(
            log.all().iter().map(|d| d.drawing_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_remove_nonexistent_drawing_is_noop() {
        // given (前提条件):
        let mut log = DrawingLog::new();
        log.append(conn("a"), "a".to_string(), Timestamp::new(0), json!(1));

        // when (操作):
        log.remove(99);

        // then (期待する結果):
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        // given (前提条件):
        let mut log = DrawingLog::new();
        log.append(conn("a"), "a".to_string(), Timestamp::new(0), json!(1));

        // when (操作): clear twice in a row
        log.clear();
        assert!(log.is_empty());
        log.clear();

        // then (期待する結果): empty both times, and the next id restarts at 0
        assert!(log.is_empty());
        assert_eq!(log.next_id(), 0);
    }

    #[test]
    fn test_drawing_snapshot_fields_initialized_from_creation() {
        // given (前提条件):
        let mut log = DrawingLog::new();

        // when (操作):
        let d = log.append(
            conn("sid-9"),
            "carol".to_string(),
            Timestamp::new(777),
            json!({ "stroke": [1, 2] }),
        );

        // then (期待する結果): last-updated fields mirror the creation values
        assert_eq!(d.user_id, conn("sid-9"));
        assert_eq!(d.last_updated_user_id, conn("sid-9"));
        assert_eq!(d.added_at, Timestamp::new(777));
        assert_eq!(d.last_updated_at, Timestamp::new(777));
        assert_eq!(d.name, "carol");
    }

    #[test]
    fn test_room_members_keep_insertion_order() {
        // given (前提条件):
        let mut r = room("42");

        // when (操作):
        r.add_member(conn("c"));
        r.add_member(conn("a"));
        r.add_member(conn("b"));

        // then (期待する結果): insertion order, not sorted
        assert_eq!(r.members, vec![conn("c"), conn("a"), conn("b")]);
    }

    #[test]
    fn test_room_remove_member_first_occurrence_only() {
        // given (前提条件): a duplicate join appended twice
        let mut r = room("42");
        r.add_member(conn("a"));
        r.add_member(conn("b"));
        r.add_member(conn("a"));

        // when (操作):
        r.remove_member(&conn("a"));

        // then (期待する結果): only the first occurrence is gone
        assert_eq!(r.members, vec![conn("b"), conn("a")]);
    }

    #[test]
    fn test_room_remove_absent_member_is_noop() {
        // given (前提条件):
        let mut r = room("42");
        r.add_member(conn("a"));

        // when (操作):
        r.remove_member(&conn("z"));

        // then (期待する結果):
        assert_eq!(r.members, vec![conn("a")]);
    }
}
