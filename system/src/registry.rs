use crate::{ConnectionId, MembershipPolicy, RoomName};
use std::collections::{HashMap, HashSet};

/// Which connections are joined to which rooms.
///
/// Every operation is total: unknown rooms and connections read as empty
/// sets. A room entry only exists while it has at least one member.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    policy: MembershipPolicy,
    rooms: HashMap<RoomName, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<RoomName>>,
}

impl RoomRegistry {
    pub fn new(policy: MembershipPolicy) -> Self {
        Self {
            policy,
            rooms: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    pub fn policy(&self) -> MembershipPolicy {
        self.policy
    }

    /// Returns `false` when nothing changed.
    pub fn join(&mut self, room: &str, connection_id: &ConnectionId) -> bool {
        if room.is_empty() {
            log::debug!("Connection {} tried to join a blank room", connection_id);
            return false;
        }
        if self.is_member(room, connection_id) {
            return false;
        }

        if self.policy == MembershipPolicy::Single {
            let others = self.rooms_of(connection_id);
            for other in others {
                self.leave(&other, connection_id);
            }
        }

        self.rooms
            .entry(room.to_owned())
            .or_insert_with(HashSet::new)
            .insert(*connection_id);
        self.memberships
            .entry(*connection_id)
            .or_insert_with(HashSet::new)
            .insert(room.to_owned());
        log::info!("Connection {} joined room {:?}", connection_id, room);
        true
    }

    /// Returns `false` when the connection was not in the room.
    pub fn leave(&mut self, room: &str, connection_id: &ConnectionId) -> bool {
        let removed = match self.rooms.get_mut(room) {
            Some(members) => members.remove(connection_id),
            None => false,
        };
        if !removed {
            return false;
        }

        if self.rooms.get(room).map_or(false, |m| m.is_empty()) {
            self.rooms.remove(room);
            log::debug!("Room {:?} is empty, removed", room);
        }
        if let Some(rooms) = self.memberships.get_mut(connection_id) {
            rooms.remove(room);
            if rooms.is_empty() {
                self.memberships.remove(connection_id);
            }
        }
        log::info!("Connection {} left room {:?}", connection_id, room);
        true
    }

    /// Removes the connection from every room and returns the rooms it left.
    pub fn leave_all(&mut self, connection_id: &ConnectionId) -> Vec<RoomName> {
        let rooms = self.rooms_of(connection_id);
        for room in &rooms {
            self.leave(room, connection_id);
        }
        rooms
    }

    pub fn members_except(&self, room: &str, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .filter(|member| *member != connection_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_member(&self, room: &str, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room)
            .map_or(false, |members| members.contains(connection_id))
    }

    /// Sorted, so callers get a stable order.
    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomName> {
        let mut rooms: Vec<RoomName> = self
            .memberships
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, |members| members.len())
    }
}
