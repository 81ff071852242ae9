use crate::{
    relay_stroke, ConnectionId, Outbound, RelayOutcome, RoomName, RoomRegistry, StrokeSegment,
};
use std::collections::HashSet;

/// Applies connection events to a [`RoomRegistry`].
///
/// Events from connections that never connected, or already disconnected,
/// are ignored.
pub struct ConnectionLifecycle {
    registry: RoomRegistry,
    connections: HashSet<ConnectionId>,
}

impl ConnectionLifecycle {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            registry,
            connections: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connect(&mut self, connection_id: ConnectionId) -> bool {
        let inserted = self.connections.insert(connection_id);
        if inserted {
            log::info!("Connection {} connected", connection_id);
        } else {
            log::warn!("Connection {} is already connected", connection_id);
        }
        inserted
    }

    pub fn join(&mut self, connection_id: &ConnectionId, room: &str) -> bool {
        if !self.is_connected(connection_id) {
            log::warn!(
                "Unknown connection {} tried to join {:?}",
                connection_id,
                room
            );
            return false;
        }
        self.registry.join(room, connection_id)
    }

    pub fn leave(&mut self, connection_id: &ConnectionId, room: &str) -> bool {
        if !self.is_connected(connection_id) {
            return false;
        }
        self.registry.leave(room, connection_id)
    }

    pub fn stroke<O: Outbound>(
        &self,
        from: &ConnectionId,
        segment: &StrokeSegment,
        outbound: &mut O,
    ) -> RelayOutcome {
        if !self.is_connected(from) {
            return RelayOutcome::default();
        }
        relay_stroke(&self.registry, from, segment, outbound)
    }

    /// Terminal. Returns the rooms the connection was removed from.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<RoomName> {
        if !self.connections.remove(connection_id) {
            return Vec::new();
        }
        let rooms = self.registry.leave_all(connection_id);
        log::info!(
            "Connection {} disconnected, left {} room(s)",
            connection_id,
            rooms.len()
        );
        rooms
    }
}
