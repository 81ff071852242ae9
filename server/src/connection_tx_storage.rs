use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use tokio::sync::mpsc::error::TrySendError;
use whiteboard_system::{ConnectionId, DeliveryError, Outbound, ServerEvent};

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    /// Dropping the returned sender ends the connection's egress task,
    /// which closes the websocket.
    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connection_txs.len()
    }
}

impl Outbound for ConnectionTxStorage {
    fn deliver(&mut self, to: &ConnectionId, event: ServerEvent) -> Result<(), DeliveryError> {
        let tx = self
            .connection_txs
            .get_mut(to)
            .ok_or(DeliveryError::Closed)?;
        tx.try_send(ConnectionEvent::ServerEvent(event))
            .map_err(|err| match err {
                TrySendError::Full(_) => DeliveryError::Overflow,
                TrySendError::Closed(_) => DeliveryError::Closed,
            })
    }
}
