use tokio::sync::mpsc::{channel, Sender};

use whiteboard_system::{
    ClientCommand, ConnectionId, ConnectionLifecycle, DeliveryError, MembershipPolicy,
    RoomRegistry,
};

use super::connection::ConnectionCommand;
use crate::connection_tx_storage::ConnectionTxStorage;

pub type ServerTx = Sender<ConnectionCommand>;

/// Owns every room and connection. Runs on a single task, so commands are
/// applied one at a time in arrival order.
pub(crate) struct Server {
    lifecycle: ConnectionLifecycle,
    connections: ConnectionTxStorage,
}

impl Server {
    pub(crate) fn new(membership: MembershipPolicy) -> Self {
        Self {
            lifecycle: ConnectionLifecycle::new(RoomRegistry::new(membership)),
            connections: ConnectionTxStorage::new(),
        }
    }

    pub(crate) fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { connection_id, tx } => {
                if self.lifecycle.connect(connection_id) {
                    self.connections.insert(connection_id, tx);
                }
            }
            ConnectionCommand::Disconnect { from } => {
                self.disconnect(&from);
            }
            ConnectionCommand::ClientCommand { from, command } => {
                self.handle_client_command(&from, command);
            }
        }
    }

    fn handle_client_command(&mut self, from: &ConnectionId, command: ClientCommand) {
        match command {
            ClientCommand::JoinRoom(room) => {
                self.lifecycle.join(from, &room);
            }
            ClientCommand::LeaveRoom(room) => {
                self.lifecycle.leave(from, &room);
            }
            ClientCommand::Drawing(segment) => {
                let outcome = self
                    .lifecycle
                    .stroke(from, &segment, &mut self.connections);
                for (connection_id, err) in outcome.failed {
                    if err == DeliveryError::Overflow {
                        log::warn!(
                            "Disconnecting connection {}: outbound buffer is full",
                            connection_id
                        );
                    }
                    self.disconnect(&connection_id);
                }
            }
        }
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.lifecycle.disconnect(connection_id);
        if self.connections.remove(connection_id).is_some() {
            log::debug!("{} connection(s) online", self.connections.len());
        }
    }
}

pub fn spawn_server(membership: MembershipPolicy) -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(64);

    tokio::spawn(async move {
        let mut server = Server::new(membership);
        log::info!("server task - started");

        while let Some(command) = srv_rx.recv().await {
            server.handle_connection_command(command);
        }
        log::info!("server task - terminated");
    });

    srv_tx
}
