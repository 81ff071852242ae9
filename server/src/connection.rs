use actix::{
    Actor, ActorContext, AsyncContext, Handler, Message, Recipient, Running, StreamHandler,
    WrapFuture,
};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};
use serde::Deserialize;
use std::sync::atomic::{AtomicU32, Ordering};

use whiteboard_system::{
    decode_binary, decode_text, ClientCommand, Codec, CodecError, ConnectionId, Frame,
    ServerEvent,
};

use crate::connection_tx_storage::ConnectionTx;
use crate::server::ServerTx;

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        connection_id: ConnectionId,
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    ClientCommand {
        from: ConnectionId,
        command: ClientCommand,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    ServerEvent(ServerEvent),
    Disconnected,
}

/// Shared by every websocket handshake.
pub struct Gateway {
    pub srv_tx: ServerTx,
    pub outbound_buffer: usize,
    connection_id_source: AtomicU32,
}

impl Gateway {
    pub fn new(srv_tx: ServerTx, outbound_buffer: usize) -> Self {
        Self {
            srv_tx,
            outbound_buffer,
            connection_id_source: AtomicU32::new(1),
        }
    }

    fn next_connection_id(&self) -> ConnectionId {
        self.connection_id_source.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

struct ConnectionActor {
    connection_id: ConnectionId,
    codec: Codec,
    srv_tx: ServerTx,
    outbound_buffer: usize,
}

impl ConnectionActor {
    /// Holds the actor until the server accepts the command, so a client
    /// that floods the socket is throttled by its own TCP window.
    fn forward(&mut self, command: ClientCommand, ctx: &mut ws::WebsocketContext<Self>) {
        let mut srv_tx = self.srv_tx.clone();
        let from = self.connection_id;
        ctx.wait(
            async move {
                if srv_tx
                    .send(ConnectionCommand::ClientCommand { from, command })
                    .await
                    .is_err()
                {
                    log::error!("Server task is gone, dropping command from {}", from);
                }
            }
            .into_actor(self),
        );
    }

    fn decode(&self, frame: Frame) -> Result<ClientCommand, CodecError> {
        match frame {
            Frame::Text(text) => decode_text(&text),
            Frame::Binary(bin) => decode_binary(&bin),
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(self.outbound_buffer);

        let mut srv_tx = self.srv_tx.clone();
        let connection_id = self.connection_id;
        ctx.wait(
            async move {
                if srv_tx
                    .send(ConnectionCommand::Connect { connection_id, tx })
                    .await
                    .is_err()
                {
                    log::error!(
                        "Server task is gone, connection {} not registered",
                        connection_id
                    );
                }
            }
            .into_actor(self),
        );

        let addr: Recipient<ConnectionActorMessage> = ctx.address().recipient();

        tokio::spawn(async move {
            log::debug!("connection {} egress - started", connection_id);
            while let Some(event) = rx.recv().await {
                if addr.send(ConnectionActorMessage(event)).await.is_err() {
                    break;
                }
            }
            let _ = addr
                .send(ConnectionActorMessage(ConnectionEvent::Disconnected))
                .await;
            log::debug!("connection {} egress - terminated", connection_id);
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        let mut srv_tx = self.srv_tx.clone();
        let from = self.connection_id;
        tokio::spawn(async move {
            if srv_tx
                .send(ConnectionCommand::Disconnect { from })
                .await
                .is_err()
            {
                log::error!("Server task is gone, connection {} not released", from);
            }
        });

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let frame = match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
                return;
            }
            Ok(ws::Message::Text(text)) => Frame::Text(text.to_string()),
            Ok(ws::Message::Binary(bin)) => Frame::Binary(bin.to_vec()),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
                return;
            }
            Err(err) => {
                log::warn!("Connection {} protocol error: {}", self.connection_id, err);
                ctx.stop();
                return;
            }
            _ => return,
        };

        match self.decode(frame) {
            Ok(command) => {
                log::trace!("Ingress {} {:?}", self.connection_id, command);
                self.forward(command, ctx);
            }
            Err(err) => {
                log::warn!(
                    "Connection {} sent a malformed frame: {}",
                    self.connection_id,
                    err
                );
                ctx.close(Some(CloseReason {
                    code: CloseCode::Invalid,
                    description: None,
                }));
                ctx.stop();
            }
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::ServerEvent(event) => match self.codec.encode(&event) {
                Ok(Frame::Text(text)) => ctx.text(text),
                Ok(Frame::Binary(bin)) => ctx.binary(bin),
                Err(err) => log::error!("Cannot encode {:?}: {}", event, err),
            },
            ConnectionEvent::Disconnected => {
                ctx.close(Some(CloseReason {
                    code: CloseCode::Away,
                    description: None,
                }));
                ctx.stop();
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    codec: Codec,
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    gateway: web::Data<Gateway>,
) -> Result<HttpResponse, Error> {
    let connection_id = gateway.next_connection_id();
    log::debug!(
        "Websocket handshake for connection {} ({:?})",
        connection_id,
        query.codec
    );
    ws::start(
        ConnectionActor {
            connection_id,
            codec: query.codec,
            srv_tx: gateway.srv_tx.clone(),
            outbound_buffer: gateway.outbound_buffer,
        },
        &req,
        stream,
    )
}
