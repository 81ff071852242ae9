use std::time::Duration;

use actix_web::{test, web, App};
use actix_web_actors::ws::{CloseCode, Frame, Message};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{channel, Receiver};
use tokio::time::{delay_for, timeout};

use whiteboard_server::connection::{ConnectionCommand, Gateway};
use whiteboard_server::handlers;
use whiteboard_server::server::{spawn_server, ServerTx};
use whiteboard_system::{bincode, MembershipPolicy, ServerEvent};

const STROKE: &str = r#"{"drawing":{"room":"art","x0":0.1,"y0":0.1,"x1":0.2,"y1":0.2,"color":"black"}}"#;

fn start(srv_tx: ServerTx) -> test::TestServer {
    let gateway = web::Data::new(Gateway::new(srv_tx, 16));
    test::start(move || {
        App::new()
            .app_data(gateway.clone())
            .configure(handlers::root)
    })
}

async fn next_frame<S>(client: &mut S) -> Frame
where
    S: futures_util::Stream<Item = Result<Frame, actix_web_actors::ws::ProtocolError>> + Unpin,
{
    timeout(Duration::from_secs(5), client.next())
        .await
        .expect("no frame within timeout")
        .expect("stream ended")
        .expect("protocol error")
}

async fn next_command(srv_rx: &mut Receiver<ConnectionCommand>) -> ConnectionCommand {
    timeout(Duration::from_secs(5), srv_rx.recv())
        .await
        .expect("no command within timeout")
        .expect("server channel closed")
}

#[actix_rt::test]
async fn it_relays_strokes_between_websocket_clients() {
    let mut srv = start(spawn_server(MembershipPolicy::Multi));

    let mut a = srv.ws_at("/ws/").await.expect("");
    let mut b = srv.ws_at("/ws/").await.expect("");
    let mut c = srv.ws_at("/ws/?codec=bincode").await.expect("");
    for client in [&mut a, &mut b, &mut c].iter_mut() {
        client
            .send(Message::Text(r#"{"joinRoom":"art"}"#.into()))
            .await
            .expect("");
    }
    // Joins from different sockets are not ordered against each other.
    delay_for(Duration::from_millis(300)).await;

    a.send(Message::Text(STROKE.into())).await.expect("");

    match next_frame(&mut b).await {
        Frame::Text(text) => assert_eq!(&text[..], STROKE.as_bytes()),
        frame => panic!("unexpected frame {:?}", frame),
    }
    match next_frame(&mut c).await {
        Frame::Binary(bin) => {
            let ServerEvent::Drawing(segment) =
                bincode::deserialize::<ServerEvent>(&bin).expect("");
            assert_eq!(segment.room, "art");
            assert_eq!(segment.x1.to_bits(), 0.2f64.to_bits());
        }
        frame => panic!("unexpected frame {:?}", frame),
    }
}

#[actix_rt::test]
async fn it_closes_on_a_malformed_frame_and_releases_the_connection() {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(16);
    let mut srv = start(srv_tx);

    let mut client = srv.ws_at("/ws/").await.expect("");
    // Holding the sender keeps the socket open from the server side.
    let (connection_id, _tx) = match next_command(&mut srv_rx).await {
        ConnectionCommand::Connect { connection_id, tx } => (connection_id, tx),
        command => panic!("unexpected command {:?}", command),
    };

    client
        .send(Message::Text("scribble".into()))
        .await
        .expect("");

    match next_frame(&mut client).await {
        Frame::Close(Some(reason)) => assert_eq!(reason.code, CloseCode::Invalid),
        frame => panic!("unexpected frame {:?}", frame),
    }
    match next_command(&mut srv_rx).await {
        ConnectionCommand::Disconnect { from } => assert_eq!(from, connection_id),
        command => panic!("unexpected command {:?}", command),
    }
}

#[actix_rt::test]
async fn it_releases_the_connection_when_the_client_leaves() {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(16);
    let mut srv = start(srv_tx);

    let mut client = srv.ws_at("/ws/").await.expect("");
    // Holding the sender keeps the socket open from the server side.
    let (connection_id, _tx) = match next_command(&mut srv_rx).await {
        ConnectionCommand::Connect { connection_id, tx } => (connection_id, tx),
        command => panic!("unexpected command {:?}", command),
    };

    client
        .send(Message::Text(r#"{"joinRoom":"art"}"#.into()))
        .await
        .expect("");
    match next_command(&mut srv_rx).await {
        ConnectionCommand::ClientCommand { from, .. } => assert_eq!(from, connection_id),
        command => panic!("unexpected command {:?}", command),
    }

    client.send(Message::Close(None)).await.expect("");

    match next_command(&mut srv_rx).await {
        ConnectionCommand::Disconnect { from } => assert_eq!(from, connection_id),
        command => panic!("unexpected command {:?}", command),
    }
}

#[actix_rt::test]
async fn it_closes_the_socket_when_the_server_lets_go() {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(16);
    let mut srv = start(srv_tx);

    let mut client = srv.ws_at("/ws/").await.expect("");
    let (connection_id, tx) = match next_command(&mut srv_rx).await {
        ConnectionCommand::Connect { connection_id, tx } => (connection_id, tx),
        command => panic!("unexpected command {:?}", command),
    };

    drop(tx);

    match next_frame(&mut client).await {
        Frame::Close(Some(reason)) => assert_eq!(reason.code, CloseCode::Away),
        frame => panic!("unexpected frame {:?}", frame),
    }
    match next_command(&mut srv_rx).await {
        ConnectionCommand::Disconnect { from } => assert_eq!(from, connection_id),
        command => panic!("unexpected command {:?}", command),
    }
}
