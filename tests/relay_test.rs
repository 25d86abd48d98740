//! Integration tests for the relay over real WebSocket connections.

use futures::{SinkExt, StreamExt};
use musicociel_orchestrator::relay::{self, Registry, SharedRegistry};
use musicociel_orchestrator::server;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start the server on a random port with one meeting ("m1", "pw1").
async fn start_test_server() -> (SocketAddr, SharedRegistry) {
    let mut registry = Registry::new();
    registry.create_meeting("m1", "pw1");
    let registry = relay::shared(registry);

    let (listener, addr) = server::bind("127.0.0.1", 0).await.unwrap();
    let serve_registry = registry.clone();
    tokio::spawn(async move {
        server::serve(listener, serve_registry, std::future::pending())
            .await
            .unwrap();
    });
    (addr, registry)
}

async fn connect(addr: SocketAddr) -> Socket {
    let url = format!("ws://{}/orchestrator", addr);
    let (socket, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    socket
}

async fn send(socket: &mut Socket, frame: Value) {
    socket.send(Message::Text(frame.to_string())).await.unwrap();
}

/// Receive the next text frame, or `None` if nothing arrives in time.
async fn recv(socket: &mut Socket) -> Option<Value> {
    loop {
        match tokio::time::timeout(Duration::from_millis(300), socket.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return Some(serde_json::from_str(&text).unwrap()),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            _ => return None,
        }
    }
}

async fn join(socket: &mut Socket, id: &str, password: &str) {
    send(
        socket,
        json!({"type": "joinMeeting", "meetingId": id, "meetingPassword": password}),
    )
    .await;
}

/// Wait until the registry reaches `expected` members in "m1".
async fn wait_for_members(registry: &SharedRegistry, expected: usize) {
    for _ in 0..50 {
        let members = registry
            .lock()
            .unwrap()
            .meeting("m1")
            .map(|m| m.member_count())
            .unwrap_or(0);
        if members == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("meeting never reached {} members", expected);
}

#[tokio::test]
async fn test_meeting_scenario_over_websocket() {
    let (addr, registry) = start_test_server().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    join(&mut a, "m1", "pw1").await;
    wait_for_members(&registry, 1).await;
    assert!(recv(&mut a).await.is_none());

    send(&mut b, json!({"type": "setSong", "song": "X"})).await;
    join(&mut b, "m1", "pw1").await;
    wait_for_members(&registry, 2).await;
    assert!(recv(&mut b).await.is_none());

    send(&mut a, json!({"type": "setSong", "song": "X"})).await;
    let expected = json!({"type": "setSong", "song": "X"});
    assert_eq!(recv(&mut a).await, Some(expected.clone()));
    assert_eq!(recv(&mut b).await, Some(expected));

    send(&mut a, json!({"type": "setSongPosition", "songPosition": 42})).await;
    let expected = json!({"type": "setSongPosition", "songPosition": 42});
    assert_eq!(recv(&mut a).await, Some(expected.clone()));
    assert_eq!(recv(&mut b).await, Some(expected));

    let mut c = connect(addr).await;
    join(&mut c, "m1", "pw1").await;
    assert_eq!(
        recv(&mut c).await,
        Some(json!({"type": "setSong", "song": "X"}))
    );
    assert_eq!(
        recv(&mut c).await,
        Some(json!({"type": "setSongPosition", "songPosition": 42}))
    );
}

#[tokio::test]
async fn test_wrong_password_and_garbage_keep_connection_open() {
    let (addr, registry) = start_test_server().await;
    let mut a = connect(addr).await;

    join(&mut a, "m1", "nope").await;
    socket_garbage(&mut a).await;
    assert!(recv(&mut a).await.is_none());
    assert_eq!(
        registry.lock().unwrap().meeting("m1").unwrap().member_count(),
        0
    );

    // Still usable after rejected frames.
    join(&mut a, "m1", "pw1").await;
    wait_for_members(&registry, 1).await;
}

async fn socket_garbage(socket: &mut Socket) {
    socket
        .send(Message::Text("{not json".to_string()))
        .await
        .unwrap();
    send(socket, json!({"type": "deleteMeeting"})).await;
}

#[tokio::test]
async fn test_disconnect_leaves_meeting() {
    let (addr, registry) = start_test_server().await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    join(&mut a, "m1", "pw1").await;
    join(&mut b, "m1", "pw1").await;
    wait_for_members(&registry, 2).await;

    b.close(None).await.unwrap();
    wait_for_members(&registry, 1).await;

    send(&mut a, json!({"type": "setSong", "song": "Y"})).await;
    assert_eq!(
        recv(&mut a).await,
        Some(json!({"type": "setSong", "song": "Y"}))
    );

    for _ in 0..50 {
        if registry.lock().unwrap().session_count() == 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("closed session was never deregistered");
}

#[tokio::test]
async fn test_health_reports_counts() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (addr, registry) = start_test_server().await;
    let mut a = connect(addr).await;
    join(&mut a, "m1", "pw1").await;
    wait_for_members(&registry, 1).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    let body = response.split("\r\n\r\n").nth(1).unwrap();
    let health: Value = serde_json::from_str(body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["meetings"], 1);
    assert_eq!(health["sessions"], 1);
}
