//! End-to-end tests: the WebSocket client against the reference peer.

use agentchat_client::{ChannelError, ChannelEvent, ChatClient, Endpoint, WsConnector};
use agentchat_core::{ConnectionStatus, ConversationState, Role};
use agentchat_peer::{responder::Responder, router::create_router, state::AppState};
use async_trait::async_trait;
use futures_util::{SinkExt, Stream, StreamExt};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::timeout};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};

struct Scripted(Vec<&'static str>);

#[async_trait]
impl Responder for Scripted {
    async fn respond(&self, _session_id: &str, _text: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.0.iter().map(|s| s.to_string()).collect())
    }
}

struct SessionEcho;

#[async_trait]
impl Responder for SessionEcho {
    async fn respond(&self, session_id: &str, _text: &str) -> anyhow::Result<Vec<String>> {
        Ok(vec![session_id.to_string()])
    }
}

/// Fails any turn whose text is `fail`, echoes everything else.
struct FailOnRequest;

#[async_trait]
impl Responder for FailOnRequest {
    async fn respond(&self, _session_id: &str, text: &str) -> anyhow::Result<Vec<String>> {
        if text == "fail" {
            anyhow::bail!("model unavailable");
        }
        Ok(vec![format!("echo: {text}")])
    }
}

async fn spawn_peer(responder: Arc<dyn Responder>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(Arc::new(AppState { responder }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ChatClient<WsConnector> {
    ChatClient::new(
        WsConnector::new(),
        Endpoint::new(format!("ws://{addr}/ws/chat")),
    )
}

async fn pump_until<F>(client: &mut ChatClient<WsConnector>, mut done: F)
where
    F: FnMut(&ConversationState) -> bool,
{
    timeout(Duration::from_secs(5), async {
        while !done(&client.snapshot()) {
            if client.next_event().await.is_none() {
                break;
            }
        }
    })
    .await
    .expect("timed out waiting for channel events");
}

async fn connected_client(responder: Arc<dyn Responder>) -> ChatClient<WsConnector> {
    let addr = spawn_peer(responder).await;
    let mut client = client_for(addr);
    assert!(client.activate());
    pump_until(&mut client, |s| {
        s.connection_status() == ConnectionStatus::Connected
    })
    .await;
    assert_eq!(
        client.snapshot().connection_status(),
        ConnectionStatus::Connected
    );
    client
}

fn transcript(state: &ConversationState) -> Vec<(Role, String)> {
    state
        .messages()
        .iter()
        .map(|m| (m.role(), m.text().to_string()))
        .collect()
}

#[tokio::test]
async fn submit_then_receive_reply() {
    let mut client = connected_client(Arc::new(Scripted(vec!["Hello there"]))).await;

    client.submit("hi").unwrap();
    assert!(client.snapshot().peer_composing());
    pump_until(&mut client, |s| s.messages().len() == 2).await;

    let state = client.snapshot();
    assert_eq!(
        transcript(&state),
        vec![
            (Role::User, "hi".to_string()),
            (Role::Agent, "Hello there".to_string()),
        ]
    );
    assert!(!state.peer_composing());
    assert_eq!(state.connection_status(), ConnectionStatus::Connected);

    client.teardown();
}

#[tokio::test]
async fn streamed_chunks_arrive_in_order() {
    let mut client = connected_client(Arc::new(Scripted(vec!["one", "two", "three"]))).await;

    client.submit("count").unwrap();
    pump_until(&mut client, |s| s.messages().len() == 4).await;

    let texts: Vec<String> = transcript(&client.snapshot())
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert_eq!(texts, vec!["count", "one", "two", "three"]);

    client.teardown();
}

#[tokio::test]
async fn session_id_is_the_last_path_segment() {
    let mut client = connected_client(Arc::new(SessionEcho)).await;
    let session_id = client.session_id().cloned().unwrap();

    client.submit("who am I?").unwrap();
    pump_until(&mut client, |s| s.messages().len() == 2).await;

    assert_eq!(client.snapshot().messages()[1].text(), session_id.as_str());
    client.teardown();
}

#[tokio::test]
async fn unreachable_endpoint_reports_failure_then_disconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut client = client_for(addr);
    client.activate();

    let mut events = Vec::new();
    timeout(Duration::from_secs(5), async {
        while let Some(event) = client.next_event().await {
            events.push(event);
        }
    })
    .await
    .expect("timed out waiting for connection failure");

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        ChannelEvent::StateChange(ConnectionStatus::Connecting)
    );
    assert!(matches!(
        events[1],
        ChannelEvent::Error(ChannelError::Establish(_))
    ));
    assert_eq!(
        events[2],
        ChannelEvent::StateChange(ConnectionStatus::Disconnected)
    );
    assert_eq!(
        client.snapshot().connection_status(),
        ConnectionStatus::Disconnected
    );

    // Retrying is the caller's call, and reuses the session.
    let session_id = client.session_id().cloned();
    assert!(client.activate());
    assert_eq!(client.session_id().cloned(), session_id);
}

#[tokio::test]
async fn teardown_disconnects_and_new_activation_gets_new_session() {
    let mut client = connected_client(Arc::new(Scripted(vec![]))).await;
    let first = client.session_id().cloned().unwrap();

    client.teardown();
    assert_eq!(
        client.snapshot().connection_status(),
        ConnectionStatus::Disconnected
    );
    assert_eq!(
        client.submit("anyone?"),
        Err(agentchat_client::SubmitError::NotConnected)
    );

    assert!(client.activate());
    assert_ne!(client.session_id().cloned().unwrap(), first);
    pump_until(&mut client, |s| {
        s.connection_status() == ConnectionStatus::Connected
    })
    .await;
    client.teardown();
}

/// Reads the next text frame from a raw socket, skipping control frames.
async fn next_text<S>(ws: &mut S) -> String
where
    S: Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(WsMessage::Text(text))) => return text.as_str().to_owned(),
                Some(Ok(_)) => continue,
                other => panic!("socket ended before a text frame: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a text frame")
}

#[tokio::test]
async fn responder_failure_sends_error_frame_and_keeps_serving() {
    let addr = spawn_peer(Arc::new(FailOnRequest)).await;
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws/chat/raw-session"))
        .await
        .unwrap();

    ws.send(WsMessage::text(r#"{"text":"fail"}"#)).await.unwrap();
    let error: serde_json::Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();
    assert_eq!(error["type"], "Error");
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("model unavailable")
    );

    ws.send(WsMessage::text(r#"{"text":"again"}"#)).await.unwrap();
    assert_eq!(
        next_text(&mut ws).await,
        r#"{"type":"AgentReply","text":"echo: again"}"#
    );
    assert_eq!(next_text(&mut ws).await, r#"{"type":"TurnComplete"}"#);
}

#[tokio::test]
async fn failed_turn_adds_no_agent_message() {
    let mut client = connected_client(Arc::new(FailOnRequest)).await;

    client.submit("fail").unwrap();
    client.submit("hi").unwrap();
    pump_until(&mut client, |s| s.messages().len() == 3).await;

    let state = client.snapshot();
    assert_eq!(
        transcript(&state),
        vec![
            (Role::User, "fail".to_string()),
            (Role::User, "hi".to_string()),
            (Role::Agent, "echo: hi".to_string()),
        ]
    );
    assert_eq!(state.connection_status(), ConnectionStatus::Connected);

    client.teardown();
}

#[tokio::test]
async fn blank_frames_get_no_reply() {
    let addr = spawn_peer(Arc::new(FailOnRequest)).await;
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws/chat/raw-session"))
        .await
        .unwrap();

    ws.send(WsMessage::text("   ")).await.unwrap();
    ws.send(WsMessage::text(r#"{"text":" \t "}"#)).await.unwrap();
    ws.send(WsMessage::text("ping")).await.unwrap();

    // The first reply on the wire answers the only non-blank message.
    assert_eq!(
        next_text(&mut ws).await,
        r#"{"type":"AgentReply","text":"echo: ping"}"#
    );
    assert_eq!(next_text(&mut ws).await, r#"{"type":"TurnComplete"}"#);
}
