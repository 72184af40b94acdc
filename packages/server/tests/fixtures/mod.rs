//! Test fixtures shared by the integration tests.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use kyoshitsu_server::ui::{build_router, state::AppState};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// Server running on an ephemeral port for the lifetime of the value
pub struct TestServer {
    port: u16,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with an empty session
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().expect("No local address").port();
        let router = build_router(Arc::new(AppState::in_memory()));

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });

        Self { port, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// WebSocket client speaking the classroom protocol
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pub connection_id: String,
}

impl TestClient {
    /// Connect and consume the initial `connected` event
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        let mut client = Self {
            stream,
            connection_id: String::new(),
        };
        let connected = client.expect_event("connected").await;
        client.connection_id = connected["connectionId"]
            .as_str()
            .expect("connectionId should be a string")
            .to_string();
        client
    }

    pub async fn send(&mut self, frame: serde_json::Value) {
        self.stream
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    /// Next frame as `(event, data)`
    pub async fn next_event(&mut self) -> (String, serde_json::Value) {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                .await
                .expect("Timed out waiting for a frame")
                .expect("Stream closed")
                .expect("WebSocket error");
            if let Message::Text(text) = message {
                let value: serde_json::Value =
                    serde_json::from_str(text.as_str()).expect("Frame is not JSON");
                let event = value["event"].as_str().unwrap_or_default().to_string();
                return (event, value["data"].clone());
            }
        }
    }

    /// Skip frames until `event` arrives and return its data
    pub async fn expect_event(&mut self, event: &str) -> serde_json::Value {
        loop {
            let (name, data) = self.next_event().await;
            if name == event {
                return data;
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
