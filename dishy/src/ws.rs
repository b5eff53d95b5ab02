//! Minimal WebSocket client helpers: receive pushed frames, send commands.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::error::DashError;
use crate::types::Command;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Connect to the agent and return the WS stream
pub async fn connect(url: &str) -> Result<WsStream, DashError> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| DashError::TransportUnavailable(e.to_string()))?;
    Ok(ws)
}

/// Wait for the next text frame. Control and binary frames are skipped; a
/// closed or failed socket is `TransportUnavailable`.
pub async fn recv_frame(ws: &mut WsStream) -> Result<String, DashError> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text),
            Some(Ok(Message::Close(_))) | None => {
                return Err(DashError::TransportUnavailable("connection closed".into()))
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(DashError::TransportUnavailable(e.to_string())),
        }
    }
}

/// Fire-and-forget `dishy_event`.
pub async fn send_command(ws: &mut WsStream, cmd: Command) -> Result<(), DashError> {
    let text = serde_json::to_string(&cmd.envelope())
        .map_err(|e| DashError::TransportUnavailable(e.to_string()))?;
    ws.send(Message::Text(text))
        .await
        .map_err(|e| DashError::TransportUnavailable(e.to_string()))
}
