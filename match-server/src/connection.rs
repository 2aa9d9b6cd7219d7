//! WebSocket message routing for one player connection of a match.
//!
//! Every connection runs two Tokio tasks:
//! - **Send task**: forwards the session's messages (errors, state broadcasts, start and close
//!   notices) as JSON text frames to the client
//! - **Receive task**: parses incoming move requests and submits them to the registry
//!
//! When either task completes the other is aborted and the match is torn down, as a lost player
//! ends the whole match.

use crate::registry::{Connection, SessionRegistry};
use crate::session::ChannelId;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use protocol::{MatchId, MoveRequest, PlayerId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

/// Is called when a connection can not be attached. Sends the reason as the only message.
async fn send_closing_message(sender: &mut SplitSink<WebSocket, Message>, closing_message: String) {
    let message = ServerMessage::Closed {
        message: closing_message,
    };
    if let Ok(text) = serde_json::to_string(&message) {
        let _ = sender.send(Message::Text(text.into())).await;
    }
    let _ = sender.send(Message::Close(None)).await;
}

/// Does the whole handling from start to finish: attach to the match -> relay messages in both
/// directions -> tear the match down.
pub async fn handle_connection(
    socket: WebSocket,
    registry: Arc<SessionRegistry>,
    match_id: MatchId,
    player_id: PlayerId,
) {
    // By splitting, we can send and receive at the same time.
    let (mut sender, receiver) = socket.split();

    let Connection {
        channel_id,
        receiver: internal_receiver,
    } = match registry.attach(match_id, player_id).await {
        Ok(connection) => connection,
        Err(error) => {
            tracing::warn!(%match_id, %player_id, %error, "Could not attach channel.");
            send_closing_message(&mut sender, error.to_string()).await;
            return;
        }
    };

    let mut send_task = tokio::spawn(send_logic(sender, internal_receiver));
    let receive_registry = registry.clone();
    let mut receive_task = tokio::spawn(async move {
        receive_logic(receiver, receive_registry, match_id, channel_id).await
    });

    // If any one of the tasks run to completion, we abort the other.
    let result = tokio::select! {
        res_a = &mut send_task => {receive_task.abort(); res_a},
        res_b = &mut receive_task => {send_task.abort(); res_b},
    };
    let reason = result.unwrap_or_else(|err| {
        tracing::error!(?err, "Internal panic in connection logic.");
        "Internal panic in connection logic."
    });
    tracing::info!(%match_id, channel_id, reason, "Connection ended.");

    registry.disconnect(match_id, channel_id).await;
}

/// Parses client frames and submits the moves.
///
/// Only text frames carrying a [`MoveRequest`] are accepted. Unreadable frames are answered with
/// an error on this channel and the connection stays open.
async fn receive_logic(
    mut receiver: SplitStream<WebSocket>,
    registry: Arc<SessionRegistry>,
    match_id: MatchId,
    channel_id: ChannelId,
) -> &'static str {
    while let Some(state) = receiver.next().await {
        match state {
            Ok(Message::Text(text)) => {
                let request = match read_move_request(text.as_str()) {
                    Ok(request) => request,
                    Err(answer) => {
                        tracing::warn!(%match_id, channel_id, "Unreadable move request.");
                        registry.reply(match_id, channel_id, answer).await;
                        continue;
                    }
                };
                // Rejections are answered by the registry, a finished match closes our channel.
                let _ = registry.submit_move(match_id, channel_id, &request).await;
            }
            Ok(Message::Close(_)) => {
                return "Client disconnected intentionally";
            }
            Ok(_) => {} // Ignore other messages (ping/pong handled by axum)
            Err(_) => {
                return "Connection lost.";
            }
        }
    }
    "Connection lost."
}

/// Parses a text frame. An unreadable frame yields the error message for the sender.
fn read_move_request(text: &str) -> Result<MoveRequest, ServerMessage> {
    serde_json::from_str(text)
        .map_err(|error| ServerMessage::error(format!("Invalid move request: {}", error)))
}

/// Delivers the session's messages to the client. Ends with a close frame once the session drops
/// the channel.
async fn send_logic(
    mut sender: SplitSink<WebSocket, Message>,
    mut internal_receiver: Receiver<ServerMessage>,
) -> &'static str {
    while let Some(message) = internal_receiver.recv().await {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(?error, "Could not serialize server message.");
                continue;
            }
        };
        if let Err(error) = sender.send(Message::Text(text.into())).await {
            tracing::error!(?error, "Error in communication with client endpoint.");
            return "Error in communication with client endpoint.";
        }
    }
    let _ = sender.send(Message::Close(None)).await;
    "Match closed."
}
