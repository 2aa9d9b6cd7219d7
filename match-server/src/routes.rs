//! The HTTP surface: creating, joining, starting and inspecting matches, plus the upgrade to the
//! per match web socket.

use crate::connection::handle_connection;
use crate::error::SessionError;
use crate::registry::SessionRegistry;
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use protocol::{
    JoinResponse, MatchId, MatchSnapshot, MatchSummary, PlayerId, StartRequest, StartResponse,
};
use serde::Deserialize;
use std::sync::Arc;

/// The query of the web socket upgrade.
#[derive(Deserialize)]
pub struct ChannelQuery {
    pub player_id: PlayerId,
}

/// Sets up the routing system for all endpoints.
pub fn router(registry: Arc<SessionRegistry>) -> Router {
    Router::new()
        .route("/create_match", post(create_match_handler))
        .route("/join_match/{match_id}", post(join_match_handler))
        .route("/start_match/{match_id}", post(start_match_handler))
        .route("/match_state/{match_id}", get(match_state_handler))
        .route("/matches", get(list_matches_handler))
        .route("/ws/{match_id}", get(websocket_handler))
        .with_state(registry)
}

/// Creates a match and joins the creator, who becomes the host.
async fn create_match_handler(
    State(registry): State<Arc<SessionRegistry>>,
) -> Result<Json<JoinResponse>, SessionError> {
    let match_id = registry.create().await;
    let (player_id, color) = registry.join(match_id).await?;
    Ok(Json(JoinResponse {
        match_id,
        player_id,
        color,
    }))
}

async fn join_match_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<JoinResponse>, SessionError> {
    let (player_id, color) = registry.join(match_id).await?;
    Ok(Json(JoinResponse {
        match_id,
        player_id,
        color,
    }))
}

async fn start_match_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>, SessionError> {
    let current_player = registry.start(match_id, request.player_id).await?;
    Ok(Json(StartResponse { current_player }))
}

async fn match_state_handler(
    State(registry): State<Arc<SessionRegistry>>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchSnapshot>, SessionError> {
    Ok(Json(registry.get_state(match_id).await?))
}

/// Lists the live matches with their amount of players and connections.
async fn list_matches_handler(
    State(registry): State<Arc<SessionRegistry>>,
) -> Json<Vec<MatchSummary>> {
    Json(registry.list().await)
}

/// Upgrades to a web socket for a player that joined the match.
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<SessionRegistry>>,
    Path(match_id): Path<MatchId>,
    Query(ChannelQuery { player_id }): Query<ChannelQuery>,
) -> Response {
    if let Err(error) = registry.is_member(match_id, player_id).await {
        return error.into_response();
    }
    ws.on_upgrade(move |socket| handle_connection(socket, registry, match_id, player_id))
}
