//! This module holds all live matches.
//! It provides:
//! - [`SessionRegistry`]: the map from match id to [`MatchSession`] with create, lookup and removal
//! - the operations the HTTP and web socket layers call, each running under the lock of exactly
//!   one match
//!
//! The registry lock is only held to find or change entries. Work on a match happens under that
//! match's own mutex, so distinct matches never wait on each other.

use crate::error::SessionError;
use crate::session::{ChannelId, MatchSession};
use onitama_rules::{Color, MatchEngine};
use protocol::{MatchId, MatchSnapshot, MatchSummary, MoveRequest, PlayerId, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// A freshly attached connection.
pub struct Connection {
    pub channel_id: ChannelId,
    pub receiver: mpsc::Receiver<ServerMessage>,
}

/// All matches of the process. Created at start up, entries leave on completion or teardown.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<MatchId, Arc<Mutex<MatchSession>>>>,
    channel_buffer_size: usize,
}

impl SessionRegistry {
    pub fn new(channel_buffer_size: usize) -> Self {
        SessionRegistry {
            sessions: Mutex::new(HashMap::new()),
            channel_buffer_size,
        }
    }

    /// Creates a new match with a fresh engine and returns its id.
    pub async fn create(&self) -> MatchId {
        let engine = MatchEngine::new(&mut rand::thread_rng());
        self.create_with_engine(engine).await
    }

    /// Registers a match around an already set up engine.
    pub async fn create_with_engine(&self, engine: MatchEngine) -> MatchId {
        let match_id = Uuid::new_v4();
        let session = MatchSession::new(match_id, engine, self.channel_buffer_size);
        self.sessions
            .lock()
            .await
            .insert(match_id, Arc::new(Mutex::new(session)));
        tracing::info!(%match_id, "Match created.");
        match_id
    }

    /// Looks up a match. The registry lock is released before the caller locks the match.
    async fn session(&self, match_id: MatchId) -> Result<Arc<Mutex<MatchSession>>, SessionError> {
        self.sessions
            .lock()
            .await
            .get(&match_id)
            .cloned()
            .ok_or(SessionError::NotFound)
    }

    /// Runs `operation` under the lock of one open match.
    async fn with_session<T>(
        &self,
        match_id: MatchId,
        operation: impl FnOnce(&mut MatchSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = self.session(match_id).await?;
        let mut session = session.lock().await;
        if session.is_closed() {
            return Err(SessionError::NotFound);
        }
        operation(&mut *session)
    }

    pub async fn join(&self, match_id: MatchId) -> Result<(PlayerId, Color), SessionError> {
        self.with_session(match_id, |session| session.join(&mut rand::thread_rng()))
            .await
    }

    /// Starts a match and returns the player that moves first.
    pub async fn start(
        &self,
        match_id: MatchId,
        requester: PlayerId,
    ) -> Result<PlayerId, SessionError> {
        self.with_session(match_id, |session| {
            session.start(requester, &mut rand::thread_rng())
        })
        .await
    }

    pub async fn get_state(&self, match_id: MatchId) -> Result<MatchSnapshot, SessionError> {
        self.with_session(match_id, |session| Ok(session.snapshot()))
            .await
    }

    /// Checks if a player joined a match, used before upgrading a web socket.
    pub async fn is_member(&self, match_id: MatchId, player_id: PlayerId) -> Result<(), SessionError> {
        self.with_session(match_id, |session| {
            session
                .color_of(player_id)
                .map(|_| ())
                .ok_or(SessionError::Forbidden("Unknown player"))
        })
        .await
    }

    pub async fn attach(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<Connection, SessionError> {
        self.with_session(match_id, |session| {
            let (channel_id, receiver) = session.attach(player_id)?;
            Ok(Connection {
                channel_id,
                receiver,
            })
        })
        .await
    }

    /// Applies a move from a channel. Rejections are answered on that channel only, successes are
    /// broadcast by the session. A finished match is removed from the registry.
    pub async fn submit_move(
        &self,
        match_id: MatchId,
        channel_id: ChannelId,
        request: &MoveRequest,
    ) -> Result<Option<Color>, SessionError> {
        let result = self
            .with_session(match_id, |session| {
                let result = session.submit_move(channel_id, request);
                if let Err(error) = &result {
                    tracing::warn!(%match_id, channel_id, %error, "Move rejected.");
                    session.reply(channel_id, ServerMessage::error(error.to_string()));
                }
                result
            })
            .await;

        if let Ok(Some(_)) = result {
            self.remove(match_id).await;
        }
        result
    }

    /// Sends a message to one channel of a match, e.g. for unreadable input.
    pub async fn reply(&self, match_id: MatchId, channel_id: ChannelId, message: ServerMessage) {
        let _ = self
            .with_session(match_id, |session| {
                session.reply(channel_id, message);
                Ok(())
            })
            .await;
    }

    /// A lost connection ends the whole match: every other channel is closed and the entry
    /// removed. The entry also goes if the session was already closed, e.g. by a finishing move
    /// whose removal got interrupted.
    pub async fn disconnect(&self, match_id: MatchId, channel_id: ChannelId) {
        let _ = self
            .with_session(match_id, |session| {
                let player_id = session.detach(channel_id);
                tracing::info!(%match_id, channel_id, ?player_id, "Channel disconnected, closing match.");
                session.close("A player disconnected");
                Ok(())
            })
            .await;
        self.remove(match_id).await;
    }

    /// Drops a match from the registry.
    pub async fn remove(&self, match_id: MatchId) {
        if self.sessions.lock().await.remove(&match_id).is_some() {
            tracing::info!(%match_id, "Match removed.");
        }
    }

    pub async fn list(&self) -> Vec<MatchSummary> {
        let sessions: Vec<Arc<Mutex<MatchSession>>> =
            self.sessions.lock().await.values().cloned().collect();
        let mut summaries = Vec::with_capacity(sessions.len());
        for session in sessions {
            summaries.push(session.lock().await.summary());
        }
        summaries
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Removes matches without any connection for at least `limit`. Returns the amount removed.
    /// This is a fallback for matches that were created but never played.
    pub async fn cleanup_idle(&self, limit: Duration) -> usize {
        let entries: Vec<(MatchId, Arc<Mutex<MatchSession>>)> = self
            .sessions
            .lock()
            .await
            .iter()
            .map(|(id, session)| (*id, session.clone()))
            .collect();

        let mut removed = 0;
        for (match_id, session) in entries {
            let mut session = session.lock().await;
            if session.is_closed() || session.is_idle_for(limit) {
                session.close("Match abandoned");
                drop(session);
                tracing::info!(%match_id, "Removing idle match.");
                self.remove(match_id).await;
                removed += 1;
            }
        }
        removed
    }
}
