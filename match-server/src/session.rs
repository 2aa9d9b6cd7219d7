//! One live match: the engine, the joined players and the connections watching it.
//!
//! A [`MatchSession`] is never shared without its mutex, so every method here runs as one
//! indivisible step with respect to the other operations on the same match.

use crate::error::SessionError;
use onitama_rules::{Color, InputError, MatchEngine};
use protocol::{MatchId, MatchSnapshot, MatchSummary, MoveRequest, PlayerId, ServerMessage};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Identifies one connection within a session.
pub type ChannelId = u64;

/// The maximum amount of players per match.
pub const MAX_PLAYERS: usize = 2;

/// A connected channel and the player it speaks for.
struct Observer {
    player_id: PlayerId,
    sender: mpsc::Sender<ServerMessage>,
}

/// The description of the match session.
pub struct MatchSession {
    match_id: MatchId,
    /// Exclusively owned by the session.
    engine: MatchEngine,
    /// Joined players and their colors, at most [`MAX_PLAYERS`] with distinct colors.
    players: HashMap<PlayerId, Color>,
    /// The first joiner.
    host: Option<PlayerId>,
    /// The player whose connection may submit the next move. `None` until started.
    current_player: Option<PlayerId>,
    observers: HashMap<ChannelId, Observer>,
    next_channel_id: ChannelId,
    channel_buffer_size: usize,
    /// Set once the session has been torn down. The registry entry may still linger briefly.
    closed: bool,
    /// Since when no connection is attached.
    idle_since: Instant,
}

impl MatchSession {
    pub fn new(match_id: MatchId, engine: MatchEngine, channel_buffer_size: usize) -> Self {
        MatchSession {
            match_id,
            engine,
            players: HashMap::new(),
            host: None,
            current_player: None,
            observers: HashMap::new(),
            next_channel_id: 0,
            channel_buffer_size,
            closed: false,
            idle_since: Instant::now(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_started(&self) -> bool {
        self.current_player.is_some()
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.current_player
    }

    pub fn color_of(&self, player_id: PlayerId) -> Option<Color> {
        self.players.get(&player_id).copied()
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Adds a player with a color drawn uniformly from the ones still free. The first joiner
    /// becomes the host.
    pub fn join<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(PlayerId, Color), SessionError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(SessionError::AlreadyFull);
        }
        let free_colors: Vec<Color> = Color::ALL
            .into_iter()
            .filter(|color| !self.players.values().any(|taken| taken == color))
            .collect();
        let Some(color) = free_colors.choose(rng).copied() else {
            return Err(SessionError::AlreadyFull);
        };

        let player_id = Uuid::new_v4();
        self.players.insert(player_id, color);
        if self.host.is_none() {
            self.host = Some(player_id);
        }
        tracing::info!(match_id = %self.match_id, %player_id, %color, "Player joined.");
        Ok((player_id, color))
    }

    /// Starts the match on request of the host. A uniformly drawn player moves first and the
    /// engine's turn owner is aligned with that player's color.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        requester: PlayerId,
        rng: &mut R,
    ) -> Result<PlayerId, SessionError> {
        if self.players.len() < MAX_PLAYERS {
            return Err(SessionError::NotReady("Waiting for a second player"));
        }
        if self.host != Some(requester) {
            return Err(SessionError::Forbidden("Only the host may start the match"));
        }
        if self.is_started() {
            return Err(SessionError::Forbidden("Match already started"));
        }

        let candidates: Vec<(PlayerId, Color)> =
            self.players.iter().map(|(id, color)| (*id, *color)).collect();
        let Some(&(first_player, first_color)) = candidates.choose(rng) else {
            return Err(SessionError::NotReady("Waiting for a second player"));
        };
        self.engine.set_turn_owner(first_color);
        self.current_player = Some(first_player);

        tracing::info!(match_id = %self.match_id, %first_player, %first_color, "Match started.");
        self.broadcast(ServerMessage::Started {
            current_player: first_player,
            current_color: first_color,
        });
        Ok(first_player)
    }

    /// The snapshot with hands relative to the host. Before anyone joined, Red counts as host.
    pub fn snapshot(&self) -> MatchSnapshot {
        let host_color = self
            .host
            .and_then(|host| self.color_of(host))
            .unwrap_or(Color::Red);
        MatchSnapshot::capture(&self.engine, host_color)
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            match_id: self.match_id,
            players: self.players.len(),
            started: self.is_started(),
            connected_channels: self.observers.len(),
        }
    }

    /// Registers a connection for a joined player. The receiver gets every broadcast from now on.
    pub fn attach(
        &mut self,
        player_id: PlayerId,
    ) -> Result<(ChannelId, mpsc::Receiver<ServerMessage>), SessionError> {
        if !self.players.contains_key(&player_id) {
            return Err(SessionError::Forbidden("Unknown player"));
        }
        let (sender, receiver) = mpsc::channel(self.channel_buffer_size);
        let channel_id = self.next_channel_id;
        self.next_channel_id += 1;
        self.observers
            .insert(channel_id, Observer { player_id, sender });
        tracing::debug!(match_id = %self.match_id, channel_id, %player_id, "Channel attached.");
        Ok((channel_id, receiver))
    }

    /// Removes a connection from the channel set. Returns the player it spoke for.
    pub fn detach(&mut self, channel_id: ChannelId) -> Option<PlayerId> {
        let observer = self.observers.remove(&channel_id)?;
        if self.observers.is_empty() {
            self.idle_since = Instant::now();
        }
        Some(observer.player_id)
    }

    /// Validates and applies a move sent over `channel_id`. The requester is the player the
    /// channel was attached for. On success the new state goes to every channel and the winner,
    /// if any, is returned. On failure nothing changes and nobody is informed; see
    /// [`Self::reply`].
    pub fn submit_move(
        &mut self,
        channel_id: ChannelId,
        request: &MoveRequest,
    ) -> Result<Option<Color>, SessionError> {
        let requester = self
            .observers
            .get(&channel_id)
            .map(|observer| observer.player_id)
            .ok_or(SessionError::Forbidden("Unknown channel"))?;
        let Some(current_player) = self.current_player else {
            return Err(SessionError::NotReady("Match has not started"));
        };
        if requester != current_player {
            return Err(SessionError::Forbidden("not your turn"));
        }

        let from = request.source();
        let to = request.destination();
        self.engine.validate_input(&request.card_name, from, to)?;
        if !self
            .engine
            .legal_moves_for_card(from, &request.card_name)
            .iter()
            .any(|legal| legal.target == to)
        {
            return Err(InputError::IllegalDestination.into());
        }
        let winner = self.engine.apply_move(&request.card_name, from, to)?;

        self.current_player = self
            .players
            .keys()
            .find(|player| **player != current_player)
            .copied();
        tracing::info!(
            match_id = %self.match_id,
            player_id = %requester,
            card = %request.card_name,
            ?from,
            ?to,
            "Move applied."
        );

        let snapshot = self.snapshot();
        self.broadcast(ServerMessage::success(snapshot, winner));
        if let Some(winner) = winner {
            tracing::info!(match_id = %self.match_id, %winner, "Match finished.");
            self.close("Match finished");
        }
        Ok(winner)
    }

    /// Sends a message to a single channel.
    pub fn reply(&mut self, channel_id: ChannelId, message: ServerMessage) {
        let lagging = self
            .observers
            .get(&channel_id)
            .is_some_and(|observer| !self.deliver(channel_id, observer, message));
        if lagging {
            self.drop_lagging([channel_id]);
        }
    }

    /// Fans a message out to every channel. A failing channel does not affect the others.
    pub fn broadcast(&mut self, message: ServerMessage) {
        let lagging: Vec<ChannelId> = self
            .observers
            .iter()
            .filter(|(channel_id, observer)| !self.deliver(**channel_id, observer, message.clone()))
            .map(|(channel_id, _)| *channel_id)
            .collect();
        self.drop_lagging(lagging);
    }

    /// Returns false if the channel can not keep up and has to go.
    fn deliver(&self, channel_id: ChannelId, observer: &Observer, message: ServerMessage) -> bool {
        match observer.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(match_id = %self.match_id, channel_id, "Channel lagging, dropping it.");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(match_id = %self.match_id, channel_id, "Sending to a closed channel.");
                true
            }
        }
    }

    /// A dropped sender ends the connection's send task, which in turn tears the match down.
    fn drop_lagging(&mut self, channel_ids: impl IntoIterator<Item = ChannelId>) {
        for channel_id in channel_ids {
            self.detach(channel_id);
        }
    }

    /// Tears the session down: every channel gets a last message and is closed afterwards.
    pub fn close(&mut self, reason: &str) {
        if self.closed {
            return;
        }
        self.broadcast(ServerMessage::Closed {
            message: reason.to_string(),
        });
        // Dropping the senders ends the receivers after the queued messages.
        self.observers.clear();
        self.closed = true;
    }

    /// True if no connection was attached for at least `limit`.
    pub fn is_idle_for(&self, limit: Duration) -> bool {
        self.observers.is_empty() && self.idle_since.elapsed() >= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session() -> MatchSession {
        let mut rng = StdRng::seed_from_u64(3);
        MatchSession::new(Uuid::new_v4(), MatchEngine::new(&mut rng), 8)
    }

    #[test]
    fn colors_are_distinct_and_host_is_first() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = session();
            let (first, first_color) = session.join(&mut rng).unwrap();
            let (_, second_color) = session.join(&mut rng).unwrap();
            assert_ne!(first_color, second_color);
            assert_eq!(session.host(), Some(first));
            assert_eq!(session.join(&mut rng), Err(SessionError::AlreadyFull));
        }
    }

    #[test]
    fn start_aligns_engine_with_first_player() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = session();
            let (host, _) = session.join(&mut rng).unwrap();
            session.join(&mut rng).unwrap();
            let first = session.start(host, &mut rng).unwrap();
            assert_eq!(session.current_player(), Some(first));
            assert_eq!(session.color_of(first), Some(session.engine().turn_owner()));
            assert!(session.start(host, &mut rng).is_err());
        }
    }

    #[test]
    fn attach_requires_a_joined_player() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = session();
        assert!(session.attach(Uuid::new_v4()).is_err());
        let (player, _) = session.join(&mut rng).unwrap();
        let (first, _) = session.attach(player).unwrap();
        let (second, _) = session.attach(player).unwrap();
        assert_ne!(first, second);
        assert_eq!(session.summary().connected_channels, 2);
    }

    #[test]
    fn close_ends_receivers_after_last_message() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = session();
        let (player, _) = session.join(&mut rng).unwrap();
        let (_, mut receiver) = session.attach(player).unwrap();
        session.close("bye");
        assert!(session.is_closed());
        assert_eq!(
            receiver.try_recv().unwrap(),
            ServerMessage::Closed {
                message: "bye".into()
            }
        );
        assert!(matches!(
            receiver.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn lagging_channel_is_dropped_without_affecting_others() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = MatchSession::new(Uuid::new_v4(), MatchEngine::new(&mut rng), 1);
        let (player, _) = session.join(&mut rng).unwrap();
        let (_, mut reading) = session.attach(player).unwrap();
        let (_, mut stalled) = session.attach(player).unwrap();

        session.broadcast(ServerMessage::error("first"));
        assert_eq!(reading.try_recv().unwrap(), ServerMessage::error("first"));
        session.broadcast(ServerMessage::error("second"));

        assert_eq!(reading.try_recv().unwrap(), ServerMessage::error("second"));
        assert_eq!(session.summary().connected_channels, 1);
        assert_eq!(stalled.try_recv().unwrap(), ServerMessage::error("first"));
        assert!(matches!(
            stalled.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
