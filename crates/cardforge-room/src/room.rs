//! Room actor: an isolated Tokio task that owns one room's state.
//!
//! Each room runs in its own task, reached only through an mpsc command
//! channel. Commands are applied strictly one at a time — fully validated
//! and committed (or rejected) before the next one is taken — which is
//! what keeps two players from both believing it is their turn. Nothing
//! inside the loop performs blocking I/O.

use std::time::Instant;

use cardforge_engine::{CardColor, CardId};
use cardforge_protocol::{
    MemberSummary, PlayerId, Recipient, RoomId, RoomSummary, ServerEvent,
};
use tokio::sync::{mpsc, oneshot};

use crate::{DrawOutcome, GameConfig, GameError, GameState, GameStatus, MatchResult, RoomError};

/// Channel sender for delivering broadcast events to one member's
/// connection handler.
pub type MemberSender = mpsc::UnboundedSender<ServerEvent>;

/// A game operation, already bound to the authenticated acting player by
/// the gateway.
#[derive(Debug, Clone)]
pub enum GameIntent {
    Start,
    Play {
        card_id: CardId,
        declared_color: Option<CardColor>,
    },
    Draw,
    CallUno,
    Challenge { target: PlayerId },
}

/// What a successful intent produced, for the caller's acknowledgment.
/// Broadcasts go out separately, to every member.
#[derive(Debug, Clone)]
pub enum IntentOutcome {
    Started,
    Played { result: Option<MatchResult> },
    Drew(DrawOutcome),
    UnoCalled,
    Challenged { success: bool },
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub host_id: Option<PlayerId>,
    pub member_count: usize,
    pub status: Option<GameStatus>,
    pub created_at: Instant,
}

/// Commands sent to a room actor through its channel. Reply channels make
/// every operation request/response from the caller's perspective.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        player_name: String,
        sender: MemberSender,
        reply: oneshot::Sender<Result<RoomSummary, RoomError>>,
    },

    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Transport-level drop: membership is removed immediately, but any
    /// seat (hand, score) survives under the player id for a rejoin.
    Disconnect {
        player_id: PlayerId,
        reply: oneshot::Sender<usize>,
    },

    Intent {
        player_id: PlayerId,
        intent: GameIntent,
        reply: oneshot::Sender<Result<IntentOutcome, RoomError>>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// Handle to a running room actor. Cheap to clone — just an mpsc sender.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Joins (or re-binds) a player, returning the membership summary.
    pub async fn join(
        &self,
        player_id: PlayerId,
        player_name: String,
        sender: MemberSender,
    ) -> Result<RoomSummary, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                player_name,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Removes a player. Returns the number of members left behind.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Reports a dropped connection. Returns the remaining member count.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Disconnect {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Submits a game intent and waits for the validation verdict.
    pub async fn intent(
        &self,
        player_id: PlayerId,
        intent: GameIntent,
    ) -> Result<IntentOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Intent {
                player_id,
                intent,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// One connected member: a transport binding, in join order.
struct Member {
    player_id: PlayerId,
    player_name: String,
    sender: MemberSender,
}

/// The room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    /// Always a current member while any member remains; reassigned to the
    /// first remaining member (join order) when the host departs.
    host: Option<PlayerId>,
    members: Vec<Member>,
    game: Option<GameState>,
    config: GameConfig,
    created_at: Instant,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    player_name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, player_name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Disconnect { player_id, reply } => {
                    let remaining = self.handle_disconnect(player_id);
                    let _ = reply.send(remaining);
                }
                RoomCommand::Intent {
                    player_id,
                    intent,
                    reply,
                } => {
                    let result = self.handle_intent(player_id, intent);
                    let _ = reply.send(result);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        player_name: String,
        sender: MemberSender,
    ) -> Result<RoomSummary, RoomError> {
        match self.members.iter_mut().find(|m| m.player_id == player_id) {
            // Rejoin after a drop: re-bind the transport, keep the seat.
            Some(member) => {
                member.sender = sender;
                member.player_name = player_name;
            }
            None => {
                self.members.push(Member {
                    player_id: player_id.clone(),
                    player_name,
                    sender,
                });
            }
        }

        if self.host.is_none() {
            self.host = Some(player_id.clone());
        }
        if let Some(game) = &mut self.game {
            game.set_connected(&player_id, true);
        }

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            members = self.members.len(),
            "player joined"
        );

        let joined_name = self
            .members
            .iter()
            .find(|m| m.player_id == player_id)
            .map(|m| m.player_name.clone())
            .expect("member inserted above");
        self.dispatch(vec![(
            Recipient::All,
            ServerEvent::PlayerJoined {
                player_id: player_id.clone(),
                player_name: joined_name,
                total_players: self.members.len(),
            },
        )]);

        Ok(self.summary())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, RoomError> {
        let index = self
            .members
            .iter()
            .position(|m| m.player_id == player_id)
            .ok_or_else(|| RoomError::NotInRoom(player_id.clone(), self.room_id.clone()))?;
        self.members.remove(index);

        // The seat stays so turn order is stable; only membership goes.
        if let Some(game) = &mut self.game {
            game.set_connected(&player_id, false);
        }

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            members = self.members.len(),
            "player left"
        );

        let mut events = vec![(
            Recipient::All,
            ServerEvent::PlayerLeft {
                player_id: player_id.clone(),
                remaining_players: self.members.len(),
            },
        )];
        events.extend(self.reassign_host_if_departed(&player_id));
        self.dispatch(events);

        Ok(self.members.len())
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) -> usize {
        let Some(index) = self.members.iter().position(|m| m.player_id == player_id) else {
            return self.members.len();
        };
        self.members.remove(index);

        if let Some(game) = &mut self.game {
            game.set_connected(&player_id, false);
        }

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            members = self.members.len(),
            "player disconnected"
        );

        let mut events = vec![(
            Recipient::All,
            ServerEvent::PlayerDisconnected {
                player_id: player_id.clone(),
            },
        )];
        events.extend(self.reassign_host_if_departed(&player_id));
        self.dispatch(events);

        self.members.len()
    }

    fn handle_intent(
        &mut self,
        player_id: PlayerId,
        intent: GameIntent,
    ) -> Result<IntentOutcome, RoomError> {
        if !self.members.iter().any(|m| m.player_id == player_id) {
            return Err(RoomError::NotInRoom(player_id, self.room_id.clone()));
        }

        let result = self.apply_intent(&player_id, intent);
        match &result {
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %player_id,
                    error = %e,
                    "intent rejected"
                );
            }
        }
        result.map_err(RoomError::Game)
    }

    fn apply_intent(
        &mut self,
        player_id: &PlayerId,
        intent: GameIntent,
    ) -> Result<IntentOutcome, GameError> {
        let mut rng = rand::rng();
        match intent {
            GameIntent::Start => {
                if self.host.as_ref() != Some(player_id) {
                    return Err(GameError::NotHost);
                }
                if self.game.is_some() {
                    return Err(GameError::AlreadyStarted);
                }
                let seats: Vec<(PlayerId, String)> = self
                    .members
                    .iter()
                    .map(|m| (m.player_id.clone(), m.player_name.clone()))
                    .collect();
                let state = GameState::deal(&seats, &self.config, &mut rng)?;
                let events = state.started_events();
                tracing::info!(
                    room_id = %self.room_id,
                    players = seats.len(),
                    "game started"
                );
                self.game = Some(state);
                self.dispatch(events);
                Ok(IntentOutcome::Started)
            }
            GameIntent::Play {
                card_id,
                declared_color,
            } => {
                let game = self.game.as_mut().ok_or(GameError::GameNotInProgress)?;
                let (result, events) =
                    game.play_card(player_id, card_id, declared_color, &mut rng)?;
                self.dispatch(events);
                Ok(IntentOutcome::Played { result })
            }
            GameIntent::Draw => {
                let game = self.game.as_mut().ok_or(GameError::GameNotInProgress)?;
                let (outcome, events) = game.draw_card(player_id, &mut rng)?;
                self.dispatch(events);
                Ok(IntentOutcome::Drew(outcome))
            }
            GameIntent::CallUno => {
                let game = self.game.as_mut().ok_or(GameError::GameNotInProgress)?;
                let events = game.call_uno(player_id)?;
                self.dispatch(events);
                Ok(IntentOutcome::UnoCalled)
            }
            GameIntent::Challenge { target } => {
                let game = self.game.as_mut().ok_or(GameError::GameNotInProgress)?;
                let (success, events) = game.challenge(player_id, &target, &mut rng)?;
                self.dispatch(events);
                Ok(IntentOutcome::Challenged { success })
            }
        }
    }

    /// Reassigns the host to the first remaining member (join order) when
    /// the departed player held it. Returns the announcement, if any.
    fn reassign_host_if_departed(
        &mut self,
        departed: &PlayerId,
    ) -> Vec<(Recipient, ServerEvent)> {
        if self.host.as_ref() != Some(departed) {
            return Vec::new();
        }
        self.host = self.members.first().map(|m| m.player_id.clone());
        match &self.host {
            Some(new_host) => {
                tracing::info!(room_id = %self.room_id, host = %new_host, "host reassigned");
                vec![(
                    Recipient::All,
                    ServerEvent::HostChanged {
                        host_id: new_host.clone(),
                    },
                )]
            }
            None => Vec::new(),
        }
    }

    /// Fans events out to the addressed member connections, in order. A
    /// closed receiver means the member is mid-disconnect; the drop is
    /// harmless because membership cleanup follows.
    fn dispatch(&self, events: Vec<(Recipient, ServerEvent)>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for member in &self.members {
                        let _ = member.sender.send(event.clone());
                    }
                }
                Recipient::Player(player_id) => {
                    if let Some(member) =
                        self.members.iter().find(|m| m.player_id == player_id)
                    {
                        let _ = member.sender.send(event);
                    }
                }
                Recipient::AllExcept(excluded) => {
                    for member in &self.members {
                        if member.player_id != excluded {
                            let _ = member.sender.send(event.clone());
                        }
                    }
                }
            }
        }
    }

    fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.room_id.clone(),
            host_id: self
                .host
                .clone()
                .expect("a non-empty room always has a host"),
            members: self
                .members
                .iter()
                .map(|m| MemberSummary {
                    player_id: m.player_id.clone(),
                    player_name: m.player_name.clone(),
                    connected: true,
                })
                .collect(),
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            host_id: self.host.clone(),
            member_count: self.members.len(),
            status: self.game.as_ref().map(|g| g.status()),
            created_at: self.created_at,
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel — senders wait when it fills.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: GameConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        host: None,
        members: Vec::new(),
        game: None,
        config,
        created_at: Instant::now(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
