//! Per-connection handler: handshake, intent routing, and broadcast pump.
//!
//! Each accepted connection gets its own task running this handler. The
//! flow is:
//!   1. Receive `hello` → validate version → resume by reconnect token or
//!      authenticate the credential
//!   2. Send `welcome` → player is connected
//!   3. Pump task forwards room broadcasts to the socket, in order
//!   4. Loop: decode intent envelopes → route to the room layer → ack each
//!      correlation exactly once
//!
//! The acting player id on every routed intent is the authenticated one —
//! payloads never carry identity.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use cardforge_protocol::{
    AckData, AckResult, ClientFrame, ClientIntent, Codec, PlayerId, ProtocolError, RoomId,
    ServerEvent, ServerFrame,
};
use cardforge_room::{DrawOutcome, GameIntent, IntentOutcome, MemberSender};
use cardforge_session::Authenticator;
use tokio::sync::mpsc;

use crate::server::{PROTOCOL_VERSION, ServerState};
use crate::ws::WsConnection;
use crate::{GatewayError, MatchStore};

/// Drop guard that cleans up a player's footprint when the handler exits:
/// session marked disconnected, room membership removed (broadcasting
/// `player-disconnected`), empty room destroyed. Runs even on panic; since
/// `Drop` is synchronous the async work is spawned fire-and-forget.
struct DisconnectGuard<A, C, S>
where
    A: Authenticator,
    C: Codec,
    S: MatchStore,
{
    player_id: PlayerId,
    state: Arc<ServerState<A, C, S>>,
    room: Arc<StdMutex<Option<RoomId>>>,
}

impl<A, C, S> Drop for DisconnectGuard<A, C, S>
where
    A: Authenticator,
    C: Codec,
    S: MatchStore,
{
    fn drop(&mut self) {
        let player_id = self.player_id.clone();
        let state = Arc::clone(&self.state);
        let room = self.room.lock().expect("room tracker poisoned").take();
        tokio::spawn(async move {
            if let Some(room_id) = room {
                let mut registry = state.registry.lock().await;
                if let Err(e) = registry.disconnect(&room_id, player_id.clone()).await {
                    tracing::debug!(%player_id, error = %e, "disconnect cleanup failed");
                }
            }
            let mut sessions = state.sessions.lock().await;
            let _ = sessions.disconnect(&player_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C, S>(
    conn: WsConnection,
    state: Arc<ServerState<A, C, S>>,
) -> Result<(), GatewayError>
where
    A: Authenticator,
    C: Codec,
    S: MatchStore,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: handshake ---
    let player_id = perform_handshake(&conn, &state).await?;
    tracing::info!(%conn_id, %player_id, "player connected");

    // --- Step 2: broadcast pump ---
    // Room actors push events into this channel; the pump serializes them
    // onto the socket in arrival order.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let pump = {
        let conn = Arc::clone(&conn);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                let frame = ServerFrame::Event { event };
                let bytes = match state.codec.encode(&frame) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to encode event");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    let tracked_room: Arc<StdMutex<Option<RoomId>>> = Arc::new(StdMutex::new(None));
    let _guard = DisconnectGuard {
        player_id: player_id.clone(),
        state: Arc::clone(&state),
        room: Arc::clone(&tracked_room),
    };

    // --- Step 3: intent loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let frame: ClientFrame = match state.codec.decode(&data) {
            Ok(frame) => frame,
            Err(e) => {
                // Malformed payloads are rejected here, before the state
                // machine ever sees them.
                tracing::debug!(%player_id, error = %e, "failed to decode frame");
                send_error(&conn, &state.codec, 400, "malformed frame").await?;
                continue;
            }
        };

        match frame {
            ClientFrame::Hello { .. } => {
                send_error(&conn, &state.codec, 400, "already connected").await?;
            }
            ClientFrame::Intent {
                correlation,
                intent,
            } => {
                let result =
                    dispatch_intent(&state, &player_id, &event_tx, &tracked_room, intent).await;
                let ack = ServerFrame::Ack {
                    correlation,
                    result,
                };
                let bytes = state.codec.encode(&ack)?;
                conn.send(&bytes).await.map_err(GatewayError::Transport)?;
            }
        }
    }

    pump.abort();
    // _guard drops here → session + membership cleanup fires.
    Ok(())
}

/// Performs the handshake: `hello` in, `welcome` out.
///
/// The credential is first tried as a reconnection token — a returning
/// player resumes their session without re-authenticating — and otherwise
/// handed to the external authenticator.
async fn perform_handshake<A, C, S>(
    conn: &WsConnection,
    state: &Arc<ServerState<A, C, S>>,
) -> Result<PlayerId, GatewayError>
where
    A: Authenticator,
    C: Codec,
    S: MatchStore,
{
    let data = match tokio::time::timeout(Duration::from_secs(5), conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(GatewayError::Protocol(ProtocolError::InvalidFrame(
                "connection closed before handshake".into(),
            )));
        }
        Ok(Err(e)) => return Err(GatewayError::Transport(e)),
        Err(_) => {
            return Err(GatewayError::Protocol(ProtocolError::InvalidFrame(
                "handshake timed out".into(),
            )));
        }
    };

    let frame: ClientFrame = state.codec.decode(&data)?;
    let (version, token) = match frame {
        ClientFrame::Hello { version, token } => (version, token),
        _ => {
            send_error(conn, &state.codec, 400, "expected hello").await?;
            return Err(GatewayError::Protocol(ProtocolError::InvalidFrame(
                "first frame must be hello".into(),
            )));
        }
    };

    if version != PROTOCOL_VERSION {
        send_error(
            conn,
            &state.codec,
            400,
            &format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
        )
        .await?;
        return Err(GatewayError::Protocol(ProtocolError::InvalidFrame(
            "protocol version mismatch".into(),
        )));
    }

    // A returning player presents the reconnect token from their previous
    // welcome; anything else goes to the authenticator.
    let resumed = {
        let mut sessions = state.sessions.lock().await;
        sessions
            .reconnect(&token)
            .map(|s| (s.player_id.clone(), s.reconnect_token.clone()))
            .ok()
    };

    let (player_id, reconnect_token) = match resumed {
        Some(resumed) => resumed,
        None => {
            let player_id = match state.auth.authenticate(&token).await {
                Ok(player_id) => player_id,
                Err(e) => {
                    send_error(conn, &state.codec, 401, "unauthorized").await?;
                    return Err(GatewayError::Session(e));
                }
            };
            let mut sessions = state.sessions.lock().await;
            match sessions.create(player_id.clone()) {
                Ok(session) => (player_id, session.reconnect_token.clone()),
                Err(e) => {
                    send_error(conn, &state.codec, 409, "already connected").await?;
                    return Err(GatewayError::Session(e));
                }
            }
        }
    };

    let welcome = ServerFrame::Welcome {
        player_id: player_id.clone(),
        reconnect_token,
    };
    let bytes = state.codec.encode(&welcome)?;
    conn.send(&bytes).await.map_err(GatewayError::Transport)?;

    Ok(player_id)
}

/// Routes one intent and shapes its acknowledgment. Rule rejections come
/// back as structured failures; only transport faults propagate upward.
async fn dispatch_intent<A, C, S>(
    state: &Arc<ServerState<A, C, S>>,
    player_id: &PlayerId,
    event_tx: &MemberSender,
    tracked_room: &Arc<StdMutex<Option<RoomId>>>,
    intent: ClientIntent,
) -> AckResult
where
    A: Authenticator,
    C: Codec,
    S: MatchStore,
{
    match intent {
        ClientIntent::JoinRoom {
            room_id,
            player_name,
        } => {
            let (handle, created) = {
                let mut registry = state.registry.lock().await;
                registry.create_or_get(&room_id)
            };
            // Boundary write, outside any room critical section.
            if created {
                state.store.room_created(room_id.clone()).await;
            }
            match handle
                .join(player_id.clone(), player_name, event_tx.clone())
                .await
            {
                Ok(room) => {
                    *tracked_room.lock().expect("room tracker poisoned") = Some(room_id);
                    AckResult::with(AckData::RoomJoined { room })
                }
                Err(e) => AckResult::err(e.code(), e.to_string()),
            }
        }

        ClientIntent::LeaveRoom { room_id } => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry.leave(&room_id, player_id.clone()).await
            };
            match result {
                Ok(()) => {
                    let mut tracked = tracked_room.lock().expect("room tracker poisoned");
                    if tracked.as_ref() == Some(&room_id) {
                        *tracked = None;
                    }
                    AckResult::ok()
                }
                Err(e) => AckResult::err(e.code(), e.to_string()),
            }
        }

        ClientIntent::StartGame { room_id } => {
            room_intent(state, &room_id, player_id, GameIntent::Start).await
        }
        ClientIntent::PlayCard {
            room_id,
            card_id,
            declared_color,
        } => {
            room_intent(
                state,
                &room_id,
                player_id,
                GameIntent::Play {
                    card_id,
                    declared_color,
                },
            )
            .await
        }
        ClientIntent::DrawCard { room_id } => {
            room_intent(state, &room_id, player_id, GameIntent::Draw).await
        }
        ClientIntent::CallUno { room_id } => {
            room_intent(state, &room_id, player_id, GameIntent::CallUno).await
        }
        ClientIntent::Challenge {
            room_id,
            target_player_id,
        } => {
            room_intent(
                state,
                &room_id,
                player_id,
                GameIntent::Challenge {
                    target: target_player_id,
                },
            )
            .await
        }
    }
}

/// Submits a game intent to the addressed room and maps the outcome onto
/// the ack payload.
async fn room_intent<A, C, S>(
    state: &Arc<ServerState<A, C, S>>,
    room_id: &RoomId,
    player_id: &PlayerId,
    intent: GameIntent,
) -> AckResult
where
    A: Authenticator,
    C: Codec,
    S: MatchStore,
{
    let handle = {
        let registry = state.registry.lock().await;
        registry.get(room_id)
    };
    let Some(handle) = handle else {
        return AckResult::err("RoomNotFound", format!("room {room_id} not found"));
    };

    match handle.intent(player_id.clone(), intent).await {
        Ok(IntentOutcome::Started) => AckResult::ok(),
        Ok(IntentOutcome::Played { result }) => {
            if let Some(result) = result {
                // Final-match record: another boundary write, after the
                // room has already committed and broadcast.
                state
                    .store
                    .match_finished(room_id.clone(), result)
                    .await;
            }
            AckResult::ok()
        }
        Ok(IntentOutcome::Drew(DrawOutcome::Drew(card))) => {
            AckResult::with(AckData::CardDrawn { card })
        }
        Ok(IntentOutcome::Drew(DrawOutcome::PenaltyAccepted(cards))) => {
            AckResult::with(AckData::PenaltyDrawn { cards })
        }
        Ok(IntentOutcome::UnoCalled) => AckResult::ok(),
        Ok(IntentOutcome::Challenged { success }) => {
            AckResult::with(AckData::ChallengeOutcome { success })
        }
        Err(e) => AckResult::err(e.code(), e.to_string()),
    }
}

/// Sends a connection-level error frame.
async fn send_error(
    conn: &WsConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), GatewayError> {
    let frame = ServerFrame::Error {
        code,
        message: message.to_string(),
    };
    let bytes = codec.encode(&frame)?;
    conn.send(&bytes).await.map_err(GatewayError::Transport)?;
    Ok(())
}
