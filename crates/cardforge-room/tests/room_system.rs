//! Integration tests for the registry + room actor, driving real actor
//! tasks through handles and asserting on the broadcast streams.

use std::time::Duration;

use cardforge_protocol::{PlayerId, RoomId, ServerEvent};
use cardforge_room::{
    GameConfig, GameError, GameIntent, GameStatus, IntentOutcome, MemberSender, RoomError,
    RoomRegistry,
};
use tokio::sync::mpsc;

fn pid(id: &str) -> PlayerId {
    PlayerId::from(id)
}

fn rid(id: &str) -> RoomId {
    RoomId::from(id)
}

/// An event receiver paired with its sender half for joining.
fn member_channel() -> (MemberSender, mpsc::UnboundedReceiver<ServerEvent>) {
    mpsc::unbounded_channel()
}

/// Receives the next broadcast or panics after a timeout.
async fn recv(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Registry with two members joined to one room. Join broadcasts drained.
async fn two_player_room() -> (
    RoomRegistry,
    RoomId,
    mpsc::UnboundedReceiver<ServerEvent>,
    mpsc::UnboundedReceiver<ServerEvent>,
) {
    let mut registry = RoomRegistry::new(GameConfig::default());
    let room_id = rid("room-1");
    let (handle, created) = registry.create_or_get(&room_id);
    assert!(created);

    let (tx_a, mut rx_a) = member_channel();
    let (tx_b, mut rx_b) = member_channel();
    handle
        .join(pid("a"), "Ada".into(), tx_a)
        .await
        .expect("a joins");
    handle
        .join(pid("b"), "Bo".into(), tx_b)
        .await
        .expect("b joins");

    // a sees both joins, b sees only its own.
    let _ = recv(&mut rx_a).await;
    let _ = recv(&mut rx_a).await;
    let _ = recv(&mut rx_b).await;

    (registry, room_id, rx_a, rx_b)
}

#[tokio::test]
async fn test_create_or_get_is_idempotent() {
    let mut registry = RoomRegistry::new(GameConfig::default());

    let (_, created_first) = registry.create_or_get(&rid("r"));
    let (_, created_again) = registry.create_or_get(&rid("r"));

    assert!(created_first);
    assert!(!created_again);
    assert_eq!(registry.room_count(), 1);
}

#[tokio::test]
async fn test_join_broadcasts_and_summary() {
    let mut registry = RoomRegistry::new(GameConfig::default());
    let (handle, _) = registry.create_or_get(&rid("r"));

    let (tx_a, mut rx_a) = member_channel();
    let summary = handle.join(pid("a"), "Ada".into(), tx_a).await.unwrap();

    assert_eq!(summary.host_id, pid("a"), "first joiner hosts");
    assert_eq!(summary.members.len(), 1);

    // The joiner's own connection receives the broadcast too.
    let event = recv(&mut rx_a).await;
    assert!(matches!(
        event,
        ServerEvent::PlayerJoined { total_players: 1, .. }
    ));

    let (tx_b, _rx_b) = member_channel();
    let summary = handle.join(pid("b"), "Bo".into(), tx_b).await.unwrap();
    assert_eq!(summary.host_id, pid("a"), "host unchanged by later joins");
    assert_eq!(summary.members.len(), 2);
}

#[tokio::test]
async fn test_start_game_requires_host_and_two_players() {
    let mut registry = RoomRegistry::new(GameConfig::default());
    let (handle, _) = registry.create_or_get(&rid("r"));

    let (tx_a, mut rx_a) = member_channel();
    handle.join(pid("a"), "Ada".into(), tx_a).await.unwrap();
    let _ = recv(&mut rx_a).await;

    // Alone: host, but not enough players.
    let err = handle.intent(pid("a"), GameIntent::Start).await.unwrap_err();
    assert!(matches!(
        err,
        RoomError::Game(GameError::NotEnoughPlayers { have: 1 })
    ));

    let (tx_b, mut rx_b) = member_channel();
    handle.join(pid("b"), "Bo".into(), tx_b).await.unwrap();
    let _ = recv(&mut rx_a).await;
    let _ = recv(&mut rx_b).await;

    // Non-host cannot start.
    let err = handle.intent(pid("b"), GameIntent::Start).await.unwrap_err();
    assert!(matches!(err, RoomError::Game(GameError::NotHost)));

    // Host starts; both receive a personalized game-started.
    let outcome = handle.intent(pid("a"), GameIntent::Start).await.unwrap();
    assert!(matches!(outcome, IntentOutcome::Started));

    for rx in [&mut rx_a, &mut rx_b] {
        let event = recv(rx).await;
        let ServerEvent::GameStarted {
            hand,
            seats,
            current_player,
            ..
        } = event
        else {
            panic!("expected game-started, got {event:?}");
        };
        assert_eq!(hand.len(), 7);
        assert_eq!(seats.len(), 2);
        assert_eq!(current_player, pid("a"), "first joiner opens");
    }

    // A second start is rejected.
    let err = handle.intent(pid("a"), GameIntent::Start).await.unwrap_err();
    assert!(matches!(err, RoomError::Game(GameError::AlreadyStarted)));
}

#[tokio::test]
async fn test_intent_from_non_member_is_rejected() {
    let (registry, room_id, _rx_a, _rx_b) = two_player_room().await;
    let handle = registry.get(&room_id).unwrap();

    let err = handle
        .intent(pid("ghost"), GameIntent::Draw)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::NotInRoom(..)));
}

#[tokio::test]
async fn test_draw_respects_turn_order_and_broadcasts() {
    let (registry, room_id, mut rx_a, mut rx_b) = two_player_room().await;
    let handle = registry.get(&room_id).unwrap();

    handle.intent(pid("a"), GameIntent::Start).await.unwrap();
    let _ = recv(&mut rx_a).await; // game-started
    let _ = recv(&mut rx_b).await;

    // b is not the current player.
    let err = handle.intent(pid("b"), GameIntent::Draw).await.unwrap_err();
    assert!(matches!(err, RoomError::Game(GameError::NotYourTurn)));

    // a draws; both connections see the broadcast, only a's ack has the card.
    let outcome = handle.intent(pid("a"), GameIntent::Draw).await.unwrap();
    assert!(matches!(outcome, IntentOutcome::Drew(_)));

    for rx in [&mut rx_a, &mut rx_b] {
        let event = recv(rx).await;
        let ServerEvent::CardDrawn {
            player_id,
            count,
            hand_size,
            ..
        } = event
        else {
            panic!("expected card-drawn, got {event:?}");
        };
        assert_eq!(player_id, pid("a"));
        assert_eq!(count, 1);
        assert_eq!(hand_size, 8);
    }

    // A rejected intent produced no broadcast: channels are now empty.
    assert!(rx_a.try_recv().is_err());
    assert!(rx_b.try_recv().is_err());
}

#[tokio::test]
async fn test_host_leaving_reassigns_in_join_order() {
    let (mut registry, room_id, _rx_a, mut rx_b) = two_player_room().await;

    registry.leave(&room_id, pid("a")).await.unwrap();

    let event = recv(&mut rx_b).await;
    assert!(matches!(
        event,
        ServerEvent::PlayerLeft { remaining_players: 1, .. }
    ));
    let event = recv(&mut rx_b).await;
    assert!(matches!(
        event,
        ServerEvent::HostChanged { host_id } if host_id == pid("b")
    ));

    let info = registry.get(&room_id).unwrap().get_info().await.unwrap();
    assert_eq!(info.host_id, Some(pid("b")));
}

#[tokio::test]
async fn test_last_leave_destroys_the_room() {
    let (mut registry, room_id, _rx_a, _rx_b) = two_player_room().await;

    registry.leave(&room_id, pid("a")).await.unwrap();
    registry.leave(&room_id, pid("b")).await.unwrap();

    assert_eq!(registry.room_count(), 0, "empty room is deleted, hard rule");
    assert!(registry.get(&room_id).is_none());

    // Leaving a destroyed room reports not-found.
    let err = registry.leave(&room_id, pid("a")).await.unwrap_err();
    assert!(matches!(err, RoomError::NotFound(_)));
}

#[tokio::test]
async fn test_disconnect_preserves_seat_for_rejoin() {
    let (mut registry, room_id, mut rx_a, mut rx_b) = two_player_room().await;
    let handle = registry.get(&room_id).unwrap();

    handle.intent(pid("a"), GameIntent::Start).await.unwrap();
    let _ = recv(&mut rx_a).await;
    let _ = recv(&mut rx_b).await;

    // b's transport drops; the room survives with one member.
    registry.disconnect(&room_id, pid("b")).await.unwrap();
    let event = recv(&mut rx_a).await;
    assert!(matches!(
        event,
        ServerEvent::PlayerDisconnected { player_id } if player_id == pid("b")
    ));
    assert_eq!(registry.room_count(), 1);

    // b rejoins on a fresh connection and re-binds to the same match.
    let (tx_b2, _rx_b2) = member_channel();
    let handle = registry.get(&room_id).unwrap();
    handle.join(pid("b"), "Bo".into(), tx_b2).await.unwrap();

    let info = handle.get_info().await.unwrap();
    assert_eq!(info.member_count, 2);
    assert_eq!(
        info.status,
        Some(GameStatus::InProgress),
        "the in-flight match survived the drop"
    );

    // The game still remembers the deal: starting again is rejected.
    let err = handle.intent(pid("a"), GameIntent::Start).await.unwrap_err();
    assert!(matches!(err, RoomError::Game(GameError::AlreadyStarted)));
}

#[tokio::test]
async fn test_all_disconnected_destroys_the_room() {
    let (mut registry, room_id, _rx_a, _rx_b) = two_player_room().await;

    registry.disconnect(&room_id, pid("a")).await.unwrap();
    registry.disconnect(&room_id, pid("b")).await.unwrap();

    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_cross_room_operations_are_independent() {
    let mut registry = RoomRegistry::new(GameConfig::default());
    let (h1, _) = registry.create_or_get(&rid("r1"));
    let (h2, _) = registry.create_or_get(&rid("r2"));

    let (tx_a, _rx_a) = member_channel();
    let (tx_b, _rx_b) = member_channel();
    h1.join(pid("a"), "Ada".into(), tx_a).await.unwrap();
    h2.join(pid("b"), "Bo".into(), tx_b).await.unwrap();

    assert_eq!(registry.room_count(), 2);

    // Emptying one room leaves the other untouched.
    registry.leave(&rid("r1"), pid("a")).await.unwrap();
    assert_eq!(registry.room_count(), 1);
    assert!(registry.get(&rid("r2")).is_some());
}
