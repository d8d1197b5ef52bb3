//! The game session controller: a turn-based state machine over one room's
//! match.
//!
//! All mutation goes through the validated operations here — no other
//! component writes `GameState` fields. Every operation validates all of
//! its preconditions before touching state, so a rejection never leaves a
//! partial mutation behind. Successful operations return the broadcast
//! events describing what happened; the room actor fans them out in
//! mutation order.
//!
//! Within a running match a turn moves through: awaiting action → (wild
//! play) color declared with the play itself → (wild-draw-four play)
//! challenge window → effects applied, turn advanced → awaiting action for
//! the new current player, or finished when a hand empties.

use std::time::{Duration, Instant};

use cardforge_engine::{
    Card, CardColor, CardId, CardType, Direction, STARTING_HAND, create_deck, deal_initial_hands,
    is_heads_up, is_valid_move, is_wild_draw_four_legal, next_player_index, score_hand, shuffle,
};
use cardforge_protocol::{PlayerId, Recipient, ScoreEntry, SeatSummary, ServerEvent};
use rand::Rng;

use crate::GameError;

/// Tunables for one match.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Cards dealt per seat.
    pub starting_hand: usize,
    /// How long a wild-draw-four stays contestable.
    pub challenge_window: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_hand: STARTING_HAND,
            challenge_window: Duration::from_secs(30),
        }
    }
}

/// Match lifecycle. A room without a `GameState` is in the implicit
/// Waiting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Finished,
}

/// One seat in turn order. Seat order is fixed at deal time; it never
/// changes for the life of the match, even across disconnects.
#[derive(Debug, Clone)]
pub struct Seat {
    pub player_id: PlayerId,
    pub display_name: String,
    pub hand: Vec<Card>,
    pub score: u32,
    pub has_called_uno: bool,
    pub connected: bool,
}

/// An open wild-draw-four challenge window.
///
/// `hand_at_play` is the accused's hand as it stood immediately after the
/// wild-draw-four left it — the snapshot a challenge is judged against,
/// regardless of what the live hand looks like by then.
#[derive(Debug, Clone)]
pub struct PendingChallenge {
    pub accused: PlayerId,
    pub declared_color: CardColor,
    pub hand_at_play: Vec<Card>,
    pub deadline: Instant,
}

/// What a successful draw handed over: a single regular draw, or the
/// four-card penalty taken by accepting a pending wild-draw-four.
#[derive(Debug, Clone)]
pub enum DrawOutcome {
    Drew(Card),
    PenaltyAccepted(Vec<Card>),
}

/// Final result of a finished round, for the durable-store boundary.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub winner_id: PlayerId,
    pub scores: Vec<ScoreEntry>,
}

/// The authoritative state of one live match.
///
/// Card conservation is the load-bearing invariant: every card dealt at
/// the start is in exactly one of draw pile, discard pile, top card, or a
/// hand at all times. A violation is a bug, not a user error — it is
/// logged at error level and debug-asserted, never absorbed.
#[derive(Debug)]
pub struct GameState {
    status: GameStatus,
    seats: Vec<Seat>,
    current: usize,
    /// Top of the pile is the end of the vec (pop semantics).
    draw_pile: Vec<Card>,
    /// Face-up pile beneath the top card.
    discard_pile: Vec<Card>,
    top_card: Option<Card>,
    /// Color in force after a wild play, overriding the top card's color.
    active_color: Option<CardColor>,
    direction: Direction,
    pending_challenge: Option<PendingChallenge>,
    winner: Option<PlayerId>,
    finished_at: Option<Instant>,
    challenge_window: Duration,
    deck_size: usize,
}

impl GameState {
    /// Builds, shuffles, and deals a fresh match for `members` (seated in
    /// join order). Seat 0 opens, clockwise.
    ///
    /// The first face-up card is drawn from the pile, redrawing while it
    /// is a wild-draw-four (rejected cards go under the pile). Its action
    /// effect is not applied.
    pub fn deal<R: Rng + ?Sized>(
        members: &[(PlayerId, String)],
        config: &GameConfig,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if members.len() < 2 {
            return Err(GameError::NotEnoughPlayers {
                have: members.len(),
            });
        }

        let deck = create_deck();
        let deck_size = deck.len();
        let shuffled = shuffle(&deck, rng);
        let (hands, mut draw_pile) =
            deal_initial_hands(&shuffled, members.len(), config.starting_hand)?;

        let top_card = seed_top_card(&mut draw_pile).ok_or(GameError::NoCardsAvailable)?;

        let seats = members
            .iter()
            .zip(hands)
            .map(|((player_id, display_name), hand)| Seat {
                player_id: player_id.clone(),
                display_name: display_name.clone(),
                hand,
                score: 0,
                has_called_uno: false,
                connected: true,
            })
            .collect();

        let state = Self {
            status: GameStatus::InProgress,
            seats,
            current: 0,
            draw_pile,
            discard_pile: Vec::new(),
            top_card: Some(top_card),
            // A wild first flip leaves the color open.
            active_color: None,
            direction: Direction::Clockwise,
            pending_challenge: None,
            winner: None,
            finished_at: None,
            challenge_window: config.challenge_window,
            deck_size,
        };
        state.assert_conserved();
        Ok(state)
    }

    // -- Accessors --------------------------------------------------------

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn current_player_id(&self) -> &PlayerId {
        &self.seats[self.current].player_id
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    /// The open challenge window, if a wild-draw-four is awaiting a
    /// decision.
    pub fn pending_challenge(&self) -> Option<&PendingChallenge> {
        self.pending_challenge.as_ref()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Marks a seated player's connectivity without touching their hand.
    pub fn set_connected(&mut self, player: &PlayerId, connected: bool) {
        if let Some(seat) = self.seats.iter_mut().find(|s| &s.player_id == player) {
            seat.connected = connected;
        }
    }

    /// Public per-seat summaries (hand sizes, never cards).
    pub fn seat_summaries(&self) -> Vec<SeatSummary> {
        self.seats
            .iter()
            .map(|seat| SeatSummary {
                player_id: seat.player_id.clone(),
                player_name: seat.display_name.clone(),
                hand_size: seat.hand.len(),
                score: seat.score,
                connected: seat.connected,
            })
            .collect()
    }

    /// Personalized `game-started` events: each seat receives its own hand
    /// plus the public view of everyone.
    pub fn started_events(&self) -> Vec<(Recipient, ServerEvent)> {
        let seats = self.seat_summaries();
        let top_card = self
            .top_card
            .clone()
            .expect("a dealt game always has a top card");
        self.seats
            .iter()
            .map(|seat| {
                (
                    Recipient::Player(seat.player_id.clone()),
                    ServerEvent::GameStarted {
                        hand: seat.hand.clone(),
                        seats: seats.clone(),
                        top_card: top_card.clone(),
                        current_player: self.current_player_id().clone(),
                        direction: self.direction,
                    },
                )
            })
            .collect()
    }

    // -- Operations -------------------------------------------------------

    /// Plays `card_id` from the current player's hand.
    ///
    /// Validates turn ownership, hand membership, move legality, and the
    /// color declaration before mutating anything. Resolves card effects,
    /// advances the turn, and finishes the match when the hand empties.
    pub fn play_card<R: Rng + ?Sized>(
        &mut self,
        player: &PlayerId,
        card_id: CardId,
        declared_color: Option<CardColor>,
        rng: &mut R,
    ) -> Result<(Option<MatchResult>, Vec<(Recipient, ServerEvent)>), GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        let seat_index = self.seat_index(player)?;
        if seat_index != self.current {
            return Err(GameError::NotYourTurn);
        }
        // An open challenge window only admits challenge or accept-by-draw.
        if self.pending_challenge.is_some() {
            return Err(GameError::InvalidMove);
        }

        let seat = &self.seats[seat_index];
        let card_index = seat
            .hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::CardNotInHand)?;
        let card = seat.hand[card_index].clone();

        if !is_valid_move(&card, self.top_card.as_ref(), self.active_color) {
            return Err(GameError::InvalidMove);
        }

        let declared = if card.is_wild_colored() {
            match declared_color {
                Some(color) if !color.is_wild() => Some(color),
                _ => return Err(GameError::MissingColorDeclaration),
            }
        } else {
            None
        };

        // All preconditions hold — mutate.
        let seat = &mut self.seats[seat_index];
        seat.hand.remove(card_index);
        let new_hand_size = seat.hand.len();
        if let Some(previous_top) = self.top_card.replace(card.clone()) {
            self.discard_pile.push(previous_top);
        }
        self.active_color = declared;

        let mut events = Vec::new();
        let total = self.seats.len();

        let result = if new_hand_size == 0 {
            // The round ends the moment a hand empties; effects of the
            // final card are not applied.
            Some(self.finish(seat_index))
        } else {
            match card.kind {
                CardType::Skip => {
                    self.current = next_player_index(self.current, total, self.direction, 1);
                }
                CardType::Reverse => {
                    if is_heads_up(total) {
                        // Heads-up: Reverse behaves as Skip.
                        self.current = next_player_index(self.current, total, self.direction, 1);
                    } else {
                        self.direction = self.direction.flipped();
                        self.current = next_player_index(self.current, total, self.direction, 0);
                    }
                }
                CardType::DrawTwo => {
                    let victim = next_player_index(self.current, total, self.direction, 0);
                    let drawn = self.take_from_draw_pile(2, rng);
                    let victim_id = self.seats[victim].player_id.clone();
                    self.seats[victim].hand.extend(drawn.iter().cloned());
                    self.current = next_player_index(self.current, total, self.direction, 1);
                    events.push((
                        Recipient::All,
                        ServerEvent::CardDrawn {
                            player_id: victim_id,
                            count: drawn.len(),
                            hand_size: self.seats[victim].hand.len(),
                            current_player: self.current_player_id().clone(),
                        },
                    ));
                }
                CardType::WildDrawFour => {
                    // The turn passes to the would-be victim, who may
                    // challenge (or accept by drawing) before acting.
                    let snapshot = self.seats[seat_index].hand.clone();
                    self.pending_challenge = Some(PendingChallenge {
                        accused: player.clone(),
                        declared_color: declared.expect("validated above"),
                        hand_at_play: snapshot,
                        deadline: Instant::now() + self.challenge_window,
                    });
                    self.current = next_player_index(self.current, total, self.direction, 0);
                }
                CardType::Number | CardType::Wild | CardType::CustomBlank => {
                    self.current = next_player_index(self.current, total, self.direction, 0);
                }
            }
            None
        };

        // The play itself broadcasts first, then its side effects.
        events.insert(
            0,
            (
                Recipient::All,
                ServerEvent::CardPlayed {
                    player_id: player.clone(),
                    card,
                    declared_color: declared,
                    hand_size: new_hand_size,
                    current_player: self.current_player_id().clone(),
                },
            ),
        );

        if new_hand_size == 1 {
            events.push((
                Recipient::All,
                ServerEvent::UnoAlert {
                    player_id: player.clone(),
                },
            ));
        }
        if let Some(result) = &result {
            events.push((
                Recipient::All,
                ServerEvent::GameFinished {
                    winner_id: result.winner_id.clone(),
                    scores: result.scores.clone(),
                },
            ));
        }

        self.assert_conserved();
        Ok((result, events))
    }

    /// Draws for the current player.
    ///
    /// A regular draw pops one card and does not end the turn — the game
    /// still expects a play (there is no auto-pass here; that would be a
    /// gateway policy). While a challenge window is open, drawing instead
    /// accepts the four-card penalty and forfeits the turn.
    pub fn draw_card<R: Rng + ?Sized>(
        &mut self,
        player: &PlayerId,
        rng: &mut R,
    ) -> Result<(DrawOutcome, Vec<(Recipient, ServerEvent)>), GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        let seat_index = self.seat_index(player)?;
        if seat_index != self.current {
            return Err(GameError::NotYourTurn);
        }

        if self.pending_challenge.is_some() {
            return self.accept_penalty(seat_index, rng);
        }

        if self.draw_pile.is_empty() && self.discard_pile.is_empty() {
            return Err(GameError::NoCardsAvailable);
        }

        let mut drawn = self.take_from_draw_pile(1, rng);
        let card = drawn.pop().expect("pile verified non-empty above");
        self.seats[seat_index].hand.push(card.clone());

        let events = vec![(
            Recipient::All,
            ServerEvent::CardDrawn {
                player_id: player.clone(),
                count: 1,
                hand_size: self.seats[seat_index].hand.len(),
                current_player: self.current_player_id().clone(),
            },
        )];

        self.assert_conserved();
        Ok((DrawOutcome::Drew(card), events))
    }

    /// Declares UNO. Legal only with exactly one card in hand.
    pub fn call_uno(
        &mut self,
        player: &PlayerId,
    ) -> Result<Vec<(Recipient, ServerEvent)>, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        let seat_index = self.seat_index(player)?;
        if self.seats[seat_index].hand.len() != 1 {
            return Err(GameError::CannotCallUno);
        }

        self.seats[seat_index].has_called_uno = true;
        Ok(vec![(
            Recipient::All,
            ServerEvent::UnoCalled {
                player_id: player.clone(),
            },
        )])
    }

    /// Contests the pending wild-draw-four played by `target`.
    ///
    /// Judged against the accused's hand as it stood at play time. A
    /// successful challenge sends the four-card penalty back to the
    /// accused and the challenger keeps their turn; a failed one costs the
    /// challenger four cards and their turn.
    pub fn challenge<R: Rng + ?Sized>(
        &mut self,
        challenger: &PlayerId,
        target: &PlayerId,
        rng: &mut R,
    ) -> Result<(bool, Vec<(Recipient, ServerEvent)>), GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        let challenger_index = self.seat_index(challenger)?;
        let target_index = self.seat_index(target)?;

        let pending = self
            .pending_challenge
            .as_ref()
            .ok_or(GameError::ChallengeNotApplicable)?;
        let is_wdf_on_top = self
            .top_card
            .as_ref()
            .is_some_and(|c| c.kind == CardType::WildDrawFour);
        if !is_wdf_on_top
            || pending.accused != *target
            || challenger_index != self.current
            || Instant::now() > pending.deadline
        {
            return Err(GameError::ChallengeNotApplicable);
        }

        let legal = is_wild_draw_four_legal(&pending.hand_at_play, Some(pending.declared_color));
        self.pending_challenge = None;

        let total = self.seats.len();
        let success = !legal;
        let (loser_index, penalty_target) = if success {
            // Bluff caught: the accused takes the cards back fourfold and
            // the skip is forfeited — the challenger plays on.
            (target_index, target.clone())
        } else {
            (challenger_index, challenger.clone())
        };

        let drawn = self.take_from_draw_pile(4, rng);
        let penalty = drawn.len();
        self.seats[loser_index].hand.extend(drawn);
        if !success {
            self.current = next_player_index(self.current, total, self.direction, 0);
        }

        let events = vec![
            (
                Recipient::All,
                ServerEvent::ChallengeResult {
                    challenger_id: challenger.clone(),
                    target_id: target.clone(),
                    success,
                    penalty,
                    current_player: self.current_player_id().clone(),
                },
            ),
            (
                Recipient::All,
                ServerEvent::CardDrawn {
                    player_id: penalty_target,
                    count: penalty,
                    hand_size: self.seats[loser_index].hand.len(),
                    current_player: self.current_player_id().clone(),
                },
            ),
        ];

        self.assert_conserved();
        Ok((success, events))
    }

    // -- Internals --------------------------------------------------------

    fn seat_index(&self, player: &PlayerId) -> Result<usize, GameError> {
        self.seats
            .iter()
            .position(|s| &s.player_id == player)
            .ok_or(GameError::NotYourTurn)
    }

    /// Closes an open challenge window by taking the penalty: the current
    /// player draws four and their turn is skipped.
    fn accept_penalty<R: Rng + ?Sized>(
        &mut self,
        seat_index: usize,
        rng: &mut R,
    ) -> Result<(DrawOutcome, Vec<(Recipient, ServerEvent)>), GameError> {
        self.pending_challenge = None;

        let drawn = self.take_from_draw_pile(4, rng);
        self.seats[seat_index].hand.extend(drawn.iter().cloned());
        let player_id = self.seats[seat_index].player_id.clone();
        let total = self.seats.len();
        self.current = next_player_index(self.current, total, self.direction, 0);

        let events = vec![(
            Recipient::All,
            ServerEvent::CardDrawn {
                player_id,
                count: drawn.len(),
                hand_size: self.seats[seat_index].hand.len(),
                current_player: self.current_player_id().clone(),
            },
        )];

        self.assert_conserved();
        Ok((DrawOutcome::PenaltyAccepted(drawn), events))
    }

    /// Pops up to `n` cards, reshuffling the discard pile (the top card
    /// stays in place so play can continue) whenever the draw pile runs
    /// dry. Returns fewer than `n` only when every pile is exhausted.
    fn take_from_draw_pile<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Vec<Card> {
        let mut drawn = Vec::with_capacity(n);
        for _ in 0..n {
            if self.draw_pile.is_empty() && !self.discard_pile.is_empty() {
                let recycled = shuffle(&self.discard_pile, rng);
                self.discard_pile.clear();
                self.draw_pile = recycled;
                tracing::debug!(cards = self.draw_pile.len(), "reshuffled discard into draw pile");
            }
            match self.draw_pile.pop() {
                Some(card) => drawn.push(card),
                None => break,
            }
        }
        drawn
    }

    fn finish(&mut self, winner_index: usize) -> MatchResult {
        self.status = GameStatus::Finished;
        self.pending_challenge = None;
        self.finished_at = Some(Instant::now());

        let winner_id = self.seats[winner_index].player_id.clone();
        self.winner = Some(winner_id.clone());

        let mut scores = Vec::with_capacity(self.seats.len());
        for (i, seat) in self.seats.iter_mut().enumerate() {
            let points = if i == winner_index {
                0
            } else {
                score_hand(&seat.hand)
            };
            seat.score += points;
            scores.push(ScoreEntry {
                player_id: seat.player_id.clone(),
                score: points,
            });
        }

        tracing::info!(winner = %winner_id, "round finished");
        MatchResult { winner_id, scores }
    }

    /// Card conservation: everything dealt is in exactly one place.
    fn assert_conserved(&self) {
        let in_hands: usize = self.seats.iter().map(|s| s.hand.len()).sum();
        let total = self.draw_pile.len()
            + self.discard_pile.len()
            + usize::from(self.top_card.is_some())
            + in_hands;
        if total != self.deck_size {
            tracing::error!(
                expected = self.deck_size,
                actual = total,
                "card conservation violated"
            );
            debug_assert_eq!(total, self.deck_size, "card conservation violated");
        }
    }

    #[cfg(test)]
    fn counted(&self) -> usize {
        self.draw_pile.len()
            + self.discard_pile.len()
            + usize::from(self.top_card.is_some())
            + self.seats.iter().map(|s| s.hand.len()).sum::<usize>()
    }
}

/// Draws the opening face-up card, redrawing while it is a wild-draw-four
/// (rejected cards go under the pile). Falls back to accepting one if the
/// pile somehow holds nothing else.
fn seed_top_card(draw_pile: &mut Vec<Card>) -> Option<Card> {
    for _ in 0..=draw_pile.len() {
        let card = draw_pile.pop()?;
        let has_alternative = draw_pile.iter().any(|c| c.kind != CardType::WildDrawFour);
        if card.kind == CardType::WildDrawFour && has_alternative {
            draw_pile.insert(0, card);
        } else {
            return Some(card);
        }
    }
    None
}

// =========================================================================
// Tests
// =========================================================================
