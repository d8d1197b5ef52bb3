//! Move legality predicates.
//!
//! Pure functions over card values — the session controller decides *when*
//! to consult them, these decide *whether* a play is legal.

use crate::{Card, CardColor, CardType};

/// Whether `card` may be played on `top_card` under `active_color`.
///
/// `active_color` is the color in force after a prior Wild was played and a
/// color declared; it overrides the top card's own color for matching.
/// Rules, in order:
///
/// 1. No top card yet → any card is legal.
/// 2. A wild-colored card is always legal (a declaration follows).
/// 3. A card matching a concrete `active_color` is legal.
/// 4. A card matching the top card's color is legal.
/// 5. A card matching the top card's type is legal (Skip-on-Skip, any
///    colors).
/// 6. Two Number cards with equal numbers are legal regardless of color.
/// 7. Otherwise illegal.
pub fn is_valid_move(card: &Card, top_card: Option<&Card>, active_color: Option<CardColor>) -> bool {
    let Some(top) = top_card else {
        return true;
    };

    if card.color.is_wild() {
        return true;
    }

    if let Some(active) = active_color {
        if !active.is_wild() && card.color == active {
            return true;
        }
    }

    if card.color == top.color {
        return true;
    }

    if card.kind == top.kind {
        return true;
    }

    card.kind == CardType::Number && top.kind == CardType::Number && card.number == top.number
}

/// The subset of `hand` that is currently legal to play.
pub fn playable_cards<'a>(
    hand: &'a [Card],
    top_card: Option<&Card>,
    active_color: Option<CardColor>,
) -> Vec<&'a Card> {
    hand.iter()
        .filter(|card| is_valid_move(card, top_card, active_color))
        .collect()
}

/// Whether a WildDrawFour play was legal: the player must have held no
/// card of the declared color. An absent or Wild declared color is never
/// legal.
///
/// `hand_at_play` is the player's hand at the moment of the play (minus
/// the WildDrawFour itself) — a challenger inspects that snapshot, not the
/// live hand, to decide whether the accused bluffed.
pub fn is_wild_draw_four_legal(hand_at_play: &[Card], declared: Option<CardColor>) -> bool {
    let Some(color) = declared else {
        return false;
    };
    if color.is_wild() {
        return false;
    }
    !hand_at_play.iter().any(|card| card.color == color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CardId;

    fn number(id: u32, color: CardColor, n: u8) -> Card {
        Card {
            id: CardId(id),
            color,
            kind: CardType::Number,
            number: Some(n),
            custom_rule: None,
        }
    }

    fn action(id: u32, color: CardColor, kind: CardType) -> Card {
        Card {
            id: CardId(id),
            color,
            kind,
            number: None,
            custom_rule: None,
        }
    }

    fn wild(id: u32, kind: CardType) -> Card {
        Card {
            id: CardId(id),
            color: CardColor::Wild,
            kind,
            number: None,
            custom_rule: None,
        }
    }

    #[test]
    fn test_any_card_is_legal_on_empty_top() {
        let cards = [
            number(0, CardColor::Red, 5),
            action(1, CardColor::Blue, CardType::Skip),
            wild(2, CardType::WildDrawFour),
        ];
        for card in &cards {
            assert!(is_valid_move(card, None, None));
        }
    }

    #[test]
    fn test_wild_cards_are_always_legal() {
        let top = number(0, CardColor::Red, 5);
        assert!(is_valid_move(&wild(1, CardType::Wild), Some(&top), None));
        assert!(is_valid_move(
            &wild(2, CardType::WildDrawFour),
            Some(&top),
            Some(CardColor::Green)
        ));
    }

    #[test]
    fn test_active_color_overrides_top_card_color() {
        // Top is a Wild that was declared blue: a blue card is legal even
        // though the top card's own color is wild.
        let top = wild(0, CardType::Wild);
        let blue = number(1, CardColor::Blue, 3);
        assert!(is_valid_move(&blue, Some(&top), Some(CardColor::Blue)));

        let red = number(2, CardColor::Red, 3);
        assert!(!is_valid_move(&red, Some(&top), Some(CardColor::Blue)));
    }

    #[test]
    fn test_color_match_is_legal() {
        let top = number(0, CardColor::Yellow, 2);
        assert!(is_valid_move(
            &action(1, CardColor::Yellow, CardType::DrawTwo),
            Some(&top),
            None
        ));
    }

    #[test]
    fn test_type_match_is_legal_across_colors() {
        let top = action(0, CardColor::Red, CardType::Skip);
        assert!(is_valid_move(
            &action(1, CardColor::Green, CardType::Skip),
            Some(&top),
            None
        ));
    }

    #[test]
    fn test_equal_numbers_match_across_colors() {
        let top = number(0, CardColor::Red, 7);
        assert!(is_valid_move(&number(1, CardColor::Blue, 7), Some(&top), None));
    }

    #[test]
    fn test_mismatched_card_is_illegal() {
        let top = number(0, CardColor::Red, 7);
        assert!(!is_valid_move(
            &number(1, CardColor::Blue, 3),
            Some(&top),
            None
        ));
        assert!(!is_valid_move(
            &action(2, CardColor::Green, CardType::Skip),
            Some(&top),
            None
        ));
    }

    #[test]
    fn test_number_cards_with_different_numbers_do_not_type_match() {
        // Both are Number-typed, but rule 5 must not fire for unequal
        // numbers of different colors.
        let top = number(0, CardColor::Red, 7);
        assert!(!is_valid_move(
            &number(1, CardColor::Blue, 8),
            Some(&top),
            None
        ));
    }

    #[test]
    fn test_playable_cards_filters_hand() {
        let top = number(0, CardColor::Red, 7);
        let hand = [
            number(1, CardColor::Red, 2),    // color match
            number(2, CardColor::Blue, 7),   // number match
            number(3, CardColor::Green, 1),  // illegal
            wild(4, CardType::Wild),         // wild
        ];
        let playable = playable_cards(&hand, Some(&top), None);
        let ids: Vec<u32> = playable.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn test_wild_draw_four_legal_without_declared_color_cards() {
        let hand = [number(0, CardColor::Red, 1), number(1, CardColor::Green, 2)];
        assert!(is_wild_draw_four_legal(&hand, Some(CardColor::Blue)));
    }

    #[test]
    fn test_wild_draw_four_illegal_when_holding_declared_color() {
        let hand = [number(0, CardColor::Blue, 1)];
        assert!(!is_wild_draw_four_legal(&hand, Some(CardColor::Blue)));
    }

    #[test]
    fn test_wild_draw_four_never_legal_without_concrete_declaration() {
        let hand = [number(0, CardColor::Red, 1)];
        assert!(!is_wild_draw_four_legal(&hand, None));
        assert!(!is_wild_draw_four_legal(&hand, Some(CardColor::Wild)));
    }
}
