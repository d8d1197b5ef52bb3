//! End-of-round hand scoring.

use crate::{Card, CardType};

/// Points a losing hand is worth to the winner: face value for numbers,
/// 20 for Skip/Reverse/DrawTwo, 50 for Wild/WildDrawFour/CustomBlank.
pub fn score_hand(hand: &[Card]) -> u32 {
    hand.iter()
        .map(|card| match card.kind {
            CardType::Number => u32::from(card.number.unwrap_or(0)),
            CardType::Skip | CardType::Reverse | CardType::DrawTwo => 20,
            CardType::Wild | CardType::WildDrawFour | CardType::CustomBlank => 50,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardColor, CardId};

    fn card(kind: CardType, number: Option<u8>) -> Card {
        Card {
            id: CardId(0),
            color: if matches!(
                kind,
                CardType::Wild | CardType::WildDrawFour | CardType::CustomBlank
            ) {
                CardColor::Wild
            } else {
                CardColor::Red
            },
            kind,
            number,
            custom_rule: None,
        }
    }

    #[test]
    fn test_score_hand_mixed() {
        // Number 7 + Skip + Wild = 7 + 20 + 50.
        let hand = [
            card(CardType::Number, Some(7)),
            card(CardType::Skip, None),
            card(CardType::Wild, None),
        ];
        assert_eq!(score_hand(&hand), 77);
    }

    #[test]
    fn test_score_hand_empty_is_zero() {
        assert_eq!(score_hand(&[]), 0);
    }

    #[test]
    fn test_score_hand_action_values() {
        assert_eq!(score_hand(&[card(CardType::Reverse, None)]), 20);
        assert_eq!(score_hand(&[card(CardType::DrawTwo, None)]), 20);
        assert_eq!(score_hand(&[card(CardType::WildDrawFour, None)]), 50);
        assert_eq!(score_hand(&[card(CardType::CustomBlank, None)]), 50);
    }
}
