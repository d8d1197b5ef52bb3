//! The card model.
//!
//! Closed sum/record types tagged by [`CardType`], so illegal card shapes
//! are unrepresentable past the decode boundary: a Skip can't carry a
//! number, a card can't have an out-of-range color. The JSON field names
//! are part of the wire format and pinned by tests.

use serde::{Deserialize, Serialize};

use std::fmt;

/// A card's identity, unique within one deck instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

/// Card color. `Wild` is the color of the four wild-type cards; it never
/// matches a concrete color in legality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Red,
    Blue,
    Green,
    Yellow,
    Wild,
}

impl CardColor {
    /// The four concrete colors, in deck-composition order.
    pub const CONCRETE: [CardColor; 4] = [
        CardColor::Red,
        CardColor::Blue,
        CardColor::Green,
        CardColor::Yellow,
    ];

    /// Returns `true` for the `Wild` pseudo-color.
    pub fn is_wild(self) -> bool {
        matches!(self, CardColor::Wild)
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CardColor::Red => "red",
            CardColor::Blue => "blue",
            CardColor::Green => "green",
            CardColor::Yellow => "yellow",
            CardColor::Wild => "wild",
        };
        write!(f, "{s}")
    }
}

/// Card kind. Wire tags use camelCase to match the client protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardType {
    Number,
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
    CustomBlank,
}

/// An immutable card value.
///
/// `number` is present exactly when `kind` is [`CardType::Number`];
/// `custom_rule` only ever appears on [`CardType::CustomBlank`] cards that
/// a table has written a rule onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub color: CardColor,
    #[serde(rename = "type")]
    pub kind: CardType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_rule: Option<String>,
}

impl Card {
    /// Returns `true` for Wild and WildDrawFour (and blank) cards — the
    /// ones whose play requires a color declaration.
    pub fn is_wild_colored(&self) -> bool {
        self.color.is_wild()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CardType::Number => {
                write!(f, "{} {}", self.color, self.number.unwrap_or(0))
            }
            CardType::Skip => write!(f, "{} skip", self.color),
            CardType::Reverse => write!(f, "{} reverse", self.color),
            CardType::DrawTwo => write!(f, "{} draw-two", self.color),
            CardType::Wild => write!(f, "wild"),
            CardType::WildDrawFour => write!(f, "wild draw-four"),
            CardType::CustomBlank => write!(f, "custom blank"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&CardId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_color_wire_tags_are_lowercase() {
        assert_eq!(serde_json::to_string(&CardColor::Red).unwrap(), "\"red\"");
        assert_eq!(serde_json::to_string(&CardColor::Wild).unwrap(), "\"wild\"");
    }

    #[test]
    fn test_type_wire_tags_are_camel_case() {
        assert_eq!(
            serde_json::to_string(&CardType::WildDrawFour).unwrap(),
            "\"wildDrawFour\""
        );
        assert_eq!(
            serde_json::to_string(&CardType::DrawTwo).unwrap(),
            "\"drawTwo\""
        );
    }

    #[test]
    fn test_number_card_json_shape() {
        let card = Card {
            id: CardId(3),
            color: CardColor::Green,
            kind: CardType::Number,
            number: Some(7),
            custom_rule: None,
        };
        let json: serde_json::Value = serde_json::to_value(&card).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["color"], "green");
        assert_eq!(json["type"], "number");
        assert_eq!(json["number"], 7);
        // Absent options are omitted, not null.
        assert!(json.get("custom_rule").is_none());
    }

    #[test]
    fn test_action_card_omits_number() {
        let card = Card {
            id: CardId(9),
            color: CardColor::Red,
            kind: CardType::Skip,
            number: None,
            custom_rule: None,
        };
        let json: serde_json::Value = serde_json::to_value(&card).unwrap();
        assert!(json.get("number").is_none());
    }

    #[test]
    fn test_display_formats() {
        let card = Card {
            id: CardId(0),
            color: CardColor::Blue,
            kind: CardType::Number,
            number: Some(4),
            custom_rule: None,
        };
        assert_eq!(card.to_string(), "blue 4");
    }
}
