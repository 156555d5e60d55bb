use lexview_base::SharedString;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use crate::position::{SourcePoint, SourceSpan, TokenPosition};

/// One lexical unit as produced by the lexer service.
///
/// Serializes to and deserializes from the wire form
/// `{"type": .., "attr": .., "location"|"position": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireToken", into = "WireToken")]
pub struct Token {
    /// Server-defined lexical category, e.g. `I_ID` or `S_SEMICOLON`.
    pub token_type: SharedString,
    /// Opaque numeric attribute, kept exactly as received so integers stay
    /// integers and float literal values stay floats.
    pub attr: Number,
    pub position: TokenPosition,
}

impl Token {
    /// Creates a token from its type name, attribute and position.
    pub fn new(
        token_type: impl Into<SharedString>,
        attr: impl Into<Number>,
        position: TokenPosition,
    ) -> Self {
        Self {
            token_type: token_type.into(),
            attr: attr.into(),
            position,
        }
    }

    /// Returns the attribute as an integer when it is one.
    pub fn attr_as_i64(&self) -> Option<i64> {
        self.attr.as_i64()
    }

    /// Returns the attribute as a float; integer attributes are widened.
    pub fn attr_as_f64(&self) -> Option<f64> {
        self.attr.as_f64()
    }
}

#[derive(Serialize, Deserialize)]
struct WireToken {
    #[serde(rename = "type")]
    token_type: SharedString,
    attr: Number,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    location: Option<SourceSpan>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    position: Option<SourcePoint>,
}

/// An absent position field is `None`; a present one must hold a value, `null`
/// included.
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TryFrom<WireToken> for Token {
    type Error = String;

    fn try_from(wire: WireToken) -> Result<Self, Self::Error> {
        let position = match (wire.location, wire.position) {
            (Some(span), None) => TokenPosition::Span(span),
            (None, Some(point)) => TokenPosition::Point(point),
            (Some(_), Some(_)) => {
                return Err("token carries both `location` and `position`".to_owned())
            }
            (None, None) => return Err("token has neither `location` nor `position`".to_owned()),
        };
        Ok(Self {
            token_type: wire.token_type,
            attr: wire.attr,
            position,
        })
    }
}

impl From<Token> for WireToken {
    fn from(token: Token) -> Self {
        let (location, position) = match token.position {
            TokenPosition::Span(span) => (Some(span), None),
            TokenPosition::Point(point) => (None, Some(point)),
        };
        Self {
            token_type: token.token_type,
            attr: token.attr,
            location,
            position,
        }
    }
}
