use lexview_base::{LexviewError, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::position::PositionShape;
use crate::token::Token;

/// Ordered tokens of one tokenization request, in source order.
///
/// Every token uses the same [`PositionShape`]; construction rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSequence {
    shape: PositionShape,
    tokens: Vec<Token>,
}

impl TokenSequence {
    /// Builds a sequence, checking that every token uses `shape`.
    pub fn new(shape: PositionShape, tokens: Vec<Token>) -> Result<Self> {
        if let Some((index, token)) = tokens
            .iter()
            .enumerate()
            .find(|(_, token)| token.position.shape() != shape)
        {
            return Err(LexviewError::malformed_response(format!(
                "token {index} uses `{}` but this client expects `{}`",
                token.position.shape().field_name(),
                shape.field_name()
            )));
        }
        Ok(Self { shape, tokens })
    }

    /// Decodes a lexer service response body.
    ///
    /// The body must be a JSON array of tokens that all use `shape`. A single bad
    /// element rejects the whole body.
    pub fn decode(body: &[u8], shape: PositionShape) -> Result<Self> {
        let elements = serde_json::from_slice::<Vec<Value>>(body).map_err(|error| {
            LexviewError::malformed_response("expected a JSON array of tokens")
                .with_std_source(error)
        })?;

        let mut tokens = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            let token = serde_json::from_value::<Token>(element).map_err(|error| {
                LexviewError::malformed_response(format!("token {index}: {error}"))
                    .with_std_source(error)
            })?;
            tokens.push(token);
        }

        Self::new(shape, tokens)
    }

    /// Position shape shared by every token.
    pub fn shape(&self) -> PositionShape {
        self.shape
    }

    /// Tokens in source order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` when the service produced no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Leftmost token, if any.
    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// Iterates over the tokens in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Encodes the tokens back into the wire JSON array.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|error| {
            lexview_base::lexview_message_error!("failed to encode tokens").with_std_source(error)
        })
    }
}

impl Serialize for TokenSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.tokens.serialize(serializer)
    }
}
