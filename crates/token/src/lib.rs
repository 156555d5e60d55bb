//! Token data model for responses of the remote lexer service.

pub mod position;
pub mod sequence;
pub mod token;

pub use position::{PositionShape, SourcePoint, SourceSpan, TokenPosition};
pub use sequence::TokenSequence;
pub use token::Token;
