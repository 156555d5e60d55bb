//! HTTP client for the remote lexer service.

pub mod config;
pub mod fetcher;

pub use config::ClientConfig;
pub use fetcher::TokenFetcher;
pub use lexview_token::{PositionShape, Token, TokenSequence};

#[cfg(test)]
mod tests;
