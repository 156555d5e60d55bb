use lexview_base::{lexview_message_error, Result};
use lexview_token::PositionShape;

/// Base URL used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
/// Environment variable overriding [`ClientConfig::server_url`].
pub const SERVER_URL_ENV: &str = "LEXVIEW_SERVER_URL";
/// Environment variable overriding [`ClientConfig::position_shape`].
pub const POSITION_SHAPE_ENV: &str = "LEXVIEW_POSITION_SHAPE";

const LEXER_ROUTE: &str = "/lexer";

/// Connection settings for one lexer service deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the lexer service, e.g. `http://localhost:8000`.
    pub server_url: String,
    /// Position encoding this deployment's service emits.
    pub position_shape: PositionShape,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl ClientConfig {
    /// Creates a config for `server_url` with the default position shape.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            position_shape: PositionShape::default(),
        }
    }

    /// Replaces the expected position shape.
    pub fn with_position_shape(mut self, position_shape: PositionShape) -> Self {
        self.position_shape = position_shape;
        self
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value
    /// (`|name| std::env::var(name).ok()` for the process environment).
    ///
    /// Unset and blank variables both fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();
        if let Some(server_url) = non_blank(SERVER_URL_ENV) {
            config.server_url = server_url.trim().to_owned();
        }
        if let Some(shape) = non_blank(POSITION_SHAPE_ENV) {
            config.position_shape = shape.parse().map_err(|error| {
                lexview_message_error!("invalid {POSITION_SHAPE_ENV}").with_source(error)
            })?;
        }
        Ok(config)
    }

    /// Full URL of the tokenization route.
    ///
    /// One trailing `/` on the base URL is ignored.
    pub fn endpoint(&self) -> String {
        let base = self
            .server_url
            .strip_suffix('/')
            .unwrap_or(&self.server_url);
        format!("{base}{LEXER_ROUTE}")
    }
}
