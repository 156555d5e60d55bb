use lexview_base::{lexview_message_error, project_revision, LexviewError, Result, TaskTimer};
use lexview_token::{PositionShape, TokenSequence};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use tracing::{debug, info, instrument, warn};

use crate::ClientConfig;

/// Requests tokenization results from a lexer service.
///
/// Each [`fetch_tokens`](Self::fetch_tokens) call sends exactly one request and
/// never retries or follows redirects; a 3xx answer is a transport error. The fetcher holds no mutable state, so one instance can serve
/// many concurrent calls; cloning it shares the underlying connection pool.
/// No timeout is applied; callers needing bounded latency wrap the call.
#[derive(Debug, Clone)]
pub struct TokenFetcher {
    http: Client,
    endpoint: Url,
    position_shape: PositionShape,
}

impl TokenFetcher {
    /// Creates a fetcher for the service described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoint_text = config.endpoint();
        let endpoint = Url::parse(&endpoint_text).map_err(|error| {
            lexview_message_error!("invalid lexer service URL `{endpoint_text}`")
                .with_std_source(error)
        })?;
        let http = Client::builder()
            .user_agent(format!("lexview/{}", project_revision()))
            .redirect(Policy::none())
            .build()
            .map_err(|error| {
                lexview_message_error!("failed to build HTTP client").with_std_source(error)
            })?;
        Ok(Self {
            http,
            endpoint,
            position_shape: config.position_shape,
        })
    }

    /// Full URL of the tokenization route this fetcher posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Position encoding expected in responses.
    pub fn position_shape(&self) -> PositionShape {
        self.position_shape
    }

    /// Sends `code` to the lexer service and returns the tokens it produced.
    ///
    /// Fails with [`ErrorKind::Transport`](lexview_base::ErrorKind::Transport) when
    /// the exchange cannot complete or the service answers with a non-success
    /// status, and with
    /// [`ErrorKind::MalformedResponse`](lexview_base::ErrorKind::MalformedResponse)
    /// when the body is not a token array in the configured shape.
    #[instrument(skip_all, fields(endpoint = %self.endpoint, code_len = code.len()))]
    pub async fn fetch_tokens(&self, code: &str) -> Result<TokenSequence> {
        let timer = TaskTimer::start("fetch tokens");
        debug!("sending tokenization request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(code.to_owned())
            .send()
            .await
            .map_err(|error| {
                warn!(%error, "lexer service unreachable");
                LexviewError::transport(None).with_std_source(error)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "lexer service rejected request");
            return Err(LexviewError::transport(Some(status.as_u16())));
        }

        let body = response.bytes().await.map_err(|error| {
            warn!(%error, "failed to read lexer service response");
            LexviewError::transport(None).with_std_source(error)
        })?;
        debug!(body_len = body.len(), "received lexer service response");

        let tokens = TokenSequence::decode(&body, self.position_shape).inspect_err(|error| {
            warn!(%error, "rejected lexer service response");
        })?;

        let timing = timer.finish();
        info!(
            token_count = tokens.len(),
            elapsed_ms = timing.elapsed_ms(),
            "tokenization completed"
        );
        Ok(tokens)
    }
}
