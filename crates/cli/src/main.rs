use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lexview_base::{lexview_message_error, project_revision, LexviewError, Result};
use lexview_client::config::{POSITION_SHAPE_ENV, SERVER_URL_ENV};
use lexview_client::{ClientConfig, TokenFetcher};
use lexview_token::{PositionShape, TokenSequence};
use pico_args::Arguments;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, instrument};

const USAGE: &str = "\
usage: lexview [--server URL] [--shape span|point] [--format table|json]
               [--timeout-ms N] [--version] [FILE]

Sends FILE (or stdin when FILE is absent or `-`) to the lexer service and
prints the returned tokens.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CliOptions {
    server_url: Option<String>,
    position_shape: Option<PositionShape>,
    format: OutputFormat,
    timeout: Option<Duration>,
    input: Option<PathBuf>,
    show_version: bool,
    show_help: bool,
}

impl CliOptions {
    /// Applies command-line overrides on top of an environment-derived config.
    fn apply_to(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(server_url) = &self.server_url {
            config.server_url = server_url.clone();
        }
        if let Some(shape) = self.position_shape {
            config.position_shape = shape;
        }
        config
    }
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut pargs = Arguments::from_vec(args.iter().skip(1).map(OsString::from).collect());

    let show_help = pargs.contains(["-h", "--help"]);
    let show_version = pargs.contains("--version");
    let server_url = pargs
        .opt_value_from_str("--server")
        .map_err(argument_error)?;
    let position_shape = pargs
        .opt_value_from_fn("--shape", parse_shape)
        .map_err(argument_error)?;
    let format = pargs
        .opt_value_from_fn("--format", parse_format)
        .map_err(argument_error)?
        .unwrap_or_default();
    let timeout = pargs
        .opt_value_from_str::<_, u64>("--timeout-ms")
        .map_err(argument_error)?
        .map(Duration::from_millis);
    let input = pargs
        .opt_free_from_str::<PathBuf>()
        .map_err(argument_error)?;

    if let Some(flag) = input
        .as_deref()
        .filter(|path| *path != Path::new("-"))
        .and_then(Path::to_str)
        .filter(|path| path.starts_with('-'))
    {
        return Err(lexview_message_error!("unknown option {flag}\n\n{USAGE}"));
    }
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(lexview_message_error!(
            "unexpected arguments {remaining:?}\n\n{USAGE}"
        ));
    }

    Ok(CliOptions {
        server_url,
        position_shape,
        format,
        timeout,
        input,
        show_version,
        show_help,
    })
}

fn parse_shape(value: &str) -> Result<PositionShape> {
    value.parse()
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    match value {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        other => Err(lexview_message_error!(
            "unknown output format `{other}`, expected `table` or `json`"
        )),
    }
}

fn argument_error(error: pico_args::Error) -> LexviewError {
    lexview_message_error!("{error}\n\n{USAGE}")
}

/// Builds the client config from `lookup` (the environment) and the flags.
///
/// Variables shadowed by a flag are not read, so a bad value there cannot fail a
/// run that overrides it.
fn resolve_config(
    options: &CliOptions,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig> {
    let config = ClientConfig::from_lookup(|name| {
        let overridden = match name {
            SERVER_URL_ENV => options.server_url.is_some(),
            POSITION_SHAPE_ENV => options.position_shape.is_some(),
            _ => false,
        };
        if overridden {
            None
        } else {
            lookup(name)
        }
    })?;
    Ok(options.apply_to(config))
}

async fn read_source(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            debug!(path = %path.display(), "reading source file");
            tokio::fs::read_to_string(path).await.map_err(|error| {
                lexview_message_error!("failed to read source file {}", path.display())
                    .with_source(LexviewError::from(error))
            })
        }
        _ => {
            debug!("reading source from stdin");
            let mut source = String::new();
            tokio::io::stdin()
                .read_to_string(&mut source)
                .await
                .map_err(|error| {
                    lexview_message_error!("failed to read source from stdin")
                        .with_source(LexviewError::from(error))
                })?;
            Ok(source)
        }
    }
}

#[instrument(skip_all, fields(endpoint = %fetcher.endpoint()))]
async fn fetch_with_deadline(
    fetcher: &TokenFetcher,
    source: &str,
    timeout: Option<Duration>,
) -> Result<TokenSequence> {
    match timeout {
        None => fetcher.fetch_tokens(source).await,
        Some(limit) => tokio::time::timeout(limit, fetcher.fetch_tokens(source))
            .await
            .map_err(|_| {
                lexview_message_error!(
                    "lexer service did not respond within {} ms",
                    limit.as_millis()
                )
            })?,
    }
}

fn render_table(tokens: &TokenSequence) -> String {
    let rows = tokens
        .iter()
        .map(|token| {
            (
                token.position.to_string(),
                token.token_type.as_str(),
                token.attr.to_string(),
            )
        })
        .collect::<Vec<_>>();
    let position_width = rows.iter().map(|row| row.0.len()).max().unwrap_or(0);
    let type_width = rows.iter().map(|row| row.1.len()).max().unwrap_or(0);

    let mut output = String::new();
    for (position, token_type, attr) in rows {
        output.push_str(&format!(
            "{position:<position_width$}  {token_type:<type_width$}  {attr}\n"
        ));
    }
    output.push_str(&format!("{} token(s)", tokens.len()));
    output
}

fn render(tokens: &TokenSequence, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(tokens)),
        OutputFormat::Json => tokens.to_json_pretty(),
    }
}

async fn run(options: &CliOptions, config: ClientConfig) -> Result<String> {
    info!(
        endpoint = %config.endpoint(),
        position_shape = %config.position_shape,
        "running lexview"
    );
    let fetcher = TokenFetcher::new(config)?;
    let source = read_source(options.input.as_deref()).await?;
    let tokens = fetch_with_deadline(&fetcher, &source, options.timeout).await?;
    render(&tokens, options.format)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = lexview_base::logging::init_logging() {
        eprintln!("{}", error.report());
        std::process::exit(1);
    }

    let args = env::args().collect::<Vec<_>>();
    let outcome = match parse_args(&args) {
        Ok(options) if options.show_help => Ok(USAGE.to_owned()),
        Ok(options) if options.show_version => Ok(format!("lexview {}", project_revision())),
        Ok(options) => match resolve_config(&options, |name| env::var(name).ok()) {
            Ok(config) => run(&options, config).await,
            Err(error) => Err(error),
        },
        Err(error) => Err(error),
    };

    match outcome {
        Ok(output) => println!("{output}"),
        Err(error) => {
            eprintln!("{}", error.report());
            std::process::exit(1);
        }
    }
}
