//! keel-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the game API over HTTP.
//!
//! # One-off generation
//!
//! To generate a game from the command line without starting the server:
//!
//! ```
//! cargo run -p keel-server --bin server -- --generate --mode main
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use keel_clues::{ClueSynthesizer, HttpSummaryClient};
use keel_core::mode::GameMode;
use keel_lineart::{HttpSegmenter, LineArtRenderer};
use keel_server::{
  AppState, DailyGenerator as _, Pipeline, ServerConfig,
};
use keel_store_sqlite::SqliteStore;
use keel_wikidata::{HttpSparqlClient, ShipSelector};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Keel game server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run the generation pipeline once and exit instead of serving.
  #[arg(long)]
  generate: bool,

  /// Mode to generate (with --generate). Defaults to every mode.
  #[arg(long)]
  mode: Option<GameModeArg>,

  /// Date to generate for (with --generate), YYYY-MM-DD. Defaults to today.
  #[arg(long)]
  date: Option<NaiveDate>,
}

/// Thin clap wrapper so `--mode` values get the store's own parser.
#[derive(Clone)]
struct GameModeArg(GameMode);

impl std::str::FromStr for GameModeArg {
  type Err = keel_core::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.parse().map(GameModeArg)
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("KEEL"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Wire the generation pipeline.
  let segmenter = match &server_cfg.segmenter_url {
    Some(url) => Some(
      HttpSegmenter::new(url, server_cfg.segmenter_api_key.clone())
        .context("failed to build segmenter client")?,
    ),
    None => None,
  };
  let pipeline = Pipeline::new(
    ShipSelector::new(HttpSparqlClient::new()?),
    ClueSynthesizer::new(HttpSummaryClient::new()?),
    LineArtRenderer::new(segmenter)?,
    Arc::clone(&store),
  );

  // Helper mode: generate once and exit.
  if cli.generate {
    let date = cli.date.unwrap_or_else(|| Utc::now().date_naive());
    let modes: Vec<GameMode> = match cli.mode {
      Some(GameModeArg(mode)) => vec![mode],
      None => GameMode::ALL.to_vec(),
    };
    for mode in modes {
      match pipeline.generate(date, mode).await {
        Ok(record) => {
          println!("{mode}: generated game for {} ({})", date, record.ship.id);
        }
        Err(e) => {
          eprintln!("{mode}: {e}");
        }
      }
    }
    return Ok(());
  }

  // Build application state.
  let state = AppState {
    store,
    generator: Arc::new(pipeline),
    config: Arc::new(server_cfg.clone()),
  };

  let app = keel_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
