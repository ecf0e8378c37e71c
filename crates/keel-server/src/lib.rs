//! HTTP surface of the Keel game service.
//!
//! Exposes an axum [`Router`] with two read endpoints for finished games and
//! one bearer-guarded cron endpoint that drives the generation pipeline.
//! TLS and transport concerns are the caller's responsibility.

pub mod api;
pub mod error;
pub mod generate;

pub use error::ApiError;
pub use generate::{
  DailyGenerator, GenerateError, Pipeline, SilhouetteRenderer,
};

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use keel_core::store::{GameStore, UsageLedger};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `KEEL_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  /// Shared secret for `POST /api/cron/generate`. Unset means the endpoint
  /// is open — only sensible behind a private network.
  #[serde(default)]
  pub cron_secret:       Option<String>,
  /// Background-removal service endpoint. Unset disables segmentation.
  #[serde(default)]
  pub segmenter_url:     Option<String>,
  #[serde(default)]
  pub segmenter_api_key: Option<String>,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8080
}

fn default_store_path() -> PathBuf {
  PathBuf::from("keel.db")
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              default_host(),
      port:              default_port(),
      store_path:        default_store_path(),
      cron_secret:       None,
      segmenter_url:     None,
      segmenter_api_key: None,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, G> {
  pub store:     Arc<S>,
  pub generator: Arc<G>,
  pub config:    Arc<ServerConfig>,
}

// Manual impl: `S`/`G` need not be `Clone` behind the `Arc`s.
impl<S, G> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      generator: Arc::clone(&self.generator),
      config:    Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S, G>(state: AppState<S, G>) -> Router
where
  S: GameStore + UsageLedger + 'static,
  G: DailyGenerator + 'static,
{
  Router::new()
    .route("/api/game/today", get(api::today::<S, G>))
    .route("/api/game/{date}", get(api::by_date::<S, G>))
    .route("/api/cron/generate", post(api::cron_generate::<S, G>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{NaiveDate, Utc};
  use keel_core::{
    clues::{ContextClue, GameClues, SpecsClue},
    game::GameRecord,
    mode::GameMode,
    ship::ShipIdentity,
  };
  use keel_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use crate::generate::{DailyGenerator, GenerateError};

  /// Stub pipeline: succeeds with a synthetic record or fails with an
  /// exhausted pool, without touching the network or the store.
  struct StubGenerator {
    exhausted: bool,
  }

  impl DailyGenerator for StubGenerator {
    async fn generate(
      &self,
      date: NaiveDate,
      mode: GameMode,
    ) -> Result<GameRecord, GenerateError> {
      if self.exhausted {
        return Err(GenerateError::NoEligibleShips(mode));
      }
      Ok(record(date, mode, "Stub Ship"))
    }
  }

  fn record(date: NaiveDate, mode: GameMode, name: &str) -> GameRecord {
    GameRecord {
      date,
      mode,
      ship: ShipIdentity {
        id:      "Q7".into(),
        name:    name.into(),
        aliases: Vec::new(),
      },
      silhouette: "data:image/png;base64,AAAA".into(),
      clues: GameClues {
        specs:   SpecsClue {
          class:        None,
          displacement: None,
          length:       None,
          commissioned: Some("1962".into()),
        },
        context: ContextClue {
          nation:    "France".into(),
          conflicts: Vec::new(),
          status:    None,
        },
        trivia:  None,
        photo:   "https://example.test/photo.jpg".into(),
      },
      updated_at: Utc::now(),
    }
  }

  async fn make_state(
    cron_secret: Option<&str>,
    exhausted: bool,
  ) -> AppState<SqliteStore, StubGenerator> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:     Arc::new(store),
      generator: Arc::new(StubGenerator { exhausted }),
      config:    Arc::new(ServerConfig {
        cron_secret: cron_secret.map(str::to_owned),
        ..ServerConfig::default()
      }),
    }
  }

  async fn send(
    state: AppState<SqliteStore, StubGenerator>,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = builder.body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  // ── Game lookup ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_game_returns_404() {
    let state = make_state(None, false).await;
    let resp = send(state, "GET", "/api/game/2026-08-25", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn stored_game_is_served_by_date() {
    let state = make_state(None, false).await;
    let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
    state
      .store
      .upsert_game(&record(date, GameMode::Ww2, "HMS Stored"))
      .await
      .unwrap();

    let resp =
      send(state, "GET", "/api/game/2026-08-25?mode=ww2", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("HMS Stored"), "body: {body}");
  }

  #[tokio::test]
  async fn today_serves_the_current_utc_date() {
    let state = make_state(None, false).await;
    let today = Utc::now().date_naive();
    state
      .store
      .upsert_game(&record(today, GameMode::Main, "Today Ship"))
      .await
      .unwrap();

    let resp = send(state, "GET", "/api/game/today", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Today Ship"), "body: {body}");
  }

  #[tokio::test]
  async fn unknown_mode_returns_400() {
    let state = make_state(None, false).await;
    let resp =
      send(state, "GET", "/api/game/today?mode=zeppelin", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn malformed_date_returns_400() {
    let state = make_state(None, false).await;
    let resp = send(state, "GET", "/api/game/yesterday-ish", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Cron auth ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cron_without_token_returns_401() {
    let state = make_state(Some("s3cret"), false).await;
    let resp = send(state, "POST", "/api/cron/generate", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn cron_with_wrong_token_returns_401() {
    let state = make_state(Some("s3cret"), false).await;
    let resp = send(state, "POST", "/api/cron/generate", Some("guess")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Cron generation ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cron_generates_every_mode_by_default() {
    let state = make_state(Some("s3cret"), false).await;
    let resp =
      send(state, "POST", "/api/cron/generate", Some("s3cret")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let report: serde_json::Value =
      serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(report["generated"].as_array().unwrap().len(), 6);
    assert!(report["failed"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn cron_single_mode_failure_is_the_response() {
    let state = make_state(Some("s3cret"), true).await;
    let resp = send(
      state,
      "POST",
      "/api/cron/generate?mode=main",
      Some("s3cret"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn cron_full_run_reports_failures_without_aborting() {
    let state = make_state(Some("s3cret"), true).await;
    let resp =
      send(state, "POST", "/api/cron/generate", Some("s3cret")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let report: serde_json::Value =
      serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(report["generated"].as_array().unwrap().is_empty());
    assert_eq!(report["failed"].as_array().unwrap().len(), 6);
  }

  #[tokio::test]
  async fn cron_accepts_an_explicit_date() {
    let state = make_state(None, false).await;
    let resp = send(
      state,
      "POST",
      "/api/cron/generate?mode=carrier&date=2026-09-01",
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let report: serde_json::Value =
      serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(report["date"], "2026-09-01");
  }
}
