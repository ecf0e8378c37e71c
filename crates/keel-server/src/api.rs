//! Handlers for the game API.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/game/today` | Optional `?mode=` (default `main`) |
//! | `GET`  | `/api/game/:date` | `date` is `YYYY-MM-DD`; 404 if not generated |
//! | `POST` | `/api/cron/generate` | Bearer-guarded; `?mode=` and `?date=` optional |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::HeaderMap,
};
use chrono::{NaiveDate, Utc};
use keel_core::{
  game::GameRecord,
  mode::GameMode,
  store::{GameStore, UsageLedger},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{AppState, error::ApiError, generate::DailyGenerator};

fn parse_mode(raw: Option<&str>) -> Result<GameMode, ApiError> {
  match raw {
    None => Ok(GameMode::Main),
    Some(s) => s
      .parse()
      .map_err(|_| ApiError::BadRequest(format!("unknown mode: {s}"))),
  }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .map_err(|_| ApiError::BadRequest(format!("invalid date: {raw}")))
}

// ─── Game lookup ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GameParams {
  pub mode: Option<String>,
}

async fn lookup<S, G>(
  state: &AppState<S, G>,
  date: NaiveDate,
  mode: GameMode,
) -> Result<Json<GameRecord>, ApiError>
where
  S: GameStore + UsageLedger,
  G: DailyGenerator,
{
  let game = state
    .store
    .game_for(date, mode)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no {mode} game for {date}"))
    })?;
  Ok(Json(game))
}

/// `GET /api/game/today[?mode=<mode>]`
pub async fn today<S, G>(
  State(state): State<AppState<S, G>>,
  Query(params): Query<GameParams>,
) -> Result<Json<GameRecord>, ApiError>
where
  S: GameStore + UsageLedger,
  G: DailyGenerator,
{
  let mode = parse_mode(params.mode.as_deref())?;
  lookup(&state, Utc::now().date_naive(), mode).await
}

/// `GET /api/game/:date[?mode=<mode>]`
pub async fn by_date<S, G>(
  State(state): State<AppState<S, G>>,
  Path(date): Path<String>,
  Query(params): Query<GameParams>,
) -> Result<Json<GameRecord>, ApiError>
where
  S: GameStore + UsageLedger,
  G: DailyGenerator,
{
  let mode = parse_mode(params.mode.as_deref())?;
  lookup(&state, parse_date(&date)?, mode).await
}

// ─── Cron generation ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CronParams {
  /// Limit the run to one mode; omitted means every mode.
  pub mode: Option<String>,
  /// Target date; omitted means today (UTC).
  pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CronReport {
  pub date:      NaiveDate,
  pub generated: Vec<GameMode>,
  pub failed:    Vec<CronFailure>,
}

#[derive(Debug, Serialize)]
pub struct CronFailure {
  pub mode:  GameMode,
  pub error: String,
}

fn check_cron_auth(
  headers: &HeaderMap,
  secret: Option<&str>,
) -> Result<(), ApiError> {
  let Some(secret) = secret else {
    return Ok(());
  };
  let presented = headers
    .get("authorization")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "));
  if presented == Some(secret) {
    Ok(())
  } else {
    Err(ApiError::Unauthorized)
  }
}

/// `POST /api/cron/generate[?mode=<mode>][&date=<date>]`
///
/// With an explicit `mode`, a generation failure is the response. Without
/// one, the run continues through every mode and reports per-mode outcomes
/// with a 200 — one empty pool must not block the others.
pub async fn cron_generate<S, G>(
  State(state): State<AppState<S, G>>,
  Query(params): Query<CronParams>,
  headers: HeaderMap,
) -> Result<Json<CronReport>, ApiError>
where
  S: GameStore + UsageLedger,
  G: DailyGenerator,
{
  check_cron_auth(&headers, state.config.cron_secret.as_deref())?;

  let date = match &params.date {
    Some(raw) => parse_date(raw)?,
    None => Utc::now().date_naive(),
  };

  let modes: Vec<GameMode> = match &params.mode {
    Some(raw) => vec![parse_mode(Some(raw.as_str()))?],
    None => GameMode::ALL.to_vec(),
  };
  let single = params.mode.is_some();

  let mut report = CronReport {
    date,
    generated: Vec::new(),
    failed: Vec::new(),
  };
  for mode in modes {
    match state.generator.generate(date, mode).await {
      Ok(_) => {
        info!(%mode, %date, "cron generated game");
        report.generated.push(mode);
      }
      Err(e) if single => return Err(e.into()),
      Err(e) => {
        error!(%mode, %date, error = %e, "cron generation failed");
        report.failed.push(CronFailure {
          mode,
          error: e.to_string(),
        });
      }
    }
  }
  Ok(Json(report))
}
