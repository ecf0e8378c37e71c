//! [`SqliteStore`] — the SQLite implementation of [`GameStore`] and
//! [`UsageLedger`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use keel_core::{
  clues::{ContextClue, GameClues, SpecsClue},
  game::{GameRecord, UsedShipEntry},
  mode::GameMode,
  ship::ShipIdentity,
  store::{GameStore, UsageLedger},
};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Keel store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Encoding helpers ────────────────────────────────────────────────────────

fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_mode(s: &str) -> Result<GameMode> {
  Ok(s.parse::<GameMode>()?)
}

fn encode_strings(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

fn decode_strings(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

/// Column tuple of one `games` row, in SELECT order.
type RawGameRow = (
  String,         // game_date
  String,         // mode
  String,         // ship_id
  String,         // ship_name
  String,         // ship_aliases
  String,         // silhouette
  Option<String>, // specs_class
  Option<String>, // specs_displacement
  Option<String>, // specs_length
  Option<String>, // specs_commissioned
  String,         // context_nation
  String,         // context_conflicts
  Option<String>, // context_status
  Option<String>, // trivia
  String,         // photo
  String,         // updated_at
);

fn decode_game(raw: RawGameRow) -> Result<GameRecord> {
  let (
    game_date,
    mode,
    ship_id,
    ship_name,
    ship_aliases,
    silhouette,
    specs_class,
    specs_displacement,
    specs_length,
    specs_commissioned,
    context_nation,
    context_conflicts,
    context_status,
    trivia,
    photo,
    updated_at,
  ) = raw;

  Ok(GameRecord {
    date: decode_date(&game_date)?,
    mode: decode_mode(&mode)?,
    ship: ShipIdentity {
      id:      ship_id,
      name:    ship_name,
      aliases: decode_strings(&ship_aliases)?,
    },
    silhouette,
    clues: GameClues {
      specs:   SpecsClue {
        class:        specs_class,
        displacement: specs_displacement,
        length:       specs_length,
        commissioned: specs_commissioned,
      },
      context: ContextClue {
        nation:    context_nation,
        conflicts: decode_strings(&context_conflicts)?,
        status:    context_status,
      },
      trivia,
      photo,
    },
    updated_at: decode_dt(&updated_at)?,
  })
}

// ─── GameStore ───────────────────────────────────────────────────────────────

impl GameStore for SqliteStore {
  type Error = Error;

  async fn upsert_game(&self, record: &GameRecord) -> Result<()> {
    let date_str = encode_date(record.date);
    let mode_str = record.mode.as_str().to_owned();
    let ship_id = record.ship.id.clone();
    let ship_name = record.ship.name.clone();
    let aliases_str = encode_strings(&record.ship.aliases)?;
    let silhouette = record.silhouette.clone();
    let clues = record.clues.clone();
    let conflicts_str = encode_strings(&clues.context.conflicts)?;
    let updated_str = record.updated_at.to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO games (
             game_date, mode, ship_id, ship_name, ship_aliases, silhouette,
             specs_class, specs_displacement, specs_length, specs_commissioned,
             context_nation, context_conflicts, context_status,
             trivia, photo, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
           ON CONFLICT (game_date, mode) DO UPDATE SET
             ship_id            = excluded.ship_id,
             ship_name          = excluded.ship_name,
             ship_aliases       = excluded.ship_aliases,
             silhouette         = excluded.silhouette,
             specs_class        = excluded.specs_class,
             specs_displacement = excluded.specs_displacement,
             specs_length       = excluded.specs_length,
             specs_commissioned = excluded.specs_commissioned,
             context_nation     = excluded.context_nation,
             context_conflicts  = excluded.context_conflicts,
             context_status     = excluded.context_status,
             trivia             = excluded.trivia,
             photo              = excluded.photo,
             updated_at         = excluded.updated_at",
          rusqlite::params![
            date_str,
            mode_str,
            ship_id,
            ship_name,
            aliases_str,
            silhouette,
            clues.specs.class,
            clues.specs.displacement,
            clues.specs.length,
            clues.specs.commissioned,
            clues.context.nation,
            conflicts_str,
            clues.context.status,
            clues.trivia,
            clues.photo,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn game_for(
    &self,
    date: NaiveDate,
    mode: GameMode,
  ) -> Result<Option<GameRecord>> {
    let date_str = encode_date(date);
    let mode_str = mode.as_str().to_owned();

    let raw: Option<RawGameRow> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            "SELECT game_date, mode, ship_id, ship_name, ship_aliases,
                    silhouette, specs_class, specs_displacement, specs_length,
                    specs_commissioned, context_nation, context_conflicts,
                    context_status, trivia, photo, updated_at
             FROM games WHERE game_date = ?1 AND mode = ?2",
            rusqlite::params![date_str, mode_str],
            |r| {
              Ok((
                r.get(0)?,
                r.get(1)?,
                r.get(2)?,
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
                r.get(7)?,
                r.get(8)?,
                r.get(9)?,
                r.get(10)?,
                r.get(11)?,
                r.get(12)?,
                r.get(13)?,
                r.get(14)?,
                r.get(15)?,
              ))
            },
          )
          .optional()?;
        Ok(row)
      })
      .await?;

    raw.map(decode_game).transpose()
  }
}

// ─── UsageLedger ─────────────────────────────────────────────────────────────

impl UsageLedger for SqliteStore {
  type Error = Error;

  async fn list_used(&self) -> Result<Vec<UsedShipEntry>> {
    let rows: Vec<(String, String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT ship_id, name, used_date FROM used_ships ORDER BY used_date",
        )?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
          .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(ship_id, name, used_date)| {
        Ok(UsedShipEntry {
          ship_id,
          name,
          used_date: decode_date(&used_date)?,
        })
      })
      .collect()
  }

  async fn mark_used(
    &self,
    ship_id: &str,
    name: &str,
    used_date: NaiveDate,
  ) -> Result<()> {
    let ship_id = ship_id.to_owned();
    let name = name.to_owned();
    let date_str = encode_date(used_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO used_ships (ship_id, name, used_date)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (ship_id) DO NOTHING",
          rusqlite::params![ship_id, name, date_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
