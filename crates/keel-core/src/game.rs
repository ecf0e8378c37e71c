//! Persisted game and ledger records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{clues::GameClues, mode::GameMode, ship::ShipIdentity};

/// One day's finished game, keyed by `(date, mode)`. Regeneration for the
/// same key overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
  pub date:       NaiveDate,
  pub mode:       GameMode,
  pub ship:       ShipIdentity,
  /// Base64-encoded line-art PNG as a `data:image/png;base64,` URI.
  pub silhouette: String,
  pub clues:      GameClues,
  pub updated_at: DateTime<Utc>,
}

/// A previously-featured ship. Identifier-unique; marking the same ship
/// twice is a silent no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedShipEntry {
  pub ship_id:   String,
  pub name:      String,
  pub used_date: NaiveDate,
}
