//! The [`GameStore`] and [`UsageLedger`] traits.
//!
//! Implemented by storage backends (e.g. `keel-store-sqlite`). Higher layers
//! (`keel-server`) depend on these abstractions, not on any concrete backend.
//! Both services are treated as single-writer-per-key external systems: the
//! pipeline relies on their upsert / idempotent-insert semantics and does no
//! locking of its own.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  game::{GameRecord, UsedShipEntry},
  mode::GameMode,
};

/// Persistence for finished daily games.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GameStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert or overwrite the record for its `(date, mode)` key.
  fn upsert_game<'a>(
    &'a self,
    record: &'a GameRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve the record for a `(date, mode)` key. Returns `None` if no game
  /// has been generated for that key.
  fn game_for(
    &self,
    date: NaiveDate,
    mode: GameMode,
  ) -> impl Future<Output = Result<Option<GameRecord>, Self::Error>> + Send + '_;
}

/// Durable record of previously-featured ships.
pub trait UsageLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All ledger entries. Callers that cannot tolerate a read failure should
  /// recover to an empty exclusion set rather than aborting a run.
  fn list_used(
    &self,
  ) -> impl Future<Output = Result<Vec<UsedShipEntry>, Self::Error>> + Send + '_;

  /// Record a ship as featured on `used_date`. Idempotent: marking an
  /// already-present id succeeds without creating a second entry.
  fn mark_used<'a>(
    &'a self,
    ship_id: &'a str,
    name: &'a str,
    used_date: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
