//! Two-phase uniform candidate selection.
//!
//! Count the eligible set, then fetch the ship at one uniformly drawn offset
//! into its label-ordered form. This avoids materializing the full set while
//! still giving a uniform draw; the cost is a race window between the two
//! queries, bounded by a single fresh-offset retry.

use keel_core::{mode::ModeConfig, ship::ShipRecord};
use rand::Rng;
use tracing::{info, warn};

use crate::{
  Error, Result, SparqlClient,
  parse::parse_ship_rows,
  query::{build_count_query, build_detail_query},
};

/// Orchestrates the query builder and a [`SparqlClient`] to pick one
/// eligible, previously-unused ship uniformly at random.
pub struct ShipSelector<C> {
  client: C,
}

impl<C: SparqlClient> ShipSelector<C> {
  pub fn new(client: C) -> Self {
    Self { client }
  }

  /// Size of the eligible set under `mode` minus `exclude_ids`.
  ///
  /// An aggregate query always yields exactly one row, so a missing or
  /// unparseable count cell is a malformed response — never zero, which
  /// callers treat as terminal pool exhaustion.
  async fn eligible_count(
    &self,
    mode: &ModeConfig,
    exclude_ids: &[String],
  ) -> Result<u64> {
    let rows = self
      .client
      .execute(&build_count_query(mode, exclude_ids))
      .await?;
    let cell = rows.first().and_then(|row| row.get("count")).ok_or_else(|| {
      Error::MalformedResponse("count query returned no count cell".into())
    })?;
    cell.value.parse().map_err(|_| {
      Error::MalformedResponse(format!("unparseable count: {:?}", cell.value))
    })
  }

  async fn ship_at_offset(
    &self,
    mode: &ModeConfig,
    exclude_ids: &[String],
    offset: u64,
  ) -> Result<Option<ShipRecord>> {
    let rows = self
      .client
      .execute(&build_detail_query(mode, exclude_ids, offset))
      .await?;
    Ok(parse_ship_rows(&rows))
  }

  /// Select one ship, or `None` when the pool is exhausted.
  ///
  /// `Ok(None)` is terminal — the caller must treat "no eligible ships" as a
  /// hard stop, not a retry loop. An empty result at the drawn offset (the
  /// eligible set changed between count and fetch) is retried exactly once
  /// at a fresh offset.
  pub async fn select(
    &self,
    mode: &ModeConfig,
    exclude_ids: &[String],
    rng: &mut (impl Rng + Send),
  ) -> Result<Option<ShipRecord>> {
    let count = self.eligible_count(mode, exclude_ids).await?;
    info!(
      mode = mode.mode.as_str(),
      excluded = exclude_ids.len(),
      count,
      "counted eligible ships"
    );
    if count == 0 {
      return Ok(None);
    }

    let offset = rng.gen_range(0..count);
    if let Some(ship) = self.ship_at_offset(mode, exclude_ids, offset).await? {
      return Ok(Some(ship));
    }

    let retry_offset = rng.gen_range(0..count);
    warn!(offset, retry_offset, "no ship at offset, retrying once");
    self.ship_at_offset(mode, exclude_ids, retry_offset).await
  }
}
