//! The daily generation pipeline: select, synthesize, render, persist.

use std::{future::Future, sync::Arc};

use chrono::{NaiveDate, Utc};
use keel_clues::{ClueSynthesizer, SummaryClient};
use keel_core::{
  game::GameRecord,
  mode::GameMode,
  store::{GameStore, UsageLedger},
};
use keel_lineart::{LineArtRenderer, Segmenter};
use keel_wikidata::{ShipSelector, SparqlClient};
use rand::{SeedableRng as _, rngs::StdRng};
use thiserror::Error;
use tracing::{info, warn};

/// An error from one generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
  /// Terminal: every eligible ship has already been featured. Callers must
  /// not retry — the pool only grows when the knowledge graph does.
  #[error("no eligible ships remain for mode {0}")]
  NoEligibleShips(GameMode),

  #[error("selection error: {0}")]
  Wikidata(#[from] keel_wikidata::Error),

  #[error("line-art error: {0}")]
  LineArt(#[from] keel_lineart::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Produces and persists one day's game for a `(date, mode)` key.
pub trait DailyGenerator: Send + Sync {
  fn generate(
    &self,
    date: NaiveDate,
    mode: GameMode,
  ) -> impl Future<Output = Result<GameRecord, GenerateError>> + Send + '_;
}

/// Renders a source photograph into base64 line art. The seam lets the
/// orchestrator be exercised without downloading anything.
pub trait SilhouetteRenderer: Send + Sync {
  fn render<'a>(
    &'a self,
    photo_url: &'a str,
  ) -> impl Future<Output = keel_lineart::Result<String>> + Send + 'a;
}

impl<G: Segmenter> SilhouetteRenderer for LineArtRenderer<G> {
  async fn render(&self, photo_url: &str) -> keel_lineart::Result<String> {
    LineArtRenderer::render(self, photo_url).await
  }
}

/// The production [`DailyGenerator`]: wires the selector, clue synthesizer
/// and line-art renderer to a shared store.
pub struct Pipeline<C, Y, R, S> {
  selector:    ShipSelector<C>,
  synthesizer: ClueSynthesizer<Y>,
  renderer:    R,
  store:       Arc<S>,
}

impl<C, Y, R, S> Pipeline<C, Y, R, S>
where
  C: SparqlClient,
  Y: SummaryClient,
  R: SilhouetteRenderer,
  S: GameStore + UsageLedger,
{
  pub fn new(
    selector: ShipSelector<C>,
    synthesizer: ClueSynthesizer<Y>,
    renderer: R,
    store: Arc<S>,
  ) -> Self {
    Self {
      selector,
      synthesizer,
      renderer,
      store,
    }
  }

  /// Ledger entries as an exclusion list. A read failure degrades to an
  /// empty list — a duplicate ship is preferable to a missed day.
  async fn exclusion_ids(&self) -> Vec<String> {
    match self.store.list_used().await {
      Ok(entries) => entries.into_iter().map(|e| e.ship_id).collect(),
      Err(e) => {
        warn!(error = %e, "usage ledger read failed, excluding nothing");
        Vec::new()
      }
    }
  }

  async fn run(
    &self,
    date: NaiveDate,
    mode: GameMode,
  ) -> Result<GameRecord, GenerateError> {
    let exclude_ids = self.exclusion_ids().await;
    let mut rng = StdRng::from_entropy();
    let ship = self
      .selector
      .select(mode.config(), &exclude_ids, &mut rng)
      .await?
      .ok_or(GenerateError::NoEligibleShips(mode))?;
    info!(mode = %mode, ship_id = %ship.id, "selected ship");

    // Clues and line art share no state; run them concurrently.
    let (clues, silhouette) = tokio::join!(
      self.synthesizer.synthesize(&ship),
      self.renderer.render(&ship.image_url),
    );
    let silhouette = format!("data:image/png;base64,{}", silhouette?);

    let record = GameRecord {
      date,
      mode,
      ship: ship.identity(),
      silhouette,
      clues,
      updated_at: Utc::now(),
    };

    self
      .store
      .upsert_game(&record)
      .await
      .map_err(|e| GenerateError::Store(Box::new(e)))?;
    // Mark after the upsert: a persisted game without a ledger entry risks
    // only a repeat, the reverse loses a day.
    self
      .store
      .mark_used(&ship.id, &ship.name, date)
      .await
      .map_err(|e| GenerateError::Store(Box::new(e)))?;

    info!(mode = %mode, date = %date, "game generated and persisted");
    Ok(record)
  }
}

impl<C, Y, R, S> DailyGenerator for Pipeline<C, Y, R, S>
where
  C: SparqlClient,
  Y: SummaryClient,
  R: SilhouetteRenderer,
  S: GameStore + UsageLedger,
{
  async fn generate(
    &self,
    date: NaiveDate,
    mode: GameMode,
  ) -> Result<GameRecord, GenerateError> {
    self.run(date, mode).await
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use keel_clues::PageSummary;
  use keel_core::game::UsedShipEntry;
  use keel_wikidata::{Row, client::Cell};

  use super::*;

  // ── Stubs ───────────────────────────────────────────────────────────────────

  /// One eligible ship, always.
  struct SingleShipClient;

  impl SparqlClient for SingleShipClient {
    async fn execute(&self, query: &str) -> keel_wikidata::Result<Vec<Row>> {
      if query.contains("COUNT(") {
        return Ok(vec![Row::from([(
          "count".to_string(),
          Cell {
            value: "1".to_string(),
          },
        )])]);
      }
      Ok(vec![Row::from([
        (
          "ship".to_string(),
          Cell {
            value: "http://www.wikidata.org/entity/Q99".to_string(),
          },
        ),
        (
          "shipLabel".to_string(),
          Cell {
            value: "USS Stub".to_string(),
          },
        ),
        (
          "image".to_string(),
          Cell {
            value: "Stub.jpg".to_string(),
          },
        ),
      ])])
    }
  }

  struct NoSummaries;

  impl SummaryClient for NoSummaries {
    async fn fetch_summary(
      &self,
      _title: &str,
    ) -> keel_clues::Result<Option<PageSummary>> {
      Ok(None)
    }
  }

  struct StubRenderer {
    fail: bool,
  }

  impl SilhouetteRenderer for StubRenderer {
    async fn render(&self, _photo_url: &str) -> keel_lineart::Result<String> {
      if self.fail {
        Err(keel_lineart::Error::DownloadStatus(500))
      } else {
        Ok("QUJD".to_string())
      }
    }
  }

  #[derive(Debug, Error)]
  #[error("stub store failure")]
  struct StoreFailure;

  /// Records writes; the ledger read can be made to fail.
  struct RecordingStore {
    ledger_fails: bool,
    upserts:      Mutex<Vec<GameRecord>>,
    marked:       Mutex<Vec<String>>,
  }

  impl RecordingStore {
    fn new(ledger_fails: bool) -> Self {
      Self {
        ledger_fails,
        upserts: Mutex::new(Vec::new()),
        marked: Mutex::new(Vec::new()),
      }
    }
  }

  impl GameStore for RecordingStore {
    type Error = StoreFailure;

    async fn upsert_game(&self, record: &GameRecord) -> Result<(), StoreFailure> {
      self.upserts.lock().unwrap().push(record.clone());
      Ok(())
    }

    async fn game_for(
      &self,
      _date: NaiveDate,
      _mode: GameMode,
    ) -> Result<Option<GameRecord>, StoreFailure> {
      Ok(None)
    }
  }

  impl UsageLedger for RecordingStore {
    type Error = StoreFailure;

    async fn list_used(&self) -> Result<Vec<UsedShipEntry>, StoreFailure> {
      if self.ledger_fails {
        Err(StoreFailure)
      } else {
        Ok(Vec::new())
      }
    }

    async fn mark_used(
      &self,
      ship_id: &str,
      _name: &str,
      _used_date: NaiveDate,
    ) -> Result<(), StoreFailure> {
      self.marked.lock().unwrap().push(ship_id.to_string());
      Ok(())
    }
  }

  fn pipeline(
    render_fails: bool,
    ledger_fails: bool,
  ) -> Pipeline<SingleShipClient, NoSummaries, StubRenderer, RecordingStore> {
    Pipeline::new(
      ShipSelector::new(SingleShipClient),
      ClueSynthesizer::new(NoSummaries),
      StubRenderer {
        fail: render_fails,
      },
      Arc::new(RecordingStore::new(ledger_fails)),
    )
  }

  fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
  }

  // ── Orchestration ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn generates_and_persists_end_to_end() {
    let pipeline = pipeline(false, false);
    let record = pipeline.generate(date(), GameMode::Carrier).await.unwrap();

    assert_eq!(record.ship.id, "Q99");
    assert!(record.silhouette.starts_with("data:image/png;base64,"));
    assert_eq!(pipeline.store.upserts.lock().unwrap().len(), 1);
    assert_eq!(*pipeline.store.marked.lock().unwrap(), vec!["Q99"]);
  }

  #[tokio::test]
  async fn ledger_read_failure_still_generates() {
    let pipeline = pipeline(false, true);
    let record = pipeline.generate(date(), GameMode::Carrier).await.unwrap();

    assert_eq!(record.ship.id, "Q99");
    assert_eq!(pipeline.store.upserts.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn render_failure_persists_nothing() {
    let pipeline = pipeline(true, false);
    let result = pipeline.generate(date(), GameMode::Carrier).await;

    assert!(matches!(result, Err(GenerateError::LineArt(_))));
    assert!(pipeline.store.upserts.lock().unwrap().is_empty());
    assert!(pipeline.store.marked.lock().unwrap().is_empty());
  }
}
