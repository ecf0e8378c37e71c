//! Assembling the four clue groups for a selected ship.

use keel_core::{
  clues::{ContextClue, GameClues, SpecsClue, UNKNOWN_NATION},
  ship::ShipRecord,
};
use tracing::{info, warn};

use crate::{summary::SummaryClient, trivia::derive_trivia};

fn build_specs(ship: &ShipRecord) -> SpecsClue {
  SpecsClue {
    class:        ship.class_name.clone(),
    displacement: ship.displacement.clone(),
    length:       ship.length.clone(),
    commissioned: ship.commissioned.map(|y| y.to_string()),
  }
}

fn build_context(ship: &ShipRecord) -> ContextClue {
  ContextClue {
    nation:    ship
      .nation
      .clone()
      .unwrap_or_else(|| UNKNOWN_NATION.to_string()),
    conflicts: ship.conflicts.clone(),
    status:    ship.status.clone(),
  }
}

/// Derives a [`GameClues`] from a ship record, fetching the optional
/// article summary for the trivia group.
pub struct ClueSynthesizer<S> {
  summaries: S,
}

impl<S: SummaryClient> ClueSynthesizer<S> {
  pub fn new(summaries: S) -> Self {
    Self { summaries }
  }

  /// Specs and context are pure projections; trivia needs the summary
  /// fetch. A fetch failure is logged and degrades to no trivia — it never
  /// fails the run.
  pub async fn synthesize(&self, ship: &ShipRecord) -> GameClues {
    let trivia = match &ship.wikipedia_title {
      None => None,
      Some(title) => match self.summaries.fetch_summary(title).await {
        Ok(Some(summary)) => {
          let trivia = derive_trivia(&summary, ship.class_name.as_deref());
          if trivia.is_some() {
            info!(title, "found trivia sentence");
          }
          trivia
        }
        Ok(None) => None,
        Err(e) => {
          warn!(title, error = %e, "summary fetch failed, skipping trivia");
          None
        }
      },
    };

    GameClues {
      specs: build_specs(ship),
      context: build_context(ship),
      trivia,
      photo: ship.image_url.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use crate::{Error, PageSummary, Result};

  use super::*;

  struct StubSummaries {
    response: Result<Option<PageSummary>>,
    calls:    AtomicUsize,
  }

  impl StubSummaries {
    fn returning(response: Result<Option<PageSummary>>) -> Self {
      Self {
        response,
        calls: AtomicUsize::new(0),
      }
    }
  }

  impl SummaryClient for StubSummaries {
    async fn fetch_summary(&self, _title: &str) -> Result<Option<PageSummary>> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      match &self.response {
        Ok(s) => Ok(s.clone()),
        Err(Error::UpstreamStatus(code)) => Err(Error::UpstreamStatus(*code)),
        // reqwest errors are not cloneable; the stub never carries one.
        Err(_) => unreachable!(),
      }
    }
  }

  fn ship(wikipedia_title: Option<&str>, nation: Option<&str>) -> ShipRecord {
    ShipRecord {
      id:              "Q1".into(),
      name:            "USS Example".into(),
      image_url:       "https://example.test/ship.jpg".into(),
      class_name:      Some("Example-class destroyer".into()),
      nation:          nation.map(str::to_string),
      length:          Some("114m".into()),
      displacement:    Some("2,050 tons".into()),
      commissioned:    Some(1943),
      decommissioned:  None,
      status:          Some("Museum ship".into()),
      conflicts:       vec!["Event A".into()],
      wikipedia_title: wikipedia_title.map(str::to_string),
    }
  }

  #[tokio::test]
  async fn no_article_title_means_no_fetch() {
    let stub = StubSummaries::returning(Ok(None));
    let synth = ClueSynthesizer::new(stub);
    let clues = synth.synthesize(&ship(None, Some("United States"))).await;
    assert_eq!(clues.trivia, None);
    assert_eq!(synth.summaries.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn fetch_failure_degrades_to_no_trivia() {
    let stub = StubSummaries::returning(Err(Error::UpstreamStatus(503)));
    let synth = ClueSynthesizer::new(stub);
    let clues = synth.synthesize(&ship(Some("USS Example"), None)).await;
    assert_eq!(clues.trivia, None);
    // Specs and context still populated.
    assert_eq!(clues.specs.commissioned.as_deref(), Some("1943"));
  }

  #[tokio::test]
  async fn missing_nation_becomes_the_unknown_sentinel() {
    let stub = StubSummaries::returning(Ok(None));
    let synth = ClueSynthesizer::new(stub);
    let clues = synth.synthesize(&ship(None, None)).await;
    assert_eq!(clues.context.nation, UNKNOWN_NATION);
    assert_ne!(clues.context.nation, "");
  }

  #[tokio::test]
  async fn trivia_is_extracted_and_redacted() {
    let summary = PageSummary {
      title:       "USS Example".into(),
      extract:     "USS Example is a ship. She was preserved as a museum \
                    Example-class destroyer in Boston harbor."
        .into(),
      description: None,
    };
    let stub = StubSummaries::returning(Ok(Some(summary)));
    let synth = ClueSynthesizer::new(stub);
    let clues = synth.synthesize(&ship(Some("USS Example"), None)).await;
    let trivia = clues.trivia.unwrap();
    assert!(!trivia.to_lowercase().contains("example"));
    assert!(trivia.contains("Boston"));
  }
}
