//! Ship records — the ephemeral subject of one generation run.
//!
//! A [`ShipRecord`] is assembled from knowledge-graph query rows, consumed by
//! clue synthesis and line-art rendering, and discarded once the day's
//! [`GameRecord`](crate::game::GameRecord) has been persisted.

use serde::{Deserialize, Serialize};

/// Everything the pipeline knows about the selected vessel.
///
/// Only `id`, `name` and `image_url` are guaranteed present — eligibility
/// requires them. Every other field is `Option` / possibly-empty: absent
/// source data stays absent rather than being defaulted to false data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipRecord {
  /// Stable external key (Wikidata entity id, e.g. "Q12345").
  pub id:              String,
  /// English display name.
  pub name:            String,
  /// Canonical media-repository URL of the source photograph.
  pub image_url:       String,
  /// Vessel class label (e.g. "Fletcher-class destroyer").
  pub class_name:      Option<String>,
  /// Resolved nation — direct country, else operator's country, else the
  /// operator's own name as a weaker hint.
  pub nation:          Option<String>,
  /// Pre-rendered length, e.g. "114m".
  pub length:          Option<String>,
  /// Pre-rendered displacement, e.g. "2,050 tons".
  pub displacement:    Option<String>,
  /// Commissioning year.
  pub commissioned:    Option<i32>,
  /// Decommissioning year, when recorded.
  pub decommissioned:  Option<i32>,
  /// Disposition status ("Museum ship", "Decommissioned 1971", ...).
  pub status:          Option<String>,
  /// Associated conflict labels, de-duplicated. Order is not meaningful.
  pub conflicts:       Vec<String>,
  /// Title of the linked long-form article, if one exists.
  pub wikipedia_title: Option<String>,
}

/// The answer identity embedded in a persisted game. Aliases are additional
/// accepted answer strings, in insertion order (class name first, when known).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipIdentity {
  pub id:      String,
  pub name:    String,
  pub aliases: Vec<String>,
}

impl ShipRecord {
  /// Build the answer identity: the class name, when present, becomes an
  /// accepted alias.
  pub fn identity(&self) -> ShipIdentity {
    let mut aliases = Vec::new();
    if let Some(class) = &self.class_name {
      aliases.push(class.clone());
    }
    ShipIdentity {
      id: self.id.clone(),
      name: self.name.clone(),
      aliases,
    }
  }
}
