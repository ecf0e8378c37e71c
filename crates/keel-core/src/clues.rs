//! Clue types — the four independently revealable hint groups.

use serde::{Deserialize, Serialize};

/// The sentinel shown when no nation could be resolved. Context clues always
/// carry a nation string; "unknown" is explicit, never an empty string.
pub const UNKNOWN_NATION: &str = "Unknown";

/// Physical specifications, revealed second. Every field is nullable;
/// missing source data is shown as missing, not zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecsClue {
  pub class:        Option<String>,
  pub displacement: Option<String>,
  pub length:       Option<String>,
  pub commissioned: Option<String>,
}

/// Historical context, revealed third.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextClue {
  /// Never empty — defaults to [`UNKNOWN_NATION`].
  pub nation:    String,
  pub conflicts: Vec<String>,
  pub status:    Option<String>,
}

/// The complete clue payload for one day's game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClues {
  pub specs:   SpecsClue,
  pub context: ContextClue,
  /// At most one redacted sentence of free text.
  pub trivia:  Option<String>,
  /// URL of the original (non-stylized) photograph.
  pub photo:   String,
}
