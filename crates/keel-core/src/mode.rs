//! Game modes and their eligibility filters.
//!
//! Each mode restricts the knowledge graph to a set of vessel-type entities
//! and, optionally, a commissioning-year window. The main mode additionally
//! requires a recorded conflict, because its narrative clues depend on one;
//! the themed modes trade that requirement away for a larger pool.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of a game mode. Serialised in storage and URLs as the
/// lowercase strings returned by [`GameMode::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
  Main,
  Ww2,
  #[serde(rename = "coldwar")]
  ColdWar,
  Carrier,
  Submarine,
  #[serde(rename = "coastguard")]
  CoastGuard,
}

impl GameMode {
  pub const ALL: [GameMode; 6] = [
    GameMode::Main,
    GameMode::Ww2,
    GameMode::ColdWar,
    GameMode::Carrier,
    GameMode::Submarine,
    GameMode::CoastGuard,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      GameMode::Main => "main",
      GameMode::Ww2 => "ww2",
      GameMode::ColdWar => "coldwar",
      GameMode::Carrier => "carrier",
      GameMode::Submarine => "submarine",
      GameMode::CoastGuard => "coastguard",
    }
  }

  pub fn config(self) -> &'static ModeConfig {
    &MODE_CONFIGS[self as usize]
  }
}

impl std::str::FromStr for GameMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "main" => Ok(GameMode::Main),
      "ww2" => Ok(GameMode::Ww2),
      "coldwar" => Ok(GameMode::ColdWar),
      "carrier" => Ok(GameMode::Carrier),
      "submarine" => Ok(GameMode::Submarine),
      "coastguard" => Ok(GameMode::CoastGuard),
      other => Err(Error::UnknownMode(other.to_string())),
    }
  }
}

impl std::fmt::Display for GameMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Eligibility filters for one mode.
#[derive(Debug, Clone)]
pub struct ModeConfig {
  pub mode:              GameMode,
  pub name:              &'static str,
  pub description:       &'static str,
  /// Inclusive commissioning-year lower bound; `None` = unbounded.
  pub year_min:          Option<i32>,
  /// Inclusive commissioning-year upper bound; `None` = unbounded.
  pub year_max:          Option<i32>,
  /// Wikidata entity ids of the eligible vessel types.
  pub ship_types:        &'static [&'static str],
  /// Whether an associated conflict is required (main) or merely optional.
  pub requires_conflict: bool,
}

const GENERAL_TYPES: &[&str] = &[
  "Q174736",  // destroyer
  "Q182531",  // battleship
  "Q17205",   // aircraft carrier
  "Q104843",  // cruiser
  "Q161705",  // frigate
  "Q170013",  // corvette
  "Q2811",    // submarine
];

const MAIN_TYPES: &[&str] = &[
  "Q174736", "Q182531", "Q17205", "Q104843", "Q161705", "Q170013", "Q2811",
  "Q2607934", // guided missile destroyer
];

const SUBMARINE_TYPES: &[&str] = &[
  "Q4818021",  // attack submarine
  "Q2811",     // submarine
  "Q683570",   // ballistic missile submarine
  "Q17005311", // coastal submarine
  "Q757587",   // nuclear attack submarine
  "Q757554",   // nuclear submarine
];

const COASTGUARD_TYPES: &[&str] = &[
  "Q331795",   // patrol vessel
  "Q11479409", // offshore patrol vessel
  "Q10316200", // small patrol boat
  "Q683363",   // cutter
];

// Indexed by the discriminant of `GameMode`.
static MODE_CONFIGS: [ModeConfig; 6] = [
  ModeConfig {
    mode:              GameMode::Main,
    name:              "Daily Keel",
    description:       "Modern warships (1980+)",
    year_min:          Some(1980),
    year_max:          None,
    ship_types:        MAIN_TYPES,
    requires_conflict: true,
  },
  ModeConfig {
    mode:              GameMode::Ww2,
    name:              "WW2",
    description:       "World War 2 ships (1939-1945)",
    year_min:          Some(1939),
    year_max:          Some(1945),
    ship_types:        GENERAL_TYPES,
    requires_conflict: false,
  },
  ModeConfig {
    mode:              GameMode::ColdWar,
    name:              "Cold War",
    description:       "Cold War era ships (1947-1991)",
    year_min:          Some(1947),
    year_max:          Some(1991),
    ship_types:        GENERAL_TYPES,
    requires_conflict: false,
  },
  ModeConfig {
    mode:              GameMode::Carrier,
    name:              "Aircraft Carrier",
    description:       "Aircraft carriers only",
    year_min:          None,
    year_max:          None,
    ship_types:        &["Q17205"],
    requires_conflict: false,
  },
  ModeConfig {
    mode:              GameMode::Submarine,
    name:              "Submarine",
    description:       "Submarines only",
    year_min:          None,
    year_max:          None,
    ship_types:        SUBMARINE_TYPES,
    requires_conflict: false,
  },
  ModeConfig {
    mode:              GameMode::CoastGuard,
    name:              "Coast Guard",
    description:       "Patrol vessels and cutters",
    year_min:          None,
    year_max:          None,
    ship_types:        COASTGUARD_TYPES,
    requires_conflict: false,
  },
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trip_mode_strings() {
    for mode in GameMode::ALL {
      assert_eq!(mode.as_str().parse::<GameMode>().unwrap(), mode);
    }
  }

  #[test]
  fn unknown_mode_is_an_error() {
    assert!("battleship-royale".parse::<GameMode>().is_err());
  }

  #[test]
  fn configs_are_indexed_by_discriminant() {
    for mode in GameMode::ALL {
      assert_eq!(mode.config().mode, mode);
    }
  }

  #[test]
  fn only_main_requires_a_conflict() {
    for mode in GameMode::ALL {
      assert_eq!(mode.config().requires_conflict, mode == GameMode::Main);
    }
  }
}
