//! SQL schema for the Keel SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One finished game per (date, mode); regeneration overwrites via upsert.
CREATE TABLE IF NOT EXISTS games (
    game_date           TEXT NOT NULL,   -- ISO 8601 calendar date
    mode                TEXT NOT NULL,   -- 'main' | 'ww2' | ...
    ship_id             TEXT NOT NULL,
    ship_name           TEXT NOT NULL,
    ship_aliases        TEXT NOT NULL DEFAULT '[]',  -- JSON array, insertion order
    silhouette          TEXT NOT NULL,   -- base64 PNG data URI
    specs_class         TEXT,
    specs_displacement  TEXT,
    specs_length        TEXT,
    specs_commissioned  TEXT,
    context_nation      TEXT NOT NULL,
    context_conflicts   TEXT NOT NULL DEFAULT '[]',  -- JSON array
    context_status      TEXT,
    trivia              TEXT,
    photo               TEXT NOT NULL,
    updated_at          TEXT NOT NULL,   -- RFC 3339 UTC
    PRIMARY KEY (game_date, mode)
);

-- Ships already featured. Inserting a duplicate id is a no-op.
CREATE TABLE IF NOT EXISTS used_ships (
    ship_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    used_date  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS games_date_idx ON games(game_date);

PRAGMA user_version = 1;
";
