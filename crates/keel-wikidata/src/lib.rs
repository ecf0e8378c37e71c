//! Wikidata selection layer for the Keel pipeline.
//!
//! Splits cleanly into a pure query builder ([`query`]), a thin SPARQL HTTP
//! client ([`client`]), a row parser ([`parse`]) and the two-phase
//! count-then-offset candidate selector ([`select`]).

#![allow(async_fn_in_trait)]

pub mod client;
pub mod error;
pub mod parse;
pub mod query;
pub mod select;

pub use client::{HttpSparqlClient, Row, SparqlClient};
pub use error::{Error, Result};
pub use select::ShipSelector;

/// Identifying User-Agent sent on every outbound request, per the etiquette
/// of the public endpoints we query.
pub const USER_AGENT: &str =
  "Mozilla/5.0 (compatible; KeelGame/1.0; +https://github.com/keel-game)";
