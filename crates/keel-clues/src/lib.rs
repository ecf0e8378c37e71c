//! Clue synthesis for the Keel pipeline.
//!
//! Projects a ship record into the four revealable clue groups, mining the
//! optional article summary for one spoiler-redacted trivia sentence.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod summary;
pub mod synth;
pub mod trivia;

pub use error::{Error, Result};
pub use summary::{HttpSummaryClient, PageSummary, SummaryClient};
pub use synth::ClueSynthesizer;
