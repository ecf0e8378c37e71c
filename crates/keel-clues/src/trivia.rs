//! Trivia mining and spoiler redaction.
//!
//! One sentence of the article abstract becomes the fourth clue. The first
//! sentence is always skipped — it is near-universally a generic "X is a
//! ship of Y type" statement — and whatever is selected is scrubbed of the
//! ship's class name so the clue cannot give the answer away.

use crate::summary::PageSummary;

/// A redacted trivia sentence shorter than this has lost its informational
/// content and is discarded outright.
const MIN_TRIVIA_LEN: usize = 20;

/// Words marking a sentence as distinctive enough to be a clue.
const NOTEWORTHY_KEYWORDS: [&str; 21] = [
  "famous",
  "notable",
  "first",
  "last",
  "only",
  "largest",
  "fastest",
  "sunk",
  "battle",
  "war",
  "attack",
  "served",
  "participated",
  "known for",
  "renamed",
  "converted",
  "museum",
  "memorial",
  "preserved",
  "film",
  "movie",
];

/// Split text into sentences: maximal runs ending in one or more of `.!?`.
/// A trailing fragment with no terminator is dropped.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
  let mut sentences = Vec::new();
  let mut start = 0;
  let mut in_terminator = false;
  for (i, c) in text.char_indices() {
    let is_term = matches!(c, '.' | '!' | '?');
    if in_terminator && !is_term {
      let sentence = text[start..i].trim();
      if !sentence.is_empty() {
        sentences.push(sentence);
      }
      start = i;
    }
    in_terminator = is_term;
  }
  if in_terminator {
    let sentence = text[start..].trim();
    if !sentence.is_empty() {
      sentences.push(sentence);
    }
  }
  sentences
}

/// Pick the most clue-worthy sentence of a summary, before redaction.
///
/// Scan order: first keyword hit after the opening sentence, then the plain
/// second sentence, then the short description field, then nothing.
pub fn extract_trivia(summary: &PageSummary) -> Option<String> {
  let sentences = split_sentences(&summary.extract);

  for sentence in sentences.iter().skip(1) {
    let lower = sentence.to_lowercase();
    if NOTEWORTHY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
      return Some((*sentence).to_string());
    }
  }

  if sentences.len() > 1 {
    return Some(sentences[1].to_string());
  }

  summary.description.clone()
}

fn class_tokens(class_name: &str) -> Vec<String> {
  class_name
    .split(|c: char| !c.is_alphanumeric())
    .filter(|t| t.chars().count() >= 3)
    .map(str::to_lowercase)
    .collect()
}

/// Remove every case-insensitive occurrence of `needle` from `text`.
fn remove_phrase(text: &str, needle: &str) -> String {
  let lower_text = text.to_lowercase();
  let lower_needle = needle.to_lowercase();
  // Lowercasing that changes byte length would break the index mapping
  // below; in that case the token pass still scrubs the constituents.
  if lower_needle.is_empty() || lower_text.len() != text.len() {
    return text.to_string();
  }

  let mut out = String::with_capacity(text.len());
  let mut cursor = 0;
  while let Some(found) = lower_text[cursor..].find(&lower_needle) {
    let at = cursor + found;
    out.push_str(&text[cursor..at]);
    cursor = at + lower_needle.len();
  }
  out.push_str(&text[cursor..]);
  out
}

/// Scrub the class name out of a trivia sentence: the full phrase first,
/// then every constituent token of length >= 3, whole-word and
/// case-insensitive. Returns `None` when the residue is too short to still
/// carry information.
pub fn redact_class_name(trivia: &str, class_name: &str) -> Option<String> {
  let without_phrase = remove_phrase(trivia, class_name);
  let banned = class_tokens(class_name);

  // A word is dropped when any of its alphanumeric runs is banned, so
  // hyphenated compounds like "Fletcher-class" go with their tokens.
  let kept: Vec<&str> = without_phrase
    .split_whitespace()
    .filter(|word| {
      !word
        .split(|c: char| !c.is_alphanumeric())
        .filter(|run| !run.is_empty())
        .any(|run| banned.contains(&run.to_lowercase()))
    })
    .collect();

  let result = kept.join(" ");
  if result.chars().count() < MIN_TRIVIA_LEN {
    None
  } else {
    Some(result)
  }
}

/// Full trivia derivation: extract, then redact when a class name is known.
pub fn derive_trivia(
  summary: &PageSummary,
  class_name: Option<&str>,
) -> Option<String> {
  let raw = extract_trivia(summary)?;
  match class_name {
    Some(class) => redact_class_name(&raw, class),
    None => Some(raw),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn summary(extract: &str, description: Option<&str>) -> PageSummary {
    PageSummary {
      title:       "Test".to_string(),
      extract:     extract.to_string(),
      description: description.map(str::to_string),
    }
  }

  // ── Sentence splitting ───────────────────────────────────────────────────

  #[test]
  fn sentences_split_on_terminators() {
    let s = split_sentences("One. Two! Three? Trailing fragment");
    assert_eq!(s, vec!["One.", "Two!", "Three?"]);
  }

  #[test]
  fn consecutive_terminators_stay_with_their_sentence() {
    let s = split_sentences("Wait... what. Done.");
    assert_eq!(s, vec!["Wait...", "what.", "Done."]);
  }

  // ── Extraction ───────────────────────────────────────────────────────────

  #[test]
  fn first_sentence_is_never_selected() {
    let s = summary(
      "She was the first ship of her kind. She carried mail. She sank in a battle.",
      None,
    );
    // "first" appears only in the opening sentence, which is skipped;
    // "battle" makes the third sentence the keyword hit.
    assert_eq!(extract_trivia(&s).as_deref(), Some("She sank in a battle."));
  }

  #[test]
  fn falls_back_to_second_sentence_without_keywords() {
    let s = summary("Intro sentence. Plain second sentence. Plain third.", None);
    assert_eq!(
      extract_trivia(&s).as_deref(),
      Some("Plain second sentence.")
    );
  }

  #[test]
  fn single_sentence_falls_back_to_description() {
    let s = summary("Only one sentence here.", Some("a preserved destroyer"));
    assert_eq!(extract_trivia(&s).as_deref(), Some("a preserved destroyer"));
  }

  #[test]
  fn nothing_to_extract_yields_none() {
    let s = summary("Only one sentence here.", None);
    assert_eq!(extract_trivia(&s), None);
  }

  // ── Redaction ────────────────────────────────────────────────────────────

  #[test]
  fn full_class_phrase_is_removed() {
    let out = redact_class_name(
      "She was the lead Fletcher-class destroyer ship of the fleet reserve.",
      "Fletcher-class destroyer",
    )
    .unwrap();
    assert!(!out.to_lowercase().contains("fletcher"));
    assert!(!out.to_lowercase().contains("destroyer"));
    assert!(out.contains("fleet reserve"));
  }

  #[test]
  fn single_tokens_are_removed_whole_word() {
    let out = redact_class_name(
      "The Fletcher, as she was known, served for thirty years overall.",
      "Fletcher-class destroyer",
    )
    .unwrap();
    assert!(!out.to_lowercase().contains("fletcher"));
    // "class" inside another word must survive whole-word matching.
    let out2 = redact_class_name(
      "Her classification changed twice during her long career at sea.",
      "Fletcher-class destroyer",
    )
    .unwrap();
    assert!(out2.contains("classification"));
  }

  #[test]
  fn hyphenated_class_compounds_are_removed() {
    // "Fletcher-class" without the trailing "destroyer" dodges the
    // full-phrase pass; the token pass must still catch it.
    let out = redact_class_name(
      "She was the first Fletcher-class ship to round the cape twice.",
      "Fletcher-class destroyer",
    )
    .unwrap();
    assert!(!out.to_lowercase().contains("fletcher"), "out: {out}");
    assert!(!out.to_lowercase().contains("class"), "out: {out}");
    assert!(out.contains("round the cape"));
  }

  #[test]
  fn short_tokens_are_not_banned() {
    // "de" is shorter than three characters and must survive.
    let out = redact_class_name(
      "Named after an admiral de Ruyter of the seventeenth century.",
      "De Zeven Provinciën-class",
    )
    .unwrap();
    assert!(out.contains("de Ruyter"));
  }

  #[test]
  fn too_short_residue_becomes_none() {
    let redacted =
      redact_class_name("A Fletcher-class destroyer.", "Fletcher-class destroyer");
    assert_eq!(redacted, None);
  }

  #[test]
  fn derive_without_class_name_skips_redaction() {
    let s = summary("Intro. She was preserved as a museum ship in 1975.", None);
    let trivia = derive_trivia(&s, None).unwrap();
    assert!(trivia.contains("museum"));
  }
}
