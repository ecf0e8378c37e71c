//! Row normalization — raw tabular bindings to one [`ShipRecord`].
//!
//! The detail query can return several rows for the same ship: multi-valued
//! predicates (conflict associations) Cartesian-expand in tabular results.
//! The first row is authoritative for every single-valued field; conflict
//! labels are aggregated across all rows.

use std::collections::HashSet;

use keel_core::ship::ShipRecord;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::client::Row;

/// The `encodeURIComponent` alphabet: everything except ASCII alphanumerics
/// and `- _ . ! ~ * ' ( )` is percent-encoded.
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

fn val<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
  row.get(key).map(|c| c.value.as_str())
}

/// Trailing `Q\d+` entity id of a Wikidata URI; the URI itself if the tail
/// is not an id.
pub fn extract_entity_id(uri: &str) -> String {
  let tail = uri.rsplit('/').next().unwrap_or(uri);
  let is_qid = tail.len() > 1
    && tail.starts_with('Q')
    && tail[1..].bytes().all(|b| b.is_ascii_digit());
  if is_qid { tail.to_string() } else { uri.to_string() }
}

/// Canonical media-repository URL for a Commons filename.
///
/// The filename may arrive percent-encoded or not, inconsistently, so it is
/// first decoded and then re-encoded: strip a `File:`/`Image:` prefix,
/// decode if decodable, spaces to underscores, component-encode keeping
/// underscores and slashes. Byte-for-byte reproducible for a given input.
pub fn commons_file_url(filename: &str) -> String {
  let lower = filename.to_ascii_lowercase();
  let clean = if let Some(rest) = lower.strip_prefix("file:") {
    &filename[filename.len() - rest.len()..]
  } else if let Some(rest) = lower.strip_prefix("image:") {
    &filename[filename.len() - rest.len()..]
  } else {
    filename
  };

  // If the name does not decode to valid UTF-8 it was not encoded; keep it.
  let decoded = percent_decode_str(clean)
    .decode_utf8()
    .map(|c| c.into_owned())
    .unwrap_or_else(|_| clean.to_string());

  let underscored = decoded.replace(' ', "_");
  let encoded = utf8_percent_encode(&underscored, COMPONENT)
    .to_string()
    .replace("%2F", "/");

  format!("https://commons.wikimedia.org/wiki/Special:FilePath/{encoded}")
}

/// Article title from an enwiki URL: trailing `/wiki/` segment,
/// percent-decoded, underscores to spaces.
fn wikipedia_title(article_url: &str) -> Option<String> {
  let (_, tail) = article_url.split_once("/wiki/")?;
  if tail.is_empty() {
    return None;
  }
  let spaced = tail.replace('_', " ");
  let decoded = percent_decode_str(&spaced)
    .decode_utf8()
    .map(|c| c.into_owned())
    .unwrap_or(spaced);
  Some(decoded)
}

/// Year component of a Wikidata datetime literal
/// (e.g. `+1943-06-01T00:00:00Z`).
fn year_of(datetime: &str) -> Option<i32> {
  let s = datetime.strip_prefix('+').unwrap_or(datetime);
  if s.is_empty() {
    return None;
  }
  let end = s[1..].find(|c: char| !c.is_ascii_digit()).map_or(s.len(), |i| i + 1);
  s[..end].parse().ok()
}

/// Locale-style thousands grouping for a non-negative integer.
fn group_thousands(n: i64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

const RECENCY_KEYWORDS: [&str; 4] = ["iraq", "afghan", "gulf", "syria"];

/// Whether a conflict label suggests the ship is still (or was recently) in
/// service: a recency keyword, or a bare 4-digit year >= 2000.
fn is_recent_conflict(label: &str) -> bool {
  let lower = label.to_lowercase();
  if RECENCY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
    return true;
  }
  // Scan maximal digit runs; only standalone 4-digit years count.
  let bytes = lower.as_bytes();
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i].is_ascii_digit() {
      let start = i;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      if i - start == 4 {
        if let Ok(year) = lower[start..i].parse::<i32>() {
          if year >= 2000 {
            return true;
          }
        }
      }
    } else {
      i += 1;
    }
  }
  false
}

/// Disposition resolution, in priority order: explicit status label, a
/// synthesized "Decommissioned {year}", the recency heuristic, unknown.
fn resolve_status(
  status_label: Option<&str>,
  decommissioned: Option<i32>,
  conflicts: &[String],
) -> Option<String> {
  if let Some(label) = status_label {
    return Some(label.to_string());
  }
  if let Some(year) = decommissioned {
    return Some(format!("Decommissioned {year}"));
  }
  if conflicts.iter().any(|c| is_recent_conflict(c)) {
    return Some("Active or recently active".to_string());
  }
  None
}

/// Normalize one row-group into a [`ShipRecord`]. Returns `None` when the
/// rows are empty or a required field (id, label, image) is missing, which
/// the selector treats the same as an empty offset.
pub fn parse_ship_rows(rows: &[Row]) -> Option<ShipRecord> {
  let first = rows.first()?;

  let id = extract_entity_id(val(first, "ship")?);
  let name = val(first, "shipLabel")?.to_string();
  let image_url = {
    let raw = val(first, "image")?;
    let filename = raw.rsplit('/').next().unwrap_or(raw);
    commons_file_url(filename)
  };

  let mut conflicts = Vec::new();
  let mut seen = HashSet::new();
  for row in rows {
    if let Some(label) = val(row, "conflictLabel") {
      if seen.insert(label.to_string()) {
        conflicts.push(label.to_string());
      }
    }
  }

  let nation = val(first, "countryLabel")
    .or_else(|| val(first, "operatorCountryLabel"))
    .or_else(|| val(first, "operatorLabel"))
    .map(str::to_string);

  let length = val(first, "length")
    .and_then(|v| v.parse::<f64>().ok())
    .map(|m| format!("{}m", m.round() as i64));

  let displacement = val(first, "displacement")
    .and_then(|v| v.parse::<f64>().ok())
    .map(|t| format!("{} tons", group_thousands(t.round() as i64)));

  let commissioned = val(first, "commissioned").and_then(year_of);
  let decommissioned = val(first, "decommissioned").and_then(year_of);
  let status =
    resolve_status(val(first, "statusLabel"), decommissioned, &conflicts);

  let wikipedia_title = val(first, "article").and_then(wikipedia_title);

  Some(ShipRecord {
    id,
    name,
    image_url,
    class_name: val(first, "classLabel").map(str::to_string),
    nation,
    length,
    displacement,
    commissioned,
    decommissioned,
    status,
    conflicts,
    wikipedia_title,
  })
}
