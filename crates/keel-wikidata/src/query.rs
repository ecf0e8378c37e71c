//! SPARQL query construction. Pure string building, no I/O.
//!
//! The count query and the detail query share one eligibility fragment
//! ([`eligibility_patterns`]). That sharing is load-bearing: the detail query
//! is addressed by a numeric offset into the eligible set counted by the
//! first query, so any divergence between the two predicates would put the
//! offset out of range or on the wrong ship.

use keel_core::mode::ModeConfig;

/// The WHERE-clause body both queries have in common: type whitelist,
/// required predicates, year window, label filter, exclusion list.
fn eligibility_patterns(mode: &ModeConfig, exclude_ids: &[String]) -> String {
  let type_values = mode
    .ship_types
    .iter()
    .map(|t| format!("wd:{t}"))
    .collect::<Vec<_>>()
    .join(" ");

  let conflict_pattern = if mode.requires_conflict {
    "?ship wdt:P607 ?conflict ."
  } else {
    "OPTIONAL { ?ship wdt:P607 ?conflict . }"
  };

  let mut year_filters = String::new();
  if let Some(min) = mode.year_min {
    year_filters.push_str(&format!("  FILTER(YEAR(?commissioned) >= {min})\n"));
  }
  if let Some(max) = mode.year_max {
    year_filters.push_str(&format!("  FILTER(YEAR(?commissioned) <= {max})\n"));
  }

  // An empty exclusion set omits the clause entirely: `NOT IN ()` is not
  // valid SPARQL, and an empty filter must not silently exclude nothing
  // while appearing to exclude something.
  let exclude_filter = if exclude_ids.is_empty() {
    String::new()
  } else {
    let ids = exclude_ids
      .iter()
      .map(|id| format!("wd:{id}"))
      .collect::<Vec<_>>()
      .join(", ");
    format!("  FILTER(?ship NOT IN ({ids}))\n")
  };

  format!(
    "\
  VALUES ?type {{ {type_values} }}
  ?ship wdt:P31 ?type .
  ?ship wdt:P18 ?image .
  ?ship wdt:P729 ?commissioned .
  {conflict_pattern}

{year_filters}
  ?ship rdfs:label ?label .
  FILTER(LANG(?label) = \"en\")
  FILTER(!STRSTARTS(?label, \"Q\"))

{exclude_filter}"
  )
}

/// Query for the size of the eligible set.
pub fn build_count_query(mode: &ModeConfig, exclude_ids: &[String]) -> String {
  let patterns = eligibility_patterns(mode, exclude_ids);
  format!(
    "\
SELECT (COUNT(DISTINCT ?ship) AS ?count)
WHERE {{
{patterns}}}"
  )
}

/// Query for the single ship at `offset` in the label-ordered eligible set.
///
/// The deterministic `ORDER BY ?shipLabel` is what makes a fixed offset
/// address a fixed ship, so a uniform offset draw is a uniform ship draw.
/// Optional properties are left-outer patterns: their absence never shrinks
/// the eligible set.
pub fn build_detail_query(
  mode: &ModeConfig,
  exclude_ids: &[String],
  offset: u64,
) -> String {
  let patterns = eligibility_patterns(mode, exclude_ids);
  format!(
    "\
SELECT DISTINCT
  ?ship ?shipLabel
  ?image
  ?class ?classLabel
  ?country ?countryLabel
  ?operator ?operatorLabel
  ?operatorCountry ?operatorCountryLabel
  ?length ?displacement
  ?commissioned
  ?conflict ?conflictLabel
  ?decommissioned
  ?status ?statusLabel
  ?article
WHERE {{
{patterns}
  OPTIONAL {{ ?ship wdt:P289 ?class . }}
  OPTIONAL {{ ?ship wdt:P17 ?country . }}
  OPTIONAL {{
    ?ship wdt:P137 ?operator .
    OPTIONAL {{ ?operator wdt:P17 ?operatorCountry . }}
  }}
  OPTIONAL {{ ?ship wdt:P2043 ?length . }}
  OPTIONAL {{ ?ship wdt:P2386 ?displacement . }}
  OPTIONAL {{ ?ship wdt:P730 ?decommissioned . }}
  OPTIONAL {{ ?ship wdt:P1308 ?status . }}

  OPTIONAL {{
    ?article schema:about ?ship ;
             schema:isPartOf <https://en.wikipedia.org/> .
  }}

  SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"en\" . }}
}}
ORDER BY ?shipLabel
LIMIT 1
OFFSET {offset}"
  )
}
