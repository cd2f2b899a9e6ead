//! Name-similarity scoring for diagnostics.

/// Edit distance above this percentage of the reference's length is noise.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Declared names closest to an unknown reference.
///
/// Candidates are ranked by edit distance; anything further than half the
/// reference's length is dropped, and at most three names are returned. An
/// empty result means nothing plausible was declared and the caller should
/// not guess.
pub fn similar_names(target: &str, candidates: &[&str]) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), *candidate))
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .filter(|(distance, _)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(_, name)| name.to_string())
        .collect()
}
