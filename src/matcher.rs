use std::collections::BTreeSet;

use crate::models::RawRecord;
use crate::normalize::normalize;

// Acceptance thresholds and bonus weights tuned against historical
// payout exports; change them together or not at all.
pub const MIN_SCORE: f64 = 65.0;
pub const MIN_COVERAGE: f64 = 0.5;

const DICE_WEIGHT: f64 = 0.55;
const COVERAGE_WEIGHT: f64 = 0.20;
const JACCARD_WEIGHT: f64 = 0.10;
const DISTANCE_WEIGHT: f64 = 0.15;

const FIRST_TOKEN_BONUS: f64 = 8.0;
const LAST_TOKEN_BONUS: f64 = 8.0;
const PREFIX_PAIR_BONUS: f64 = 4.0;
const PREFIX_BONUS_CAP: f64 = 8.0;
const DIALECT_BONUS: f64 = 20.0;

/// Shortest token length eligible for the truncated-spelling prefix bonus.
const MIN_PREFIX_LEN: usize = 3;

/// The record a source contributed for a driver, with score and matched
/// name kept for auditability. Computed fresh per run, never persisted.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub record: RawRecord,
    pub matched_name: String,
    pub score: f64,
}

struct Breakdown {
    score: f64,
    coverage: f64,
    first_match: bool,
    last_match: bool,
    positional_count: usize,
}

fn breakdown(query_norm: &str, cand_norm: &str) -> Breakdown {
    if query_norm == cand_norm {
        return Breakdown {
            score: 100.0,
            coverage: 1.0,
            first_match: true,
            last_match: true,
            positional_count: 2,
        };
    }

    let q_tokens: Vec<&str> = query_norm.split_whitespace().collect();
    let c_tokens: Vec<&str> = cand_norm.split_whitespace().collect();
    let q_set: BTreeSet<&str> = q_tokens.iter().copied().collect();
    let c_set: BTreeSet<&str> = c_tokens.iter().copied().collect();
    if q_set.is_empty() || c_set.is_empty() {
        return Breakdown {
            score: 0.0,
            coverage: 0.0,
            first_match: false,
            last_match: false,
            positional_count: 0,
        };
    }

    let inter = q_set.intersection(&c_set).count() as f64;
    let union = q_set.union(&c_set).count() as f64;
    let dice = 2.0 * inter / (q_set.len() + c_set.len()) as f64;
    let coverage = inter / q_set.len() as f64;
    let jaccard = inter / union;

    let first_match = q_tokens.first() == c_tokens.first();
    let last_match = q_tokens.last() == c_tokens.last();

    // Truncated spellings: one token a strict prefix of the other.
    let mut prefix_pairs = 0usize;
    for a in &q_set {
        for b in &c_set {
            if a != b
                && a.len().min(b.len()) >= MIN_PREFIX_LEN
                && (a.starts_with(b) || b.starts_with(a))
            {
                prefix_pairs += 1;
            }
        }
    }
    let prefix_bonus = (prefix_pairs as f64 * PREFIX_PAIR_BONUS).min(PREFIX_BONUS_CAP);

    // Transliteration variants: both names carry the dialectal prefix
    // token ("al" already folded to "el") the same number of times.
    let q_dialect = q_tokens.iter().filter(|t| **t == "el").count();
    let c_dialect = c_tokens.iter().filter(|t| **t == "el").count();
    let dialect_bonus = if q_dialect > 0 && q_dialect == c_dialect {
        DIALECT_BONUS
    } else {
        0.0
    };

    let max_len = query_norm.chars().count().max(cand_norm.chars().count());
    let distance_score = if max_len == 0 {
        1.0
    } else {
        1.0 - strsim::levenshtein(query_norm, cand_norm) as f64 / max_len as f64
    };

    let base = DICE_WEIGHT * dice
        + COVERAGE_WEIGHT * coverage
        + JACCARD_WEIGHT * jaccard
        + DISTANCE_WEIGHT * distance_score;
    let mut bonus = prefix_bonus + dialect_bonus;
    if first_match {
        bonus += FIRST_TOKEN_BONUS;
    }
    if last_match {
        bonus += LAST_TOKEN_BONUS;
    }

    Breakdown {
        score: (base * 100.0 + bonus).clamp(0.0, 100.0),
        coverage,
        first_match,
        last_match,
        positional_count: usize::from(first_match) + usize::from(last_match) + prefix_pairs,
    }
}

/// Blended lexical similarity between two names, in [0,100].
pub fn score(query: &str, candidate: &str) -> f64 {
    breakdown(&normalize(query), &normalize(candidate)).score
}

/// Pick the single best acceptable candidate for a source, or `None`.
///
/// Acceptance requires the score and coverage thresholds plus a
/// first-or-last token match or a literal substring containment; lexical
/// similarity alone (a shared common first name, say) is not enough.
pub fn select_best(
    query: &str,
    candidates: &[RawRecord],
    min_score: f64,
    min_coverage: f64,
) -> Option<MatchResult> {
    let query_norm = normalize(query);
    if query_norm.is_empty() {
        return None;
    }

    let mut best: Option<(Breakdown, &RawRecord)> = None;
    for record in candidates {
        let cand_norm = normalize(record.driver_name());
        let b = breakdown(&query_norm, &cand_norm);
        let accepted = b.score >= min_score
            && b.coverage >= min_coverage
            && (b.first_match || b.last_match || cand_norm.contains(&query_norm));
        if !accepted {
            continue;
        }
        let better = match &best {
            None => true,
            Some((cur, _)) => {
                b.score > cur.score
                    || (b.score == cur.score && b.coverage > cur.coverage)
                    || (b.score == cur.score
                        && b.coverage == cur.coverage
                        && b.positional_count > cur.positional_count)
            }
        };
        if better {
            best = Some((b, record));
        }
    }

    best.map(|(b, record)| MatchResult {
        record: record.clone(),
        matched_name: record.driver_name().to_string(),
        score: b.score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DispatchRecord;

    fn rec(driver: &str) -> RawRecord {
        RawRecord::Dispatch(DispatchRecord {
            driver: driver.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_identical_names_score_100() {
        for name in ["Jose Garcia", "al masri", "HASSAN  el-Masri"] {
            assert_eq!(score(name, name), 100.0);
        }
    }

    #[test]
    fn test_transliteration_variants_score_100() {
        assert_eq!(score("Al Masri", "el masri"), 100.0);
        assert_eq!(score("Garcia-Lopez", "garcia lopez"), 100.0);
    }

    #[test]
    fn test_shared_last_name_alone_is_rejected() {
        // "Maria Garcia" shares one token and the last position, but the
        // blended score stays below the acceptance threshold.
        let candidates = vec![
            rec("Garcia, Jose"),
            rec("Jose Garcia-Lopez"),
            rec("Maria Garcia"),
        ];
        let m = select_best("Jose Garcia", &candidates, MIN_SCORE, MIN_COVERAGE).unwrap();
        assert_eq!(m.matched_name, "Jose Garcia-Lopez");
        assert!(score("Jose Garcia", "Maria Garcia") < MIN_SCORE);
    }

    #[test]
    fn test_common_first_name_alone_is_rejected() {
        let candidates = vec![rec("Jose Martinez")];
        assert!(select_best("Jose Garcia", &candidates, MIN_SCORE, MIN_COVERAGE).is_none());
    }

    #[test]
    fn test_truncated_spelling_matches() {
        let candidates = vec![rec("Jose Garc")];
        let m = select_best("Jose Garcia", &candidates, MIN_SCORE, MIN_COVERAGE);
        assert!(m.is_some(), "truncated last name should still match");
    }

    #[test]
    fn test_no_candidates() {
        assert!(select_best("Jose Garcia", &[], MIN_SCORE, MIN_COVERAGE).is_none());
    }

    #[test]
    fn test_empty_query() {
        assert!(select_best("", &[rec("Jose Garcia")], MIN_SCORE, MIN_COVERAGE).is_none());
    }

    #[test]
    fn test_stable_first_on_tie() {
        let candidates = vec![rec("Jose Garcia"), rec("jose garcia")];
        let m = select_best("Jose Garcia", &candidates, MIN_SCORE, MIN_COVERAGE).unwrap();
        assert_eq!(m.matched_name, "Jose Garcia");
    }

    #[test]
    fn test_score_is_clamped() {
        let s = score("Hassan el Masri", "hassan el masri oglu");
        assert!(s <= 100.0 && s >= 0.0);
    }
}
