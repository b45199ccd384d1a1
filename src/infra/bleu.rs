// ============================================================
// Layer 6 — BLEU Scorer
// ============================================================
// Sentence-level BLEU with uniform 4-gram weights.
//
// How the score is built:
//   1. For n = 1..4, count candidate n-grams and clip each count
//      at the number of times that n-gram appears in the reference
//      (so "the the the" cannot farm matches from a single "the").
//   2. p_n = clipped matches / candidate n-gram total. A zero
//      numerator is smoothed to 0.1 so the geometric mean stays
//      defined for short sentences.
//   3. Combine as exp(Σ 0.25·ln p_n), then multiply by the brevity
//      penalty exp(1 - r/c) when the candidate is shorter than the
//      reference.
//
// Why an outcome enum instead of a bare f64?
//   A pair can be unscorable (the model emitted nothing, or the
//   reference line was blank). Those cases carry a reason and are
//   excluded from the corpus mean instead of dragging it down as
//   silent zeros.
//
// Reference: Papineni et al. (2002), "BLEU: a Method for Automatic
//            Evaluation of Machine Translation"; smoothing is
//            method 1 of Chen & Cherry (2014).

use std::collections::HashMap;

const MAX_ORDER: usize = 4;
const ZERO_COUNT_SMOOTHING: f64 = 0.1;

/// Per-sentence scoring result.
#[derive(Debug, Clone, PartialEq)]
pub enum BleuOutcome {
    /// Geometric-mean 4-gram BLEU in [0, 1].
    Scored(f64),
    /// The pair could not be scored; carries the reason why.
    Skipped(&'static str),
}

/// Corpus-level summary of many sentence outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusBleu {
    /// Mean over the scored sentences only (0.0 when none scored)
    pub mean: f64,
    /// How many sentences contributed to the mean
    pub scored: usize,
    /// How many sentences were skipped with a reason
    pub skipped: usize,
}

/// Score one candidate translation against one reference.
pub fn sentence_bleu(reference: &[String], candidate: &[String]) -> BleuOutcome {
    if candidate.is_empty() {
        return BleuOutcome::Skipped("empty candidate");
    }
    if reference.is_empty() {
        return BleuOutcome::Skipped("empty reference");
    }

    let weight = 1.0 / MAX_ORDER as f64;
    let mut log_sum = 0.0;

    for n in 1..=MAX_ORDER {
        let (matched, total) = modified_precision(reference, candidate, n);
        let p = if matched == 0 {
            ZERO_COUNT_SMOOTHING / total as f64
        } else {
            matched as f64 / total as f64
        };
        log_sum += weight * p.ln();
    }

    let c = candidate.len() as f64;
    let r = reference.len() as f64;
    let brevity_penalty = if c >= r { 1.0 } else { (1.0 - r / c).exp() };

    BleuOutcome::Scored(brevity_penalty * log_sum.exp())
}

/// Clipped n-gram precision as (matched, total).
/// `total` is floored at 1 so the ratio is always defined.
fn modified_precision(reference: &[String], candidate: &[String], n: usize) -> (usize, usize) {
    let reference_counts = ngram_counts(reference, n);
    let candidate_counts = ngram_counts(candidate, n);

    let mut matched = 0usize;
    let mut total = 0usize;
    for (ngram, &count) in &candidate_counts {
        matched += count.min(*reference_counts.get(ngram).unwrap_or(&0));
        total += count;
    }

    (matched, total.max(1))
}

fn ngram_counts<'a>(tokens: &'a [String], n: usize) -> HashMap<&'a [String], usize> {
    let mut counts = HashMap::new();
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Fold per-sentence outcomes into a corpus summary.
/// Skipped sentences are counted but never averaged.
pub fn corpus_bleu<I>(outcomes: I) -> CorpusBleu
where
    I: IntoIterator<Item = BleuOutcome>,
{
    let mut sum = 0.0f64;
    let mut summary = CorpusBleu::default();

    for outcome in outcomes {
        match outcome {
            BleuOutcome::Scored(score) => {
                sum += score;
                summary.scored += 1;
            }
            BleuOutcome::Skipped(reason) => {
                summary.skipped += 1;
                tracing::debug!("BLEU skip: {}", reason);
            }
        }
    }

    if summary.scored > 0 {
        summary.mean = sum / summary.scored as f64;
    }
    summary
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn score(reference: &[&str], candidate: &[&str]) -> f64 {
        match sentence_bleu(&tokens(reference), &tokens(candidate)) {
            BleuOutcome::Scored(s) => s,
            BleuOutcome::Skipped(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_identical_sentences_score_one() {
        let s = score(
            &["the", "cat", "sat", "on", "the", "mat"],
            &["the", "cat", "sat", "on", "the", "mat"],
        );
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_sentences_score_near_zero() {
        let s = score(&["the", "cat", "sat"], &["un", "chien", "court"]);
        assert!(s > 0.0);
        assert!(s < 0.2);
    }

    #[test]
    fn test_short_candidate_is_penalised() {
        // Perfect prefix, but only half the reference length.
        let s = score(&["the", "cat", "sat", "on", "the", "mat"], &["the", "cat", "sat"]);
        assert!(s < 0.5);
    }

    #[test]
    fn test_repeated_tokens_are_clipped() {
        // "the the the" can match the single reference "the" once, not thrice.
        let s = score(&["the", "cat"], &["the", "the", "the"]);
        assert!(s < 0.2);
    }

    #[test]
    fn test_empty_sides_are_skipped() {
        let reference = tokens(&["the", "cat"]);
        assert_eq!(
            sentence_bleu(&reference, &[]),
            BleuOutcome::Skipped("empty candidate")
        );
        assert_eq!(
            sentence_bleu(&[], &reference),
            BleuOutcome::Skipped("empty reference")
        );
    }

    #[test]
    fn test_corpus_mean_excludes_skips() {
        let summary = corpus_bleu(vec![
            BleuOutcome::Scored(0.5),
            BleuOutcome::Skipped("empty candidate"),
            BleuOutcome::Scored(1.0),
        ]);
        assert!((summary.mean - 0.75).abs() < 1e-12);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_corpus_with_nothing_scored() {
        let summary = corpus_bleu(vec![BleuOutcome::Skipped("empty candidate")]);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.scored, 0);
        assert_eq!(summary.skipped, 1);
    }
}
