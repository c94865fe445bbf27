//! Fuzzy source-file matching.
//!
//! When a student's exam has no explicit link to a source PDF, the best
//! candidate is picked by additive scoring against the student's noisy
//! identity: id and name substrings, the exam id, and a fuzzy name
//! similarity. Pure function over its inputs; no filesystem access.

/// Identity fragments known about a student.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHint<'a> {
    /// Student identifier (e.g. "s042"), when known
    pub id: Option<&'a str>,
    /// Student full name, when transcription found one
    pub name: Option<&'a str>,
}

/// A candidate filename with its accumulated score. Internal to one
/// selection pass.
#[derive(Debug, Clone, Copy)]
struct MatchCandidate<'a> {
    filename: &'a str,
    score: f64,
}

/// Minimum winning score for a confident match.
const CONFIDENCE_THRESHOLD: f64 = 10.0;

/// Pick the most likely source file for a student.
///
/// Scoring (case-insensitive throughout):
/// - +100 when the id appears in the filename
/// - +50 per name token (length > 2) appearing in the filename
/// - +30 when the context id (e.g. exam id) appears in the filename
/// - up to +20 from [`similarity_ratio`] between name and file stem
///
/// Zero candidates return `None`; a single candidate is returned
/// unconditionally. When the winning score is at or below the
/// confidence threshold, the FIRST candidate is returned rather than
/// `None`, preserving the long-standing "always show something" behavior
/// (see DESIGN.md; flagged for product review).
pub fn select_best_file<'a>(
    candidates: &'a [String],
    hint: &IdentityHint<'_>,
    context_id: Option<&str>,
) -> Option<&'a str> {
    match candidates {
        [] => None,
        [only] => Some(only.as_str()),
        _ => {
            let best = candidates
                .iter()
                .map(|filename| MatchCandidate {
                    filename,
                    score: score_candidate(filename, hint, context_id),
                })
                .fold(None::<MatchCandidate<'_>>, |best, candidate| match best {
                    // Strictly-greater keeps the first-seen on ties.
                    Some(b) if candidate.score > b.score => Some(candidate),
                    Some(b) => Some(b),
                    None => Some(candidate),
                })?;

            if best.score > CONFIDENCE_THRESHOLD {
                log::debug!(
                    "selected '{}' with score {:.1}",
                    best.filename,
                    best.score
                );
                Some(best.filename)
            } else {
                log::warn!(
                    "no confident file match (best score {:.1}), defaulting to first candidate",
                    best.score
                );
                Some(candidates[0].as_str())
            }
        },
    }
}

fn score_candidate(filename: &str, hint: &IdentityHint<'_>, context_id: Option<&str>) -> f64 {
    let filename_lower = filename.to_lowercase();
    let mut score = 0.0;

    if let Some(id) = hint.id {
        if !id.is_empty() && filename_lower.contains(&id.to_lowercase()) {
            score += 100.0;
        }
    }

    if let Some(name) = hint.name {
        let name_lower = name.to_lowercase();
        if !name_lower.is_empty() && name_lower != "unknown" {
            for token in name_lower.split_whitespace() {
                if token.chars().count() > 2 && filename_lower.contains(token) {
                    score += 50.0;
                }
            }

            let stem = filename_lower
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(&filename_lower);
            score += 20.0 * similarity_ratio(&name_lower, stem);
        }
    }

    if let Some(context) = context_id {
        if !context.is_empty() && filename_lower.contains(&context.to_lowercase()) {
            score += 30.0;
        }
    }

    score
}

/// Normalized sequence similarity in `[0, 1]`: `2·LCS(a, b) / (|a| + |b|)`
/// over characters. Two empty strings are identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Longest common subsequence, two-row DP.
    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut prev, &mut current);
    }
    let lcs = prev[b.len()];

    2.0 * lcs as f64 / (a.len() + b.len()) as f64
}
