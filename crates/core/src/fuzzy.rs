//! Nearest-name lookup by bounded edit distance.

/// Matches must cost strictly less than this many edits.
pub const MAX_FUZZY_COST: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub index: usize,
    pub name: String,
}

/// Finds the candidate closest to `query`.
///
/// A case-insensitive exact hit returns immediately. Otherwise the first
/// candidate with the lowest Levenshtein distance wins, provided it is below
/// [`MAX_FUZZY_COST`]. Comparisons where either side is empty are skipped and
/// never contribute a score.
pub fn find_closest<S: AsRef<str>>(candidates: &[S], query: &str) -> Option<FuzzyMatch> {
    let lowered_query = query.to_lowercase();
    let folded_query: Vec<char> = lowered_query.chars().collect();
    let mut best: Option<(usize, usize)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        let lowered = candidate.to_lowercase();
        if lowered == lowered_query {
            return Some(FuzzyMatch {
                index,
                name: candidate.to_string(),
            });
        }
        let folded: Vec<char> = lowered.chars().collect();
        if folded.is_empty() || folded_query.is_empty() {
            continue;
        }
        let cost = edit_distance(&folded, &folded_query);
        if best.map_or(true, |(_, best_cost)| cost < best_cost) {
            best = Some((index, cost));
        }
    }
    match best {
        Some((index, cost)) if cost < MAX_FUZZY_COST => Some(FuzzyMatch {
            index,
            name: candidates[index].as_ref().to_string(),
        }),
        _ => None,
    }
}

/// Levenshtein distance with a single row sized to the shorter input.
pub fn edit_distance(left: &[char], right: &[char]) -> usize {
    let (long, short) = if left.len() >= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, long_ch) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, short_ch) in short.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(long_ch != short_ch);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }
    row[short.len()]
}
